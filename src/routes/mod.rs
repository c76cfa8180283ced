/// Router Module Index
///
/// Organizes the application's routing into security-segregated modules so
/// access control is applied explicitly at the module level (via Axum
/// layers and in-handler role gates) rather than scattered per endpoint.

/// Routes accessible without a session: health, login/registration, and the
/// SMS gateway's delivery-report webhook (secret-header authenticated).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware. Requires a
/// validated session; per-endpoint role gates apply on top.
pub mod authenticated;

/// Routes restricted to administrative roles. Each handler enumerates its
/// exact allowed role set.
pub mod admin;

/// Routes for kebele managers deciding residency-linked document approvals.
pub mod kebele;
