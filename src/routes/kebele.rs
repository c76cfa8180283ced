use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Kebele Router Module
///
/// Residency-approval endpoints for kebele managers. The queue is the set of
/// pending residency-linked documents, scoped to the manager's office when
/// one is set on their account.
pub fn kebele_routes() -> Router<AppState> {
    Router::new()
        // GET /kebele/approvals
        // Pending residency-linked documents awaiting a decision.
        .route("/approvals", get(handlers::list_kebele_approvals))
        // PATCH /kebele/approvals/{id}
        // APPROVE or REJECT; the verdict write and its audit record commit together.
        .route("/approvals/{id}", patch(handlers::decide_kebele_approval))
}
