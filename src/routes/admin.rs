use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

/// Admin Router Module
///
/// Administrative endpoints. Authentication comes from the `AuthUser`
/// extractor inside each handler; the role gate there enumerates exactly the
/// roles each operation permits. The sets differ deliberately between
/// endpoints (user management is SUPER_ADMIN-only, office management is
/// ADMIN-only, the rest accept both) and must not be collapsed into a
/// hierarchy.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Dashboard counters (cases, users, pending documents, failed SMS).
        .route("/stats", get(handlers::get_admin_stats))
        // GET/POST /admin/users
        // Account listing and staff account creation. SUPER_ADMIN only.
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        // PATCH /admin/users/{id}/status
        // Activation/deactivation; enforced on the target's next request.
        .route("/users/{id}/status", patch(handlers::update_user_status))
        // GET/POST /admin/offices
        // Office registry. ADMIN only.
        .route(
            "/offices",
            get(handlers::list_offices).post(handlers::create_office),
        )
        // GET/PUT /admin/settings
        // Batch settings read/update; the update runs in one transaction.
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        // POST /admin/sms/send
        // Bulk send with per-item outcome reporting.
        .route("/sms/send", post(handlers::send_bulk_sms))
        // POST /admin/sms/{id}/resend
        // Retry a FAILED delivery-log entry; anything else is a 400.
        .route("/sms/{id}/resend", post(handlers::resend_sms))
        // GET /admin/sms
        // The outbound delivery log.
        .route("/sms", get(handlers::list_sms_log))
}
