use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session token. Everything here is either a
/// gateway function (login, registration), infrastructure (health), or a
/// machine callback carrying its own shared-secret authentication (the SMS
/// delivery-report webhook).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/register
        // Client self-registration. Staff accounts come from the admin console.
        .route("/auth/register", post(handlers::register))
        // POST /auth/login
        // Credential verification and session-token issuance (envelope + cookie).
        .route("/auth/login", post(handlers::login))
        // POST /sms/delivery-report
        // Gateway webhook reconciling SMS delivery status. Authenticated by the
        // x-gateway-secret header, not by a session.
        .route("/sms/delivery-report", post(handlers::sms_delivery_report))
}
