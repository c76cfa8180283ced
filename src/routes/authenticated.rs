use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Authenticated Router Module
///
/// Routes for any user who has passed the authentication layer. Every
/// handler receives a validated `AuthUser` and applies its own role gate or
/// ownership scope on top; nothing in this module assumes more than a live,
/// ACTIVE session.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The resolved identity's profile.
        .route("/me", get(handlers::get_me))
        // --- Cases ---
        // POST /cases: a client submits a new case (status SUBMITTED).
        // GET /cases: role-scoped listing (own / assigned / all).
        .route("/cases", post(handlers::create_case).get(handlers::list_cases))
        // GET /cases/{id}
        // Ownership-scoped read; a non-owned case is a plain 404.
        .route("/cases/{id}", get(handlers::get_case_details))
        // PATCH /cases/{id}/status
        // Lawyer/coordinator status transition, audited atomically.
        .route("/cases/{id}/status", patch(handlers::update_case_status))
        // POST /cases/{id}/assign
        // Coordinator triage: lawyer + office assignment.
        .route("/cases/{id}/assign", post(handlers::assign_case))
        // --- Documents ---
        // POST /cases/{id}/documents
        // Registers document metadata and returns a presigned upload URL.
        .route("/cases/{id}/documents", post(handlers::upload_document))
        // GET /documents/{id}/download
        // Ownership-scoped presigned download URL.
        .route("/documents/{id}/download", get(handlers::download_document))
        // PATCH /documents/{id}/verify
        // Lawyer/coordinator verification verdict, audited atomically.
        .route("/documents/{id}/verify", patch(handlers::verify_document))
        // DELETE /documents/{id}
        // Uploader or admin; object cleanup is best-effort.
        .route("/documents/{id}", delete(handlers::delete_document))
        // --- Appointments ---
        .route(
            "/appointments",
            post(handlers::schedule_appointment).get(handlers::list_appointments),
        )
        .route(
            "/appointments/{id}/status",
            patch(handlers::update_appointment_status),
        )
        // --- Case thread ---
        .route(
            "/cases/{id}/messages",
            post(handlers::post_case_message).get(handlers::get_case_messages),
        )
        // --- Notifications ---
        // GET /me/notifications: the recipient's inbox.
        .route("/me/notifications", get(handlers::get_my_notifications))
        // PATCH /notifications/{id}/read: idempotent read-marking.
        .route(
            "/notifications/{id}/read",
            patch(handlers::mark_notification_read),
        )
        // PATCH /notifications/read-all: one bulk statement.
        .route(
            "/notifications/read-all",
            patch(handlers::mark_all_notifications_read),
        )
        // POST /notifications/create: staff-initiated notification.
        .route("/notifications/create", post(handlers::create_notification))
        // --- Assistant ---
        // POST /assistant/chat: coordinator-only external chat bridge.
        .route("/assistant/chat", post(handlers::assistant_chat))
}
