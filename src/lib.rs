use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod assistant;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod response;
pub mod sms;
pub mod storage;

// Routing segregation (Public, Authenticated, Admin, Kebele).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, kebele, public};

// --- Public Re-exports ---

// Core state types for the application entry point (main.rs) and tests.
pub use assistant::{AssistantState, HttpAssistantClient, MockAssistantService};
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use sms::{HttpSmsGateway, MockSmsGateway, SmsState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the application from the
/// `#[utoipa::path]` and `ToSchema` annotations. Served as JSON at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::register, handlers::get_me,
        handlers::create_case, handlers::list_cases, handlers::get_case_details,
        handlers::update_case_status, handlers::assign_case,
        handlers::upload_document, handlers::download_document,
        handlers::verify_document, handlers::delete_document,
        handlers::schedule_appointment, handlers::list_appointments,
        handlers::update_appointment_status,
        handlers::post_case_message, handlers::get_case_messages,
        handlers::get_my_notifications, handlers::mark_notification_read,
        handlers::mark_all_notifications_read, handlers::create_notification,
        handlers::assistant_chat,
        handlers::get_admin_stats, handlers::list_users, handlers::create_user,
        handlers::update_user_status, handlers::list_offices, handlers::create_office,
        handlers::get_settings, handlers::update_settings,
        handlers::send_bulk_sms, handlers::resend_sms, handlers::list_sms_log,
        handlers::sms_delivery_report,
        handlers::list_kebele_approvals, handlers::decide_kebele_approval,
    ),
    components(
        schemas(
            models::UserProfile, models::Case, models::Document, models::Appointment,
            models::Notification, models::CaseMessage, models::SmsMessage, models::Office,
            models::SystemSetting,
            models::LoginRequest, models::LoginResponse, models::RegisterRequest,
            models::CreateUserRequest, models::UpdateUserStatusRequest,
            models::CreateCaseRequest, models::UpdateCaseStatusRequest,
            models::AssignCaseRequest, models::CreateDocumentRequest,
            models::VerifyDocumentRequest, models::KebeleDecisionRequest,
            models::ScheduleAppointmentRequest, models::UpdateAppointmentStatusRequest,
            models::CreateNotificationRequest, models::CreatedNotification,
            models::PostMessageRequest, models::CreateOfficeRequest,
            models::SettingEntry, models::UpdateSettingsRequest,
            models::SendSmsRequest, models::DeliveryReport, models::SmsSendOutcome,
            models::BulkSmsReport, models::ChatMessage, models::ChatRequest,
            models::ChatReply, models::DocumentUploadResponse, models::DownloadUrlResponse,
            models::DashboardStats,
        )
    ),
    tags(
        (name = "legalaid-portal", description = "Legal-Aid Case Management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Storage Layer: abstracts object storage and presigned URL generation.
    pub storage: StorageState,
    /// Outbound SMS gateway client.
    pub sms: SmsState,
    /// External generative chat service for the coordinator assistant.
    pub assistant: AssistantState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow handlers and extractors to selectively pull components out of the
// shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for SmsState {
    fn from_ref(app_state: &AppState) -> SmsState {
        app_state.sms.clone()
    }
}

impl FromRef<AppState> for AssistantState {
    fn from_ref(app_state: &AppState) -> AssistantState {
        app_state.assistant.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the authenticated route group. Extracting
/// `AuthUser` runs the full session resolution (token, codec, live user
/// check); on failure the request is rejected with a 401 envelope before any
/// handler executes.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no session required.
        .merge(public::public_routes())
        // Authenticated routes: rejected at the layer before handlers run.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin routes, nested under '/admin'. Authentication comes from the
        // AuthUser extractor in each handler; the role gate there enumerates
        // the exact allowed set per endpoint.
        .nest("/admin", admin::admin_routes())
        // Kebele approval routes, nested under '/kebele'. Same pattern.
        .nest("/kebele", kebele::kebele_routes())
        .with_state(state);

    // Observability and correlation layers, applied outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: every request/response cycle in a span
                // carrying the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes span creation for `TraceLayer`: includes the `x-request-id`
/// header (if present) alongside the HTTP method and URI so every log line
/// for a request is correlated by one ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
