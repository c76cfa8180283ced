use crate::{
    AppState,
    auth::{self, AuthUser, Role, UserStatus, authorize},
    error::ApiError,
    models::{
        self, AppointmentStatus, AssignCaseRequest, BulkSmsReport, Case, CasePriority, CaseStatus,
        ChatReply, ChatRequest, CreateCaseRequest, CreateDocumentRequest, CreateNotificationRequest,
        CreateOfficeRequest, CreateUserRequest, CreatedNotification, DashboardStats,
        DeliveryReport, Document, DocumentUploadResponse, DocumentVerdict, DownloadUrlResponse,
        KebeleDecisionRequest, LoginRequest, LoginResponse, NotificationType, PostMessageRequest,
        ReadAllResponse, RegisterRequest, ScheduleAppointmentRequest, SendSmsRequest,
        SmsSendOutcome, UpdateAppointmentStatusRequest, UpdateCaseStatusRequest,
        UpdateSettingsRequest, UpdateUserStatusRequest, User, UserProfile, VerifyDocumentRequest,
    },
    response::ApiResponse,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{AppendHeaders, IntoResponse},
};
use std::str::FromStr;
use uuid::Uuid;

// --- Session & Registration ---

/// login
///
/// [Public Route] Verifies credentials against the stored hash and issues a
/// signed session token, returned both in the envelope and as an HttpOnly
/// `auth-token` cookie. Unknown email and wrong password are deliberately
/// indistinguishable.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .repo
        .get_user_by_email(&payload.email)
        .await?
        .ok_or(ApiError::Unauthenticated("invalid_credentials"))?;

    if !auth::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthenticated("invalid_credentials"));
    }

    if UserStatus::from_str(&user.status) != Ok(UserStatus::Active) {
        return Err(ApiError::Unauthenticated("inactive_or_missing"));
    }

    let token = auth::issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_secs)?;

    let cookie = format!(
        "auth-token={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        token, state.config.token_ttl_secs
    );

    let body = LoginResponse {
        token,
        user: user.into(),
    };

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::ok(body),
    ))
}

/// register
///
/// [Public Route] Client self-registration. Staff accounts are created
/// through the admin console instead.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = UserProfile),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError::InvalidInput("A valid email is required".to_string()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::InvalidInput(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::InvalidInput("Full name is required".to_string()));
    }

    if state.repo.get_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::InvalidInput("Email already registered".to_string()));
    }

    let user = User {
        id: Uuid::new_v4(),
        email: payload.email,
        full_name: payload.full_name,
        role: Role::Client.as_str().to_string(),
        status: UserStatus::Active.as_str().to_string(),
        office_id: None,
        password_hash: auth::hash_password(&payload.password)?,
        created_at: chrono::Utc::now(),
    };

    let profile = state.repo.create_user(user).await?;
    Ok(ApiResponse::ok(profile))
}

/// get_me
///
/// [Authenticated Route] The resolved identity's full profile.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let record = state
        .repo
        .get_user(user.id)
        .await?
        .ok_or(ApiError::Unauthenticated("inactive_or_missing"))?;
    Ok(ApiResponse::ok(record.into()))
}

// --- Cases ---

/// create_case
///
/// [Authenticated Route] A client submits a new case. The owning client id
/// comes from the resolved session, never from the payload.
#[utoipa::path(
    post,
    path = "/cases",
    request_body = CreateCaseRequest,
    responses((status = 200, description = "Created", body = Case))
)]
pub async fn create_case(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCaseRequest>,
) -> Result<Json<ApiResponse<Case>>, ApiError> {
    authorize(&user, &[Role::Client])?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidInput("Title is required".to_string()));
    }
    if payload.description.trim().is_empty() {
        return Err(ApiError::InvalidInput("Description is required".to_string()));
    }

    let priority = match payload.priority.as_deref() {
        Some(p) => CasePriority::from_str(p)
            .map_err(|_| ApiError::InvalidInput(format!("Invalid priority: {p}")))?,
        None => CasePriority::Normal,
    };

    let case = state
        .repo
        .create_case(
            user.id,
            &payload.title,
            &payload.description,
            &payload.category,
            priority.as_str(),
        )
        .await?;

    Ok(ApiResponse::ok(case))
}

/// list_cases
///
/// [Authenticated Route] Role-scoped case listing: clients see their own
/// submissions, lawyers their assignments, coordinators and admins all.
#[utoipa::path(
    get,
    path = "/cases",
    responses((status = 200, description = "Cases", body = [Case]))
)]
pub async fn list_cases(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Case>>>, ApiError> {
    let cases = match user.role {
        Role::Client => state.repo.list_cases_for_client(user.id).await?,
        Role::Lawyer => state.repo.list_cases_for_lawyer(user.id).await?,
        Role::Coordinator | Role::Admin | Role::SuperAdmin => {
            state.repo.list_all_cases().await?
        }
        Role::KebeleManager => return Err(ApiError::Forbidden),
    };
    Ok(ApiResponse::ok(cases))
}

/// get_case_details
///
/// [Authenticated Route] Single-case read. For clients and lawyers the
/// ownership constraint is part of the query, so a case owned by someone
/// else produces the same 404 as a nonexistent id.
#[utoipa::path(
    get,
    path = "/cases/{id}",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Found", body = Case),
        (status = 404, description = "Not found or not owned")
    )
)]
pub async fn get_case_details(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Case>>, ApiError> {
    let case = match user.role {
        Role::Client => state.repo.get_case_for_client(id, user.id).await?,
        Role::Lawyer => state.repo.get_case_for_lawyer(id, user.id).await?,
        Role::Coordinator | Role::Admin | Role::SuperAdmin => state.repo.get_case(id).await?,
        Role::KebeleManager => None,
    };
    case.map(ApiResponse::ok).ok_or(ApiError::NotFound)
}

/// update_case_status
///
/// [Authenticated Route] Lawyer/coordinator case-status transition. The
/// target value is validated against the closed status set before any write,
/// and the audit record is committed in the same transaction.
#[utoipa::path(
    patch,
    path = "/cases/{id}/status",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = UpdateCaseStatusRequest,
    responses(
        (status = 200, description = "Updated", body = Case),
        (status = 400, description = "Invalid status")
    )
)]
pub async fn update_case_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCaseStatusRequest>,
) -> Result<Json<ApiResponse<Case>>, ApiError> {
    authorize(&user, &[Role::Lawyer, Role::Coordinator])?;

    let status = CaseStatus::from_str(&payload.status)
        .map_err(|_| ApiError::InvalidInput(format!("Invalid status: {}", payload.status)))?;

    // Lawyers may only transition their own assignments.
    if user.role == Role::Lawyer
        && state.repo.get_case_for_lawyer(id, user.id).await?.is_none()
    {
        return Err(ApiError::NotFound);
    }

    state
        .repo
        .update_case_status(id, status.as_str(), user.id)
        .await?
        .map(ApiResponse::ok)
        .ok_or(ApiError::NotFound)
}

/// assign_case
///
/// [Authenticated Route] Coordinator triage: attaches a lawyer (and
/// optionally an office) and moves the case to ASSIGNED. Audited atomically.
#[utoipa::path(
    post,
    path = "/cases/{id}/assign",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = AssignCaseRequest,
    responses((status = 200, description = "Assigned", body = Case))
)]
pub async fn assign_case(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignCaseRequest>,
) -> Result<Json<ApiResponse<Case>>, ApiError> {
    authorize(&user, &[Role::Coordinator])?;

    let lawyer = state
        .repo
        .get_user(payload.lawyer_id)
        .await?
        .ok_or_else(|| ApiError::InvalidInput("Unknown lawyer".to_string()))?;
    if Role::from_str(&lawyer.role) != Ok(Role::Lawyer) {
        return Err(ApiError::InvalidInput(
            "Assignee must have the LAWYER role".to_string(),
        ));
    }

    state
        .repo
        .assign_case(id, payload.lawyer_id, payload.office_id, user.id)
        .await?
        .map(ApiResponse::ok)
        .ok_or(ApiError::NotFound)
}

// --- Documents ---

/// Resolves a case for document operations under the caller's scope.
async fn case_for_document_access(
    state: &AppState,
    user: &AuthUser,
    case_id: Uuid,
) -> Result<Case, ApiError> {
    let case = match user.role {
        Role::Client => state.repo.get_case_for_client(case_id, user.id).await?,
        Role::Lawyer => state.repo.get_case_for_lawyer(case_id, user.id).await?,
        Role::Coordinator | Role::Admin | Role::SuperAdmin => {
            state.repo.get_case(case_id).await?
        }
        Role::KebeleManager => None,
    };
    case.ok_or(ApiError::NotFound)
}

/// upload_document
///
/// [Authenticated Route] Registers a document on a case and hands back a
/// short-lived presigned PUT URL so the file goes directly to object
/// storage, never through this service.
#[utoipa::path(
    post,
    path = "/cases/{id}/documents",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = CreateDocumentRequest,
    responses((status = 200, description = "Registered", body = DocumentUploadResponse))
)]
pub async fn upload_document(
    user: AuthUser,
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<CreateDocumentRequest>,
) -> Result<Json<ApiResponse<DocumentUploadResponse>>, ApiError> {
    let case = case_for_document_access(&state, &user, case_id).await?;

    if payload.file_name.trim().is_empty() {
        return Err(ApiError::InvalidInput("File name is required".to_string()));
    }

    // Object keys are server-generated; only the extension survives from
    // the client-supplied name.
    let extension = std::path::Path::new(&payload.file_name)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let object_key = format!("documents/{}/{}.{}", case.id, Uuid::new_v4(), extension);

    let upload_url = state
        .storage
        .presigned_upload_url(&object_key, &payload.content_type)
        .await
        .map_err(|e| {
            tracing::error!("storage presign failed: {}", e);
            ApiError::Internal
        })?;

    let document = state
        .repo
        .add_document(
            case.id,
            user.id,
            &payload.file_name,
            &object_key,
            &payload.content_type,
            payload.residency_linked,
        )
        .await?;

    Ok(ApiResponse::ok(DocumentUploadResponse {
        document,
        upload_url,
    }))
}

/// download_document
///
/// [Authenticated Route] Ownership-scoped presigned GET URL. Kebele managers
/// may only reach residency-linked documents.
#[utoipa::path(
    get,
    path = "/documents/{id}/download",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "URL", body = DownloadUrlResponse),
        (status = 404, description = "Not found or not owned")
    )
)]
pub async fn download_document(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DownloadUrlResponse>>, ApiError> {
    let document = match user.role {
        Role::Client | Role::Lawyer => state.repo.get_document_scoped(id, user.id).await?,
        Role::Coordinator | Role::Admin | Role::SuperAdmin => {
            state.repo.get_document(id).await?
        }
        Role::KebeleManager => state
            .repo
            .get_document(id)
            .await?
            .filter(|d| d.residency_linked),
    }
    .ok_or(ApiError::NotFound)?;

    let download_url = state
        .storage
        .presigned_download_url(&document.file_key)
        .await
        .map_err(|e| {
            tracing::error!("storage presign failed: {}", e);
            ApiError::Internal
        })?;

    Ok(ApiResponse::ok(DownloadUrlResponse { download_url }))
}

/// verify_document
///
/// [Authenticated Route] Lawyer/coordinator verification verdict. The
/// verdict must be VERIFIED or REJECTED; the audit record commits in the
/// same transaction as the verdict, so a failed audit fails the verification.
#[utoipa::path(
    patch,
    path = "/documents/{id}/verify",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = VerifyDocumentRequest,
    responses(
        (status = 200, description = "Updated", body = Document),
        (status = 400, description = "Invalid verdict")
    )
)]
pub async fn verify_document(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VerifyDocumentRequest>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    authorize(&user, &[Role::Lawyer, Role::Coordinator])?;

    let verdict = DocumentVerdict::from_str(&payload.verdict)
        .map_err(|_| ApiError::InvalidInput(format!("Invalid verdict: {}", payload.verdict)))?;
    if verdict == DocumentVerdict::Pending {
        return Err(ApiError::InvalidInput(
            "Verdict must be VERIFIED or REJECTED".to_string(),
        ));
    }

    // Lawyers may only verify documents on cases they can reach.
    if user.role == Role::Lawyer
        && state.repo.get_document_scoped(id, user.id).await?.is_none()
    {
        return Err(ApiError::NotFound);
    }

    state
        .repo
        .verify_document(id, verdict.as_str(), user.id)
        .await?
        .map(ApiResponse::ok)
        .ok_or(ApiError::NotFound)
}

/// delete_document
///
/// [Authenticated Route] Removes a document record; the stored object is
/// deleted best-effort afterwards, and a storage failure does not undo the
/// record deletion.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found or not owned")
    )
)]
pub async fn delete_document(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let document = state.repo.get_document(id).await?.ok_or(ApiError::NotFound)?;

    let allowed = document.uploader_id == user.id
        || matches!(user.role, Role::Admin | Role::SuperAdmin);
    if !allowed {
        // Indistinguishable from an absent document.
        return Err(ApiError::NotFound);
    }

    let deleted = state
        .repo
        .delete_document(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Err(e) = state.storage.delete_object(&deleted.file_key).await {
        tracing::warn!("object delete failed for {}: {}", deleted.file_key, e);
    }

    Ok(ApiResponse::message("Document deleted"))
}

// --- Appointments ---

/// schedule_appointment
///
/// [Authenticated Route] Lawyer/coordinator scheduling. Lawyers default to
/// themselves; coordinators must name the lawyer explicitly. The client must
/// match the case being scheduled against.
#[utoipa::path(
    post,
    path = "/appointments",
    request_body = ScheduleAppointmentRequest,
    responses((status = 200, description = "Scheduled", body = models::Appointment))
)]
pub async fn schedule_appointment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ScheduleAppointmentRequest>,
) -> Result<Json<ApiResponse<models::Appointment>>, ApiError> {
    authorize(&user, &[Role::Lawyer, Role::Coordinator])?;

    let lawyer_id = match (payload.lawyer_id, user.role) {
        (Some(id), _) => id,
        (None, Role::Lawyer) => user.id,
        (None, _) => {
            return Err(ApiError::InvalidInput("lawyer_id is required".to_string()));
        }
    };

    let case = state
        .repo
        .get_case(payload.case_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    if case.client_id != payload.client_id {
        return Err(ApiError::InvalidInput(
            "Client does not belong to this case".to_string(),
        ));
    }

    let appointment = state
        .repo
        .create_appointment(
            payload.case_id,
            payload.client_id,
            lawyer_id,
            payload.scheduled_at,
            payload.notes,
        )
        .await?;

    Ok(ApiResponse::ok(appointment))
}

/// list_appointments
///
/// [Authenticated Route] Role-scoped appointment listing.
#[utoipa::path(
    get,
    path = "/appointments",
    responses((status = 200, description = "Appointments", body = [models::Appointment]))
)]
pub async fn list_appointments(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<models::Appointment>>>, ApiError> {
    let appointments = match user.role {
        Role::Client => state.repo.list_appointments_for_client(user.id).await?,
        Role::Lawyer => state.repo.list_appointments_for_lawyer(user.id).await?,
        Role::Coordinator | Role::Admin | Role::SuperAdmin => {
            state.repo.list_all_appointments().await?
        }
        Role::KebeleManager => return Err(ApiError::Forbidden),
    };
    Ok(ApiResponse::ok(appointments))
}

/// update_appointment_status
///
/// [Authenticated Route] Status transition on an appointment. Participants
/// act on their own rows; coordinators and admins on any.
#[utoipa::path(
    patch,
    path = "/appointments/{id}/status",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentStatusRequest,
    responses(
        (status = 200, description = "Updated", body = models::Appointment),
        (status = 400, description = "Invalid status")
    )
)]
pub async fn update_appointment_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAppointmentStatusRequest>,
) -> Result<Json<ApiResponse<models::Appointment>>, ApiError> {
    let status = AppointmentStatus::from_str(&payload.status)
        .map_err(|_| ApiError::InvalidInput(format!("Invalid status: {}", payload.status)))?;

    let updated = match user.role {
        Role::Client | Role::Lawyer => {
            state
                .repo
                .update_appointment_status(id, status.as_str(), user.id)
                .await?
        }
        Role::Coordinator | Role::Admin | Role::SuperAdmin => {
            state
                .repo
                .update_appointment_status_admin(id, status.as_str())
                .await?
        }
        Role::KebeleManager => None,
    };

    updated.map(ApiResponse::ok).ok_or(ApiError::NotFound)
}

// --- Case messages ---

/// Participants plus coordinating staff may read or post to a case thread.
async fn require_thread_access(
    state: &AppState,
    user: &AuthUser,
    case_id: Uuid,
) -> Result<(), ApiError> {
    if matches!(user.role, Role::Coordinator | Role::Admin | Role::SuperAdmin) {
        // Still requires the case to exist.
        state.repo.get_case(case_id).await?.ok_or(ApiError::NotFound)?;
        return Ok(());
    }
    if state.repo.is_case_participant(case_id, user.id).await? {
        return Ok(());
    }
    Err(ApiError::NotFound)
}

/// post_case_message
///
/// [Authenticated Route] Appends to a case thread. Participants only.
#[utoipa::path(
    post,
    path = "/cases/{id}/messages",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = PostMessageRequest,
    responses((status = 200, description = "Posted", body = models::CaseMessage))
)]
pub async fn post_case_message(
    user: AuthUser,
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<PostMessageRequest>,
) -> Result<Json<ApiResponse<models::CaseMessage>>, ApiError> {
    require_thread_access(&state, &user, case_id).await?;

    if payload.body.trim().is_empty() {
        return Err(ApiError::InvalidInput("Message body is required".to_string()));
    }

    let message = state
        .repo
        .add_case_message(case_id, user.id, &payload.body)
        .await?;
    Ok(ApiResponse::ok(message))
}

/// get_case_messages
///
/// [Authenticated Route] Reads a case thread. Participants only.
#[utoipa::path(
    get,
    path = "/cases/{id}/messages",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses((status = 200, description = "Messages", body = [models::CaseMessage]))
)]
pub async fn get_case_messages(
    user: AuthUser,
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<models::CaseMessage>>>, ApiError> {
    require_thread_access(&state, &user, case_id).await?;
    let messages = state.repo.get_case_messages(case_id).await?;
    Ok(ApiResponse::ok(messages))
}

// --- Notifications ---

/// get_my_notifications
///
/// [Authenticated Route] The recipient's inbox, newest first.
#[utoipa::path(
    get,
    path = "/me/notifications",
    responses((status = 200, description = "Notifications", body = [models::Notification]))
)]
pub async fn get_my_notifications(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<models::Notification>>>, ApiError> {
    let notifications = state.repo.get_notifications(user.id).await?;
    Ok(ApiResponse::ok(notifications))
}

/// mark_notification_read
///
/// [Authenticated Route] Ownership-scoped read-marking. Idempotent: marking
/// an already-read notification succeeds without a duplicate side effect.
#[utoipa::path(
    patch,
    path = "/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read"),
        (status = 404, description = "Not found or not owned")
    )
)]
pub async fn mark_notification_read(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if state.repo.mark_notification_read(id, user.id).await? {
        Ok(ApiResponse::message("Notification marked as read"))
    } else {
        Err(ApiError::NotFound)
    }
}

/// mark_all_notifications_read
///
/// [Authenticated Route] Bulk read-marking in a single statement.
#[utoipa::path(
    patch,
    path = "/notifications/read-all",
    responses((status = 200, description = "All marked as read"))
)]
pub async fn mark_all_notifications_read(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReadAllResponse>>, ApiError> {
    let updated = state.repo.mark_all_notifications_read(user.id).await?;
    Ok(ApiResponse::ok(ReadAllResponse {
        updated: updated as i64,
    }))
}

/// create_notification
///
/// [Authenticated Route] Staff-initiated notification. The type is validated
/// against the closed set before the write, and the created row is returned
/// under the `notification` key.
#[utoipa::path(
    post,
    path = "/notifications/create",
    request_body = CreateNotificationRequest,
    responses(
        (status = 200, description = "Created", body = CreatedNotification),
        (status = 400, description = "Invalid type")
    )
)]
pub async fn create_notification(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<Json<ApiResponse<CreatedNotification>>, ApiError> {
    authorize(&user, &[Role::Coordinator, Role::Admin, Role::SuperAdmin])?;

    let notification_type = NotificationType::from_str(&payload.notification_type).map_err(|_| {
        ApiError::InvalidInput(format!(
            "Invalid notification type: {}",
            payload.notification_type
        ))
    })?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidInput("Title is required".to_string()));
    }

    let notification = state
        .repo
        .create_notification(
            payload.user_id,
            &payload.title,
            &payload.message,
            notification_type.as_str(),
        )
        .await?;

    Ok(ApiResponse::ok(CreatedNotification { notification }))
}

// --- Assistant ---

/// assistant_chat
///
/// [Authenticated Route] Coordinator-only bridge to the external generative
/// chat service. The reply is opaque; failures collapse to a generic
/// internal error.
#[utoipa::path(
    post,
    path = "/assistant/chat",
    request_body = ChatRequest,
    responses((status = 200, description = "Reply", body = ChatReply))
)]
pub async fn assistant_chat(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, ApiError> {
    authorize(&user, &[Role::Coordinator])?;

    if payload.messages.is_empty() {
        return Err(ApiError::InvalidInput("At least one message is required".to_string()));
    }

    let reply = state.assistant.chat(&payload.messages).await.map_err(|e| {
        tracing::error!("assistant error: {}", e);
        ApiError::Internal
    })?;

    Ok(ApiResponse::ok(ChatReply { reply }))
}

// --- Admin ---

/// get_admin_stats
///
/// [Admin Route] Core dashboard counters.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = DashboardStats))
)]
pub async fn get_admin_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    authorize(&user, &[Role::Admin, Role::SuperAdmin])?;
    let stats = state.repo.get_stats().await?;
    Ok(ApiResponse::ok(stats))
}

/// list_users
///
/// [Admin Route] Full account listing. SUPER_ADMIN only.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses((status = 200, description = "Users", body = [UserProfile]))
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>, ApiError> {
    authorize(&user, &[Role::SuperAdmin])?;
    let users = state.repo.list_users().await?;
    Ok(ApiResponse::ok(users))
}

/// create_user
///
/// [Admin Route] Staff account creation. SUPER_ADMIN only; the requested
/// role must parse against the closed role set.
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Created", body = UserProfile),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_user(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    authorize(&user, &[Role::SuperAdmin])?;

    let role = Role::from_str(&payload.role)
        .map_err(|_| ApiError::InvalidInput(format!("Invalid role: {}", payload.role)))?;

    if !payload.email.contains('@') {
        return Err(ApiError::InvalidInput("A valid email is required".to_string()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::InvalidInput(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if state.repo.get_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::InvalidInput("Email already registered".to_string()));
    }

    let record = User {
        id: Uuid::new_v4(),
        email: payload.email,
        full_name: payload.full_name,
        role: role.as_str().to_string(),
        status: UserStatus::Active.as_str().to_string(),
        office_id: payload.office_id,
        password_hash: auth::hash_password(&payload.password)?,
        created_at: chrono::Utc::now(),
    };

    let profile = state.repo.create_user(record).await?;
    Ok(ApiResponse::ok(profile))
}

/// update_user_status
///
/// [Admin Route] Account activation/deactivation. Takes effect on the
/// target's next request because the resolver re-reads status every time.
#[utoipa::path(
    patch,
    path = "/admin/users/{id}/status",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 400, description = "Invalid status")
    )
)]
pub async fn update_user_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserStatusRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    authorize(&user, &[Role::Admin, Role::SuperAdmin])?;

    let status = UserStatus::from_str(&payload.status)
        .map_err(|_| ApiError::InvalidInput(format!("Invalid status: {}", payload.status)))?;

    state
        .repo
        .set_user_status(id, status.as_str())
        .await?
        .map(ApiResponse::ok)
        .ok_or(ApiError::NotFound)
}

/// list_offices
///
/// [Admin Route] Office registry. ADMIN only.
#[utoipa::path(
    get,
    path = "/admin/offices",
    responses((status = 200, description = "Offices", body = [models::Office]))
)]
pub async fn list_offices(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<models::Office>>>, ApiError> {
    authorize(&user, &[Role::Admin])?;
    let offices = state.repo.list_offices().await?;
    Ok(ApiResponse::ok(offices))
}

/// create_office
///
/// [Admin Route] Registers a legal-aid office. ADMIN only.
#[utoipa::path(
    post,
    path = "/admin/offices",
    request_body = CreateOfficeRequest,
    responses((status = 200, description = "Created", body = models::Office))
)]
pub async fn create_office(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateOfficeRequest>,
) -> Result<Json<ApiResponse<models::Office>>, ApiError> {
    authorize(&user, &[Role::Admin])?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("Office name is required".to_string()));
    }

    let office = state
        .repo
        .create_office(&payload.name, &payload.region, &payload.kebele)
        .await?;
    Ok(ApiResponse::ok(office))
}

/// get_settings
///
/// [Admin Route] Current system settings.
#[utoipa::path(
    get,
    path = "/admin/settings",
    responses((status = 200, description = "Settings", body = [models::SystemSetting]))
)]
pub async fn get_settings(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<models::SystemSetting>>>, ApiError> {
    authorize(&user, &[Role::Admin, Role::SuperAdmin])?;
    let settings = state.repo.list_settings().await?;
    Ok(ApiResponse::ok(settings))
}

/// update_settings
///
/// [Admin Route] Batch settings write inside one transaction: either every
/// entry lands or none do. Returns the post-update settings.
#[utoipa::path(
    put,
    path = "/admin/settings",
    request_body = UpdateSettingsRequest,
    responses((status = 200, description = "Updated", body = [models::SystemSetting]))
)]
pub async fn update_settings(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<Vec<models::SystemSetting>>>, ApiError> {
    authorize(&user, &[Role::Admin, Role::SuperAdmin])?;

    if payload.settings.is_empty() {
        return Err(ApiError::InvalidInput("No settings provided".to_string()));
    }
    if payload.settings.iter().any(|s| s.key.trim().is_empty()) {
        return Err(ApiError::InvalidInput("Setting keys must not be empty".to_string()));
    }

    state.repo.update_settings(&payload.settings).await?;
    let settings = state.repo.list_settings().await?;
    Ok(ApiResponse::ok(settings))
}

// --- SMS ---

/// send_bulk_sms
///
/// [Admin Route] Sends one message to many recipients. Failures are reported
/// per item; one rejected recipient never aborts the rest of the batch.
/// Every attempt is recorded in the delivery log.
#[utoipa::path(
    post,
    path = "/admin/sms/send",
    request_body = SendSmsRequest,
    responses((status = 200, description = "Batch report", body = BulkSmsReport))
)]
pub async fn send_bulk_sms(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SendSmsRequest>,
) -> Result<Json<ApiResponse<BulkSmsReport>>, ApiError> {
    authorize(&user, &[Role::Admin, Role::SuperAdmin])?;

    if payload.recipients.is_empty() {
        return Err(ApiError::InvalidInput("At least one recipient is required".to_string()));
    }
    if payload.message.trim().is_empty() {
        return Err(ApiError::InvalidInput("Message is required".to_string()));
    }

    let mut results = Vec::with_capacity(payload.recipients.len());
    for recipient in &payload.recipients {
        match state.sms.send(recipient, &payload.message).await {
            Ok(gateway_id) => {
                state
                    .repo
                    .record_sms(recipient, &payload.message, "SENT", Some(gateway_id))
                    .await?;
                results.push(SmsSendOutcome {
                    recipient: recipient.clone(),
                    success: true,
                    error: None,
                });
            }
            Err(e) => {
                state
                    .repo
                    .record_sms(recipient, &payload.message, "FAILED", None)
                    .await?;
                results.push(SmsSendOutcome {
                    recipient: recipient.clone(),
                    success: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let sent = results.iter().filter(|r| r.success).count();
    let failed = results.len() - sent;
    Ok(ApiResponse::ok(BulkSmsReport {
        results,
        sent,
        failed,
    }))
}

/// resend_sms
///
/// [Admin Route] Retries a single delivery-log entry. Only messages whose
/// current status is FAILED are eligible; anything else is rejected before
/// any gateway call or write.
#[utoipa::path(
    post,
    path = "/admin/sms/{id}/resend",
    params(("id" = Uuid, Path, description = "SMS ID")),
    responses(
        (status = 200, description = "Resent", body = models::SmsMessage),
        (status = 400, description = "Message is not in FAILED state")
    )
)]
pub async fn resend_sms(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<models::SmsMessage>>, ApiError> {
    authorize(&user, &[Role::Admin, Role::SuperAdmin])?;

    let message = state.repo.get_sms(id).await?.ok_or(ApiError::NotFound)?;

    if message.status != "FAILED" {
        return Err(ApiError::InvalidInput(
            "Only failed messages can be resent".to_string(),
        ));
    }

    let gateway_id = state
        .sms
        .send(&message.recipient, &message.body)
        .await
        .map_err(|e| {
            tracing::error!("sms resend failed for {}: {}", message.id, e);
            ApiError::Internal
        })?;

    state
        .repo
        .mark_sms_resent(id, Some(gateway_id))
        .await?
        .map(ApiResponse::ok)
        .ok_or(ApiError::NotFound)
}

/// list_sms_log
///
/// [Admin Route] The outbound SMS delivery log, newest first.
#[utoipa::path(
    get,
    path = "/admin/sms",
    responses((status = 200, description = "Delivery log", body = [models::SmsMessage]))
)]
pub async fn list_sms_log(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<models::SmsMessage>>>, ApiError> {
    authorize(&user, &[Role::Admin, Role::SuperAdmin])?;
    let log = state.repo.list_sms().await?;
    Ok(ApiResponse::ok(log))
}

/// sms_delivery_report
///
/// [Public Route] Gateway webhook reconciling delivery status by the
/// gateway-assigned message id. Authenticated by a shared secret header
/// rather than a session token.
#[utoipa::path(
    post,
    path = "/sms/delivery-report",
    request_body = DeliveryReport,
    responses(
        (status = 200, description = "Reconciled"),
        (status = 401, description = "Bad webhook secret"),
        (status = 404, description = "Unknown message id")
    )
)]
pub async fn sms_delivery_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DeliveryReport>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let secret = headers
        .get("x-gateway-secret")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthenticated("missing_token"))?;
    if secret != state.config.sms_webhook_secret {
        return Err(ApiError::Unauthenticated("invalid_token"));
    }

    let status = models::SmsStatus::from_str(&payload.status)
        .map_err(|_| ApiError::InvalidInput(format!("Invalid status: {}", payload.status)))?;
    if status == models::SmsStatus::Pending {
        return Err(ApiError::InvalidInput(
            "Delivery reports cannot reset a message to PENDING".to_string(),
        ));
    }

    let updated = state
        .repo
        .update_sms_status_by_gateway_id(&payload.message_id, status.as_str())
        .await?;

    if updated {
        Ok(ApiResponse::message("Delivery status recorded"))
    } else {
        Err(ApiError::NotFound)
    }
}

// --- Kebele approvals ---

/// list_kebele_approvals
///
/// [Kebele Route] Pending residency-linked documents awaiting a decision,
/// scoped to the manager's office when one is set.
#[utoipa::path(
    get,
    path = "/kebele/approvals",
    responses((status = 200, description = "Pending approvals", body = [Document]))
)]
pub async fn list_kebele_approvals(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Document>>>, ApiError> {
    authorize(&user, &[Role::KebeleManager])?;
    let pending = state
        .repo
        .list_pending_residency_documents(user.office_id)
        .await?;
    Ok(ApiResponse::ok(pending))
}

/// decide_kebele_approval
///
/// [Kebele Route] Approves or rejects a pending residency-linked document.
/// The decision maps onto the document verdict and is audited atomically.
#[utoipa::path(
    patch,
    path = "/kebele/approvals/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = KebeleDecisionRequest,
    responses(
        (status = 200, description = "Decided", body = Document),
        (status = 400, description = "Invalid decision")
    )
)]
pub async fn decide_kebele_approval(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<KebeleDecisionRequest>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    authorize(&user, &[Role::KebeleManager])?;

    let verdict = match payload.decision.as_str() {
        "APPROVE" => DocumentVerdict::Verified,
        "REJECT" => DocumentVerdict::Rejected,
        other => {
            return Err(ApiError::InvalidInput(format!("Invalid decision: {other}")));
        }
    };

    state
        .repo
        .verify_residency_document(id, verdict.as_str(), user.id, user.office_id)
        .await?
        .map(ApiResponse::ok)
        .ok_or(ApiError::NotFound)
}
