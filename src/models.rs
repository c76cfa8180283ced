use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Status / type vocabularies ---
//
// Enum columns are stored as text and validated here before any write. A
// status-transition request whose target value fails to parse is rejected
// with InvalidInput and no write is attempted.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Submitted,
    UnderReview,
    Assigned,
    InProgress,
    Closed,
    Rejected,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Submitted => "SUBMITTED",
            CaseStatus::UnderReview => "UNDER_REVIEW",
            CaseStatus::Assigned => "ASSIGNED",
            CaseStatus::InProgress => "IN_PROGRESS",
            CaseStatus::Closed => "CLOSED",
            CaseStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for CaseStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBMITTED" => Ok(CaseStatus::Submitted),
            "UNDER_REVIEW" => Ok(CaseStatus::UnderReview),
            "ASSIGNED" => Ok(CaseStatus::Assigned),
            "IN_PROGRESS" => Ok(CaseStatus::InProgress),
            "CLOSED" => Ok(CaseStatus::Closed),
            "REJECTED" => Ok(CaseStatus::Rejected),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl CasePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            CasePriority::Low => "LOW",
            CasePriority::Normal => "NORMAL",
            CasePriority::High => "HIGH",
            CasePriority::Urgent => "URGENT",
        }
    }
}

impl FromStr for CasePriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(CasePriority::Low),
            "NORMAL" => Ok(CasePriority::Normal),
            "HIGH" => Ok(CasePriority::High),
            "URGENT" => Ok(CasePriority::Urgent),
            _ => Err(()),
        }
    }
}

/// Verification verdicts a document can carry. PENDING is the initial state;
/// only VERIFIED and REJECTED are accepted as transition targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentVerdict {
    Pending,
    Verified,
    Rejected,
}

impl DocumentVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentVerdict::Pending => "PENDING",
            DocumentVerdict::Verified => "VERIFIED",
            DocumentVerdict::Rejected => "REJECTED",
        }
    }
}

impl FromStr for DocumentVerdict {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(DocumentVerdict::Pending),
            "VERIFIED" => Ok(DocumentVerdict::Verified),
            "REJECTED" => Ok(DocumentVerdict::Rejected),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    Missed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Missed => "MISSED",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(AppointmentStatus::Scheduled),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            "MISSED" => Ok(AppointmentStatus::Missed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    SystemUpdate,
    CaseUpdate,
    Appointment,
    Document,
    Sms,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::SystemUpdate => "SYSTEM_UPDATE",
            NotificationType::CaseUpdate => "CASE_UPDATE",
            NotificationType::Appointment => "APPOINTMENT",
            NotificationType::Document => "DOCUMENT",
            NotificationType::Sms => "SMS",
        }
    }
}

impl FromStr for NotificationType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SYSTEM_UPDATE" => Ok(NotificationType::SystemUpdate),
            "CASE_UPDATE" => Ok(NotificationType::CaseUpdate),
            "APPOINTMENT" => Ok(NotificationType::Appointment),
            "DOCUMENT" => Ok(NotificationType::Document),
            "SMS" => Ok(NotificationType::Sms),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsStatus {
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl SmsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsStatus::Pending => "PENDING",
            SmsStatus::Sent => "SENT",
            SmsStatus::Delivered => "DELIVERED",
            SmsStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for SmsStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(SmsStatus::Pending),
            "SENT" => Ok(SmsStatus::Sent),
            "DELIVERED" => Ok(SmsStatus::Delivered),
            "FAILED" => Ok(SmsStatus::Failed),
            _ => Err(()),
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity row, including the password hash. This type is
/// internal-only and deliberately does not implement Serialize; everything
/// client-facing goes through `UserProfile`.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    // The RBAC field. Parsed into `auth::Role` at the session boundary.
    pub role: String,
    // ACTIVE / INACTIVE / SUSPENDED. Checked on every request.
    pub status: String,
    // Office linkage for staff and kebele managers.
    pub office_id: Option<Uuid>,
    // `salt_hex$hash_hex`, PBKDF2-HMAC-SHA256. Never serialized.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// UserProfile
///
/// Client-facing view of a user record. Carries everything the frontends
/// need and nothing sensitive.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub status: String,
    pub office_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            role: u.role,
            status: u.status,
            office_id: u.office_id,
            created_at: u.created_at,
        }
    }
}

/// Case
///
/// A legal-aid case as submitted by a client and worked by an assigned
/// lawyer. The primary business record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Case {
    pub id: Uuid,
    // FK to users.id (the owning client).
    pub client_id: Uuid,
    pub assigned_lawyer_id: Option<Uuid>,
    pub office_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: String,
    // SUBMITTED / UNDER_REVIEW / ASSIGNED / IN_PROGRESS / CLOSED / REJECTED.
    pub status: String,
    pub priority: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Document
///
/// A file attached to a case. `file_key` references the object in the
/// storage bucket; the bytes never pass through this service.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Document {
    pub id: Uuid,
    pub case_id: Uuid,
    pub uploader_id: Uuid,
    pub file_name: String,
    pub file_key: String,
    pub content_type: String,
    // PENDING / VERIFIED / REJECTED.
    pub verification_status: String,
    // Residency-linked documents form the kebele approval queue.
    pub residency_linked: bool,
    pub verified_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Appointment
///
/// A scheduled meeting between a client and a lawyer on a case.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Appointment {
    pub id: Uuid,
    pub case_id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Uuid,
    #[ts(type = "string")]
    pub scheduled_at: DateTime<Utc>,
    // SCHEDULED / COMPLETED / CANCELLED / MISSED.
    pub status: String,
    pub notes: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Notification
///
/// A per-user inbox entry. The `type` column is a reserved keyword in Rust,
/// so the field is renamed internally and mapped back to "type" in JSON.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Notification {
    pub id: Uuid,
    // Recipient.
    pub user_id: Uuid,
    pub title: String,
    pub message: String,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    #[ts(rename = "type")]
    pub notification_type: String,

    // UNREAD / READ.
    pub status: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CaseMessage
///
/// A thread entry between the participants of a case.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CaseMessage {
    pub id: Uuid,
    pub case_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// SmsMessage
///
/// Delivery log for outbound SMS. `gateway_message_id` is the correlation
/// key for delivery-report reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct SmsMessage {
    pub id: Uuid,
    pub recipient: String,
    pub body: String,
    // PENDING / SENT / DELIVERED / FAILED.
    pub status: String,
    pub gateway_message_id: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Office
///
/// A legal-aid office tied to a kebele (local administrative unit).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Office {
    pub id: Uuid,
    pub name: String,
    pub region: String,
    pub kebele: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CaseActivity
///
/// Audit record written in the same transaction as the mutation it
/// describes. If this insert fails, the primary mutation is rolled back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct CaseActivity {
    pub id: Uuid,
    pub case_id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// SystemSetting
///
/// A single key/value configuration row, updated in batches.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    // Verified against the stored hash and never persisted or logged.
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Staff account creation (admin console). The role is validated against the
/// closed role set before the write.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
    pub office_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateUserStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCaseRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    // Defaults to NORMAL when omitted.
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCaseStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AssignCaseRequest {
    pub lawyer_id: Uuid,
    pub office_id: Option<Uuid>,
}

/// Upload registration: the client supplies metadata, the server answers
/// with a document row and a presigned PUT URL.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateDocumentRequest {
    #[schema(example = "residency_certificate.pdf")]
    pub file_name: String,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    #[serde(default)]
    pub residency_linked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VerifyDocumentRequest {
    // VERIFIED or REJECTED.
    pub verdict: String,
}

/// Kebele approval decision for a residency-linked document.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct KebeleDecisionRequest {
    // APPROVE or REJECT.
    pub decision: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ScheduleAppointmentRequest {
    pub case_id: Uuid,
    pub client_id: Uuid,
    // Optional for lawyers (defaults to the caller); required for
    // coordinators scheduling on someone's behalf.
    pub lawyer_id: Option<Uuid>,
    #[ts(type = "string")]
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateAppointmentStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateNotificationRequest {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,

    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub notification_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostMessageRequest {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateOfficeRequest {
    pub name: String,
    pub region: String,
    pub kebele: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SettingEntry {
    pub key: String,
    pub value: String,
}

/// Batch settings update, applied inside a single transaction: either every
/// entry lands or none do.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateSettingsRequest {
    pub settings: Vec<SettingEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SendSmsRequest {
    pub recipients: Vec<String>,
    pub message: String,
}

/// Delivery-report webhook payload posted by the SMS gateway.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DeliveryReport {
    pub message_id: String,
    // DELIVERED or FAILED (gateways may also echo SENT).
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

// --- Output Schemas ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Wrapper matching the established wire shape for notification creation:
/// the created row travels under a `notification` key.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatedNotification {
    pub notification: Notification,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ReadAllResponse {
    pub updated: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DocumentUploadResponse {
    pub document: Document,
    /// Time-limited URL for the direct-to-storage PUT.
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DownloadUrlResponse {
    pub download_url: String,
}

/// Per-item outcome of a bulk SMS send. A failed item never aborts the
/// batch; callers read the breakdown here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SmsSendOutcome {
    pub recipient: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BulkSmsReport {
    pub results: Vec<SmsSendOutcome>,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChatReply {
    pub reply: String,
}

/// Core counters for the administrative dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DashboardStats {
    pub total_cases: i64,
    pub open_cases: i64,
    pub total_users: i64,
    pub pending_documents: i64,
    pub upcoming_appointments: i64,
    pub failed_sms: i64,
}
