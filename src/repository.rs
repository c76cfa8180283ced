use crate::models::{
    Appointment, Case, CaseMessage, DashboardStats, Document, Notification, Office, SettingEntry,
    SmsMessage, SystemSetting, User, UserProfile,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers interact
/// with the data layer through this trait only, so tests can substitute a
/// mock without touching handler logic.
///
/// Ownership scoping is part of the contract, not an afterthought: the
/// `*_for_client` / `*_for_lawyer` / `*_scoped` methods bake the owner
/// equality constraint into the query itself, and a row that exists but
/// fails the constraint is indistinguishable from an absent row.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn create_user(&self, user: User) -> Result<UserProfile, sqlx::Error>;
    async fn list_users(&self) -> Result<Vec<UserProfile>, sqlx::Error>;
    async fn set_user_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<UserProfile>, sqlx::Error>;

    // --- Cases ---
    async fn create_case(
        &self,
        client_id: Uuid,
        title: &str,
        description: &str,
        category: &str,
        priority: &str,
    ) -> Result<Case, sqlx::Error>;
    async fn list_cases_for_client(&self, client_id: Uuid) -> Result<Vec<Case>, sqlx::Error>;
    async fn list_cases_for_lawyer(&self, lawyer_id: Uuid) -> Result<Vec<Case>, sqlx::Error>;
    async fn list_all_cases(&self) -> Result<Vec<Case>, sqlx::Error>;
    // Unscoped read, for roles that may see any case.
    async fn get_case(&self, id: Uuid) -> Result<Option<Case>, sqlx::Error>;
    // Owner-scoped reads. A non-owned case resolves to None.
    async fn get_case_for_client(
        &self,
        id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error>;
    async fn get_case_for_lawyer(
        &self,
        id: Uuid,
        lawyer_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error>;
    // Status transition plus audit activity in one transaction.
    async fn update_case_status(
        &self,
        id: Uuid,
        status: &str,
        actor_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error>;
    // Coordinator assignment plus audit activity in one transaction.
    async fn assign_case(
        &self,
        id: Uuid,
        lawyer_id: Uuid,
        office_id: Option<Uuid>,
        actor_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error>;
    // True iff the user is the case's client or its assigned lawyer.
    async fn is_case_participant(
        &self,
        case_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>;

    // --- Documents ---
    #[allow(clippy::too_many_arguments)]
    async fn add_document(
        &self,
        case_id: Uuid,
        uploader_id: Uuid,
        file_name: &str,
        file_key: &str,
        content_type: &str,
        residency_linked: bool,
    ) -> Result<Document, sqlx::Error>;
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, sqlx::Error>;
    // Scoped through the owning case: uploader, client, or assigned lawyer.
    async fn get_document_scoped(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Document>, sqlx::Error>;
    // Verdict write plus audit activity in one transaction.
    async fn verify_document(
        &self,
        id: Uuid,
        verdict: &str,
        actor_id: Uuid,
    ) -> Result<Option<Document>, sqlx::Error>;
    // Kebele path: only pending residency-linked documents, optionally
    // restricted to the manager's office.
    async fn verify_residency_document(
        &self,
        id: Uuid,
        verdict: &str,
        actor_id: Uuid,
        office_id: Option<Uuid>,
    ) -> Result<Option<Document>, sqlx::Error>;
    // Returns the deleted row so the caller can clean up storage.
    async fn delete_document(&self, id: Uuid) -> Result<Option<Document>, sqlx::Error>;
    async fn list_pending_residency_documents(
        &self,
        office_id: Option<Uuid>,
    ) -> Result<Vec<Document>, sqlx::Error>;

    // --- Appointments ---
    async fn create_appointment(
        &self,
        case_id: Uuid,
        client_id: Uuid,
        lawyer_id: Uuid,
        scheduled_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Appointment, sqlx::Error>;
    async fn list_appointments_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Appointment>, sqlx::Error>;
    async fn list_appointments_for_lawyer(
        &self,
        lawyer_id: Uuid,
    ) -> Result<Vec<Appointment>, sqlx::Error>;
    async fn list_all_appointments(&self) -> Result<Vec<Appointment>, sqlx::Error>;
    // Participant-scoped transition; None when the row is absent or the
    // user is neither the client nor the lawyer on it.
    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: &str,
        participant_id: Uuid,
    ) -> Result<Option<Appointment>, sqlx::Error>;
    async fn update_appointment_status_admin(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<Appointment>, sqlx::Error>;

    // --- Notifications ---
    async fn create_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        notification_type: &str,
    ) -> Result<Notification, sqlx::Error>;
    async fn get_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error>;
    // Idempotent: re-marking a READ row still matches and reports success.
    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>;
    // Single bulk statement; atomicity is the database's.
    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error>;

    // --- Case messages ---
    async fn add_case_message(
        &self,
        case_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> Result<CaseMessage, sqlx::Error>;
    async fn get_case_messages(&self, case_id: Uuid) -> Result<Vec<CaseMessage>, sqlx::Error>;

    // --- SMS delivery log ---
    async fn record_sms(
        &self,
        recipient: &str,
        body: &str,
        status: &str,
        gateway_message_id: Option<String>,
    ) -> Result<SmsMessage, sqlx::Error>;
    async fn get_sms(&self, id: Uuid) -> Result<Option<SmsMessage>, sqlx::Error>;
    async fn list_sms(&self) -> Result<Vec<SmsMessage>, sqlx::Error>;
    // Delivery-report reconciliation, keyed by the gateway's message id.
    async fn update_sms_status_by_gateway_id(
        &self,
        gateway_message_id: &str,
        status: &str,
    ) -> Result<bool, sqlx::Error>;
    async fn mark_sms_resent(
        &self,
        id: Uuid,
        gateway_message_id: Option<String>,
    ) -> Result<Option<SmsMessage>, sqlx::Error>;

    // --- Offices ---
    async fn create_office(
        &self,
        name: &str,
        region: &str,
        kebele: &str,
    ) -> Result<Office, sqlx::Error>;
    async fn list_offices(&self) -> Result<Vec<Office>, sqlx::Error>;

    // --- Settings ---
    // All entries in one transaction: either every key lands or none do.
    async fn update_settings(&self, entries: &[SettingEntry]) -> Result<(), sqlx::Error>;
    async fn list_settings(&self) -> Result<Vec<SystemSetting>, sqlx::Error>;

    // --- Dashboard ---
    async fn get_stats(&self) -> Result<DashboardStats, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

const CASE_COLUMNS: &str = "id, client_id, assigned_lawyer_id, office_id, title, description, \
                            category, status, priority, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, case_id, uploader_id, file_name, file_key, content_type, \
                                verification_status, residency_linked, verified_by, created_at";

const APPOINTMENT_COLUMNS: &str =
    "id, case_id, client_id, lawyer_id, scheduled_at, status, notes, created_at";

const USER_PROFILE_COLUMNS: &str = "id, email, full_name, role, status, office_id, created_at";

const SMS_COLUMNS: &str = "id, recipient, body, status, gateway_message_id, created_at, updated_at";

/// PostgresRepository
///
/// Concrete implementation of `Repository` backed by PostgreSQL. Queries use
/// the runtime bind API throughout, so the crate builds without a live
/// database connection.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an audit activity row on the supplied connection. Called only
    /// inside the transaction of the mutation being audited, so an audit
    /// failure rolls the whole operation back.
    async fn insert_activity(
        conn: &mut sqlx::PgConnection,
        case_id: Uuid,
        actor_id: Uuid,
        action: &str,
        detail: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO case_activity (id, case_id, actor_id, action, detail, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(actor_id)
        .bind(action)
        .bind(detail)
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, role, status, office_id, password_hash, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, role, status, office_id, password_hash, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(&self, user: User) -> Result<UserProfile, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "INSERT INTO users (id, email, full_name, role, status, office_id, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) \
             RETURNING {USER_PROFILE_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.role)
        .bind(&user.status)
        .bind(user.office_id)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {USER_PROFILE_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn set_user_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "UPDATE users SET status = $2 WHERE id = $1 RETURNING {USER_PROFILE_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Cases ---

    async fn create_case(
        &self,
        client_id: Uuid,
        title: &str,
        description: &str,
        category: &str,
        priority: &str,
    ) -> Result<Case, sqlx::Error> {
        sqlx::query_as::<_, Case>(&format!(
            "INSERT INTO cases (id, client_id, title, description, category, status, priority, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, 'SUBMITTED', $6, NOW(), NOW()) \
             RETURNING {CASE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(client_id)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(priority)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_cases_for_client(&self, client_id: Uuid) -> Result<Vec<Case>, sqlx::Error> {
        sqlx::query_as::<_, Case>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE client_id = $1 ORDER BY created_at DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_cases_for_lawyer(&self, lawyer_id: Uuid) -> Result<Vec<Case>, sqlx::Error> {
        sqlx::query_as::<_, Case>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE assigned_lawyer_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(lawyer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_all_cases(&self) -> Result<Vec<Case>, sqlx::Error> {
        sqlx::query_as::<_, Case>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_case(&self, id: Uuid) -> Result<Option<Case>, sqlx::Error> {
        sqlx::query_as::<_, Case>(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_case_for_client(
        &self,
        id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error> {
        // The owner constraint lives in the query: a non-owned case is a miss.
        sqlx::query_as::<_, Case>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE id = $1 AND client_id = $2"
        ))
        .bind(id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_case_for_lawyer(
        &self,
        id: Uuid,
        lawyer_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error> {
        sqlx::query_as::<_, Case>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE id = $1 AND assigned_lawyer_id = $2"
        ))
        .bind(id)
        .bind(lawyer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_case_status(
        &self,
        id: Uuid,
        status: &str,
        actor_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let case = sqlx::query_as::<_, Case>(&format!(
            "UPDATE cases SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {CASE_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(case) = case else {
            // Nothing updated; dropping the transaction rolls it back.
            return Ok(None);
        };

        Self::insert_activity(&mut tx, case.id, actor_id, "STATUS_CHANGED", Some(status)).await?;
        tx.commit().await?;
        Ok(Some(case))
    }

    async fn assign_case(
        &self,
        id: Uuid,
        lawyer_id: Uuid,
        office_id: Option<Uuid>,
        actor_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let case = sqlx::query_as::<_, Case>(&format!(
            "UPDATE cases SET assigned_lawyer_id = $2, office_id = COALESCE($3, office_id), \
             status = 'ASSIGNED', updated_at = NOW() WHERE id = $1 \
             RETURNING {CASE_COLUMNS}"
        ))
        .bind(id)
        .bind(lawyer_id)
        .bind(office_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(case) = case else {
            return Ok(None);
        };

        let detail = lawyer_id.to_string();
        Self::insert_activity(&mut tx, case.id, actor_id, "ASSIGNED", Some(&detail)).await?;
        tx.commit().await?;
        Ok(Some(case))
    }

    async fn is_case_participant(
        &self,
        case_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM cases WHERE id = $1 \
             AND (client_id = $2 OR assigned_lawyer_id = $2))",
        )
        .bind(case_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    // --- Documents ---

    async fn add_document(
        &self,
        case_id: Uuid,
        uploader_id: Uuid,
        file_name: &str,
        file_key: &str,
        content_type: &str,
        residency_linked: bool,
    ) -> Result<Document, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            "INSERT INTO documents (id, case_id, uploader_id, file_name, file_key, content_type, \
             verification_status, residency_linked, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'PENDING', $7, NOW()) \
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(uploader_id)
        .bind(file_name)
        .bind(file_key)
        .bind(content_type)
        .bind(residency_linked)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_document_scoped(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            "SELECT d.{} FROM documents d JOIN cases c ON d.case_id = c.id \
             WHERE d.id = $1 AND (d.uploader_id = $2 OR c.client_id = $2 \
             OR c.assigned_lawyer_id = $2)",
            DOCUMENT_COLUMNS.replace(", ", ", d.")
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn verify_document(
        &self,
        id: Uuid,
        verdict: &str,
        actor_id: Uuid,
    ) -> Result<Option<Document>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let document = sqlx::query_as::<_, Document>(&format!(
            "UPDATE documents SET verification_status = $2, verified_by = $3 WHERE id = $1 \
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(verdict)
        .bind(actor_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(document) = document else {
            return Ok(None);
        };

        Self::insert_activity(
            &mut tx,
            document.case_id,
            actor_id,
            "DOCUMENT_VERIFIED",
            Some(verdict),
        )
        .await?;
        tx.commit().await?;
        Ok(Some(document))
    }

    async fn verify_residency_document(
        &self,
        id: Uuid,
        verdict: &str,
        actor_id: Uuid,
        office_id: Option<Uuid>,
    ) -> Result<Option<Document>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Only pending residency-linked documents are eligible, and only
        // within the manager's office when one is set.
        let document = sqlx::query_as::<_, Document>(&format!(
            "UPDATE documents d SET verification_status = $2, verified_by = $3 \
             WHERE d.id = $1 AND d.residency_linked = true AND d.verification_status = 'PENDING' \
             AND EXISTS (SELECT 1 FROM cases c WHERE c.id = d.case_id \
                         AND ($4::uuid IS NULL OR c.office_id = $4)) \
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(verdict)
        .bind(actor_id)
        .bind(office_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(document) = document else {
            return Ok(None);
        };

        Self::insert_activity(
            &mut tx,
            document.case_id,
            actor_id,
            "RESIDENCY_DECISION",
            Some(verdict),
        )
        .await?;
        tx.commit().await?;
        Ok(Some(document))
    }

    async fn delete_document(&self, id: Uuid) -> Result<Option<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            "DELETE FROM documents WHERE id = $1 RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_pending_residency_documents(
        &self,
        office_id: Option<Uuid>,
    ) -> Result<Vec<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            "SELECT d.{} FROM documents d JOIN cases c ON d.case_id = c.id \
             WHERE d.residency_linked = true AND d.verification_status = 'PENDING' \
             AND ($1::uuid IS NULL OR c.office_id = $1) \
             ORDER BY d.created_at ASC",
            DOCUMENT_COLUMNS.replace(", ", ", d.")
        ))
        .bind(office_id)
        .fetch_all(&self.pool)
        .await
    }

    // --- Appointments ---

    async fn create_appointment(
        &self,
        case_id: Uuid,
        client_id: Uuid,
        lawyer_id: Uuid,
        scheduled_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Appointment, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "INSERT INTO appointments (id, case_id, client_id, lawyer_id, scheduled_at, status, notes, created_at) \
             VALUES ($1, $2, $3, $4, $5, 'SCHEDULED', $6, NOW()) \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(client_id)
        .bind(lawyer_id)
        .bind(scheduled_at)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_appointments_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE client_id = $1 \
             ORDER BY scheduled_at ASC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_appointments_for_lawyer(
        &self,
        lawyer_id: Uuid,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE lawyer_id = $1 \
             ORDER BY scheduled_at ASC"
        ))
        .bind(lawyer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_all_appointments(&self) -> Result<Vec<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY scheduled_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: &str,
        participant_id: Uuid,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "UPDATE appointments SET status = $2 WHERE id = $1 \
             AND (client_id = $3 OR lawyer_id = $3) \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_appointment_status_admin(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "UPDATE appointments SET status = $2 WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Notifications ---

    async fn create_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        notification_type: &str,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, title, message, type, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, 'UNREAD', NOW()) \
             RETURNING id, user_id, title, message, type, status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(notification_type)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, title, message, type, status, created_at \
             FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        // No status filter in the WHERE clause: re-marking a READ row is a
        // success with no additional side effect.
        let result = sqlx::query(
            "UPDATE notifications SET status = 'READ' WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'READ' WHERE user_id = $1 AND status = 'UNREAD'",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // --- Case messages ---

    async fn add_case_message(
        &self,
        case_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> Result<CaseMessage, sqlx::Error> {
        sqlx::query_as::<_, CaseMessage>(
            "INSERT INTO case_messages (id, case_id, sender_id, body, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             RETURNING id, case_id, sender_id, body, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_case_messages(&self, case_id: Uuid) -> Result<Vec<CaseMessage>, sqlx::Error> {
        sqlx::query_as::<_, CaseMessage>(
            "SELECT id, case_id, sender_id, body, created_at \
             FROM case_messages WHERE case_id = $1 ORDER BY created_at ASC",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await
    }

    // --- SMS delivery log ---

    async fn record_sms(
        &self,
        recipient: &str,
        body: &str,
        status: &str,
        gateway_message_id: Option<String>,
    ) -> Result<SmsMessage, sqlx::Error> {
        sqlx::query_as::<_, SmsMessage>(&format!(
            "INSERT INTO sms_messages (id, recipient, body, status, gateway_message_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {SMS_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(recipient)
        .bind(body)
        .bind(status)
        .bind(gateway_message_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_sms(&self, id: Uuid) -> Result<Option<SmsMessage>, sqlx::Error> {
        sqlx::query_as::<_, SmsMessage>(&format!(
            "SELECT {SMS_COLUMNS} FROM sms_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_sms(&self) -> Result<Vec<SmsMessage>, sqlx::Error> {
        sqlx::query_as::<_, SmsMessage>(&format!(
            "SELECT {SMS_COLUMNS} FROM sms_messages ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn update_sms_status_by_gateway_id(
        &self,
        gateway_message_id: &str,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sms_messages SET status = $2, updated_at = NOW() \
             WHERE gateway_message_id = $1",
        )
        .bind(gateway_message_id)
        .bind(status)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_sms_resent(
        &self,
        id: Uuid,
        gateway_message_id: Option<String>,
    ) -> Result<Option<SmsMessage>, sqlx::Error> {
        sqlx::query_as::<_, SmsMessage>(&format!(
            "UPDATE sms_messages SET status = 'SENT', gateway_message_id = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {SMS_COLUMNS}"
        ))
        .bind(id)
        .bind(gateway_message_id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Offices ---

    async fn create_office(
        &self,
        name: &str,
        region: &str,
        kebele: &str,
    ) -> Result<Office, sqlx::Error> {
        sqlx::query_as::<_, Office>(
            "INSERT INTO offices (id, name, region, kebele, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             RETURNING id, name, region, kebele, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(region)
        .bind(kebele)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_offices(&self) -> Result<Vec<Office>, sqlx::Error> {
        sqlx::query_as::<_, Office>(
            "SELECT id, name, region, kebele, created_at FROM offices ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    // --- Settings ---

    async fn update_settings(&self, entries: &[SettingEntry]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO system_settings (key, value, updated_at) VALUES ($1, $2, NOW()) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
            )
            .bind(&entry.key)
            .bind(&entry.value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_settings(&self) -> Result<Vec<SystemSetting>, sqlx::Error> {
        sqlx::query_as::<_, SystemSetting>(
            "SELECT key, value, updated_at FROM system_settings ORDER BY key ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    // --- Dashboard ---

    async fn get_stats(&self) -> Result<DashboardStats, sqlx::Error> {
        let total_cases = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cases")
            .fetch_one(&self.pool)
            .await?;
        let open_cases = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cases WHERE status NOT IN ('CLOSED', 'REJECTED')",
        )
        .fetch_one(&self.pool)
        .await?;
        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let pending_documents = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE verification_status = 'PENDING'",
        )
        .fetch_one(&self.pool)
        .await?;
        let upcoming_appointments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM appointments WHERE status = 'SCHEDULED' AND scheduled_at > NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        let failed_sms = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sms_messages WHERE status = 'FAILED'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_cases,
            open_cases,
            total_users,
            pending_documents,
            upcoming_appointments,
            failed_sms,
        })
    }
}
