use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use legalaid_portal::{
    AppState,
    auth::{AuthUser, Claims, Role, authorize},
    config::AppConfig,
    error::ApiError,
    models::{
        Appointment, Case, CaseMessage, DashboardStats, Document, Notification, Office,
        SettingEntry, SmsMessage, SystemSetting, User, UserProfile,
    },
    repository::Repository,
};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Mock Repository for Auth Logic ---

#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn get_user(&self, _id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_to_return.clone())
    }

    // The session resolver only touches get_user; everything else is a
    // compile-satisfying stub.
    async fn get_user_by_email(&self, _email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(None)
    }
    async fn create_user(&self, user: User) -> Result<UserProfile, sqlx::Error> {
        Ok(user.into())
    }
    async fn list_users(&self) -> Result<Vec<UserProfile>, sqlx::Error> {
        Ok(vec![])
    }
    async fn set_user_status(
        &self,
        _id: Uuid,
        _status: &str,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        Ok(None)
    }
    async fn create_case(
        &self,
        _client_id: Uuid,
        _title: &str,
        _description: &str,
        _category: &str,
        _priority: &str,
    ) -> Result<Case, sqlx::Error> {
        Ok(Case::default())
    }
    async fn list_cases_for_client(&self, _client_id: Uuid) -> Result<Vec<Case>, sqlx::Error> {
        Ok(vec![])
    }
    async fn list_cases_for_lawyer(&self, _lawyer_id: Uuid) -> Result<Vec<Case>, sqlx::Error> {
        Ok(vec![])
    }
    async fn list_all_cases(&self) -> Result<Vec<Case>, sqlx::Error> {
        Ok(vec![])
    }
    async fn get_case(&self, _id: Uuid) -> Result<Option<Case>, sqlx::Error> {
        Ok(None)
    }
    async fn get_case_for_client(
        &self,
        _id: Uuid,
        _client_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error> {
        Ok(None)
    }
    async fn get_case_for_lawyer(
        &self,
        _id: Uuid,
        _lawyer_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error> {
        Ok(None)
    }
    async fn update_case_status(
        &self,
        _id: Uuid,
        _status: &str,
        _actor_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error> {
        Ok(None)
    }
    async fn assign_case(
        &self,
        _id: Uuid,
        _lawyer_id: Uuid,
        _office_id: Option<Uuid>,
        _actor_id: Uuid,
    ) -> Result<Option<Case>, sqlx::Error> {
        Ok(None)
    }
    async fn is_case_participant(
        &self,
        _case_id: Uuid,
        _user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn add_document(
        &self,
        _case_id: Uuid,
        _uploader_id: Uuid,
        _file_name: &str,
        _file_key: &str,
        _content_type: &str,
        _residency_linked: bool,
    ) -> Result<Document, sqlx::Error> {
        Ok(Document::default())
    }
    async fn get_document(&self, _id: Uuid) -> Result<Option<Document>, sqlx::Error> {
        Ok(None)
    }
    async fn get_document_scoped(
        &self,
        _id: Uuid,
        _user_id: Uuid,
    ) -> Result<Option<Document>, sqlx::Error> {
        Ok(None)
    }
    async fn verify_document(
        &self,
        _id: Uuid,
        _verdict: &str,
        _actor_id: Uuid,
    ) -> Result<Option<Document>, sqlx::Error> {
        Ok(None)
    }
    async fn verify_residency_document(
        &self,
        _id: Uuid,
        _verdict: &str,
        _actor_id: Uuid,
        _office_id: Option<Uuid>,
    ) -> Result<Option<Document>, sqlx::Error> {
        Ok(None)
    }
    async fn delete_document(&self, _id: Uuid) -> Result<Option<Document>, sqlx::Error> {
        Ok(None)
    }
    async fn list_pending_residency_documents(
        &self,
        _office_id: Option<Uuid>,
    ) -> Result<Vec<Document>, sqlx::Error> {
        Ok(vec![])
    }
    async fn create_appointment(
        &self,
        _case_id: Uuid,
        _client_id: Uuid,
        _lawyer_id: Uuid,
        _scheduled_at: DateTime<Utc>,
        _notes: Option<String>,
    ) -> Result<Appointment, sqlx::Error> {
        Ok(Appointment::default())
    }
    async fn list_appointments_for_client(
        &self,
        _client_id: Uuid,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        Ok(vec![])
    }
    async fn list_appointments_for_lawyer(
        &self,
        _lawyer_id: Uuid,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        Ok(vec![])
    }
    async fn list_all_appointments(&self) -> Result<Vec<Appointment>, sqlx::Error> {
        Ok(vec![])
    }
    async fn update_appointment_status(
        &self,
        _id: Uuid,
        _status: &str,
        _participant_id: Uuid,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        Ok(None)
    }
    async fn update_appointment_status_admin(
        &self,
        _id: Uuid,
        _status: &str,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        Ok(None)
    }
    async fn create_notification(
        &self,
        _user_id: Uuid,
        _title: &str,
        _message: &str,
        _notification_type: &str,
    ) -> Result<Notification, sqlx::Error> {
        Ok(Notification::default())
    }
    async fn get_notifications(&self, _user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        Ok(vec![])
    }
    async fn mark_notification_read(
        &self,
        _id: Uuid,
        _user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn mark_all_notifications_read(&self, _user_id: Uuid) -> Result<u64, sqlx::Error> {
        Ok(0)
    }
    async fn add_case_message(
        &self,
        _case_id: Uuid,
        _sender_id: Uuid,
        _body: &str,
    ) -> Result<CaseMessage, sqlx::Error> {
        Ok(CaseMessage::default())
    }
    async fn get_case_messages(&self, _case_id: Uuid) -> Result<Vec<CaseMessage>, sqlx::Error> {
        Ok(vec![])
    }
    async fn record_sms(
        &self,
        _recipient: &str,
        _body: &str,
        _status: &str,
        _gateway_message_id: Option<String>,
    ) -> Result<SmsMessage, sqlx::Error> {
        Ok(SmsMessage::default())
    }
    async fn get_sms(&self, _id: Uuid) -> Result<Option<SmsMessage>, sqlx::Error> {
        Ok(None)
    }
    async fn list_sms(&self) -> Result<Vec<SmsMessage>, sqlx::Error> {
        Ok(vec![])
    }
    async fn update_sms_status_by_gateway_id(
        &self,
        _gateway_message_id: &str,
        _status: &str,
    ) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn mark_sms_resent(
        &self,
        _id: Uuid,
        _gateway_message_id: Option<String>,
    ) -> Result<Option<SmsMessage>, sqlx::Error> {
        Ok(None)
    }
    async fn create_office(
        &self,
        _name: &str,
        _region: &str,
        _kebele: &str,
    ) -> Result<Office, sqlx::Error> {
        Ok(Office::default())
    }
    async fn list_offices(&self) -> Result<Vec<Office>, sqlx::Error> {
        Ok(vec![])
    }
    async fn update_settings(&self, _entries: &[SettingEntry]) -> Result<(), sqlx::Error> {
        Ok(())
    }
    async fn list_settings(&self) -> Result<Vec<SystemSetting>, sqlx::Error> {
        Ok(vec![])
    }
    async fn get_stats(&self) -> Result<DashboardStats, sqlx::Error> {
        Ok(DashboardStats::default())
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn active_user(id: Uuid, role: &str) -> User {
    User {
        id,
        email: "test@example.com".to_string(),
        full_name: "Test User".to_string(),
        role: role.to_string(),
        status: "ACTIVE".to_string(),
        office_id: None,
        password_hash: String::new(),
        created_at: Utc::now(),
    }
}

fn create_token(user_id: Uuid, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        email: "test@example.com".to_string(),
        role: "CLIENT".to_string(),
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(repo: MockAuthRepo, jwt_secret: String) -> AppState {
    let mut config = AppConfig::default();
    config.jwt_secret = jwt_secret;

    AppState {
        repo: Arc::new(repo),
        storage: Arc::new(legalaid_portal::storage::MockStorageService::new()),
        sms: Arc::new(legalaid_portal::sms::MockSmsGateway::new()),
        assistant: Arc::new(legalaid_portal::assistant::MockAssistantService::new()),
        config,
    }
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn assert_unauthenticated(err: ApiError, expected_reason: &str) {
    match err {
        ApiError::Unauthenticated(reason) => assert_eq!(reason, expected_reason),
        other => panic!("expected Unauthenticated, got {:?}", other),
    }
}

// --- Session Resolver Tests ---

#[tokio::test]
async fn resolves_identity_from_bearer_header() {
    let token = create_token(TEST_USER_ID, 3600);
    let repo = MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID, "LAWYER")),
    };
    let state = create_app_state(repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, TEST_USER_ID);
    assert_eq!(auth_user.role, Role::Lawyer);
}

#[tokio::test]
async fn resolves_identity_from_auth_token_cookie() {
    let token = create_token(TEST_USER_ID, 3600);
    let repo = MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID, "CLIENT")),
    };
    let state = create_app_state(repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&format!("session=abc; auth-token={}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, TEST_USER_ID);
    assert_eq!(auth_user.role, Role::Client);
}

#[tokio::test]
async fn cookie_wins_over_bearer_header() {
    // A valid token in the cookie and garbage in the header: the cookie must
    // be used, so resolution succeeds.
    let token = create_token(TEST_USER_ID, 3600);
    let repo = MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID, "CLIENT")),
    };
    let state = create_app_state(repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&format!("auth-token={}", token)).unwrap(),
    );
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Bearer not-a-token"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(auth_user.is_ok());
}

#[tokio::test]
async fn legacy_token_cookie_is_accepted() {
    let token = create_token(TEST_USER_ID, 3600);
    let repo = MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID, "CLIENT")),
    };
    let state = create_app_state(repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&format!("token={}", token)).unwrap(),
    );

    assert!(AuthUser::from_request_parts(&mut parts, &state).await.is_ok());
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let state = create_app_state(MockAuthRepo::default(), TEST_JWT_SECRET.to_string());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert_unauthenticated(err, "missing_token");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let repo = MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID, "CLIENT")),
    };
    let state = create_app_state(repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Bearer not.a.jwt"),
    );

    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert_unauthenticated(err, "invalid_token");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let token = create_token(TEST_USER_ID, -3600);
    let repo = MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID, "CLIENT")),
    };
    let state = create_app_state(repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert_unauthenticated(err, "invalid_token");
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let token = create_token(TEST_USER_ID, 3600);
    let repo = MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID, "CLIENT")),
    };
    let state = create_app_state(repo, "a-completely-different-secret".to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert_unauthenticated(err, "invalid_token");
}

#[tokio::test]
async fn deleted_user_is_rejected_despite_valid_token() {
    let token = create_token(TEST_USER_ID, 3600);
    // Valid signature, but no matching user row.
    let state = create_app_state(MockAuthRepo::default(), TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert_unauthenticated(err, "inactive_or_missing");
}

#[tokio::test]
async fn deactivated_user_is_rejected_despite_valid_token() {
    let token = create_token(TEST_USER_ID, 3600);
    let mut user = active_user(TEST_USER_ID, "CLIENT");
    user.status = "SUSPENDED".to_string();
    let state = create_app_state(
        MockAuthRepo {
            user_to_return: Some(user),
        },
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert_unauthenticated(err, "inactive_or_missing");
}

// --- Role Gate Tests ---

fn identity(role: Role) -> AuthUser {
    AuthUser {
        id: TEST_USER_ID,
        email: "gate@example.com".to_string(),
        role,
        office_id: None,
    }
}

#[test]
fn role_gate_allows_listed_roles_only() {
    let allowed = [Role::Admin, Role::SuperAdmin];

    assert!(authorize(&identity(Role::Admin), &allowed).is_ok());
    assert!(authorize(&identity(Role::SuperAdmin), &allowed).is_ok());
    assert!(matches!(
        authorize(&identity(Role::Client), &allowed),
        Err(ApiError::Forbidden)
    ));
}

#[test]
fn role_gate_has_no_hierarchy() {
    // SUPER_ADMIN is not implicitly admitted where only ADMIN is listed.
    assert!(matches!(
        authorize(&identity(Role::SuperAdmin), &[Role::Admin]),
        Err(ApiError::Forbidden)
    ));
    // And the reverse.
    assert!(matches!(
        authorize(&identity(Role::Admin), &[Role::SuperAdmin]),
        Err(ApiError::Forbidden)
    ));
}
