use chrono::Utc;
use legalaid_portal::{
    auth::{self, Role, UserStatus},
    models::{CaseStatus, DocumentVerdict, Notification, NotificationType, SmsStatus},
    response::ApiResponse,
};
use std::str::FromStr;
use uuid::Uuid;

// --- Wire-shape tests ---

#[test]
fn notification_serializes_type_key() {
    // The Rust field is notification_type; the JSON key must be "type".
    let notif = Notification {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: "Case update".to_string(),
        message: "Your case was assigned".to_string(),
        notification_type: "CASE_UPDATE".to_string(),
        status: "UNREAD".to_string(),
        created_at: Utc::now(),
    };

    let json_output = serde_json::to_string(&notif).unwrap();
    assert!(json_output.contains(r#""type":"CASE_UPDATE""#));
    assert!(!json_output.contains("notification_type"));
}

#[test]
fn success_envelope_omits_absent_fields() {
    let body = ApiResponse::ok(vec![1, 2, 3]).0;
    let json_output = serde_json::to_string(&body).unwrap();

    assert!(json_output.contains(r#""success":true"#));
    assert!(json_output.contains(r#""data":[1,2,3]"#));
    assert!(!json_output.contains("message"));
    assert!(!json_output.contains("error"));
}

#[test]
fn failure_envelope_carries_message() {
    let body = ApiResponse::<()>::failure("Only failed messages can be resent", None);
    let json_output = serde_json::to_string(&body).unwrap();

    assert!(json_output.contains(r#""success":false"#));
    assert!(json_output.contains(r#""message":"Only failed messages can be resent""#));
    assert!(!json_output.contains("data"));
}

#[test]
fn timestamps_serialize_as_iso8601() {
    let notif = Notification {
        created_at: "2026-03-01T10:15:00Z".parse().unwrap(),
        ..Notification::default()
    };
    let value: serde_json::Value = serde_json::to_value(&notif).unwrap();
    let created = value["created_at"].as_str().unwrap();
    assert!(created.starts_with("2026-03-01T10:15:00"));
}

// --- Enum vocabulary tests ---

#[test]
fn role_parsing_is_strict() {
    assert_eq!(Role::from_str("CLIENT"), Ok(Role::Client));
    assert_eq!(Role::from_str("SUPER_ADMIN"), Ok(Role::SuperAdmin));
    assert_eq!(Role::from_str("KEBELE_MANAGER"), Ok(Role::KebeleManager));
    // Case-sensitive and closed: near-misses are not roles.
    assert!(Role::from_str("client").is_err());
    assert!(Role::from_str("SUPERADMIN").is_err());
    assert!(Role::from_str("").is_err());
}

#[test]
fn role_round_trips_through_as_str() {
    for role in [
        Role::Client,
        Role::Lawyer,
        Role::Coordinator,
        Role::Admin,
        Role::SuperAdmin,
        Role::KebeleManager,
    ] {
        assert_eq!(Role::from_str(role.as_str()), Ok(role));
    }
}

#[test]
fn status_vocabularies_reject_unknown_values() {
    assert!(CaseStatus::from_str("OPEN").is_err());
    assert!(DocumentVerdict::from_str("APPROVED").is_err());
    assert!(NotificationType::from_str("EMAIL").is_err());
    assert!(SmsStatus::from_str("QUEUED").is_err());
    assert!(UserStatus::from_str("DISABLED").is_err());
}

#[test]
fn case_status_accepts_full_vocabulary() {
    for s in [
        "SUBMITTED",
        "UNDER_REVIEW",
        "ASSIGNED",
        "IN_PROGRESS",
        "CLOSED",
        "REJECTED",
    ] {
        assert!(CaseStatus::from_str(s).is_ok(), "{} should parse", s);
    }
}

// --- Password hashing ---

#[test]
fn password_hash_verifies_and_rejects() {
    let hash = auth::hash_password("correct horse battery staple").unwrap();

    assert!(auth::verify_password("correct horse battery staple", &hash));
    assert!(!auth::verify_password("correct horse battery stable", &hash));
    assert!(!auth::verify_password("", &hash));
}

#[test]
fn password_hashes_are_salted() {
    let a = auth::hash_password("same password").unwrap();
    let b = auth::hash_password("same password").unwrap();
    assert_ne!(a, b);
}

#[test]
fn malformed_stored_hash_never_verifies() {
    assert!(!auth::verify_password("anything", "not-a-hash"));
    assert!(!auth::verify_password("anything", "deadbeef$zz"));
    assert!(!auth::verify_password("anything", ""));
}

// --- Token codec ---

#[test]
fn token_round_trips_claims() {
    let user = legalaid_portal::models::User {
        id: Uuid::new_v4(),
        email: "codec@example.com".to_string(),
        role: "LAWYER".to_string(),
        ..Default::default()
    };

    let token = auth::issue_token(&user, "codec-secret", 3600).unwrap();
    let claims = auth::decode_token(&token, "codec-secret").unwrap();

    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email, "codec@example.com");
    assert_eq!(claims.role, "LAWYER");
    assert!(claims.exp > claims.iat);
}

#[test]
fn token_codec_rejects_tampering() {
    let user = legalaid_portal::models::User {
        id: Uuid::new_v4(),
        email: "codec@example.com".to_string(),
        role: "CLIENT".to_string(),
        ..Default::default()
    };

    let token = auth::issue_token(&user, "codec-secret", 3600).unwrap();

    assert!(auth::decode_token(&token, "other-secret").is_err());
    assert!(auth::decode_token("", "codec-secret").is_err());
    assert!(auth::decode_token(&format!("{}x", token), "codec-secret").is_err());
}
