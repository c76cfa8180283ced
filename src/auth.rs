use std::num::NonZeroU32;
use std::str::FromStr;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::SecureRandom;
use ring::{pbkdf2, rand};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::ApiError, models::User, repository::RepositoryState};

/// Role
///
/// The closed set of roles the system recognizes. Authorization is strict
/// membership over this set: every protected operation enumerates exactly the
/// roles it permits, and no role implies another (listing ADMIN alone does
/// not admit SUPER_ADMIN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    Client,
    Lawyer,
    Coordinator,
    Admin,
    SuperAdmin,
    KebeleManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Lawyer => "LAWYER",
            Role::Coordinator => "COORDINATOR",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::KebeleManager => "KEBELE_MANAGER",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLIENT" => Ok(Role::Client),
            "LAWYER" => Ok(Role::Lawyer),
            "COORDINATOR" => Ok(Role::Coordinator),
            "ADMIN" => Ok(Role::Admin),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "KEBELE_MANAGER" => Ok(Role::KebeleManager),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UserStatus
///
/// Account lifecycle states. Only ACTIVE accounts may authenticate; the
/// resolver re-reads this per request so a deactivation takes effect on the
/// very next call, regardless of outstanding tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
            UserStatus::Suspended => "SUSPENDED",
        }
    }
}

impl FromStr for UserStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(UserStatus::Active),
            "INACTIVE" => Ok(UserStatus::Inactive),
            "SUSPENDED" => Ok(UserStatus::Suspended),
            _ => Err(()),
        }
    }
}

/// Claims
///
/// The payload signed into every session token at login. Claims are immutable
/// once issued; the live user row remains the source of truth for role and
/// status, which the resolver re-checks on each request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's UUID.
    pub sub: Uuid,
    /// Email at issuance time.
    pub email: String,
    /// Role at issuance time. Informational only; the resolver re-reads the
    /// user row rather than trusting this field.
    pub role: String,
    /// Issued At (unix seconds).
    pub iat: usize,
    /// Expiration Time (unix seconds). Tokens past this instant are rejected.
    pub exp: usize,
}

/// InvalidToken
///
/// The single failure the token codec produces: malformed input, signature
/// mismatch, or expiry are all deliberately indistinguishable to callers.
#[derive(Debug, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Signs a session token for the given user. Pure function of the user row,
/// the signing secret, and the configured lifetime.
pub fn issue_token(user: &User, secret: &str, ttl_secs: i64) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token signing failed: {:?}", e);
        ApiError::Internal
    })
}

/// Verifies the signature and expiry of a session token and decodes its
/// claims. Side-effect-free; no I/O beyond the signature check.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, InvalidToken> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| InvalidToken)
}

// --- Password hashing (PBKDF2-HMAC-SHA256) ---

const PBKDF2_ITERATIONS: NonZeroU32 = NonZeroU32::new(100_000).unwrap();
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Derives a salted password hash, stored as `salt_hex$hash_hex`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let rng = rand::SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt).map_err(|_| ApiError::Internal)?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ITERATIONS,
        &salt,
        password.as_bytes(),
        &mut hash,
    );

    Ok(format!("{}${}", hex::encode(salt), hex::encode(hash)))
}

/// Verifies a candidate password against a stored `salt_hex$hash_hex` value.
/// Any parse failure counts as a mismatch.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ITERATIONS,
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok()
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the validated claims
/// joined against the live user row. Constructed per request, never cached.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    /// Office linkage, used to scope kebele approval queues.
    pub office_id: Option<Uuid>,
}

/// Role Gate
///
/// Pure membership check: allowed iff the identity's role appears in the
/// endpoint's enumerated set. There is no hierarchy between roles.
pub fn authorize(user: &AuthUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Pulls the session token out of the request, if any. The `auth-token`
/// cookie is preferred, then the legacy `token` cookie, then the
/// `Authorization: Bearer` header. A cookie wins whenever both are present.
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(cookies) = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
    {
        for name in ["auth-token", "token"] {
            for pair in cookies.split(';') {
                let pair = pair.trim();
                if let Some(value) = pair.strip_prefix(name).and_then(|r| r.strip_prefix('=')) {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Session Resolver
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as an
/// argument in any protected handler. The flow is fail-closed end to end:
/// 1. Token extraction (cookie preferred, Bearer header fallback).
/// 2. Codec verification of signature and expiry.
/// 3. Re-fetch of the user's current role/status from the database, so a
///    deactivated account is rejected even while its token is still valid.
///
/// Rejection: 401 with a coarse machine-readable reason; verification errors
/// are never treated as authenticated-with-defaults.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    crate::config::AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = crate::config::AppConfig::from_ref(state);

        let token = extract_token(parts).ok_or(ApiError::Unauthenticated("missing_token"))?;

        let claims = decode_token(&token, &config.jwt_secret)
            .map_err(|_| ApiError::Unauthenticated("invalid_token"))?;

        // The claim set is not trusted for status or role; the row read here
        // is the source of truth.
        let user = repo
            .get_user(claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated("inactive_or_missing"))?;

        if UserStatus::from_str(&user.status) != Ok(UserStatus::Active) {
            return Err(ApiError::Unauthenticated("inactive_or_missing"));
        }

        let role = Role::from_str(&user.role).map_err(|_| {
            tracing::error!("user {} has unrecognized role {:?}", user.id, user.role);
            ApiError::Unauthenticated("inactive_or_missing")
        })?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            role,
            office_id: user.office_id,
        })
    }
}
