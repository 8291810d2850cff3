//! JWT authentication module.
//!
//! Token issuance and verification, plus the extractors that turn an
//! `Authorization: Bearer` header into a [`Principal`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Extractor          no header       bad/expired token   valid token    │
//! │  ─────────────────  ─────────────   ─────────────────   ────────────   │
//! │  OptionalPrincipal  None            401                 Some(p)        │
//! │  AuthUser           401             401                 p              │
//! │  AdminUser          401             401                 p if admin,    │
//! │                                                         else 403       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use warung_core::{require_role, Principal, PublicUser, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub username: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Issue a token for `user`, valid from now.
    pub fn issue(&self, user: &PublicUser) -> Result<String, ApiError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if it had been issued at `issued_at`.
    pub fn issue_at(&self, user: &PublicUser, issued_at: DateTime<Utc>) -> Result<String, ApiError> {
        let exp = issued_at + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token. Expiry is checked with zero leeway.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                ApiError::invalid_token()
            })
    }

    /// Verify a token and produce the caller it names.
    pub fn authenticate(&self, token: &str) -> Result<Principal, ApiError> {
        let claims = self.validate_token(token)?;
        let id = claims.sub.parse::<i64>().map_err(|_| ApiError::invalid_token())?;

        Ok(Principal {
            id,
            username: claims.username,
            role: claims.role,
        })
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Extractors
// =============================================================================

/// The caller if a token was presented. A presented but invalid token is 401.
#[derive(Debug, Clone)]
pub struct OptionalPrincipal(pub Option<Principal>);

/// Any authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

/// An authenticated admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

impl FromRequestParts<AppState> for OptionalPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(OptionalPrincipal(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(extract_bearer_token)
            .ok_or_else(ApiError::invalid_token)?;

        state.jwt.authenticate(token).map(|p| OptionalPrincipal(Some(p)))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let OptionalPrincipal(principal) = OptionalPrincipal::from_request_parts(parts, state).await?;
        principal.map(AuthUser).ok_or_else(ApiError::unauthenticated)
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        require_role(&principal, Role::Admin)?;
        Ok(AdminUser(principal))
    }
}
