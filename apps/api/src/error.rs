//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": "<message>"}` with one of
//! 400, 401, 403, 404 or 500.
//!
//! ```text
//! ValidationError ─┐
//! CoreError ───────┼──► ApiError ──► (StatusCode, {"error": ...})
//! DbError ─────────┤
//! CheckoutError ───┤
//! axum rejections ─┘
//! ```
//!
//! Storage failures are logged with their detail and answered with a generic
//! message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use warung_core::{CoreError, ValidationError};
use warung_db::{CheckoutError, DbError};

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Detail for the log only.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated("Authentication required".to_string())
    }

    pub fn invalid_token() -> Self {
        ApiError::Unauthenticated("Invalid or expired token".to_string())
    }

    pub fn invalid_credentials() -> Self {
        ApiError::Unauthenticated("Invalid username or password".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(%detail, "Request failed");
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            CoreError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            CoreError::InsufficientStock { .. }
            | CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::AmountOverflow
            | CoreError::Validation(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::Invalid(inner) => inner.into(),
            DbError::Domain(inner) => inner.into(),
            DbError::UniqueViolation { .. } | DbError::CheckViolation { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Rejected(core) => core.into(),
            CheckoutError::Storage(db) => db.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_status() {
        let stock: ApiError = CoreError::InsufficientStock {
            product: "Aqua".to_string(),
            available: 0,
            requested: 1,
        }
        .into();
        assert_eq!(stock.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            stock.to_string(),
            "Insufficient stock for Aqua: available 0, requested 1"
        );

        let missing: ApiError = CoreError::ProductNotFound(9).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let forbidden: ApiError = CoreError::Forbidden {
            required: warung_core::Role::Admin,
        }
        .into();
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_storage_detail_is_hidden() {
        let err: ApiError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_checkout_rejection_unwraps() {
        let err: ApiError = CheckoutError::Rejected(CoreError::EmptyCart).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "items must contain at least one product");
    }
}
