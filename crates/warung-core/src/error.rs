//! # Error Types
//!
//! Domain-specific error types for warung-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  warung-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  warung-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CheckoutError    - Engine outcome: rejection or storage failure   │
//! │                                                                         │
//! │  HTTP errors (in apps/api)                                             │
//! │  └── ApiError         - What clients see: {"error": "..."}             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, ID, quantities)
//! 3. Errors are enum variants, never String
//! 4. Every message is safe to show to a client as-is

use thiserror::Error;

use crate::types::Role;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. Every variant maps to
/// exactly one HTTP status in the API layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist in the catalog
    /// - Product was deleted between listing and checkout
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(i64),

    /// Insufficient stock to complete a sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart line (qty: 5)
    ///      │
    ///      ▼
    /// Conditional decrement fails: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Indomie Goreng", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Client shows: "Only 3 Indomie Goreng left"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The cart has no lines.
    #[error("items must contain at least one product")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// A line subtotal or the sale total does not fit in the money type.
    #[error("Total amount is too large")]
    AmountOverflow,

    /// Authenticated principal lacks the required role.
    #[error("{required} access required")]
    Forbidden { required: Role },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any store access, so a validation failure never leaves
/// partial state behind.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparseable date or number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {}", allowed.join(", "))]
    NotAllowed {
        field: String,
        allowed: Vec<String>,
    },

    /// Duplicate value (e.g., duplicate username).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Kopi Kapal Api".to_string(),
            available: 0,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Kopi Kapal Api: available 0, requested 1"
        );
        assert_eq!(
            CoreError::EmptyCart.to_string(),
            "items must contain at least one product"
        );
        assert_eq!(
            CoreError::Forbidden {
                required: Role::Admin
            }
            .to_string(),
            "admin access required"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::NotAllowed {
            field: "paymentMethod".to_string(),
            allowed: vec!["cash".to_string(), "transfer".to_string()],
        };
        assert_eq!(err.to_string(), "paymentMethod must be one of: cash, transfer");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "quantity must be positive");
    }
}
