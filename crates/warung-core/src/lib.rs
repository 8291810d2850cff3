//! # warung-core: Pure Business Logic for the Warung Storefront
//!
//! This crate holds the domain of the storefront backend as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Warung Backend Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Clients (web storefront, admin panel, mobile)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/api (axum, JWT access gate)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ warung-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │  money   │ │ checkout │ │  report  │          │   │
//! │  │   │ Product  │ │  Money   │ │ Receipt  │ │ windows  │          │   │
//! │  │   │  Sale    │ │          │ │  cart    │ │  folds   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐                       │   │
//! │  │   │validation│ │  filter  │ │  access  │                       │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘                       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   warung-db (Database Layer)                    │   │
//! │  │      SQLite, migrations, sale transaction engine, reports       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, User, enums)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules and query parameter parsing
//! - [`checkout`] - Cart validation and line pricing
//! - [`report`] - Report windows and daily/monthly/yearly folds
//! - [`filter`] - Typed sales and product filters
//! - [`access`] - Principal and role checks
//!
//! ## Example Usage
//!
//! ```rust
//! use warung_core::checkout::{price_line, Receipt};
//! use warung_core::types::CartLine;
//! use warung_core::Money;
//!
//! let line = CartLine { product_id: 1, quantity: 3 };
//! let mut receipt = Receipt::default();
//! receipt
//!     .push(price_line(&line, "Indomie Goreng", Money::from_units(3_500)).unwrap())
//!     .unwrap();
//!
//! assert_eq!(receipt.total().units(), 10_500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod checkout;
pub mod error;
pub mod filter;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{require_role, Principal};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Product listing page size when the client does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest product listing page a client may request.
pub const MAX_PAGE_LIMIT: u32 = 100;
