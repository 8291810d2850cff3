//! # warung-db: Storage Layer for the Warung Backend
//!
//! SQLite storage via sqlx: the connection pool, embedded migrations, the
//! repositories, and the sale transaction engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Warung Data Flow                                 │
//! │                                                                         │
//! │  axum handler (POST /sales)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     warung-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_initial_ │  │   │
//! │  │   │ WAL + busy    │    │ ReportRepo    │    │   schema.sql │  │   │
//! │  │   │ timeout       │    │ UserRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  warung.db (SQLite file, shared by every server process)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and checkout error types
//! - [`password`] - argon2 hashing for stored credentials
//! - [`repository`] - Repository implementations (product, sale, report, user)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_db::{Database, DbConfig};
//! use warung_core::{CartLine, NewSale};
//!
//! let db = Database::new(DbConfig::new("warung.db")).await?;
//!
//! let sale = db
//!     .sales()
//!     .create_sale(&NewSale::cash(vec![CartLine { product_id: 1, quantity: 2 }]))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CheckoutError, CheckoutResult, DbError, DbResult};
pub use password::{hash_password, verify_password};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;
