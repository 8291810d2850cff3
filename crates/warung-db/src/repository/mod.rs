//! # Repository Module
//!
//! Database repository implementations for the warung backend.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  state.db.sales().create_sale(new_sale)                        │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── create_sale(&self, new_sale)    ← the transaction engine          │
//! │  ├── get(&self, id)                                                    │
//! │  ├── list(&self, filter)                                               │
//! │  ├── update(&self, id, update)                                         │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product catalog CRUD and paged listing
//! - [`SaleRepository`](sale::SaleRepository) - Checkout engine and sale administration
//! - [`ReportRepository`](report::ReportRepository) - Daily/monthly/yearly summaries
//! - [`UserRepository`](user::UserRepository) - User directory for login

pub mod product;
pub mod report;
pub mod sale;
pub mod user;
