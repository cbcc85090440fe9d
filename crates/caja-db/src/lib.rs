//! # caja-db: Database Layer for Caja POS
//!
//! This crate provides database access for the Caja POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caja POS Data Flow                               │
//! │                                                                         │
//! │  Sale Engine (process_sale)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      caja-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (catalog.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │ (ledger.rs)   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CatalogRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Transactions  │    │ LedgerRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode, foreign keys on)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Catalog and ledger stores
//!
//! ## Two Access Styles
//!
//! Each repository module exposes the same queries twice:
//!
//! - **Executor-level functions** (`catalog::find_by_id(&mut *tx, id)`) -
//!   composable inside a transaction; this is what the sale engine uses so
//!   every read and write of one sale shares a single transaction.
//! - **Repository structs** (`db.catalog().get_by_id(id)`) - convenience
//!   wrappers over the pool for standalone reads and writes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caja_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/caja.db")).await?;
//! let product = db.catalog().get_by_id("uuid-here").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::ledger::LedgerRepository;
