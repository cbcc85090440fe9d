//! # caja-engine: Sale Transaction Engine
//!
//! The single entry point that commits sales for Caja POS.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Checkout endpoint           Picking-exit endpoint                     │
//! │   (items by product id)       (items by scanned code)                   │
//! │          │                            │                                 │
//! │          └──────────────┬─────────────┘                                 │
//! │                         ▼                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              ★ caja-engine (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐   ┌──────────────┐   ┌──────────────────┐     │   │
//! │  │   │ SaleEngine │──►│ CodeResolver │   │   CreditPolicy   │     │   │
//! │  │   │ (orchestr.)│   │ barcode +    │   │ balance vs limit │     │   │
//! │  │   │            │──►│ item number  │──►│ from the ledger  │     │   │
//! │  │   └────────────┘   └──────────────┘   └──────────────────┘     │   │
//! │  │                                                                 │   │
//! │  │   ONE TRANSACTION PER SALE • ALL-OR-NOTHING • NO CACHED STATE  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                         │                                               │
//! │                         ▼                                               │
//! │              caja-db (catalog + ledger stores)                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use caja_db::{Database, DbConfig};
//! use caja_engine::{RequestedItem, SaleEngine, SaleRequest};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DbConfig::new("./caja.db")).await?;
//! let engine = SaleEngine::new(db);
//!
//! let receipt = engine
//!     .process_sale(SaleRequest::walk_in(
//!         "operator-1",
//!         vec![RequestedItem::by_code("7791234567890", 2)],
//!     ))
//!     .await?;
//!
//! println!("Sold {} for {}", receipt.items.len(), receipt.sale.total());
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod policy;
pub mod resolver;

pub use engine::{
    ProductRef, RequestedItem, SaleEngine, SaleReceipt, SaleRequest, StockPolicy,
};
pub use error::{EngineError, EngineResult};
pub use policy::CreditPolicy;
pub use resolver::CodeResolver;
