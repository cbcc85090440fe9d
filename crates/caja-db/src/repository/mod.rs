//! # Repository Module
//!
//! Store implementations for Caja POS.
//!
//! - [`catalog`] - Catalog Store: products, lookups by id/barcode/item
//!   number, stock decrements
//! - [`ledger`] - Ledger Store: clients, sales, sale items, payments, and
//!   the per-client aggregates the credit policy reads
//!
//! Each module exposes executor-level functions (composable inside a
//! transaction) and a pool-holding repository struct for standalone use.

pub mod catalog;
pub mod ledger;
