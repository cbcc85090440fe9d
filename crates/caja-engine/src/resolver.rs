//! # Code Resolver
//!
//! Maps a scanned or typed code to a catalog product.
//!
//! ## Resolution Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      resolve("77912...")                                │
//! │                                                                         │
//! │  Stage 1: exact barcode match          ──found──►  Product              │
//! │       │ miss                                                            │
//! │       ▼                                                                 │
//! │  Stage 2: exact item-number match      ──found──►  Product              │
//! │       │ miss                                                            │
//! │       ▼                                                                 │
//! │  Stage 3: fuzzy fallback (len >= 4)                                     │
//! │    probe item numbers equal to the code's prefixes of length 5, 4, 3;  │
//! │    longest matching prefix wins        ──found──►  Product              │
//! │       │ miss                                                            │
//! │       ▼                                                                 │
//! │  CodeNotFound { code }                                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tie-Break
//! When two products with equal-length item numbers both prefix the code,
//! the one with the lexicographically smallest id wins. Resolution must be
//! deterministic: the same scan always lands on the same product.

use sqlx::SqliteConnection;
use tracing::debug;

use caja_core::{validation, CoreError, Product, FUZZY_PREFIX_LENGTHS, MIN_FUZZY_CODE_LEN};
use caja_db::repository::catalog;

use crate::error::EngineResult;

/// Resolves scanned/typed codes against the catalog.
///
/// Stateless; operates on whatever connection the caller hands it, so the
/// sale engine can run it inside an open transaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeResolver;

impl CodeResolver {
    pub fn new() -> Self {
        CodeResolver
    }

    /// Resolves a code to a product, first match wins:
    /// exact barcode, then exact item number, then fuzzy prefix fallback.
    ///
    /// Fails with `CodeNotFound` carrying the original code when no stage
    /// matches.
    pub async fn resolve(
        &self,
        conn: &mut SqliteConnection,
        code: &str,
    ) -> EngineResult<Product> {
        let code = validation::validate_code(code).map_err(CoreError::from)?;

        // Stage 1: exact barcode
        if let Some(product) = catalog::find_by_barcode(&mut *conn, &code).await? {
            debug!(code = %code, product_id = %product.id, "Resolved by barcode");
            return Ok(product);
        }

        // Stage 2: exact item number. Item numbers are not unique; take the
        // smallest id for determinism.
        if let Some(product) = catalog::find_all_by_item_number(&mut *conn, &code)
            .await?
            .into_iter()
            .next()
        {
            debug!(code = %code, product_id = %product.id, "Resolved by item number");
            return Ok(product);
        }

        // Stage 3: fuzzy prefix fallback, longest prefix first
        if code.len() >= MIN_FUZZY_CODE_LEN {
            for len in FUZZY_PREFIX_LENGTHS.iter().rev() {
                // get() keeps multibyte scanner garbage from panicking
                let Some(prefix) = code.get(..*len) else {
                    continue;
                };

                if let Some(product) =
                    catalog::find_all_by_item_number(&mut *conn, prefix)
                        .await?
                        .into_iter()
                        .next()
                {
                    debug!(
                        code = %code,
                        prefix = %prefix,
                        product_id = %product.id,
                        "Resolved by fuzzy prefix"
                    );
                    return Ok(product);
                }
            }
        }

        Err(CoreError::CodeNotFound { code }.into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
