//! # Engine Error Types
//!
//! What sale-engine callers see. Every variant is non-retryable from the
//! engine's point of view; retry, if any, is the caller's decision.

use thiserror::Error;

use caja_core::CoreError;
use caja_db::DbError;

/// Errors surfaced by the sale engine.
///
/// ## Mapping for Callers
/// ```text
/// Domain(..)   → client error (4xx): bad product, code, stock, credit, input
/// Db(..)       → server error (5xx): the store itself failed
/// ```
/// Any error raised mid-transaction rolls the whole transaction back; no
/// partial sale ever survives a failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rule violation (product/code/client not found, stock,
    /// credit limit, invalid input).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Database operation failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_converts() {
        let err: EngineError = CoreError::EmptySale.into();
        assert!(matches!(err, EngineError::Domain(CoreError::EmptySale)));
        assert_eq!(err.to_string(), "Sale has no items");
    }
}
