//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caja-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  caja-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  caja-engine errors (separate crate)                                   │
//! │  └── EngineError      - What sale-engine callers see                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → Caller (4xx)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, limit, balance, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant aborts the whole sale transaction: no error here is
/// recovered internally, and no partial sale is ever committed.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found by its id.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A scanned or typed code matched nothing by exact or fuzzy rules.
    ///
    /// Carries the raw code for diagnostics - the cashier needs to see
    /// exactly what the scanner produced.
    #[error("No product matches code '{code}'")]
    CodeNotFound { code: String },

    /// Client referenced by the sale does not exist.
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Insufficient stock to complete the sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Yerba 1kg", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Yerba 1kg in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Proposed new debt would breach the client's credit limit.
    ///
    /// Carries limit, current balance, and proposed debt so the caller can
    /// render a complete user-facing message.
    #[error(
        "Credit limit exceeded: limit {limit_cents}, current balance {balance_cents}, new debt {proposed_debt_cents}"
    )]
    CreditLimitExceeded {
        limit_cents: i64,
        balance_cents: i64,
        proposed_debt_cents: i64,
    },

    /// Requested line quantity is zero, negative, or absurdly large.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Sale request contained no items.
    #[error("Sale has no items")]
    EmptySale,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
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

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
            name: "Yerba 1kg".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Yerba 1kg: available 3, requested 5"
        );

        let err = CoreError::CodeNotFound {
            code: "77912".to_string(),
        };
        assert_eq!(err.to_string(), "No product matches code '77912'");
    }

    #[test]
    fn test_credit_limit_message_carries_all_figures() {
        let err = CoreError::CreditLimitExceeded {
            limit_cents: 500000,
            balance_cents: 450000,
            proposed_debt_cents: 100000,
        };
        let msg = err.to_string();
        assert!(msg.contains("500000"));
        assert!(msg.contains("450000"));
        assert!(msg.contains("100000"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
