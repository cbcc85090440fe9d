//! # Domain Types
//!
//! Core domain types used throughout Caja POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  barcode        │   │  client_id?     │   │  client_id (FK) │       │
//! │  │  item_number    │   │  payment_status │   │  amount_cents   │       │
//! │  │  price_cents    │   │  total_cents    │   │  note           │       │
//! │  │  stock_quantity │   │  amount_paid    │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Client       │   │  PaymentStatus  │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  credit_limit?  │   │  Paid           │   │  Cash           │       │
//! │  │  (None = no     │   │  Partial        │   │  Card           │       │
//! │  │   enforcement)  │   │  Pending        │   │  Transfer       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and snapshotted into sale items.
    pub name: String,

    /// Scannable barcode (EAN-13, Code128, etc.).
    /// Optional, but unique across the catalog when present.
    pub barcode: Option<String>,

    /// Secondary / fallback code used by the fuzzy resolver.
    /// Format is not guaranteed unique.
    pub item_number: Option<String>,

    /// Unit price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    /// Current stock level. Only the oversell policy may drive it negative.
    pub stock_quantity: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the requested quantity is covered by current stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }
}

// =============================================================================
// Client
// =============================================================================

/// A client with an optional credit limit.
///
/// ## Read-Only Within the Engine
/// Clients are created and managed elsewhere; the sale engine only reads
/// them to evaluate the credit policy and to link sales/payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Maximum outstanding balance this client may carry.
    /// `None` means no limit is enforced.
    pub credit_limit_cents: Option<i64>,

    /// When the client was created.
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Returns the credit limit as Money, if one is set.
    #[inline]
    pub fn credit_limit(&self) -> Option<Money> {
        self.credit_limit_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Derived classification of how much of a sale was paid at sale time.
///
/// This is a pure function of `amount_paid` vs `total` - it is computed
/// once at commit time and never recomputed from mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// `amount_paid >= total` - nothing outstanding.
    Paid,
    /// `0 < amount_paid < total` - partially on account.
    Partial,
    /// `amount_paid <= 0` - fully on account.
    Pending,
}

impl PaymentStatus {
    /// Derives the payment status from an amount paid and a sale total.
    ///
    /// ## Derivation Table
    /// ```text
    /// amount_paid >= total  →  Paid
    /// 0 < amount_paid < total  →  Partial
    /// amount_paid <= 0  →  Pending
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    /// use caja_core::types::PaymentStatus;
    ///
    /// let status = PaymentStatus::derive(Money::from_cents(400), Money::from_cents(1000));
    /// assert_eq!(status, PaymentStatus::Partial);
    /// ```
    pub fn derive(amount_paid: Money, total: Money) -> Self {
        if amount_paid >= total {
            PaymentStatus::Paid
        } else if amount_paid.is_positive() {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Pending
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was tendered.
///
/// Stored as a lowercase tag; `cash` is the default for walk-in sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Bank transfer.
    Transfer,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction.
///
/// Created exactly once by the sale engine and immutable thereafter.
/// `total_cents` always equals the sum of its items' line totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Client the sale is on account for, if any.
    pub client_id: Option<String>,
    /// Operator who performed the sale.
    pub user_id: String,
    pub payment_method: PaymentMethod,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the amount paid as Money.
    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    /// Outstanding amount this sale adds to the client's balance.
    /// Never negative: overpayment contributes zero debt.
    #[inline]
    pub fn outstanding(&self) -> Money {
        let due = self.total() - self.amount_paid();
        if due.is_negative() {
            Money::zero()
        } else {
            due
        }
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses the snapshot pattern to freeze product data at time of sale:
/// later catalog edits or price changes never alter historical sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment credited to a client's account.
///
/// The sale engine creates one only when a sale is associated with a client
/// and a positive amount is paid at sale time. Manual account payments are
/// recorded by unrelated flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub client_id: String,
    /// Amount paid in cents.
    pub amount_cents: i64,
    /// Optional annotation (e.g. "Immediate payment at point of sale").
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
