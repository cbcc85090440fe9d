//! # Sale Transaction Engine
//!
//! The sole entry point that commits sales. One call, one transaction:
//! every mutation applies, or none do.
//!
//! ## Processing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       process_sale(request)                             │
//! │                                                                         │
//! │  validate input (non-empty, positive quantities)                        │
//! │       │                                                                 │
//! │       ▼                 ┌──────────────── BEGIN TRANSACTION ─────────┐  │
//! │  resolve each item      │  by id, or by code via CodeResolver        │  │
//! │       │                 │                                            │  │
//! │       ▼                 │                                            │  │
//! │  check stock            │  Strict policy only                        │  │
//! │       │                 │                                            │  │
//! │       ▼                 │                                            │  │
//! │  price lines            │  unit_price × qty, current catalog price   │  │
//! │       │                 │                                            │  │
//! │       ▼                 │                                            │  │
//! │  credit policy          │  only when client owes part of the total   │  │
//! │       │                 │                                            │  │
//! │       ▼                 │                                            │  │
//! │  decrement stock        │  guarded UPDATE re-validates availability  │  │
//! │       │                 │                                            │  │
//! │       ▼                 │                                            │  │
//! │  persist sale + items   │  snapshots of name and price               │  │
//! │  (+ payment record)     │                                            │  │
//! │       │                 └──────────────── COMMIT ────────────────────┘  │
//! │       ▼                                                                 │
//! │  SaleReceipt { sale, items }                                            │
//! │                                                                         │
//! │  Any error anywhere rolls the transaction back on drop.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Two registers can sell the same product at once. Both may pass the
//! read-side stock check before either commits, so the decrement itself is
//! a guarded `UPDATE ... WHERE stock_quantity >= ?` that re-validates
//! availability inside the transaction. The loser of the race aborts with
//! `InsufficientStock` instead of driving stock negative.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use caja_core::{
    validation, CoreError, Money, Payment, PaymentMethod, PaymentStatus, Product, Sale, SaleItem,
};
use caja_db::repository::{catalog, ledger};
use caja_db::Database;

use crate::error::EngineResult;
use crate::policy::CreditPolicy;
use crate::resolver::CodeResolver;

/// Annotation stored on payments taken at the register.
const SALE_PAYMENT_NOTE: &str = "Immediate payment at point of sale";

// =============================================================================
// Request / Response Types
// =============================================================================

/// How a requested line identifies its product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductRef {
    /// Direct product id (checkout path, no resolution).
    Id(String),
    /// Scanned or typed code (picking path, resolved via [`CodeResolver`]).
    Code(String),
}

/// One requested line of a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedItem {
    pub product: ProductRef,
    pub quantity: i64,
}

impl RequestedItem {
    pub fn by_id(id: impl Into<String>, quantity: i64) -> Self {
        RequestedItem {
            product: ProductRef::Id(id.into()),
            quantity,
        }
    }

    pub fn by_code(code: impl Into<String>, quantity: i64) -> Self {
        RequestedItem {
            product: ProductRef::Code(code.into()),
            quantity,
        }
    }
}

/// A complete sale request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRequest {
    /// Operator performing the sale.
    pub operator_id: String,
    /// Ordered line items.
    pub items: Vec<RequestedItem>,
    pub payment_method: PaymentMethod,
    /// Client the sale is on account for, if any.
    pub client_id: Option<String>,
    /// Amount tendered in cents. `None` means fully paid.
    pub amount_paid_cents: Option<i64>,
}

impl SaleRequest {
    /// A plain walk-in cash sale: no client, fully paid.
    pub fn walk_in(operator_id: impl Into<String>, items: Vec<RequestedItem>) -> Self {
        SaleRequest {
            operator_id: operator_id.into(),
            items,
            payment_method: PaymentMethod::default(),
            client_id: None,
            amount_paid_cents: None,
        }
    }
}

/// The committed sale, returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Stock Policy
// =============================================================================

/// What to do when a requested quantity exceeds available stock.
///
/// Strict is the default. AllowOversell exists for shops that sell from a
/// back room the system does not track; it lets stock go negative and the
/// discrepancy is reconciled at the next stocktake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Reject the sale with `InsufficientStock`.
    #[default]
    Strict,
    /// Decrement anyway, allowing negative stock.
    AllowOversell,
}

// =============================================================================
// Sale Engine
// =============================================================================

/// Orchestrates one sale end to end.
///
/// Constructed once per process with its database handle and passed by
/// reference to request handlers; holds no per-sale state.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    db: Database,
    resolver: CodeResolver,
    policy: CreditPolicy,
    stock_policy: StockPolicy,
}

impl SaleEngine {
    /// Creates an engine with the default strict stock policy.
    pub fn new(db: Database) -> Self {
        SaleEngine {
            db,
            resolver: CodeResolver::new(),
            policy: CreditPolicy::new(),
            stock_policy: StockPolicy::default(),
        }
    }

    /// Overrides the stock policy.
    pub fn with_stock_policy(mut self, stock_policy: StockPolicy) -> Self {
        self.stock_policy = stock_policy;
        self
    }

    /// Processes one sale as a single atomic unit of work.
    ///
    /// On success the sale header, its item snapshots, the stock
    /// decrements, and the optional payment record are all committed
    /// together. On any failure nothing is persisted.
    #[instrument(skip(self, request), fields(operator = %request.operator_id))]
    pub async fn process_sale(&self, request: SaleRequest) -> EngineResult<SaleReceipt> {
        if request.items.is_empty() {
            return Err(CoreError::EmptySale.into());
        }
        for item in &request.items {
            validation::validate_quantity(item.quantity).map_err(|_| {
                CoreError::InvalidQuantity {
                    quantity: item.quantity,
                }
            })?;
        }

        let mut tx = self.db.begin().await?;

        // Resolve every line before touching anything
        let mut lines: Vec<(Product, i64)> = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let product = match &item.product {
                ProductRef::Id(id) => catalog::find_by_id(&mut *tx, id)
                    .await?
                    .ok_or_else(|| CoreError::ProductNotFound(id.clone()))?,
                ProductRef::Code(code) => self.resolver.resolve(&mut tx, code).await?,
            };
            lines.push((product, item.quantity));
        }

        // Read-side stock check. The guarded decrement below re-validates,
        // so a concurrent sale slipping in between still cannot oversell.
        if self.stock_policy == StockPolicy::Strict {
            for (product, quantity) in &lines {
                if !product.has_stock_for(*quantity) {
                    return Err(CoreError::InsufficientStock {
                        name: product.name.clone(),
                        available: product.stock_quantity,
                        requested: *quantity,
                    }
                    .into());
                }
            }
        }

        // Price the lines with the current catalog price, snapshotted below
        let mut total = Money::zero();
        for (product, quantity) in &lines {
            total += product.price().multiply_quantity(*quantity);
        }

        // Missing amount means the caller tendered the full total
        let amount_paid = request
            .amount_paid_cents
            .map(Money::from_cents)
            .unwrap_or(total);

        // Credit policy runs only when part of the total goes on account
        let client = match &request.client_id {
            Some(client_id) => {
                let client = ledger::find_client(&mut *tx, client_id)
                    .await?
                    .ok_or_else(|| CoreError::ClientNotFound(client_id.clone()))?;

                if amount_paid < total {
                    self.policy
                        .admit(&mut tx, &client, total - amount_paid)
                        .await?;
                }

                Some(client)
            }
            None => None,
        };

        let payment_status = PaymentStatus::derive(amount_paid, total);
        let now = Utc::now();

        // Decrement stock, re-validating availability inside the transaction
        for (product, quantity) in &lines {
            match self.stock_policy {
                StockPolicy::Strict => {
                    let decremented =
                        catalog::decrement_stock_checked(&mut *tx, &product.id, *quantity).await?;
                    if !decremented {
                        // A concurrent sale (or an earlier line of this one)
                        // consumed the stock after our read
                        let available = catalog::find_by_id(&mut *tx, &product.id)
                            .await?
                            .map(|p| p.stock_quantity)
                            .unwrap_or(0);
                        return Err(CoreError::InsufficientStock {
                            name: product.name.clone(),
                            available,
                            requested: *quantity,
                        }
                        .into());
                    }
                }
                StockPolicy::AllowOversell => {
                    catalog::decrement_stock_unchecked(&mut *tx, &product.id, *quantity).await?;
                }
            }
        }

        // Persist the header, then the line snapshots
        let sale = Sale {
            id: ledger::generate_sale_id(),
            client_id: client.as_ref().map(|c| c.id.clone()),
            user_id: request.operator_id.clone(),
            payment_method: request.payment_method,
            total_cents: total.cents(),
            amount_paid_cents: amount_paid.cents(),
            payment_status,
            created_at: now,
        };
        ledger::insert_sale(&mut *tx, &sale).await?;

        let mut items = Vec::with_capacity(lines.len());
        for (product, quantity) in &lines {
            let line_total = product.price().multiply_quantity(*quantity);
            let item = SaleItem {
                id: ledger::generate_sale_item_id(),
                sale_id: sale.id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                unit_price_cents: product.price_cents,
                quantity: *quantity,
                line_total_cents: line_total.cents(),
                created_at: now,
            };
            ledger::insert_sale_item(&mut *tx, &item).await?;
            items.push(item);
        }

        // Money tendered by a known client goes on their ledger
        if let Some(client) = &client {
            if amount_paid.is_positive() {
                let payment = Payment {
                    id: ledger::generate_payment_id(),
                    client_id: client.id.clone(),
                    amount_cents: amount_paid.cents(),
                    note: Some(SALE_PAYMENT_NOTE.to_string()),
                    created_at: now,
                };
                ledger::insert_payment(&mut *tx, &payment).await?;
            }
        }

        tx.commit().await.map_err(caja_db::DbError::from)?;

        info!(
            sale_id = %sale.id,
            total = %total,
            paid = %amount_paid,
            status = ?payment_status,
            lines = items.len(),
            "Sale committed"
        );

        Ok(SaleReceipt { sale, items })
    }

    /// Processes a picking-style exit: items identified by scanned code,
    /// no client, always treated as fully paid.
    pub async fn process_picking_exit(
        &self,
        operator_id: &str,
        items: Vec<(String, i64)>,
    ) -> EngineResult<SaleReceipt> {
        let items = items
            .into_iter()
            .map(|(code, quantity)| RequestedItem::by_code(code, quantity))
            .collect();

        self.process_sale(SaleRequest::walk_in(operator_id, items))
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use caja_core::Client;
    use caja_db::repository::ledger::generate_client_id;
    use caja_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, id: &str, name: &str, price_cents: i64, stock: i64) {
        let now = Utc::now();
        db.catalog()
            .insert(&Product {
                id: id.to_string(),
                name: name.to_string(),
                barcode: None,
                item_number: None,
                price_cents,
                stock_quantity: stock,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    async fn seed_client(db: &Database, limit_cents: Option<i64>) -> String {
        let client = Client {
            id: generate_client_id(),
            name: "Cliente".to_string(),
            credit_limit_cents: limit_cents,
            created_at: Utc::now(),
        };
        db.ledger().insert_client(&client).await.unwrap();
        client.id
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.catalog().get_by_id(id).await.unwrap().unwrap().stock_quantity
    }

    async fn sale_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_total_is_sum_of_line_totals() {
        let db = test_db().await;
        seed_product(&db, "p1", "Yerba 1kg", 350, 10).await;
        seed_product(&db, "p2", "Azucar 1kg", 120, 10).await;

        let engine = SaleEngine::new(db);
        let receipt = engine
            .process_sale(SaleRequest::walk_in(
                "op-1",
                vec![RequestedItem::by_id("p1", 2), RequestedItem::by_id("p2", 3)],
            ))
            .await
            .unwrap();

        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.items[0].line_total_cents, 700);
        assert_eq!(receipt.items[1].line_total_cents, 360);

        let sum: i64 = receipt.items.iter().map(|i| i.line_total_cents).sum();
        assert_eq!(receipt.sale.total_cents, sum);
        assert_eq!(receipt.sale.total_cents, 1060);

        // Fully paid by default
        assert_eq!(receipt.sale.payment_status, PaymentStatus::Paid);
        assert_eq!(receipt.sale.amount_paid_cents, 1060);
    }

    #[tokio::test]
    async fn test_stock_decrements_by_quantity_sold() {
        let db = test_db().await;
        seed_product(&db, "p1", "Pan", 100, 10).await;

        let engine = SaleEngine::new(db.clone());
        // Same product twice in one sale
        engine
            .process_sale(SaleRequest::walk_in(
                "op-1",
                vec![RequestedItem::by_id("p1", 2), RequestedItem::by_id("p1", 3)],
            ))
            .await
            .unwrap();

        assert_eq!(stock_of(&db, "p1").await, 5);
    }

    #[tokio::test]
    async fn test_failing_last_item_rolls_everything_back() {
        let db = test_db().await;
        seed_product(&db, "p1", "Leche", 200, 10).await;
        seed_product(&db, "p2", "Queso", 900, 1).await;

        let engine = SaleEngine::new(db.clone());
        let err = engine
            .process_sale(SaleRequest::walk_in(
                "op-1",
                vec![
                    RequestedItem::by_id("p1", 4),
                    RequestedItem::by_id("p2", 5), // only 1 in stock
                ],
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(CoreError::InsufficientStock { .. })
        ));

        // Nothing moved, nothing persisted
        assert_eq!(stock_of(&db, "p1").await, 10);
        assert_eq!(stock_of(&db, "p2").await, 1);
        assert_eq!(sale_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_everything_back() {
        let db = test_db().await;
        seed_product(&db, "p1", "Leche", 200, 10).await;

        let engine = SaleEngine::new(db.clone());
        let err = engine
            .process_sale(SaleRequest::walk_in(
                "op-1",
                vec![
                    RequestedItem::by_id("p1", 1),
                    RequestedItem::by_id("ghost", 1),
                ],
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(CoreError::ProductNotFound(ref id)) if id == "ghost"
        ));

        assert_eq!(stock_of(&db, "p1").await, 10);
        assert_eq!(sale_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_partial_payment_derives_partial_status() {
        let db = test_db().await;
        seed_product(&db, "p1", "Fideos", 1000, 10).await;
        let client_id = seed_client(&db, None).await;

        let engine = SaleEngine::new(db.clone());
        let receipt = engine
            .process_sale(SaleRequest {
                operator_id: "op-1".to_string(),
                items: vec![RequestedItem::by_id("p1", 1)],
                payment_method: PaymentMethod::Cash,
                client_id: Some(client_id.clone()),
                amount_paid_cents: Some(400),
            })
            .await
            .unwrap();

        assert_eq!(receipt.sale.payment_status, PaymentStatus::Partial);
        assert_eq!(receipt.sale.outstanding().cents(), 600);

        // The 600 outstanding lands on the client's balance
        assert_eq!(db.ledger().balance(&client_id).await.unwrap(), 600);
    }

    #[tokio::test]
    async fn test_zero_payment_derives_pending_status() {
        let db = test_db().await;
        seed_product(&db, "p1", "Fideos", 1000, 10).await;
        let client_id = seed_client(&db, None).await;

        let engine = SaleEngine::new(db.clone());
        let receipt = engine
            .process_sale(SaleRequest {
                operator_id: "op-1".to_string(),
                items: vec![RequestedItem::by_id("p1", 1)],
                payment_method: PaymentMethod::Cash,
                client_id: Some(client_id.clone()),
                amount_paid_cents: Some(0),
            })
            .await
            .unwrap();

        assert_eq!(receipt.sale.payment_status, PaymentStatus::Pending);

        // Zero tendered: no payment row is written
        let payments = db
            .ledger()
            .get_payments_for_client(&client_id)
            .await
            .unwrap();
        assert!(payments.is_empty());
    }

    #[tokio::test]
    async fn test_client_payment_recorded_with_note() {
        let db = test_db().await;
        seed_product(&db, "p1", "Vino", 2500, 10).await;
        let client_id = seed_client(&db, None).await;

        let engine = SaleEngine::new(db.clone());
        engine
            .process_sale(SaleRequest {
                operator_id: "op-1".to_string(),
                items: vec![RequestedItem::by_id("p1", 2)],
                payment_method: PaymentMethod::Card,
                client_id: Some(client_id.clone()),
                amount_paid_cents: None, // fully paid
            })
            .await
            .unwrap();

        let payments = db
            .ledger()
            .get_payments_for_client(&client_id)
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount_cents, 5000);
        assert_eq!(
            payments[0].note.as_deref(),
            Some("Immediate payment at point of sale")
        );

        // Fully paid sale contributes zero balance
        assert_eq!(db.ledger().balance(&client_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_credit_limit_blocks_unpaid_sale() {
        let db = test_db().await;
        seed_product(&db, "p1", "Aceite", 1000, 10).await;
        let client_id = seed_client(&db, Some(5000)).await;

        let engine = SaleEngine::new(db.clone());

        // Build up an existing balance of 4500
        engine
            .process_sale(SaleRequest {
                operator_id: "op-1".to_string(),
                items: vec![RequestedItem::by_id("p1", 1)],
                payment_method: PaymentMethod::Cash,
                client_id: Some(client_id.clone()),
                amount_paid_cents: Some(0),
            })
            .await
            .unwrap();
        engine
            .process_sale(SaleRequest {
                operator_id: "op-1".to_string(),
                items: vec![RequestedItem::by_id("p1", 4)],
                payment_method: PaymentMethod::Cash,
                client_id: Some(client_id.clone()),
                amount_paid_cents: Some(500),
            })
            .await
            .unwrap();
        assert_eq!(db.ledger().balance(&client_id).await.unwrap(), 4500);

        // A fully unpaid 1000 sale would bring the balance to 5500 > 5000
        let stock_before = stock_of(&db, "p1").await;
        let err = engine
            .process_sale(SaleRequest {
                operator_id: "op-1".to_string(),
                items: vec![RequestedItem::by_id("p1", 1)],
                payment_method: PaymentMethod::Cash,
                client_id: Some(client_id.clone()),
                amount_paid_cents: Some(0),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(CoreError::CreditLimitExceeded {
                limit_cents: 5000,
                balance_cents: 4500,
                proposed_debt_cents: 1000,
            })
        ));

        // Rejection touched nothing
        assert_eq!(stock_of(&db, "p1").await, stock_before);
        assert_eq!(db.ledger().balance(&client_id).await.unwrap(), 4500);

        // Paying 600 of the same sale leaves new debt 400: admitted
        let receipt = engine
            .process_sale(SaleRequest {
                operator_id: "op-1".to_string(),
                items: vec![RequestedItem::by_id("p1", 1)],
                payment_method: PaymentMethod::Cash,
                client_id: Some(client_id.clone()),
                amount_paid_cents: Some(600),
            })
            .await
            .unwrap();
        assert_eq!(receipt.sale.payment_status, PaymentStatus::Partial);
        assert_eq!(db.ledger().balance(&client_id).await.unwrap(), 4900);
    }

    #[tokio::test]
    async fn test_unknown_client_rejected() {
        let db = test_db().await;
        seed_product(&db, "p1", "Sal", 100, 10).await;

        let engine = SaleEngine::new(db.clone());
        let err = engine
            .process_sale(SaleRequest {
                operator_id: "op-1".to_string(),
                items: vec![RequestedItem::by_id("p1", 1)],
                payment_method: PaymentMethod::Cash,
                client_id: Some("ghost".to_string()),
                amount_paid_cents: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(CoreError::ClientNotFound(ref id)) if id == "ghost"
        ));
        assert_eq!(stock_of(&db, "p1").await, 10);
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected_before_any_work() {
        let db = test_db().await;
        seed_product(&db, "p1", "Pan", 100, 10).await;

        let engine = SaleEngine::new(db.clone());
        for quantity in [0, -3] {
            let err = engine
                .process_sale(SaleRequest::walk_in(
                    "op-1",
                    vec![RequestedItem::by_id("p1", quantity)],
                ))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                EngineError::Domain(CoreError::InvalidQuantity { .. })
            ));
        }
        assert_eq!(stock_of(&db, "p1").await, 10);
    }

    #[tokio::test]
    async fn test_empty_sale_rejected() {
        let db = test_db().await;
        let engine = SaleEngine::new(db);

        let err = engine
            .process_sale(SaleRequest::walk_in("op-1", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Domain(CoreError::EmptySale)));
    }

    #[tokio::test]
    async fn test_oversell_policy_allows_negative_stock() {
        let db = test_db().await;
        seed_product(&db, "p1", "Carbon", 500, 2).await;

        let engine = SaleEngine::new(db.clone()).with_stock_policy(StockPolicy::AllowOversell);
        let receipt = engine
            .process_sale(SaleRequest::walk_in(
                "op-1",
                vec![RequestedItem::by_id("p1", 5)],
            ))
            .await
            .unwrap();

        assert_eq!(receipt.sale.total_cents, 2500);
        assert_eq!(stock_of(&db, "p1").await, -3);
    }

    #[tokio::test]
    async fn test_picking_exit_resolves_codes_and_is_fully_paid() {
        let db = test_db().await;
        let now = Utc::now();
        db.catalog()
            .insert(&Product {
                id: "a".to_string(),
                name: "Gaseosa".to_string(),
                barcode: Some("7791234567890".to_string()),
                item_number: Some("779".to_string()),
                price_cents: 800,
                stock_quantity: 6,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        db.catalog()
            .insert(&Product {
                id: "b".to_string(),
                name: "Agua".to_string(),
                barcode: None,
                item_number: Some("7791".to_string()),
                price_cents: 300,
                stock_quantity: 6,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let engine = SaleEngine::new(db.clone());
        let receipt = engine
            .process_picking_exit(
                "op-1",
                vec![
                    ("7791234567890".to_string(), 1), // exact barcode → a
                    ("77912".to_string(), 2),          // longest prefix → b
                ],
            )
            .await
            .unwrap();

        assert_eq!(receipt.items[0].product_id, "a");
        assert_eq!(receipt.items[1].product_id, "b");
        assert_eq!(receipt.sale.client_id, None);
        assert_eq!(receipt.sale.payment_status, PaymentStatus::Paid);
        assert_eq!(receipt.sale.total_cents, 800 + 600);

        assert_eq!(stock_of(&db, "a").await, 5);
        assert_eq!(stock_of(&db, "b").await, 4);
    }

    #[tokio::test]
    async fn test_unresolvable_code_aborts_whole_picking_exit() {
        let db = test_db().await;
        seed_product(&db, "p1", "Pan", 100, 10).await;
        let now = Utc::now();
        db.catalog()
            .insert(&Product {
                id: "x".to_string(),
                name: "Scanned".to_string(),
                barcode: Some("1112223334445".to_string()),
                item_number: None,
                price_cents: 100,
                stock_quantity: 10,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let engine = SaleEngine::new(db.clone());
        let err = engine
            .process_picking_exit(
                "op-1",
                vec![
                    ("1112223334445".to_string(), 1),
                    ("9999999999999".to_string(), 1),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(CoreError::CodeNotFound { .. })
        ));

        assert_eq!(stock_of(&db, "x").await, 10);
        assert_eq!(sale_count(&db).await, 0);
    }
}
