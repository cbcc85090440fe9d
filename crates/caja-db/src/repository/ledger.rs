//! # Ledger Store
//!
//! Database operations for clients, sales, sale items, and payments.
//!
//! ## Balance Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Client Balance                                       │
//! │                                                                         │
//! │  balance = Σ sales.total_cents   (everything ever sold to the client)  │
//! │          − Σ payments.amount_cents (everything the client ever paid)   │
//! │                                                                         │
//! │  The balance is NEVER cached. The credit policy recomputes it from     │
//! │  persisted rows at every evaluation, inside the sale's transaction.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sale Immutability
//! Sales and sale items are insert-only from the engine's point of view:
//! there is no update path here. Voiding/refunds are out of scope.

use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use caja_core::{Client, Payment, Sale, SaleItem};

const SALE_COLUMNS: &str =
    "id, client_id, user_id, payment_method, total_cents, amount_paid_cents, payment_status, created_at";

const SALE_ITEM_COLUMNS: &str =
    "id, sale_id, product_id, name_snapshot, unit_price_cents, quantity, line_total_cents, created_at";

// =============================================================================
// Executor-level queries: clients
// =============================================================================

/// Fetches a client by id.
pub async fn find_client<'e, E>(ex: E, id: &str) -> DbResult<Option<Client>>
where
    E: SqliteExecutor<'e>,
{
    let client = sqlx::query_as::<_, Client>(
        "SELECT id, name, credit_limit_cents, created_at FROM clients WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?;

    Ok(client)
}

/// Inserts a new client.
pub async fn insert_client<'e, E>(ex: E, client: &Client) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %client.id, name = %client.name, "Inserting client");

    sqlx::query(
        r#"
        INSERT INTO clients (id, name, credit_limit_cents, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&client.id)
    .bind(&client.name)
    .bind(client.credit_limit_cents)
    .bind(client.created_at)
    .execute(ex)
    .await?;

    Ok(())
}

// =============================================================================
// Executor-level queries: sales and items
// =============================================================================

/// Inserts a sale header.
pub async fn insert_sale<'e, E>(ex: E, sale: &Sale) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %sale.id, total = %sale.total_cents, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, client_id, user_id, payment_method,
            total_cents, amount_paid_cents, payment_status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.client_id)
    .bind(&sale.user_id)
    .bind(sale.payment_method)
    .bind(sale.total_cents)
    .bind(sale.amount_paid_cents)
    .bind(sale.payment_status)
    .bind(sale.created_at)
    .execute(ex)
    .await?;

    Ok(())
}

/// Inserts a sale line item.
///
/// ## Snapshot Pattern
/// Product name and unit price are copied into the row so the sale's
/// history survives later catalog edits.
pub async fn insert_sale_item<'e, E>(ex: E, item: &SaleItem) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(sale_id = %item.sale_id, product_id = %item.product_id, "Inserting sale item");

    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id,
            name_snapshot, unit_price_cents, quantity, line_total_cents,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.name_snapshot)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(ex)
    .await?;

    Ok(())
}

/// Fetches a sale by id.
pub async fn find_sale<'e, E>(ex: E, id: &str) -> DbResult<Option<Sale>>
where
    E: SqliteExecutor<'e>,
{
    let sale = sqlx::query_as::<_, Sale>(&format!(
        "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(ex)
    .await?;

    Ok(sale)
}

/// Fetches all items of a sale, in insertion order.
pub async fn find_sale_items<'e, E>(ex: E, sale_id: &str) -> DbResult<Vec<SaleItem>>
where
    E: SqliteExecutor<'e>,
{
    let items = sqlx::query_as::<_, SaleItem>(&format!(
        "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY created_at, id"
    ))
    .bind(sale_id)
    .fetch_all(ex)
    .await?;

    Ok(items)
}

// =============================================================================
// Executor-level queries: payments and aggregates
// =============================================================================

/// Records a payment credited to a client's account.
pub async fn insert_payment<'e, E>(ex: E, payment: &Payment) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(client_id = %payment.client_id, amount = %payment.amount_cents, "Recording payment");

    sqlx::query(
        r#"
        INSERT INTO payments (id, client_id, amount_cents, note, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.client_id)
    .bind(payment.amount_cents)
    .bind(&payment.note)
    .bind(payment.created_at)
    .execute(ex)
    .await?;

    Ok(())
}

/// Fetches all payments for a client, oldest first.
pub async fn find_payments_for_client<'e, E>(ex: E, client_id: &str) -> DbResult<Vec<Payment>>
where
    E: SqliteExecutor<'e>,
{
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, client_id, amount_cents, note, created_at
        FROM payments
        WHERE client_id = ?1
        ORDER BY created_at, id
        "#,
    )
    .bind(client_id)
    .fetch_all(ex)
    .await?;

    Ok(payments)
}

/// Total amount ever sold to a client (sum of sale totals).
pub async fn total_sold<'e, E>(ex: E, client_id: &str) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let total: Option<i64> =
        sqlx::query_scalar("SELECT SUM(total_cents) FROM sales WHERE client_id = ?1")
            .bind(client_id)
            .fetch_one(ex)
            .await?;

    Ok(total.unwrap_or(0))
}

/// Total amount a client ever paid (sum of payment amounts).
pub async fn total_paid<'e, E>(ex: E, client_id: &str) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let total: Option<i64> =
        sqlx::query_scalar("SELECT SUM(amount_cents) FROM payments WHERE client_id = ?1")
            .bind(client_id)
            .fetch_one(ex)
            .await?;

    Ok(total.unwrap_or(0))
}

/// Outstanding balance for a client: total sold minus total paid.
///
/// Computed fresh from persisted rows on every call - there is no cached
/// balance anywhere in the system. Reading it has no side effects.
pub async fn client_balance(conn: &mut SqliteConnection, client_id: &str) -> DbResult<i64> {
    let sold = total_sold(&mut *conn, client_id).await?;
    let paid = total_paid(&mut *conn, client_id).await?;

    Ok(sold - paid)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Gets a client by ID.
    pub async fn get_client(&self, id: &str) -> DbResult<Option<Client>> {
        find_client(&self.pool, id).await
    }

    /// Inserts a new client.
    pub async fn insert_client(&self, client: &Client) -> DbResult<()> {
        insert_client(&self.pool, client).await
    }

    /// Gets a sale by ID.
    pub async fn get_sale(&self, id: &str) -> DbResult<Option<Sale>> {
        find_sale(&self.pool, id).await
    }

    /// Gets all items for a sale.
    pub async fn get_sale_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        find_sale_items(&self.pool, sale_id).await
    }

    /// Gets all payments for a client.
    pub async fn get_payments_for_client(&self, client_id: &str) -> DbResult<Vec<Payment>> {
        find_payments_for_client(&self.pool, client_id).await
    }

    /// Records a manual account payment.
    pub async fn insert_payment(&self, payment: &Payment) -> DbResult<()> {
        insert_payment(&self.pool, payment).await
    }

    /// Total amount ever sold to a client.
    pub async fn total_sold(&self, client_id: &str) -> DbResult<i64> {
        total_sold(&self.pool, client_id).await
    }

    /// Total amount a client ever paid.
    pub async fn total_paid(&self, client_id: &str) -> DbResult<i64> {
        total_paid(&self.pool, client_id).await
    }

    /// Outstanding balance for a client.
    pub async fn balance(&self, client_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        client_balance(&mut conn, client_id).await
    }
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new payment ID.
pub fn generate_payment_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new client ID.
pub fn generate_client_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
