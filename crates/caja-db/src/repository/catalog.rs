//! # Catalog Store
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Lookup by id, by barcode, by item number (exact)
//! - Guarded stock decrement (the engine's optimistic re-validation)
//! - Insert, for seeding and catalog-management callers
//!
//! ## Guarded Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Decrement Strategy                             │
//! │                                                                         │
//! │  ❌ WRONG: check-then-set with an absolute value                        │
//! │     stock = SELECT stock_quantity ...   (another sale commits here!)   │
//! │     UPDATE products SET stock_quantity = stock - 3                     │
//! │                                                                         │
//! │  ✅ CORRECT: guarded delta update, re-validated at write time          │
//! │     UPDATE products                                                    │
//! │     SET stock_quantity = stock_quantity - 3                            │
//! │     WHERE id = ? AND stock_quantity >= 3                               │
//! │                                                                         │
//! │  Zero rows affected means the earlier advisory check went stale -      │
//! │  the engine aborts and rolls back the whole sale.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caja_core::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, barcode, item_number, price_cents, stock_quantity, created_at, updated_at";

// =============================================================================
// Executor-level queries
// =============================================================================
// These take any SqliteExecutor so the sale engine can run them inside its
// transaction (`&mut *tx`) while the repository struct runs them on the pool.

/// Fetches a product by its id.
pub async fn find_by_id<'e, E>(ex: E, id: &str) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(ex)
    .await?;

    Ok(product)
}

/// Fetches a product by exact barcode match.
pub async fn find_by_barcode<'e, E>(ex: E, barcode: &str) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1"
    ))
    .bind(barcode)
    .fetch_optional(ex)
    .await?;

    Ok(product)
}

/// Fetches all products with an exact item-number match.
///
/// Item numbers carry no uniqueness guarantee, so this returns a Vec.
/// Ordered by id so callers that pick "first match" are deterministic.
pub async fn find_all_by_item_number<'e, E>(ex: E, item_number: &str) -> DbResult<Vec<Product>>
where
    E: SqliteExecutor<'e>,
{
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE item_number = ?1 ORDER BY id"
    ))
    .bind(item_number)
    .fetch_all(ex)
    .await?;

    Ok(products)
}

/// Decrements stock, re-validating availability at write time.
///
/// ## Returns
/// * `Ok(true)` - stock was sufficient and has been decremented
/// * `Ok(false)` - stock went stale (or was never sufficient); nothing changed
///
/// The `WHERE stock_quantity >= ?` guard is what makes two concurrent sales
/// against the same product safe: both may pass the advisory check, only
/// one can win the decrement.
pub async fn decrement_stock_checked<'e, E>(ex: E, id: &str, quantity: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, quantity = %quantity, "Decrementing stock (checked)");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?2,
            updated_at = ?3
        WHERE id = ?1 AND stock_quantity >= ?2
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(now)
    .execute(ex)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Decrements stock unconditionally (oversell policy).
///
/// May drive `stock_quantity` negative. Errors only if the product row
/// does not exist.
pub async fn decrement_stock_unchecked<'e, E>(ex: E, id: &str, quantity: i64) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, quantity = %quantity, "Decrementing stock (unchecked)");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?2,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(now)
    .execute(ex)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

/// Inserts a new product.
///
/// ## Returns
/// * `Err(DbError::UniqueViolation)` - barcode already exists
pub async fn insert<'e, E>(ex: E, product: &Product) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %product.id, name = %product.name, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, name, barcode, item_number,
            price_cents, stock_quantity,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.barcode)
    .bind(&product.item_number)
    .bind(product.price_cents)
    .bind(product.stock_quantity)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(ex)
    .await?;

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = CatalogRepository::new(pool);
/// let product = catalog.get_by_barcode("7791234567890").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        find_by_id(&self.pool, id).await
    }

    /// Gets a product by exact barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        find_by_barcode(&self.pool, barcode).await
    }

    /// Gets all products with an exact item-number match.
    pub async fn get_all_by_item_number(&self, item_number: &str) -> DbResult<Vec<Product>> {
        find_all_by_item_number(&self.pool, item_number).await
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        insert(&self.pool, product).await
    }

    /// Counts products (for diagnostics and the seed tool).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    fn product(name: &str, barcode: Option<&str>, item_number: Option<&str>, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            name: name.to_string(),
            barcode: barcode.map(str::to_string),
            item_number: item_number.map(str::to_string),
            price_cents: 1000,
            stock_quantity: stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let p = product("Yerba 1kg", Some("7791234567890"), Some("779"), 10);
        catalog.insert(&p).await.unwrap();

        let by_id = catalog.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Yerba 1kg");

        let by_barcode = catalog
            .get_by_barcode("7791234567890")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_barcode.id, p.id);

        let by_item = catalog.get_all_by_item_number("779").await.unwrap();
        assert_eq!(by_item.len(), 1);

        assert!(catalog.get_by_barcode("0000000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        catalog
            .insert(&product("A", Some("7791111111111"), None, 1))
            .await
            .unwrap();
        let err = catalog
            .insert(&product("B", Some("7791111111111"), None, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_checked_decrement_guards_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let p = product("Azucar", None, None, 3);
        catalog.insert(&p).await.unwrap();

        assert!(decrement_stock_checked(db.pool(), &p.id, 2).await.unwrap());
        // Only 1 left - a request for 2 must not go through.
        assert!(!decrement_stock_checked(db.pool(), &p.id, 2).await.unwrap());

        let after = catalog.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 1);
    }

    #[tokio::test]
    async fn test_unchecked_decrement_allows_negative() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let p = product("Harina", None, None, 1);
        catalog.insert(&p).await.unwrap();

        decrement_stock_unchecked(db.pool(), &p.id, 3).await.unwrap();

        let after = catalog.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, -2);
    }
}
