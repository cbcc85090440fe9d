//! # Credit Policy
//!
//! Decides whether a proposed new debt is admissible for a client.
//!
//! ## Decision Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  proposed_new_debt <= 0              →  admit (nothing goes on account)│
//! │  client.credit_limit is None         →  admit (no limit enforced)      │
//! │  balance + new_debt <= credit_limit  →  admit                          │
//! │  balance + new_debt >  credit_limit  →  CreditLimitExceeded            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The balance is recomputed fresh from the ledger at every evaluation.
//! Running inside the sale's transaction means the figure the policy sees
//! is the figure the commit is based on.

use sqlx::SqliteConnection;
use tracing::debug;

use caja_core::{Client, CoreError, Money};
use caja_db::repository::ledger;

use crate::error::EngineResult;

/// Enforces client credit limits against the ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreditPolicy;

impl CreditPolicy {
    pub fn new() -> Self {
        CreditPolicy
    }

    /// Admits or rejects a proposed new debt for a client.
    ///
    /// Fails with `CreditLimitExceeded` carrying the limit, the current
    /// balance, and the proposed debt; otherwise returns unit.
    pub async fn admit(
        &self,
        conn: &mut SqliteConnection,
        client: &Client,
        proposed_new_debt: Money,
    ) -> EngineResult<()> {
        // Nothing new goes on account
        if !proposed_new_debt.is_positive() {
            return Ok(());
        }

        // No limit configured for this client
        let Some(limit) = client.credit_limit() else {
            return Ok(());
        };

        let balance = Money::from_cents(ledger::client_balance(conn, &client.id).await?);

        debug!(
            client_id = %client.id,
            balance = %balance,
            new_debt = %proposed_new_debt,
            limit = %limit,
            "Evaluating credit policy"
        );

        if balance + proposed_new_debt > limit {
            return Err(CoreError::CreditLimitExceeded {
                limit_cents: limit.cents(),
                balance_cents: balance.cents(),
                proposed_debt_cents: proposed_new_debt.cents(),
            }
            .into());
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use caja_core::{PaymentMethod, PaymentStatus, Sale};
    use caja_db::repository::ledger::{generate_client_id, generate_sale_id};
    use caja_db::{Database, DbConfig};
    use chrono::Utc;

    async fn client_with_balance(
        db: &Database,
        limit_cents: Option<i64>,
        balance_cents: i64,
    ) -> Client {
        let client = Client {
            id: generate_client_id(),
            name: "Cliente de prueba".to_string(),
            credit_limit_cents: limit_cents,
            created_at: Utc::now(),
        };
        db.ledger().insert_client(&client).await.unwrap();

        if balance_cents > 0 {
            let sale = Sale {
                id: generate_sale_id(),
                client_id: Some(client.id.clone()),
                user_id: "operator-1".to_string(),
                payment_method: PaymentMethod::Cash,
                total_cents: balance_cents,
                amount_paid_cents: 0,
                payment_status: PaymentStatus::Pending,
                created_at: Utc::now(),
            };
            ledger::insert_sale(db.pool(), &sale).await.unwrap();
        }

        client
    }

    async fn admit(db: &Database, client: &Client, debt_cents: i64) -> EngineResult<()> {
        let mut conn = db.pool().acquire().await.unwrap();
        CreditPolicy::new()
            .admit(&mut conn, client, Money::from_cents(debt_cents))
            .await
    }

    #[tokio::test]
    async fn test_rejects_debt_over_limit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client = client_with_balance(&db, Some(5000), 4500).await;

        // 4500 + 1000 = 5500 > 5000
        let err = admit(&db, &client, 1000).await.unwrap_err();
        match err {
            EngineError::Domain(CoreError::CreditLimitExceeded {
                limit_cents,
                balance_cents,
                proposed_debt_cents,
            }) => {
                assert_eq!(limit_cents, 5000);
                assert_eq!(balance_cents, 4500);
                assert_eq!(proposed_debt_cents, 1000);
            }
            other => panic!("expected CreditLimitExceeded, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_admits_debt_within_limit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client = client_with_balance(&db, Some(5000), 4500).await;

        // 4500 + 400 = 4900 <= 5000
        admit(&db, &client, 400).await.unwrap();

        // Exactly at the limit is still admissible
        admit(&db, &client, 500).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_limit_admits_anything() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client = client_with_balance(&db, None, 1_000_000).await;

        admit(&db, &client, 50_000_000).await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_debt_trivially_admits() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // Already over the limit, but the new sale adds no debt.
        let client = client_with_balance(&db, Some(1000), 9000).await;

        admit(&db, &client, 0).await.unwrap();
        admit(&db, &client, -500).await.unwrap();
    }
}
