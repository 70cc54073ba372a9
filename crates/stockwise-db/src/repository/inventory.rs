//! # Inventory Ledger
//!
//! Stock mutations expressed as single conditional statements.
//!
//! Every function here takes a `&mut SqliteConnection` so the same
//! statement can run on its own or inside a larger unit of work (order
//! placement, refund with restock).
//!
//! ## Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Why one statement, not read-then-write               │
//! │                                                                         │
//! │  ❌ check-then-act (oversell race)                                     │
//! │     Task A: SELECT quantity → 10, ok for 6                             │
//! │     Task B: SELECT quantity → 10, ok for 6                             │
//! │     Task A: UPDATE quantity = quantity - 6   → 4                       │
//! │     Task B: UPDATE quantity = quantity - 6   → -2  ✗                   │
//! │                                                                         │
//! │  ✅ conditional update                                                  │
//! │     UPDATE products SET quantity = quantity - ?q                       │
//! │     WHERE id = ? AND quantity >= ?q                                    │
//! │                                                                         │
//! │     rows_affected == 1  → stock taken                                  │
//! │     rows_affected == 0  → InsufficientStock (authoritative)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use stockwise_core::CoreError;
use tracing::{debug, warn};

use crate::error::DbResult;

/// Takes `quantity` units from a product's stock if, and only if, at least
/// that many are on hand.
///
/// Zero affected rows is reported as [`CoreError::InsufficientStock`]; the
/// row is left untouched.
pub async fn decrement(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET
            quantity = quantity - ?2,
            updated_at = ?3
        WHERE id = ?1 AND quantity >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        warn!(product_id, quantity, "Conditional stock decrement refused");
        return Err(CoreError::InsufficientStock {
            product_id,
            requested: quantity,
        }
        .into());
    }

    debug!(product_id, quantity, "Stock decremented");
    Ok(())
}

/// Adds `quantity` units back to a product's stock.
///
/// The addition is conditional on the result still fitting in an `i64`.
/// SQLite would otherwise widen the column to REAL and the row would stop
/// decoding. Zero affected rows is [`CoreError::ProductNotFound`] or
/// [`CoreError::StockLimitExceeded`], decided by a follow-up existence read.
pub async fn restock(conn: &mut SqliteConnection, product_id: i64, quantity: i64) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET
            quantity = quantity + ?2,
            updated_at = ?3
        WHERE id = ?1 AND quantity <= ?4 - ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .bind(i64::MAX)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)")
            .bind(product_id)
            .fetch_one(&mut *conn)
            .await?;

        if found == 0 {
            return Err(CoreError::ProductNotFound(product_id).into());
        }

        warn!(product_id, quantity, "Restock refused, stock would overflow");
        return Err(CoreError::StockLimitExceeded {
            product_id,
            added: quantity,
        }
        .into());
    }

    debug!(product_id, quantity, "Stock restocked");
    Ok(())
}

/// Returns every line item's quantity of an order to its product.
///
/// Fails with [`CoreError::StockLimitExceeded`] before writing anything if
/// any product would overflow. Returns the number of product rows touched.
pub async fn restore_order_lines(conn: &mut SqliteConnection, order_id: i64) -> DbResult<u64> {
    let overflow: Option<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT d.product_id, SUM(d.quantity)
        FROM order_details d
        JOIN products p ON p.id = d.product_id
        WHERE d.order_id = ?1
        GROUP BY d.product_id, p.quantity
        HAVING p.quantity > ?2 - SUM(d.quantity)
        LIMIT 1
        "#,
    )
    .bind(order_id)
    .bind(i64::MAX)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((product_id, added)) = overflow {
        warn!(order_id, product_id, added, "Line restock refused, stock would overflow");
        return Err(CoreError::StockLimitExceeded { product_id, added }.into());
    }

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET
            quantity = quantity + (
                SELECT COALESCE(SUM(d.quantity), 0)
                FROM order_details d
                WHERE d.order_id = ?1 AND d.product_id = products.id
            ),
            updated_at = ?2
        WHERE id IN (SELECT product_id FROM order_details WHERE order_id = ?1)
        "#,
    )
    .bind(order_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    debug!(order_id, products = result.rows_affected(), "Order lines restocked");
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use crate::DbError;

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let seeded = fixtures::seeded(10).await;
        let mut conn = seeded.db.pool().acquire().await.unwrap();

        decrement(&mut conn, seeded.product_id, 10).await.unwrap();

        let err = decrement(&mut conn, seeded.product_id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::InsufficientStock { requested: 1, .. })
        ));

        let product = seeded
            .db
            .products()
            .get(seeded.product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.quantity, 0);
    }

    #[tokio::test]
    async fn test_decrement_missing_product() {
        let seeded = fixtures::seeded(10).await;
        let mut conn = seeded.db.pool().acquire().await.unwrap();

        let err = decrement(&mut conn, 4242, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InsufficientStock { .. })));
    }

    #[tokio::test]
    async fn test_restock_missing_product() {
        let seeded = fixtures::seeded(10).await;
        let mut conn = seeded.db.pool().acquire().await.unwrap();

        restock(&mut conn, seeded.product_id, 5).await.unwrap();
        let err = restock(&mut conn, 4242, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::ProductNotFound(4242))));
    }

    #[tokio::test]
    async fn test_restock_cannot_overflow_stock() {
        let seeded = fixtures::seeded(10).await;
        let mut conn = seeded.db.pool().acquire().await.unwrap();

        let err = restock(&mut conn, seeded.product_id, i64::MAX).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::StockLimitExceeded { added: i64::MAX, .. })
        ));
        drop(conn);

        // Row still decodes and is unchanged
        let products = seeded.db.products();
        assert_eq!(products.get(seeded.product_id).await.unwrap().unwrap().quantity, 10);

        // Filling up to the limit exactly is allowed
        products.restock(seeded.product_id, i64::MAX - 10).await.unwrap();
        let product = products.get(seeded.product_id).await.unwrap().unwrap();
        assert_eq!(product.quantity, i64::MAX);

        let err = products.restock(seeded.product_id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::StockLimitExceeded { .. })));
    }
}
