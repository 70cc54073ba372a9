//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Units of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  place(&NewOrder)                                                       │
//! │  ┌───────────────────────────── BEGIN ─────────────────────────────┐   │
//! │  │ 1. INSERT orders (status = 'pending')         → order_id        │   │
//! │  │ 2. INSERT order_details SELECT … FROM products → detail_id       │   │
//! │  │      0 rows → ProductNotFound                                    │   │
//! │  │ 3. UPDATE products … WHERE quantity >= q                         │   │
//! │  │      0 rows → InsufficientStock                                  │   │
//! │  └──────────── COMMIT on success, ROLLBACK on any error ───────────┘   │
//! │                                                                         │
//! │  update_status(id, target)                                              │
//! │  ┌───────────────────────────── BEGIN ─────────────────────────────┐   │
//! │  │ UPDATE orders SET status … WHERE id = ? AND status not terminal │   │
//! │  │      0 rows → SELECT status → OrderNotFound | OrderRefunded      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  refund(id, restock)                                                    │
//! │  ┌───────────────────────────── BEGIN ─────────────────────────────┐   │
//! │  │ UPDATE orders SET status = 'refunded' … WHERE not terminal      │   │
//! │  │      0 rows → SELECT status → OrderNotFound | AlreadyRefunded    │   │
//! │  │ restock? → inventory::restore_order_lines                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  sales_report / demand_report: read-only aggregates over line items    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first statement of every unit is a write, so the transaction holds
//! SQLite's write lock from its first step and never has to upgrade a read
//! snapshot under contention.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use stockwise_core::status::{ensure_generic_target, ensure_generic_transition};
use stockwise_core::{
    CoreError, NewOrder, Order, OrderDetail, OrderStatus, PlacedOrder, ProductDemand,
    ProductSales, RefundOutcome, REFUNDED_STATUS,
};
use tracing::{debug, info, warn};

use crate::error::{ConstraintKind, DbError, DbResult};
use crate::repository::{inventory, limit_param};

/// Terminal spellings as stored, compared after `lower(trim(status))`.
const TERMINAL_SQL: &str = "('refunded', 'refund')";

/// Row shape of the `orders` table; `status` is decoded separately.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            customer_id: row.customer_id,
            status: OrderStatus::from_stored(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for order database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = OrderRepository::new(pool);
///
/// let placed = repo.place(&new_order).await?;
/// repo.update_status(placed.order_id, &OrderStatus::parse("shipped")?).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Whether an order row with this id exists.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = ?1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(found != 0)
    }

    /// Gets an order by its id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Orders of a customer, newest first.
    pub async fn for_customer(&self, customer_id: i64, limit: Option<u32>) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, created_at, updated_at
            FROM orders
            WHERE customer_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(customer_id)
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await?;

        debug!(customer_id, count = rows.len(), "Fetched customer orders");
        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Orders currently in `status`, newest first.
    ///
    /// Asking for the terminal status matches both stored spellings.
    pub async fn by_status(&self, status: &OrderStatus, limit: Option<u32>) -> DbResult<Vec<Order>> {
        let rows = match status {
            OrderStatus::Refunded => {
                let sql = format!(
                    r#"
                    SELECT id, customer_id, status, created_at, updated_at
                    FROM orders
                    WHERE lower(trim(status)) IN {TERMINAL_SQL}
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?1
                    "#
                );
                sqlx::query_as::<_, OrderRow>(&sql)
                    .bind(limit_param(limit))
                    .fetch_all(&self.pool)
                    .await?
            }
            OrderStatus::Active(text) => {
                sqlx::query_as::<_, OrderRow>(
                    r#"
                    SELECT id, customer_id, status, created_at, updated_at
                    FROM orders
                    WHERE status = ?1
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?2
                    "#,
                )
                .bind(text)
                .bind(limit_param(limit))
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(status = %status, count = rows.len(), "Fetched orders by status");
        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Orders created within `[start, end]`, oldest first.
    pub async fn created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<u32>,
    ) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, created_at, updated_at
            FROM orders
            WHERE created_at >= ?1 AND created_at <= ?2
            ORDER BY created_at, id
            LIMIT ?3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Line items of an order.
    pub async fn details(&self, order_id: i64, limit: Option<u32>) -> DbResult<Vec<OrderDetail>> {
        let details = sqlx::query_as::<_, OrderDetail>(
            r#"
            SELECT id, order_id, product_id, quantity, price_cents, product_name_snapshot
            FROM order_details
            WHERE order_id = ?1
            ORDER BY id
            LIMIT ?2
            "#,
        )
        .bind(order_id)
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(details)
    }

    /// Counts orders (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Units and revenue per product, best seller first.
    ///
    /// Line items of refunded orders are left out; their revenue was given
    /// back.
    pub async fn sales_report(&self, limit: Option<u32>) -> DbResult<Vec<ProductSales>> {
        let sql = format!(
            r#"
            SELECT
                d.product_id AS product_id,
                p.name AS name,
                SUM(d.quantity) AS units_sold,
                SUM(d.price_cents * d.quantity) AS total_sales_cents
            FROM order_details d
            JOIN orders o ON o.id = d.order_id
            JOIN products p ON p.id = d.product_id
            WHERE lower(trim(o.status)) NOT IN {TERMINAL_SQL}
            GROUP BY d.product_id, p.name
            ORDER BY total_sales_cents DESC, d.product_id
            LIMIT ?1
            "#
        );
        let rows = sqlx::query_as::<_, ProductSales>(&sql)
            .bind(limit_param(limit))
            .fetch_all(&self.pool)
            .await?;

        debug!(products = rows.len(), "Built sales report");
        Ok(rows)
    }

    /// Average units per line item for every product that has been ordered.
    ///
    /// Refunded orders still count: they show demand, whatever happened to
    /// the sale afterwards.
    pub async fn demand_report(&self, limit: Option<u32>) -> DbResult<Vec<ProductDemand>> {
        let rows = sqlx::query_as::<_, ProductDemand>(
            r#"
            SELECT
                d.product_id AS product_id,
                p.name AS name,
                COUNT(*) AS line_count,
                AVG(CAST(d.quantity AS REAL)) AS average_quantity
            FROM order_details d
            JOIN products p ON p.id = d.product_id
            GROUP BY d.product_id, p.name
            ORDER BY d.product_id
            LIMIT ?1
            "#,
        )
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await?;

        debug!(products = rows.len(), "Built demand report");
        Ok(rows)
    }

    // =========================================================================
    // Units of Work
    // =========================================================================

    /// Places a single-line order and takes its stock, atomically.
    ///
    /// ## Returns
    /// * `Ok(PlacedOrder)` - order, line item and stock change all committed
    /// * `Err(DbError::Rule(InsufficientStock))` - nothing committed
    /// * `Err(DbError::Rule(ProductNotFound | CustomerNotFound))` - nothing committed
    /// * `Err(_)` - storage failure, nothing committed
    pub async fn place(&self, order: &NewOrder) -> DbResult<PlacedOrder> {
        debug!(
            customer_id = order.customer_id,
            product_id = order.product_id,
            quantity = order.quantity,
            price_cents = order.unit_price.cents(),
            "Placing order"
        );

        let mut tx = self.pool.begin().await?;
        let outcome = place_in(&mut tx, order).await;
        let placed = finish(tx, outcome).await?;

        info!(
            order_id = placed.order_id,
            order_detail_id = placed.order_detail_id,
            product_id = order.product_id,
            quantity = order.quantity,
            "Order placed"
        );
        Ok(placed)
    }

    /// Moves an order to another active status.
    ///
    /// The write is conditional on the stored status not being terminal, so
    /// a concurrent refund can never be overwritten.
    pub async fn update_status(&self, order_id: i64, target: &OrderStatus) -> DbResult<()> {
        ensure_generic_target(order_id, target)?;

        let mut tx = self.pool.begin().await?;
        let outcome = update_status_in(&mut tx, order_id, target).await;
        finish(tx, outcome).await?;

        info!(order_id, status = %target, "Order status updated");
        Ok(())
    }

    /// Moves an order into the refunded state.
    ///
    /// Refunding an order that is already refunded writes nothing and
    /// reports [`RefundOutcome::AlreadyRefunded`]. With `restock` set, every
    /// line item's quantity is returned to its product in the same unit.
    pub async fn refund(&self, order_id: i64, restock: bool) -> DbResult<RefundOutcome> {
        let mut tx = self.pool.begin().await?;
        let outcome = refund_in(&mut tx, order_id, restock).await;
        let outcome = finish(tx, outcome).await?;

        match outcome {
            RefundOutcome::Refunded => info!(order_id, restock, "Order refunded"),
            RefundOutcome::AlreadyRefunded => debug!(order_id, "Order already refunded"),
        }
        Ok(outcome)
    }
}

// =============================================================================
// Unit-of-work bodies
// =============================================================================

/// Commits on `Ok`, rolls back on `Err`. A failed rollback is logged and the
/// original error wins.
async fn finish<T>(tx: Transaction<'_, Sqlite>, outcome: DbResult<T>) -> DbResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

async fn place_in(conn: &mut SqliteConnection, order: &NewOrder) -> DbResult<PlacedOrder> {
    let now = Utc::now();
    let initial = OrderStatus::initial();

    let order_id = sqlx::query(
        r#"
        INSERT INTO orders (customer_id, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?3)
        "#,
    )
    .bind(order.customer_id)
    .bind(initial.as_str())
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        err if err.is_constraint(ConstraintKind::ForeignKey) => {
            CoreError::CustomerNotFound(order.customer_id).into()
        }
        other => other,
    })?
    .last_insert_rowid();

    // Snapshot the product name in the same statement that writes the line item
    let detail = sqlx::query(
        r#"
        INSERT INTO order_details (order_id, product_id, quantity, price_cents, product_name_snapshot)
        SELECT ?1, id, ?3, ?4, name
        FROM products
        WHERE id = ?2
        "#,
    )
    .bind(order_id)
    .bind(order.product_id)
    .bind(order.quantity)
    .bind(order.unit_price.cents())
    .execute(&mut *conn)
    .await?;

    if detail.rows_affected() == 0 {
        return Err(CoreError::ProductNotFound(order.product_id).into());
    }
    let order_detail_id = detail.last_insert_rowid();

    inventory::decrement(&mut *conn, order.product_id, order.quantity).await?;

    Ok(PlacedOrder {
        order_id,
        order_detail_id,
    })
}

async fn update_status_in(
    conn: &mut SqliteConnection,
    order_id: i64,
    target: &OrderStatus,
) -> DbResult<()> {
    let now = Utc::now();

    let sql = format!(
        r#"
        UPDATE orders
        SET status = ?2, updated_at = ?3
        WHERE id = ?1 AND lower(trim(status)) NOT IN {TERMINAL_SQL}
        "#
    );
    let result = sqlx::query(&sql)
        .bind(order_id)
        .bind(target.as_str())
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let stored = current_status(conn, order_id).await?;
    let rule = match stored {
        None => CoreError::OrderNotFound(order_id),
        Some(current) => match ensure_generic_transition(order_id, &current, target) {
            Err(rule) => rule,
            Ok(()) => {
                return Err(DbError::TransactionFailed(format!(
                    "order {order_id} status '{current}' was not updated"
                )))
            }
        },
    };

    warn!(order_id, status = %target, error = %rule, "Status update rejected");
    Err(rule.into())
}

async fn refund_in(
    conn: &mut SqliteConnection,
    order_id: i64,
    restock: bool,
) -> DbResult<RefundOutcome> {
    let now = Utc::now();

    let sql = format!(
        r#"
        UPDATE orders
        SET status = ?2, updated_at = ?3
        WHERE id = ?1 AND lower(trim(status)) NOT IN {TERMINAL_SQL}
        "#
    );
    let result = sqlx::query(&sql)
        .bind(order_id)
        .bind(REFUNDED_STATUS)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return match current_status(conn, order_id).await? {
            None => Err(CoreError::OrderNotFound(order_id).into()),
            Some(_) => Ok(RefundOutcome::AlreadyRefunded),
        };
    }

    if restock {
        inventory::restore_order_lines(&mut *conn, order_id).await?;
    }

    Ok(RefundOutcome::Refunded)
}

async fn current_status(conn: &mut SqliteConnection, order_id: i64) -> DbResult<Option<OrderStatus>> {
    let stored: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(stored.as_deref().map(OrderStatus::from_stored))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{self, Seeded};
    use chrono::Duration;
    use stockwise_core::{Money, NewProduct};

    fn new_order(seeded: &Seeded, quantity: i64) -> NewOrder {
        NewOrder {
            customer_id: seeded.customer_id,
            product_id: seeded.product_id,
            quantity,
            unit_price: Money::from_cents(999),
        }
    }

    async fn stock(seeded: &Seeded) -> i64 {
        seeded
            .db
            .products()
            .get(seeded.product_id)
            .await
            .unwrap()
            .unwrap()
            .quantity
    }

    async fn set_raw_status(seeded: &Seeded, order_id: i64, status: &str) {
        sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(order_id)
            .bind(status)
            .execute(seeded.db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_place_commits_order_line_and_stock() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();

        let placed = orders.place(&new_order(&seeded, 3)).await.unwrap();

        let order = orders.get(placed.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::initial());
        assert_eq!(order.customer_id, seeded.customer_id);

        let details = orders.details(placed.order_id, None).await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].id, placed.order_detail_id);
        assert_eq!(details[0].quantity, 3);
        assert_eq!(details[0].unit_price(), Money::from_cents(999));
        assert_eq!(details[0].product_name_snapshot, "Widget");

        assert_eq!(stock(&seeded).await, 7);
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_nothing_behind() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();

        let err = orders.place(&new_order(&seeded, 11)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::InsufficientStock { requested: 11, .. })
        ));

        assert_eq!(orders.count().await.unwrap(), 0);
        assert_eq!(stock(&seeded).await, 10);
    }

    #[tokio::test]
    async fn test_unknown_references_roll_back() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();

        let mut order = new_order(&seeded, 1);
        order.product_id = 4242;
        let err = orders.place(&order).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::ProductNotFound(4242))));

        let mut order = new_order(&seeded, 1);
        order.customer_id = 4242;
        let err = orders.place(&order).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::CustomerNotFound(4242))));

        assert_eq!(orders.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_line_item_failure_leaves_no_orphan_order() {
        let seeded = fixtures::seeded(10).await;
        sqlx::query(
            r#"
            CREATE TRIGGER fail_line_items BEFORE INSERT ON order_details
            BEGIN
                SELECT RAISE(ABORT, 'injected failure');
            END
            "#,
        )
        .execute(seeded.db.pool())
        .await
        .unwrap();

        let orders = seeded.db.orders();
        let err = orders.place(&new_order(&seeded, 2)).await.unwrap_err();
        assert!(err.as_rule().is_none());

        assert_eq!(orders.count().await.unwrap(), 0);
        assert_eq!(stock(&seeded).await, 10);
    }

    #[tokio::test]
    async fn test_placement_sequence_never_goes_negative() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();

        let mut expected = 10;
        for qty in [4, 7, 3, 1, 5, 2, 1, 9] {
            let result = orders.place(&new_order(&seeded, qty)).await;
            if qty <= expected {
                result.unwrap();
                expected -= qty;
            } else {
                assert!(result.is_err());
            }
            let current = stock(&seeded).await;
            assert_eq!(current, expected);
            assert!(current >= 0);
        }
        assert_eq!(expected, 0);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();
        let placed = orders.place(&new_order(&seeded, 1)).await.unwrap();
        let shipped = OrderStatus::parse("shipped").unwrap();

        orders.update_status(placed.order_id, &shipped).await.unwrap();
        assert_eq!(orders.get(placed.order_id).await.unwrap().unwrap().status, shipped);

        // Generic path cannot refund
        let err = orders
            .update_status(placed.order_id, &OrderStatus::Refunded)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::RefundRequiresRefundOperation { .. })
        ));

        let err = orders.update_status(4242, &shipped).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::OrderNotFound(4242))));
    }

    #[tokio::test]
    async fn test_refunded_is_terminal() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();
        let placed = orders.place(&new_order(&seeded, 1)).await.unwrap();

        assert_eq!(
            orders.refund(placed.order_id, false).await.unwrap(),
            RefundOutcome::Refunded
        );

        for target in ["shipped", "pending", "refunded", "refund"] {
            let target = OrderStatus::parse(target).unwrap();
            let err = orders.update_status(placed.order_id, &target).await.unwrap_err();
            assert!(err.as_rule().is_some());
        }

        let order = orders.get(placed.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
    }

    #[tokio::test]
    async fn test_legacy_refund_spelling_is_terminal() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();
        let placed = orders.place(&new_order(&seeded, 1)).await.unwrap();
        set_raw_status(&seeded, placed.order_id, "refund").await;

        let err = orders
            .update_status(placed.order_id, &OrderStatus::parse("shipped").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::OrderRefunded { .. })));

        assert_eq!(
            orders.refund(placed.order_id, false).await.unwrap(),
            RefundOutcome::AlreadyRefunded
        );

        let refunded = orders.by_status(&OrderStatus::Refunded, None).await.unwrap();
        assert_eq!(refunded.len(), 1);
    }

    #[tokio::test]
    async fn test_refund_outcomes_and_stock_policy() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();

        let first = orders.place(&new_order(&seeded, 3)).await.unwrap();
        let second = orders.place(&new_order(&seeded, 2)).await.unwrap();
        assert_eq!(stock(&seeded).await, 5);

        // Default policy: stock stays where it is
        orders.refund(first.order_id, false).await.unwrap();
        assert_eq!(stock(&seeded).await, 5);

        // Second refund is a no-op even with restock requested
        assert_eq!(
            orders.refund(first.order_id, true).await.unwrap(),
            RefundOutcome::AlreadyRefunded
        );
        assert_eq!(stock(&seeded).await, 5);

        // Restock policy returns the line quantity
        orders.refund(second.order_id, true).await.unwrap();
        assert_eq!(stock(&seeded).await, 7);

        let err = orders.refund(4242, false).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::OrderNotFound(4242))));
    }

    #[tokio::test]
    async fn test_lookups() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();
        let before = Utc::now() - Duration::seconds(1);

        let a = orders.place(&new_order(&seeded, 1)).await.unwrap();
        let b = orders.place(&new_order(&seeded, 1)).await.unwrap();
        let c = orders.place(&new_order(&seeded, 1)).await.unwrap();
        orders
            .update_status(b.order_id, &OrderStatus::parse("shipped").unwrap())
            .await
            .unwrap();

        let mine = orders.for_customer(seeded.customer_id, None).await.unwrap();
        assert_eq!(
            mine.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![c.order_id, b.order_id, a.order_id]
        );
        assert_eq!(orders.for_customer(seeded.customer_id, Some(2)).await.unwrap().len(), 2);
        assert!(orders.for_customer(4242, None).await.unwrap().is_empty());

        let pending = orders.by_status(&OrderStatus::initial(), None).await.unwrap();
        assert_eq!(pending.len(), 2);

        let after = Utc::now() + Duration::seconds(1);
        let ranged = orders.created_between(before, after, None).await.unwrap();
        assert_eq!(ranged.len(), 3);
        assert_eq!(ranged[0].id, a.order_id);
        assert!(orders
            .created_between(after, after + Duration::seconds(5), None)
            .await
            .unwrap()
            .is_empty());

        assert!(orders.exists(a.order_id).await.unwrap());
        assert!(!orders.exists(0).await.unwrap());
    }

    #[tokio::test]
    async fn test_refund_restock_overflow_rolls_back() {
        let seeded = fixtures::seeded(10).await;
        let orders = seeded.db.orders();
        let placed = orders.place(&new_order(&seeded, 3)).await.unwrap();

        // Someone filled the shelf to the limit after the sale
        seeded
            .db
            .products()
            .restock(seeded.product_id, i64::MAX - 7)
            .await
            .unwrap();

        let err = orders.refund(placed.order_id, true).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::StockLimitExceeded { added: 3, .. })
        ));

        // Status write rolled back with the restock
        let order = orders.get(placed.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::initial());
        assert_eq!(stock(&seeded).await, i64::MAX);

        assert_eq!(
            orders.refund(placed.order_id, false).await.unwrap(),
            RefundOutcome::Refunded
        );
    }

    #[tokio::test]
    async fn test_sales_and_demand_reports() {
        let seeded = fixtures::seeded(100).await;
        let orders = seeded.db.orders();

        let supplier_id = seeded
            .db
            .products()
            .get(seeded.product_id)
            .await
            .unwrap()
            .unwrap()
            .supplier_id;
        let gadget = seeded
            .db
            .products()
            .insert(&NewProduct {
                supplier_id,
                name: "Gadget".to_string(),
                description: String::new(),
                price: Money::from_cents(250),
                quantity: 100,
                category: "tools".to_string(),
            })
            .await
            .unwrap();

        assert!(orders.sales_report(None).await.unwrap().is_empty());
        assert!(orders.demand_report(None).await.unwrap().is_empty());

        // Widget: 2 + 4 at 9.99, plus a refunded 5
        orders.place(&new_order(&seeded, 2)).await.unwrap();
        orders.place(&new_order(&seeded, 4)).await.unwrap();
        let refunded = orders.place(&new_order(&seeded, 5)).await.unwrap();
        orders.refund(refunded.order_id, false).await.unwrap();

        // Gadget: 1 line of 3 at a snapshot price of 2.00
        orders
            .place(&NewOrder {
                customer_id: seeded.customer_id,
                product_id: gadget,
                quantity: 3,
                unit_price: Money::from_cents(200),
            })
            .await
            .unwrap();

        let sales = orders.sales_report(None).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].product_id, seeded.product_id);
        assert_eq!(sales[0].name, "Widget");
        assert_eq!(sales[0].units_sold, 6);
        assert_eq!(sales[0].total_sales(), Money::from_cents(5994));
        assert_eq!(sales[1].product_id, gadget);
        assert_eq!(sales[1].total_sales_cents, 600);
        assert_eq!(orders.sales_report(Some(1)).await.unwrap().len(), 1);

        let demand = orders.demand_report(None).await.unwrap();
        assert_eq!(demand.len(), 2);
        assert_eq!(demand[0].product_id, seeded.product_id);
        assert_eq!(demand[0].line_count, 3);
        assert!((demand[0].average_quantity - 11.0 / 3.0).abs() < 1e-9);
        assert_eq!(demand[1].line_count, 1);
        assert!((demand[1].average_quantity - 3.0).abs() < 1e-9);
    }
}
