//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Reference validation (`exists`)
//! - Availability check (`is_available`), a fast path only
//! - Stock ledger entry points (`decrement_stock`, `restock`)
//!
//! ## Availability vs Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  is_available(5, 3)          decrement_stock(5, 3)                     │
//! │  ─────────────────           ─────────────────────                     │
//! │  SELECT quantity             UPDATE … WHERE quantity >= 3              │
//! │  read-only, may be stale     authoritative                             │
//! │  early rejection             the only gate that counts                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use stockwise_core::validation::{validate_price, validate_quantity};
use stockwise_core::{CoreError, NewProduct, Product, ValidationError};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{inventory, limit_param};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// if !repo.is_available(5, 3).await? {
///     // reject early
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Whether a product row with this id exists.
    ///
    /// Zero and negative ids are well-formed and simply report `false`.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        debug!(product_id = id, found = found != 0, "Checked product reference");
        Ok(found != 0)
    }

    /// Whether current stock covers `quantity` whole units.
    ///
    /// An absent product reports `false` rather than an error. The answer
    /// may be stale by the time the caller acts on it; the conditional
    /// decrement is what actually guards stock.
    pub async fn is_available(&self, id: i64, quantity: i64) -> DbResult<bool> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        debug!(product_id = id, ?stock, requested = quantity, "Checked availability");
        Ok(stock.map(|q| q >= quantity).unwrap_or(false))
    }

    /// Gets a product by its id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, supplier_id, name, description, price_cents,
                quantity, category, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products with stock on hand, sorted by name.
    pub async fn list_in_stock(&self, limit: Option<u32>) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, supplier_id, name, description, price_cents,
                quantity, category, created_at, updated_at
            FROM products
            WHERE quantity > 0
            ORDER BY name, id
            LIMIT ?1
            "#,
        )
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product and returns its generated id.
    ///
    /// ## Returns
    /// * `Err(DbError::Rule)` - negative price or stock
    /// * `Err(DbError::Constraint)` - supplier doesn't exist
    pub async fn insert(&self, product: &NewProduct) -> DbResult<i64> {
        debug!(name = %product.name, supplier_id = product.supplier_id, "Inserting product");

        validate_price(product.price).map_err(CoreError::from)?;
        if product.quantity < 0 {
            let err = ValidationError::Negative {
                field: "quantity".to_string(),
            };
            return Err(CoreError::from(err).into());
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                supplier_id, name, description, price_cents,
                quantity, category, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(product.supplier_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(product.quantity)
        .bind(&product.category)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Takes stock as its own unit of work.
    ///
    /// See [`inventory::decrement`]; order placement runs the same statement
    /// inside its own transaction instead.
    pub async fn decrement_stock(&self, id: i64, quantity: i64) -> DbResult<()> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        let mut conn = self.pool.acquire().await?;
        inventory::decrement(&mut conn, id, quantity).await
    }

    /// Returns stock to a product.
    pub async fn restock(&self, id: i64, quantity: i64) -> DbResult<()> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        let mut conn = self.pool.acquire().await?;
        inventory::restock(&mut conn, id, quantity).await
    }

    /// Counts total products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use crate::error::ConstraintKind;
    use crate::DbError;
    use stockwise_core::Money;

    #[tokio::test]
    async fn test_is_available_boundaries() {
        let seeded = fixtures::seeded(10).await;
        let products = seeded.db.products();

        assert!(products.is_available(seeded.product_id, 10).await.unwrap());
        assert!(!products.is_available(seeded.product_id, 11).await.unwrap());
        // Absent product is "not available", not an error
        assert!(!products.is_available(999, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_odd_ids() {
        let seeded = fixtures::seeded(10).await;
        let products = seeded.db.products();

        assert!(products.exists(seeded.product_id).await.unwrap());
        assert!(!products.exists(0).await.unwrap());
        assert!(!products.exists(-1).await.unwrap());
    }

    #[tokio::test]
    async fn test_decrement_and_restock() {
        let seeded = fixtures::seeded(10).await;
        let products = seeded.db.products();

        products.decrement_stock(seeded.product_id, 4).await.unwrap();
        products.restock(seeded.product_id, 1).await.unwrap();

        let product = products.get(seeded.product_id).await.unwrap().unwrap();
        assert_eq!(product.quantity, 7);

        let err = products.decrement_stock(seeded.product_id, 8).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InsufficientStock { .. })));

        let err = products.decrement_stock(seeded.product_id, 0).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_supplier() {
        let seeded = fixtures::seeded(10).await;

        let err = seeded
            .db
            .products()
            .insert(&NewProduct {
                supplier_id: 9999,
                name: "Orphan".to_string(),
                description: String::new(),
                price: Money::from_cents(100),
                quantity: 1,
                category: String::new(),
            })
            .await
            .unwrap_err();

        assert!(err.is_constraint(ConstraintKind::ForeignKey));
    }

    #[tokio::test]
    async fn test_list_in_stock() {
        let seeded = fixtures::seeded(0).await;
        let products = seeded.db.products();

        assert!(products.list_in_stock(None).await.unwrap().is_empty());

        products.restock(seeded.product_id, 2).await.unwrap();
        let listed = products.list_in_stock(Some(5)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].price(), Money::from_cents(999));
        assert_eq!(products.count().await.unwrap(), 1);
    }
}
