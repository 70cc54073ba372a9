//! # Supplier Repository

use chrono::Utc;
use sqlx::SqlitePool;
use stockwise_core::NewSupplier;
use tracing::debug;

use crate::error::DbResult;

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = ?1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(found != 0)
    }

    /// Inserts a supplier and returns its generated id.
    pub async fn insert(&self, supplier: &NewSupplier) -> DbResult<i64> {
        debug!(name = %supplier.name, "Inserting supplier");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (name, contact_name, contact_email, contact_phone, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.contact_email)
        .bind(&supplier.contact_phone)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
