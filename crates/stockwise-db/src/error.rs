//! # Database Error Types
//!
//! ```text
//! sqlx::Error ──────────────┐
//! MigrateError ─────────────┤
//!                           ▼
//! CoreError (rule) ──► DbError ──► ServiceError (stockwise-orders)
//! ```
//!
//! [`DbError::Rule`] is the only variant a caller can act on. It carries the
//! business rule a unit of work rejected, e.g. the conditional decrement that
//! found too little stock. Everything else is infrastructure.

use sqlx::error::ErrorKind;
use stockwise_core::CoreError;
use thiserror::Error;

/// Which schema constraint refused a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    /// `CHECK (quantity >= 0)` and friends
    Check,
}

#[derive(Debug, Error)]
pub enum DbError {
    /// A business rule rejected the operation inside a unit of work.
    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error("{kind:?} constraint failed: {message}")]
    Constraint { kind: ConstraintKind, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No pooled connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DbError {
    /// Returns the business rule if this error is one.
    pub fn as_rule(&self) -> Option<&CoreError> {
        match self {
            DbError::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn is_constraint(&self, kind: ConstraintKind) -> bool {
        matches!(self, DbError::Constraint { kind: k, .. } if *k == kind)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let kind = match db_err.kind() {
                    ErrorKind::UniqueViolation => ConstraintKind::Unique,
                    ErrorKind::ForeignKeyViolation => ConstraintKind::ForeignKey,
                    ErrorKind::NotNullViolation => ConstraintKind::NotNull,
                    ErrorKind::CheckViolation => ConstraintKind::Check,
                    _ => return DbError::QueryFailed(db_err.message().to_string()),
                };
                DbError::Constraint {
                    kind,
                    message: db_err.message().to_string(),
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),
            other => DbError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[test]
    fn test_rule_is_transparent() {
        let err: DbError = CoreError::InsufficientStock {
            product_id: 5,
            requested: 11,
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 5: requested 11"
        );
        assert!(err.as_rule().is_some());
    }

    #[tokio::test]
    async fn test_constraint_kind_classified() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err: DbError = sqlx::query(
            "INSERT INTO suppliers (name, contact_name, contact_email, contact_phone, created_at, updated_at)
             VALUES (NULL, '', '', '', '', '')",
        )
        .execute(db.pool())
        .await
        .unwrap_err()
        .into();

        assert!(err.is_constraint(ConstraintKind::NotNull));
        assert!(err.as_rule().is_none());
    }

    #[test]
    fn test_pool_timeout() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));
    }
}
