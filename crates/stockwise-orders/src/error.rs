//! # Service Error Type
//!
//! Unified error type returned by every `OrderService` operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockwise                              │
//! │                                                                         │
//! │  ValidationError ──────────────────────────► VALIDATION_ERROR          │
//! │                                                                         │
//! │  CoreError                                                              │
//! │  ├── *NotFound ────────────────────────────► NOT_FOUND                 │
//! │  ├── InsufficientStock ────────────────────► INSUFFICIENT_STOCK        │
//! │  ├── OrderRefunded / RefundRequires… ──────► ILLEGAL_TRANSITION        │
//! │  └── Validation / StockLimitExceeded ──────► VALIDATION_ERROR          │
//! │                                                                         │
//! │  DbError                                                                │
//! │  ├── Rule(CoreError) ──────────────────────► (as above)                │
//! │  └── everything else ── tracing::error! ───► DATABASE_ERROR            │
//! │                          (real cause logged,  generic message out)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here retries. Caller-fixable errors carry the precise reason;
//! infrastructure errors are opaque to the caller and logged inside the
//! operation's span, which carries the operation name and identifiers.

use serde::Serialize;
use stockwise_core::{CoreError, ValidationError};
use stockwise_db::DbError;

/// Error returned from order operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for product 5: requested 11"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Customer, product or order does not exist (404)
    NotFound,

    /// Not enough stock (409)
    InsufficientStock,

    /// Status change not allowed by the order state machine (409)
    IllegalTransition,

    /// Database operation failed (500)
    DatabaseError,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    /// Whether the caller can fix this by changing its request.
    pub fn is_caller_fixable(&self) -> bool {
        self.code != ErrorCode::DatabaseError
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::validation(err.to_string())
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::CustomerNotFound(_)
            | CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::OrderRefunded { .. } | CoreError::RefundRequiresRefundOperation { .. } => {
                ErrorCode::IllegalTransition
            }
            CoreError::Validation(_) | CoreError::StockLimitExceeded { .. } => {
                ErrorCode::ValidationError
            }
        };

        match err {
            CoreError::Validation(e) => ServiceError::new(code, e.to_string()),
            other => ServiceError::new(code, other.to_string()),
        }
    }
}

/// Converts database errors to service errors.
///
/// Only [`DbError::Rule`] keeps its detail; everything else is logged and
/// replaced by a generic message.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        if let DbError::Rule(rule) = err {
            return rule.into();
        }

        let message = match &err {
            DbError::ConnectionFailed(_) => "Database connection failed",
            DbError::MigrationFailed(_) => "Database migration failed",
            DbError::TransactionFailed(_) => "Database transaction failed",
            DbError::PoolExhausted => "Database is busy, try again later",
            DbError::Rule(_) | DbError::Constraint { .. } | DbError::QueryFailed(_) => {
                "Database operation failed"
            }
        };

        tracing::error!(error = %err, "Storage failure");
        ServiceError::new(ErrorCode::DatabaseError, message)
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
