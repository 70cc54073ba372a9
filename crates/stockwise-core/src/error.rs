//! Domain errors.
//!
//! ```text
//! ValidationError ──► CoreError ──► DbError (stockwise-db) ──► ServiceError (stockwise-orders)
//!  bad input          missing row,   storage failure, or a      code + message
//!                     stock, status  rule hit inside a tx       for the caller
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Reference and business-rule errors.
///
/// None of these are infrastructure failures: each one means the caller
/// asked for something the current state of the store does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Customer identifier does not resolve to a row.
    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),

    /// Product identifier does not resolve to a row.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Order identifier does not resolve to a row.
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    /// Not enough stock to fulfil the requested quantity.
    ///
    /// ## When This Occurs
    /// ```text
    /// Place order (qty: 11)
    ///      │
    ///      ▼
    /// Fast path: stock=10 < 11 ──► InsufficientStock
    ///      │
    ///      ▼ (or, when a concurrent order won the race)
    /// UPDATE … WHERE quantity >= 11 affects 0 rows ──► InsufficientStock
    /// ```
    #[error("Insufficient stock for product {product_id}: requested {requested}")]
    InsufficientStock { product_id: i64, requested: i64 },

    /// Returning `added` units would push the stock count past what the
    /// store can hold.
    #[error("Stock for product {product_id} cannot grow by {added}")]
    StockLimitExceeded { product_id: i64, added: i64 },

    /// The order is refunded; its status can no longer change.
    #[error("Order {order_id} is refunded, its status cannot be changed")]
    OrderRefunded { order_id: i64 },

    /// The generic status update was asked to move an order into the
    /// terminal state.
    #[error("Order {order_id} cannot be set to refunded by a status update, use the refund operation")]
    RefundRequiresRefundOperation { order_id: i64 },

    /// Input rejected before touching the store.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Problems with the request itself. Always fixable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Zero or below where only positive values make sense.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Unparseable text, such as a price with three decimals.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A range whose start lies after its end.
    #[error("{field} start must not be after its end")]
    InvertedRange { field: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
