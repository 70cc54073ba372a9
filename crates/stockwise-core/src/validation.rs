//! # Validation Module
//!
//! Input validation for the order operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (pure)                                           │
//! │  ├── Required fields present                                           │
//! │  ├── quantity > 0, price ≥ 0, status well formed                       │
//! │  └── Produces NewOrder / OrderStatus values                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Reference validation (stockwise-db, existence reads)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0), CHECK (price_cents >= 0)                   │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::Money;
use crate::status::OrderStatus;
use crate::types::NewOrder;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Unwraps an optional input field, naming it when absent.
pub fn require<T>(value: Option<T>, field: &str) -> ValidationResult<T> {
    value.ok_or_else(|| ValidationError::required(field))
}

/// Validates an order quantity: whole units, strictly positive.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a unit price. Zero is allowed (free items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates the raw fields of a place-order request.
///
/// Identifiers are not range-checked here: zero and negative ids are
/// well-formed and simply fail reference validation later.
pub fn validate_new_order(
    customer_id: Option<i64>,
    product_id: Option<i64>,
    quantity: Option<i64>,
    unit_price: Option<Money>,
) -> ValidationResult<NewOrder> {
    let customer_id = require(customer_id, "customer_id")?;
    let product_id = require(product_id, "product_id")?;
    let quantity = require(quantity, "quantity")?;
    let unit_price = require(unit_price, "price")?;

    validate_quantity(quantity)?;
    validate_price(unit_price)?;

    Ok(NewOrder {
        customer_id,
        product_id,
        quantity,
        unit_price,
    })
}

/// Validates a status string supplied by a caller.
pub fn validate_status(raw: Option<&str>) -> ValidationResult<OrderStatus> {
    OrderStatus::parse(require(raw, "status")?)
}

/// Validates an optional result limit. Absent means unlimited.
pub fn validate_limit(limit: Option<u32>) -> ValidationResult<Option<u32>> {
    match limit {
        Some(0) => Err(ValidationError::MustBePositive {
            field: "limit".to_string(),
        }),
        other => Ok(other),
    }
}

/// Validates an inclusive creation-date range.
pub fn validate_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvertedRange {
            field: "date range".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
