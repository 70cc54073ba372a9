//! # Domain Types
//!
//! Core domain types used throughout Stockwise.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderDetail   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  supplier_id    │   │  customer_id    │   │  order_id (FK)  │       │
//! │  │  price_cents    │   │  status         │   │  price_cents    │       │
//! │  │  quantity ≥ 0   │   │  timestamps     │   │  name snapshot  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Customer     │   │    Supplier     │   referenced by id only     │
//! │  └─────────────────┘   └─────────────────┘   from the order subsystem  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are the store's integer row ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::status::OrderStatus;

// =============================================================================
// Product
// =============================================================================

/// A product tracked in inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub supplier_id: i64,
    pub name: String,
    pub description: String,
    /// Unit price in cents (never negative).
    pub price_cents: i64,
    /// Stock on hand (never negative).
    pub quantity: i64,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Fields needed to create a product row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub supplier_id: i64,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub quantity: i64,
    pub category: String,
}

// =============================================================================
// Customer / Supplier
// =============================================================================

/// Fields needed to create a customer row (seeding and tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
}

// =============================================================================
// Order
// =============================================================================

/// An order header. Created only together with its line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price in cents at time of order (frozen).
    pub price_cents: i64,
    /// Product name at time of order (frozen).
    pub product_name_snapshot: String,
}

impl OrderDetail {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// `None` if the total overflows.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// A validated request to place a single-line order.
///
/// Only [`crate::validation::validate_new_order`] builds one from raw input,
/// so holders can rely on `quantity > 0` and a non-negative price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub customer_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Identifiers generated by a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order_id: i64,
    pub order_detail_id: i64,
}

/// Result of the refund operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundOutcome {
    /// The order moved into the refunded state.
    Refunded,
    /// The order was already refunded; nothing was written.
    AlreadyRefunded,
}

// =============================================================================
// Reports
// =============================================================================

/// Revenue of one product across its non-refunded line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductSales {
    pub product_id: i64,
    pub name: String,
    pub units_sold: i64,
    /// Sum of `price_cents * quantity` over the line items.
    pub total_sales_cents: i64,
}

impl ProductSales {
    #[inline]
    pub fn total_sales(&self) -> Money {
        Money::from_cents(self.total_sales_cents)
    }
}

/// Average units per line item of one product, used to plan restocking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductDemand {
    pub product_id: i64,
    pub name: String,
    pub line_count: i64,
    pub average_quantity: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_uses_snapshot_price() {
        let detail = OrderDetail {
            id: 1,
            order_id: 1,
            product_id: 5,
            quantity: 3,
            price_cents: 999,
            product_name_snapshot: "Widget".to_string(),
        };
        assert_eq!(detail.line_total(), Some(Money::from_cents(2997)));
    }

    #[test]
    fn test_product_price() {
        let now = Utc::now();
        let product = Product {
            id: 5,
            supplier_id: 1,
            name: "Widget".to_string(),
            description: String::new(),
            price_cents: 999,
            quantity: 10,
            category: "tools".to_string(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(product.price().to_string(), "9.99");
    }

    #[test]
    fn test_refund_outcome_serde() {
        let json = serde_json::to_string(&RefundOutcome::AlreadyRefunded).unwrap();
        assert_eq!(json, "\"already_refunded\"");
    }
}
