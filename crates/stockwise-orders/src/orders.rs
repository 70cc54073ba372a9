//! # Order Service
//!
//! The operations callers invoke. Each one validates its raw request, runs
//! the component pipeline against the store and reports failures as
//! [`ServiceError`].
//!
//! ## Place Order Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PlaceOrderRequest (raw, all fields optional)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. validate_new_order ─────────────► VALIDATION_ERROR                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. customers().exists                                                 │
//! │     products().exists   ────────────► NOT_FOUND                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. products().is_available ────────► INSUFFICIENT_STOCK (early)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. orders().place  (one transaction: order + line item + decrement)   │
//! │       │             conditional decrement is the real gate ──►         │
//! │       │             INSUFFICIENT_STOCK, nothing committed              │
//! │       ▼                                                                 │
//! │  PlacedOrder { order_id, order_detail_id }                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 2 and 3 are early rejections only. Between them and step 4 another
//! request may change the store; step 4 re-checks everything it depends on.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use stockwise_core::validation::{
    require, validate_date_range, validate_limit, validate_new_order, validate_status,
};
use stockwise_core::{
    CoreError, Money, Order, OrderDetail, PlacedOrder, ProductDemand, ProductSales, RefundOutcome,
    ValidationError,
};
use stockwise_db::Database;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::error::ServiceResult;

// =============================================================================
// Requests
// =============================================================================

/// Raw place-order input. Every field is optional so a missing one is
/// reported as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: Option<i64>,
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
    pub price: Option<PriceInput>,
}

/// Unit price as sent by the caller: decimal text (`"9.99"`) or a JSON
/// number (`9.99`). Both go through the same exact decimal parser, so a
/// number with three decimals is a validation error, not a rounding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(f64),
}

impl PriceInput {
    pub fn to_money(&self) -> Result<Money, ValidationError> {
        match self {
            PriceInput::Text(text) => text.parse(),
            // Display is the shortest text that reads back as the same f64
            PriceInput::Number(number) => number.to_string().parse(),
        }
    }
}

impl From<&str> for PriceInput {
    fn from(text: &str) -> Self {
        PriceInput::Text(text.to_string())
    }
}

impl From<Money> for PriceInput {
    fn from(money: Money) -> Self {
        PriceInput::Text(money.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub order_id: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefundRequest {
    pub order_id: Option<i64>,
}

// =============================================================================
// Service
// =============================================================================

/// Order operations over a shared [`Database`].
///
/// Cheap to clone; clones share the pool and hold no other state, so each
/// request can run on its own task.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    restock_on_refund: bool,
}

impl OrderService {
    /// Creates a service with the default refund policy (stock not restored).
    pub fn new(db: Database) -> Self {
        OrderService {
            db,
            restock_on_refund: false,
        }
    }

    /// Creates a service using the policies in `config`.
    pub fn from_config(db: Database, config: &AppConfig) -> Self {
        OrderService::new(db).with_restock_on_refund(config.restock_on_refund)
    }

    /// Sets whether refunds return line quantities to stock.
    pub fn with_restock_on_refund(mut self, restock: bool) -> Self {
        self.restock_on_refund = restock;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Places a single-line order.
    #[instrument(
        name = "place_order",
        skip_all,
        fields(
            customer_id = ?request.customer_id,
            product_id = ?request.product_id,
            quantity = ?request.quantity
        )
    )]
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> ServiceResult<PlacedOrder> {
        let unit_price = request.price.as_ref().map(PriceInput::to_money).transpose()?;

        let order = validate_new_order(
            request.customer_id,
            request.product_id,
            request.quantity,
            unit_price,
        )?;

        if !self.db.customers().exists(order.customer_id).await? {
            warn!("Rejected order: unknown customer");
            return Err(CoreError::CustomerNotFound(order.customer_id).into());
        }

        let products = self.db.products();
        if !products.exists(order.product_id).await? {
            warn!("Rejected order: unknown product");
            return Err(CoreError::ProductNotFound(order.product_id).into());
        }

        if !products.is_available(order.product_id, order.quantity).await? {
            warn!("Rejected order: insufficient stock");
            return Err(CoreError::InsufficientStock {
                product_id: order.product_id,
                requested: order.quantity,
            }
            .into());
        }

        let placed = self.db.orders().place(&order).await?;
        info!(
            order_id = placed.order_id,
            order_detail_id = placed.order_detail_id,
            "Order accepted"
        );
        Ok(placed)
    }

    /// Moves an order to another active status.
    #[instrument(name = "update_order_status", skip_all, fields(order_id = ?request.order_id))]
    pub async fn update_status(&self, request: &UpdateStatusRequest) -> ServiceResult<Order> {
        let order_id = require(request.order_id, "order_id")?;
        let target = validate_status(request.status.as_deref())?;

        self.db.orders().update_status(order_id, &target).await?;

        self.fetch_order(order_id).await
    }

    /// Refunds an order. The only path into the refunded state.
    #[instrument(name = "refund_order", skip_all, fields(order_id = ?request.order_id))]
    pub async fn refund(&self, request: &RefundRequest) -> ServiceResult<RefundOutcome> {
        let order_id = require(request.order_id, "order_id")?;

        let outcome = self
            .db
            .orders()
            .refund(order_id, self.restock_on_refund)
            .await?;

        Ok(outcome)
    }

    // =========================================================================
    // Look-ups
    // =========================================================================

    #[instrument(name = "get_order", skip(self))]
    pub async fn get_order(&self, order_id: i64) -> ServiceResult<Order> {
        self.fetch_order(order_id).await
    }

    /// Orders of a customer, newest first.
    #[instrument(name = "customer_orders", skip(self))]
    pub async fn customer_orders(
        &self,
        customer_id: i64,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<Order>> {
        let limit = validate_limit(limit)?;

        if !self.db.customers().exists(customer_id).await? {
            return Err(CoreError::CustomerNotFound(customer_id).into());
        }

        Ok(self.db.orders().for_customer(customer_id, limit).await?)
    }

    /// Orders currently in `status`. Either terminal spelling finds
    /// refunded orders.
    #[instrument(name = "orders_by_status", skip(self))]
    pub async fn orders_by_status(
        &self,
        status: &str,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<Order>> {
        let status = validate_status(Some(status))?;
        let limit = validate_limit(limit)?;

        Ok(self.db.orders().by_status(&status, limit).await?)
    }

    /// Orders created within `[start, end]`.
    #[instrument(name = "orders_between", skip(self))]
    pub async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<Order>> {
        validate_date_range(start, end)?;
        let limit = validate_limit(limit)?;

        Ok(self.db.orders().created_between(start, end, limit).await?)
    }

    /// Line items of an order.
    #[instrument(name = "order_details", skip(self))]
    pub async fn order_details(
        &self,
        order_id: i64,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<OrderDetail>> {
        let limit = validate_limit(limit)?;

        if !self.db.orders().exists(order_id).await? {
            return Err(CoreError::OrderNotFound(order_id).into());
        }

        Ok(self.db.orders().details(order_id, limit).await?)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Units and revenue per product, best seller first. Refunded orders
    /// are left out.
    #[instrument(name = "sales_report", skip(self))]
    pub async fn sales_report(&self, limit: Option<u32>) -> ServiceResult<Vec<ProductSales>> {
        let limit = validate_limit(limit)?;

        Ok(self.db.orders().sales_report(limit).await?)
    }

    /// Average units per line item, by product.
    #[instrument(name = "demand_report", skip(self))]
    pub async fn demand_report(&self, limit: Option<u32>) -> ServiceResult<Vec<ProductDemand>> {
        let limit = validate_limit(limit)?;

        Ok(self.db.orders().demand_report(limit).await?)
    }

    async fn fetch_order(&self, order_id: i64) -> ServiceResult<Order> {
        self.db
            .orders()
            .get(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id).into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
