//! # stockwise-orders: Order Service for Stockwise
//!
//! The operations callers invoke to place, update and refund orders. Raw
//! requests are validated here, the stock-changing work runs inside one
//! database transaction in `stockwise-db`, and every failure comes back as a
//! serializable [`ServiceError`].
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Order Request Flow                              │
//! │                                                                         │
//! │  caller (handler, CLI, seed)                                           │
//! │       │  PlaceOrderRequest / UpdateStatusRequest / RefundRequest       │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                        OrderService                              │  │
//! │  │  #[instrument] span per operation                                │  │
//! │  │  validation ─► existence ─► availability ─► unit of work         │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ stockwise-core │  │  stockwise-db  │  │  ServiceError          │    │
//! │  │ validation,    │  │  repositories, │  │  code + message,       │    │
//! │  │ status guards  │  │  transactions  │  │  storage detail logged │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Service error type and codes
//! - [`orders`] - `OrderService` and its request types
//! - [`telemetry`] - Tracing subscriber setup
//!
//! ## Usage
//! ```rust,ignore
//! use stockwise_db::Database;
//! use stockwise_orders::{init_tracing, AppConfig, OrderService, PlaceOrderRequest};
//!
//! let config = AppConfig::load()?;
//! init_tracing(&config);
//!
//! let db = Database::new(config.db_config()).await?;
//! let service = OrderService::from_config(db, &config);
//!
//! let placed = service
//!     .place_order(&PlaceOrderRequest {
//!         customer_id: Some(1),
//!         product_id: Some(5),
//!         quantity: Some(3),
//!         price: Some("9.99".into()),
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod orders;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError, Environment};
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use orders::{OrderService, PlaceOrderRequest, PriceInput, RefundRequest, UpdateStatusRequest};
pub use telemetry::init_tracing;
