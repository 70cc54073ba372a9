//! # stockwise-core: Pure Business Logic for Stockwise
//!
//! This crate holds the domain model of the order placement and inventory
//! subsystem as plain types and pure functions. It never touches the store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockwise Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 stockwise-orders (OrderService)                 │   │
//! │  │    place_order, update_status, refund, order look-ups          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ stockwise-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  status   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │OrderStatus│  │   rules   │  │   │
//! │  │   │  Order    │  │           │  │  guard    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockwise-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, units of work                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderDetail, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`status`] - Order status state machine and transition guard
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation for order operations
//!
//! ## Example Usage
//!
//! ```rust
//! use stockwise_core::{Money, OrderStatus};
//!
//! let price: Money = "9.99".parse().unwrap();
//! assert_eq!(price.cents(), 999);
//!
//! // Both spellings name the same terminal state
//! assert!(OrderStatus::parse("refund").unwrap().is_terminal());
//! ```

pub mod error;
pub mod money;
pub mod status;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use status::OrderStatus;
pub use types::*;

/// Status assigned to every order by the order committer.
pub const DEFAULT_ORDER_STATUS: &str = "pending";

/// Canonical stored spelling of the terminal status.
pub const REFUNDED_STATUS: &str = "refunded";

/// Legacy spelling of the terminal status still accepted on input and in
/// stored rows.
pub const REFUND_ALIAS: &str = "refund";

/// Maximum length of a free-form status string.
pub const MAX_STATUS_LEN: usize = 32;
