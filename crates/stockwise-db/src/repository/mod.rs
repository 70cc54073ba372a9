//! # Repository Module
//!
//! Database repository implementations for Stockwise.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Units of Work                       │
//! │                                                                         │
//! │  OrderService                                                          │
//! │       │                                                                 │
//! │       │  db.orders().place(&new_order)                                 │
//! │       ▼                                                                 │
//! │  OrderRepository::place                                                │
//! │  ┌──────────────────────── one transaction ───────────────────────┐   │
//! │  │  INSERT orders                                                  │   │
//! │  │  INSERT order_details … SELECT name FROM products               │   │
//! │  │  inventory::decrement(&mut *tx, …)  ◄── conditional UPDATE     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Existence checks, minimal writes
//! - [`SupplierRepository`](supplier::SupplierRepository) - Existence checks, minimal writes
//! - [`ProductRepository`](product::ProductRepository) - Availability, stock ledger entry points
//! - [`OrderRepository`](order::OrderRepository) - Placement, status updates, refunds, look-ups
//! - [`inventory`] - Connection-level stock mutations shared by the units of work

pub mod customer;
pub mod inventory;
pub mod order;
pub mod product;
pub mod supplier;

/// SQLite treats a negative LIMIT as "no limit".
pub(crate) fn limit_param(limit: Option<u32>) -> i64 {
    limit.map(i64::from).unwrap_or(-1)
}

// =============================================================================
// Test Fixtures
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_param() {
        assert_eq!(limit_param(None), -1);
        assert_eq!(limit_param(Some(20)), 20);
    }
}
