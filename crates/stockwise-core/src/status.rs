//! # Order Status State Machine
//!
//! ## States and Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Order Status State Machine                          │
//! │                                                                         │
//! │        order committer                                                 │
//! │              │                                                          │
//! │              ▼                                                          │
//! │   ┌─────────────────────┐   generic update    ┌──────────────────────┐ │
//! │   │ Active("pending")   │ ──────────────────► │ Active("shipped")    │ │
//! │   │                     │ ◄────────────────── │ Active(<any text>)   │ │
//! │   └──────────┬──────────┘                     └──────────┬───────────┘ │
//! │              │                                           │             │
//! │              │ refund operation ONLY                     │             │
//! │              ▼                                           ▼             │
//! │   ┌─────────────────────────────────────────────────────────────────┐  │
//! │   │                     Refunded (terminal)                         │  │
//! │   │         stored as "refunded", "refund" accepted as alias        │  │
//! │   └─────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │   Active ──generic──► Refunded      FORBIDDEN                          │
//! │   Refunded ──any──► *               FORBIDDEN                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{DEFAULT_ORDER_STATUS, MAX_STATUS_LEN, REFUNDED_STATUS, REFUND_ALIAS};

/// The status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Any caller-defined, non-terminal status ("pending", "shipped", ...).
    Active(String),
    /// Terminal state, reachable only through the refund operation.
    Refunded,
}

impl OrderStatus {
    /// Parses caller input into a status.
    ///
    /// Input is trimmed. Both terminal spellings are recognised regardless of
    /// case; active statuses keep their text as given.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::required("status"));
        }

        if trimmed.chars().count() > MAX_STATUS_LEN {
            return Err(ValidationError::TooLong {
                field: "status".to_string(),
                max: MAX_STATUS_LEN,
            });
        }

        if is_terminal_text(trimmed) {
            return Ok(OrderStatus::Refunded);
        }

        Ok(OrderStatus::Active(trimmed.to_string()))
    }

    /// Reads a status column value. Never fails: whatever the store holds is
    /// either terminal or an active status.
    pub fn from_stored(stored: &str) -> Self {
        if is_terminal_text(stored.trim()) {
            OrderStatus::Refunded
        } else {
            OrderStatus::Active(stored.to_string())
        }
    }

    /// Status given to newly committed orders.
    pub fn initial() -> Self {
        OrderStatus::Active(DEFAULT_ORDER_STATUS.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Active(s) => s.as_str(),
            OrderStatus::Refunded => REFUNDED_STATUS,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Refunded)
    }
}

fn is_terminal_text(s: &str) -> bool {
    s.eq_ignore_ascii_case(REFUNDED_STATUS) || s.eq_ignore_ascii_case(REFUND_ALIAS)
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        OrderStatus::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Transition Guard
// =============================================================================

/// Checks a transition requested through the generic status-update path.
///
/// ## Rules
/// 1. A refunded order never changes status.
/// 2. The generic path never moves an order into the refunded state.
/// 3. Everything else is permitted, including re-setting the same status.
pub fn ensure_generic_transition(
    order_id: i64,
    current: &OrderStatus,
    target: &OrderStatus,
) -> CoreResult<()> {
    if current.is_terminal() {
        return Err(CoreError::OrderRefunded { order_id });
    }
    ensure_generic_target(order_id, target)
}

/// Rejects a terminal target before the current status is even known.
pub fn ensure_generic_target(order_id: i64, target: &OrderStatus) -> CoreResult<()> {
    if target.is_terminal() {
        return Err(CoreError::RefundRequiresRefundOperation { order_id });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
