use serde::{Deserialize, Serialize};
use thiserror::Error;

use supplyflow_auth::Role;
use supplyflow_catalog::UnitRef;
use supplyflow_core::DomainError;

use crate::OrderStatus;

/// A cart line that no longer fits the stock on hand at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineShortfall {
    pub unit: UnitRef,
    pub available: i64,
    pub requested: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The target status is not reachable from the current one (including
    /// every attempt to leave a terminal status).
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// The transition exists but belongs to a different role.
    #[error("role '{role}' may not move an order from {from} to {to}")]
    Forbidden {
        role: Role,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Placement-time re-check failed for one or more lines.
    #[error("inventory exceeded for {} line(s)", .0.len())]
    InventoryExceeded(Vec<LineShortfall>),

    #[error("cannot place an order from an empty cart")]
    EmptyCart,

    #[error("validation failed: {0}")]
    Validation(String),
}

impl From<DomainError> for OrderError {
    fn from(value: DomainError) -> Self {
        OrderError::Validation(value.detail().to_string())
    }
}
