use std::sync::Arc;

use thiserror::Error;

use supplyflow_catalog::UnitRef;

use crate::StockLevel;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// Reservation-time failure: not enough on hand.
    #[error("insufficient stock for {unit}: available {available}, requested {requested}")]
    InsufficientStock {
        unit: UnitRef,
        available: i64,
        requested: i64,
    },

    #[error("unknown sellable unit {0}")]
    UnknownUnit(UnitRef),

    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(i64),

    /// Backing storage failure; not a business outcome.
    #[error("stock ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result of an advisory availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityCheck {
    pub available: i64,
    pub requested: i64,
}

impl AvailabilityCheck {
    pub fn is_satisfied(&self) -> bool {
        self.requested <= self.available
    }

    pub fn level(&self) -> StockLevel {
        StockLevel::classify(self.available)
    }
}

/// Authoritative per-unit stock.
///
/// Implementations must make `reserve` a single atomic conditional decrement
/// per unit: concurrent callers never observe a lost update and the on-hand
/// count never drops below zero.
pub trait StockLedger: Send + Sync {
    /// Current on-hand quantity; never negative.
    fn available(&self, unit: &UnitRef) -> Result<i64, StockError>;

    /// Decrement by `qty` if and only if `qty <= available`. Returns what is
    /// left on hand afterwards.
    fn reserve(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError>;

    /// Unconditionally give `qty` back. The ledger does not track what was
    /// reserved; callers must only release what they previously reserved.
    fn release(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError>;

    /// Administrative restock (goods received).
    fn restock(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError>;

    /// Advisory, read-only check. The answer may be stale by the time the
    /// caller acts on it.
    fn check_availability(
        &self,
        unit: &UnitRef,
        requested: i64,
    ) -> Result<AvailabilityCheck, StockError> {
        Ok(AvailabilityCheck {
            available: self.available(unit)?,
            requested,
        })
    }
}

impl<L> StockLedger for Arc<L>
where
    L: StockLedger + ?Sized,
{
    fn available(&self, unit: &UnitRef) -> Result<i64, StockError> {
        (**self).available(unit)
    }

    fn reserve(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError> {
        (**self).reserve(unit, qty)
    }

    fn release(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError> {
        (**self).release(unit, qty)
    }

    fn restock(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError> {
        (**self).restock(unit, qty)
    }

    fn check_availability(
        &self,
        unit: &UnitRef,
        requested: i64,
    ) -> Result<AvailabilityCheck, StockError> {
        (**self).check_availability(unit, requested)
    }
}
