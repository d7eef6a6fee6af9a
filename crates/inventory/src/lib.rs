//! Inventory: the authoritative on-hand count per sellable unit.
//!
//! Two distinct operations live here on purpose:
//! - [`StockLedger::check_availability`] is an *advisory* read that may be
//!   stale by the time the caller acts on it (cart editing).
//! - [`StockLedger::reserve`] is the *atomic* conditional decrement used at
//!   order placement; it can never drive stock negative.

pub mod ledger;
pub mod level;
pub mod reservation;

pub use ledger::{AvailabilityCheck, StockError, StockLedger};
pub use level::{LOW_STOCK_THRESHOLD, StockLevel};
pub use reservation::{Reservation, reserve_all};
