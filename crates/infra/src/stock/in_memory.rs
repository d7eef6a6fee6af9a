use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use tracing::{debug, info};

use supplyflow_catalog::UnitRef;
use supplyflow_inventory::{StockError, StockLedger};

/// In-memory stock ledger.
///
/// Each unit's on-hand count is an `AtomicI64`. The map lock is only taken
/// for writing when a unit is registered; reservations run under the read
/// lock and decrement with a compare-and-swap loop, so concurrent callers on
/// the same unit never lose an update and never go below zero.
#[derive(Debug, Default)]
pub struct InMemoryStockLedger {
    units: RwLock<HashMap<UnitRef, AtomicI64>>,
}

impl InMemoryStockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `unit` with `on_hand`. A unit that is already tracked
    /// keeps its count; after that only reserve, release and restock move it.
    /// Returns the on-hand count the unit ends up with.
    pub fn track(&self, unit: UnitRef, on_hand: i64) -> Result<i64, StockError> {
        if on_hand < 0 {
            return Err(StockError::InvalidQuantity(on_hand));
        }

        let mut units = self
            .units
            .write()
            .map_err(|_| StockError::Unavailable("lock poisoned".to_string()))?;

        if let Some(cell) = units.get(&unit) {
            let current = cell.load(Ordering::Acquire);
            debug!(unit = %unit, on_hand = current, ignored = on_hand, "unit already tracked");
            return Ok(current);
        }

        units.insert(unit, AtomicI64::new(on_hand));
        info!(unit = %unit, on_hand, "stock tracking started");
        Ok(on_hand)
    }

    pub fn is_tracked(&self, unit: &UnitRef) -> bool {
        self.units
            .read()
            .map(|units| units.contains_key(unit))
            .unwrap_or(false)
    }

    fn with_cell<R>(
        &self,
        unit: &UnitRef,
        f: impl FnOnce(&AtomicI64) -> Result<R, StockError>,
    ) -> Result<R, StockError> {
        let units = self
            .units
            .read()
            .map_err(|_| StockError::Unavailable("lock poisoned".to_string()))?;

        let cell = units.get(unit).ok_or(StockError::UnknownUnit(*unit))?;
        f(cell)
    }

    fn increment(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError> {
        if qty < 1 {
            return Err(StockError::InvalidQuantity(qty));
        }

        self.with_cell(unit, |cell| {
            cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(qty)
            })
            .map(|previous| previous + qty)
            .map_err(|_| StockError::InvalidQuantity(qty))
        })
    }
}

impl StockLedger for InMemoryStockLedger {
    fn available(&self, unit: &UnitRef) -> Result<i64, StockError> {
        self.with_cell(unit, |cell| Ok(cell.load(Ordering::Acquire)))
    }

    fn reserve(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError> {
        if qty < 1 {
            return Err(StockError::InvalidQuantity(qty));
        }

        let remaining = self.with_cell(unit, |cell| {
            let mut current = cell.load(Ordering::Acquire);
            loop {
                if qty > current {
                    return Err(StockError::InsufficientStock {
                        unit: *unit,
                        available: current,
                        requested: qty,
                    });
                }

                match cell.compare_exchange_weak(
                    current,
                    current - qty,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return Ok(current - qty),
                    Err(actual) => current = actual,
                }
            }
        })?;

        debug!(unit = %unit, qty, remaining, "stock reserved");
        Ok(remaining)
    }

    fn release(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError> {
        let on_hand = self.increment(unit, qty)?;
        debug!(unit = %unit, qty, on_hand, "stock released");
        Ok(on_hand)
    }

    fn restock(&self, unit: &UnitRef, qty: i64) -> Result<i64, StockError> {
        let on_hand = self.increment(unit, qty)?;
        info!(unit = %unit, qty, on_hand, "stock received");
        Ok(on_hand)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use supplyflow_catalog::ProductId;
    use supplyflow_core::AggregateId;
    use supplyflow_inventory::StockLevel;

    use super::*;

    fn test_unit() -> UnitRef {
        UnitRef::product(ProductId::new(AggregateId::new()))
    }

    fn ledger_with(on_hand: i64) -> (InMemoryStockLedger, UnitRef) {
        let ledger = InMemoryStockLedger::new();
        let unit = test_unit();
        ledger.track(unit, on_hand).unwrap();
        (ledger, unit)
    }

    #[test]
    fn reserve_decrements_and_reports_remaining() {
        let (ledger, unit) = ledger_with(5);
        assert_eq!(ledger.reserve(&unit, 3).unwrap(), 2);
        assert_eq!(ledger.available(&unit).unwrap(), 2);
    }

    #[test]
    fn reserve_more_than_available_fails_without_mutation() {
        let (ledger, unit) = ledger_with(2);
        let err = ledger.reserve(&unit, 3).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                unit,
                available: 2,
                requested: 3
            }
        );
        assert_eq!(ledger.available(&unit).unwrap(), 2);
    }

    #[test]
    fn unknown_unit_is_reported() {
        let ledger = InMemoryStockLedger::new();
        let unit = test_unit();
        assert_eq!(ledger.available(&unit), Err(StockError::UnknownUnit(unit)));
        assert!(!ledger.is_tracked(&unit));
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        let (ledger, unit) = ledger_with(5);
        assert_eq!(ledger.reserve(&unit, 0), Err(StockError::InvalidQuantity(0)));
        assert_eq!(ledger.release(&unit, -1), Err(StockError::InvalidQuantity(-1)));
        assert!(ledger.track(test_unit(), -3).is_err());
    }

    #[test]
    fn tracking_again_never_overwrites_the_count() {
        let (ledger, unit) = ledger_with(10);
        ledger.reserve(&unit, 3).unwrap();

        assert_eq!(ledger.track(unit, 10).unwrap(), 7);
        ledger.release(&unit, 3).unwrap();
        assert_eq!(ledger.available(&unit).unwrap(), 10);
    }

    #[test]
    fn restock_and_check_availability() {
        let (ledger, unit) = ledger_with(0);
        let check = ledger.check_availability(&unit, 1).unwrap();
        assert!(!check.is_satisfied());
        assert_eq!(check.level(), StockLevel::OutOfStock);

        ledger.restock(&unit, 8).unwrap();
        let check = ledger.check_availability(&unit, 1).unwrap();
        assert!(check.is_satisfied());
        assert_eq!(check.level(), StockLevel::LowStock);
    }

    #[test]
    fn concurrent_reservations_never_oversell() {
        let (ledger, unit) = ledger_with(50);
        let ledger = Arc::new(ledger);
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let ledger = ledger.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let mut won = 0;
                    for _ in 0..10 {
                        if ledger.reserve(&unit, 1).is_ok() {
                            won += 1;
                        }
                    }
                    won
                })
            })
            .collect();

        let reserved: i64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(reserved, 50);
        assert_eq!(ledger.available(&unit).unwrap(), 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Reserve(i64),
            Release(i64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (1i64..20).prop_map(Op::Reserve),
                (1i64..20).prop_map(Op::Release),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: on-hand never goes negative, whatever the sequence.
            #[test]
            fn available_never_negative(start in 0i64..30, ops in prop::collection::vec(op(), 0..60)) {
                let (ledger, unit) = ledger_with(start);
                let mut model = start;

                for op in ops {
                    match op {
                        Op::Reserve(q) => {
                            let result = ledger.reserve(&unit, q);
                            if q <= model {
                                model -= q;
                                prop_assert_eq!(result, Ok(model));
                            } else {
                                prop_assert!(result.is_err());
                            }
                        }
                        Op::Release(q) => {
                            model += q;
                            prop_assert_eq!(ledger.release(&unit, q), Ok(model));
                        }
                    }
                    prop_assert!(ledger.available(&unit).unwrap() >= 0);
                }
            }

            /// Property: reserve then release restores the prior count.
            #[test]
            fn reserve_release_round_trip(start in 1i64..1_000, pick in 1i64..1_000) {
                let (ledger, unit) = ledger_with(start);
                let qty = pick.min(start);

                ledger.reserve(&unit, qty).unwrap();
                ledger.release(&unit, qty).unwrap();

                prop_assert_eq!(ledger.available(&unit).unwrap(), start);
            }
        }
    }
}
