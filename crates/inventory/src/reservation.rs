//! All-or-nothing reservation of several units.

use tracing::{debug, warn};

use supplyflow_catalog::UnitRef;

use crate::{StockError, StockLedger};

/// Stock taken by one successful [`reserve_all`] call.
///
/// Holding a `Reservation` means the quantities have already left the
/// ledger. Call [`Reservation::rollback`] if whatever the stock was taken for
/// could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an unused reservation keeps stock out of the ledger"]
pub struct Reservation {
    taken: Vec<(UnitRef, i64)>,
}

impl Reservation {
    pub fn lines(&self) -> &[(UnitRef, i64)] {
        &self.taken
    }

    pub fn total_units(&self) -> i64 {
        self.taken.iter().map(|(_, q)| q).sum()
    }

    /// Return every reserved quantity to the ledger, newest first.
    pub fn rollback<L: StockLedger + ?Sized>(self, ledger: &L) {
        release_taken(ledger, &self.taken);
    }
}

/// Reserve every `(unit, qty)` or none of them.
///
/// Reservations already taken in this call are released again if a later
/// line fails, so a failed call leaves the ledger as it found it.
pub fn reserve_all<L>(ledger: &L, lines: &[(UnitRef, i64)]) -> Result<Reservation, StockError>
where
    L: StockLedger + ?Sized,
{
    let mut taken: Vec<(UnitRef, i64)> = Vec::with_capacity(lines.len());

    for (unit, qty) in lines {
        match ledger.reserve(unit, *qty) {
            Ok(remaining) => {
                debug!(unit = %unit, qty, remaining, "reserved");
                taken.push((*unit, *qty));
            }
            Err(err) => {
                if !taken.is_empty() {
                    warn!(unit = %unit, error = %err, rolled_back = taken.len(), "reservation failed; rolling back");
                }
                release_taken(ledger, &taken);
                return Err(err);
            }
        }
    }

    Ok(Reservation { taken })
}

fn release_taken<L: StockLedger + ?Sized>(ledger: &L, taken: &[(UnitRef, i64)]) {
    for (unit, qty) in taken.iter().rev() {
        if let Err(err) = ledger.release(unit, *qty) {
            // Nothing sensible to do beyond recording it: the unit was
            // reservable a moment ago, so this is a backend failure.
            warn!(unit = %unit, qty, error = %err, "failed to release reserved stock");
        }
    }
}
