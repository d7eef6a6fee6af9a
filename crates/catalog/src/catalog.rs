use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{SellableUnit, UnitRef};

/// Read access to the catalog.
///
/// Prices read here are captured into order items at placement time; later
/// catalog edits never reach an existing order.
pub trait Catalog: Send + Sync {
    fn unit(&self, unit: &UnitRef) -> Option<SellableUnit>;

    fn current_price(&self, unit: &UnitRef) -> Option<Decimal> {
        self.unit(unit).map(|u| u.effective_price())
    }
}

impl<C> Catalog for Arc<C>
where
    C: Catalog + ?Sized,
{
    fn unit(&self, unit: &UnitRef) -> Option<SellableUnit> {
        (**self).unit(unit)
    }

    fn current_price(&self, unit: &UnitRef) -> Option<Decimal> {
        (**self).current_price(unit)
    }
}
