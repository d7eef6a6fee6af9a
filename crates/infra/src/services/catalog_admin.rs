use supplyflow_auth::{Actor, Permission, authorize};
use supplyflow_catalog::{SellableUnit, UnitRef};
use supplyflow_inventory::{StockError, StockLedger};

use super::ServiceError;
use crate::{InMemoryCatalog, InMemoryStockLedger};

/// Administrative catalog and stock maintenance.
pub struct CatalogAdmin<C, L> {
    catalog: C,
    ledger: L,
}

impl<C, L> CatalogAdmin<C, L>
where
    C: AsRef<InMemoryCatalog>,
    L: AsRef<InMemoryStockLedger>,
{
    pub fn new(catalog: C, ledger: L) -> Self {
        Self { catalog, ledger }
    }

    /// List a unit or change its price.
    ///
    /// `on_hand` only seeds stock for a unit the ledger has never seen; an
    /// existing unit keeps its count. Returns the unit and its on-hand count.
    pub fn register_unit(
        &self,
        actor: &Actor,
        unit: SellableUnit,
        on_hand: i64,
    ) -> Result<(UnitRef, i64), ServiceError> {
        authorize(actor, &Permission::CATALOG_MANAGE)?;
        if on_hand < 0 {
            return Err(StockError::InvalidQuantity(on_hand).into());
        }

        let unit_ref = unit.unit();
        self.catalog.as_ref().register(unit)?;
        let on_hand = self.ledger.as_ref().track(unit_ref, on_hand)?;
        Ok((unit_ref, on_hand))
    }

    /// Goods received. Returns the new on-hand count.
    pub fn restock(&self, actor: &Actor, unit: UnitRef, qty: i64) -> Result<i64, ServiceError> {
        authorize(actor, &Permission::CATALOG_MANAGE)?;
        Ok(self.ledger.as_ref().restock(&unit, qty)?)
    }
}
