//! In-memory catalog adapter.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::info;

use supplyflow_catalog::{Catalog, SellableUnit, UnitRef};

use crate::StoreError;

/// Sellable units keyed by `(product, variant)`.
///
/// Registering a unit that already exists replaces it, which is how price
/// edits are modelled. Orders placed earlier keep the price they captured.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    units: RwLock<HashMap<UnitRef, SellableUnit>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, unit: SellableUnit) -> Result<(), StoreError> {
        let mut units = self
            .units
            .write()
            .map_err(|_| StoreError::Unavailable("catalog lock poisoned".to_string()))?;

        info!(
            unit = %unit.unit(),
            name = unit.name(),
            price = %unit.effective_price(),
            "sellable unit registered"
        );
        units.insert(unit.unit(), unit);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.read().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Catalog for InMemoryCatalog {
    fn unit(&self, unit: &UnitRef) -> Option<SellableUnit> {
        self.units.read().ok()?.get(unit).cloned()
    }
}
