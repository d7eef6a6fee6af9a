use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use supplyflow_auth::{Actor, Permission, authorize};
use supplyflow_cart::CartMutation;
use supplyflow_catalog::{Catalog, UnitRef};
use supplyflow_core::UserId;
use supplyflow_inventory::{StockLedger, StockLevel};

use super::ServiceError;
use crate::cart_store::InMemoryCartStore;

/// One cart line as the buyer sees it, priced at today's catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartViewLine {
    pub unit: UnitRef,
    pub name: Option<String>,
    pub quantity: i64,
    pub unit_price: Option<Decimal>,
    pub line_total: Decimal,
    pub available: i64,
    pub stock_level: StockLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub buyer_id: UserId,
    pub lines: Vec<CartViewLine>,
    pub item_count: i64,
    pub total: Decimal,
}

/// Cart editing with advisory stock checks. Nothing here reserves stock.
pub struct CartService<L, C> {
    carts: Arc<InMemoryCartStore>,
    ledger: L,
    catalog: C,
}

impl<L, C> CartService<L, C>
where
    L: StockLedger,
    C: Catalog,
{
    pub fn new(carts: Arc<InMemoryCartStore>, ledger: L, catalog: C) -> Self {
        Self {
            carts,
            ledger,
            catalog,
        }
    }

    pub fn add(&self, actor: &Actor, unit: UnitRef, qty: i64) -> Result<CartMutation, ServiceError> {
        let buyer = cart_owner(actor)?;
        self.require_listed(&unit)?;

        let mutation = self
            .carts
            .modify(buyer, |cart| cart.add(&self.ledger, unit, qty))??;

        info!(
            buyer = %buyer,
            unit = %unit,
            qty,
            cart_count = mutation.cart_count,
            "cart line added"
        );
        Ok(mutation)
    }

    pub fn update(
        &self,
        actor: &Actor,
        unit: UnitRef,
        new_qty: i64,
    ) -> Result<CartMutation, ServiceError> {
        let buyer = cart_owner(actor)?;
        self.require_listed(&unit)?;

        let mutation = self
            .carts
            .modify(buyer, |cart| cart.update(&self.ledger, unit, new_qty))??;

        info!(
            buyer = %buyer,
            unit = %unit,
            qty = new_qty,
            cart_count = mutation.cart_count,
            "cart line updated"
        );
        Ok(mutation)
    }

    pub fn remove(&self, actor: &Actor, unit: UnitRef) -> Result<CartMutation, ServiceError> {
        let buyer = cart_owner(actor)?;

        let mutation = self
            .carts
            .modify(buyer, |cart| cart.remove(&self.ledger, unit))??;

        info!(buyer = %buyer, unit = %unit, cart_count = mutation.cart_count, "cart line removed");
        Ok(mutation)
    }

    pub fn clear(&self, actor: &Actor) -> Result<i64, ServiceError> {
        let buyer = cart_owner(actor)?;
        let removed = self.carts.clear(buyer)?;
        info!(buyer = %buyer, removed, "cart cleared");
        Ok(removed)
    }

    pub fn view(&self, actor: &Actor) -> Result<CartView, ServiceError> {
        let buyer = cart_owner(actor)?;
        let cart = self.carts.load(buyer)?;

        let lines: Vec<CartViewLine> = cart
            .lines()
            .iter()
            .map(|line| {
                let listed = self.catalog.unit(&line.unit);
                let unit_price = listed.as_ref().map(|u| u.effective_price());
                let available = self.ledger.available(&line.unit).unwrap_or(0);
                CartViewLine {
                    unit: line.unit,
                    name: listed.map(|u| u.name().to_string()),
                    quantity: line.quantity,
                    unit_price,
                    line_total: unit_price.unwrap_or_default() * Decimal::from(line.quantity),
                    available,
                    stock_level: StockLevel::classify(available),
                }
            })
            .collect();

        Ok(CartView {
            buyer_id: buyer,
            total: lines.iter().map(|l| l.line_total).sum(),
            item_count: cart.item_count(),
            lines,
        })
    }

    fn require_listed(&self, unit: &UnitRef) -> Result<(), ServiceError> {
        match self.catalog.unit(unit) {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(format!("unit {unit}"))),
        }
    }
}

fn cart_owner(actor: &Actor) -> Result<UserId, ServiceError> {
    authorize(actor, &Permission::CART_WRITE)?;
    Ok(actor.user_id)
}
