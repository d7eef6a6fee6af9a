use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use supplyflow_auth::{Actor, Permission, authorize};
use supplyflow_catalog::{Catalog, UnitRef};
use supplyflow_cart::CartLine;
use supplyflow_core::{AggregateId, UserId};
use supplyflow_inventory::{StockError, StockLedger, reserve_all};
use supplyflow_orders::{
    DeliveryPreference, LineShortfall, Order, OrderError, OrderId, OrderItem, PlaceOrder,
    ShippingInfo,
};

use super::ServiceError;
use crate::cart_store::InMemoryCartStore;
use crate::order_store::OrderStore;

/// Buyer input for placing an order. The items come from the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRequest {
    pub shipping: ShippingInfo,
    pub delivery_preference: DeliveryPreference,
    pub notes: Option<String>,
}

/// Turns a buyer's cart into a `pending` order.
///
/// Placement either fully happens (stock reserved, order stored, cart
/// emptied, `OrderPlaced` published by the store) or leaves everything as it
/// was.
pub struct OrderFactory<L, C, S> {
    carts: Arc<InMemoryCartStore>,
    ledger: L,
    catalog: C,
    orders: S,
}

impl<L, C, S> OrderFactory<L, C, S>
where
    L: StockLedger,
    C: Catalog,
    S: OrderStore,
{
    pub fn new(carts: Arc<InMemoryCartStore>, ledger: L, catalog: C, orders: S) -> Self {
        Self {
            carts,
            ledger,
            catalog,
            orders,
        }
    }

    pub fn place(&self, actor: &Actor, request: PlacementRequest) -> Result<Order, ServiceError> {
        authorize(actor, &Permission::ORDERS_PLACE)?;
        let buyer_id = actor.user_id;

        // Taking the cart is what serialises placements by the same buyer:
        // a concurrent second call finds it empty.
        let lines = self.carts.take(buyer_id)?;
        if lines.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        match self.place_lines(buyer_id, &lines, request) {
            Ok(order) => Ok(order),
            Err(err) => {
                if let Err(restore_err) = self.carts.restore(buyer_id, lines) {
                    warn!(buyer = %buyer_id, error = %restore_err, "failed to restore cart");
                }
                Err(err)
            }
        }
    }

    fn place_lines(
        &self,
        buyer_id: UserId,
        lines: &[CartLine],
        request: PlacementRequest,
    ) -> Result<Order, ServiceError> {
        request.shipping.validate().map_err(OrderError::from)?;

        // The cart only ever checked availability, so everything is
        // re-validated against the ledger before anything is taken.
        let mut items = Vec::with_capacity(lines.len());
        let mut shortfalls = Vec::new();
        for line in lines {
            let listed = self
                .catalog
                .unit(&line.unit)
                .ok_or_else(|| ServiceError::NotFound(format!("unit {}", line.unit)))?;

            let check = self.ledger.check_availability(&line.unit, line.quantity)?;
            if !check.is_satisfied() {
                shortfalls.push(LineShortfall {
                    unit: line.unit,
                    available: check.available,
                    requested: line.quantity,
                });
            }

            items.push(OrderItem {
                unit: line.unit,
                name: listed.name().to_string(),
                quantity: line.quantity,
                price: listed.effective_price(),
            });
        }

        if !shortfalls.is_empty() {
            warn!(buyer = %buyer_id, lines = shortfalls.len(), "placement re-check failed");
            return Err(OrderError::InventoryExceeded(shortfalls).into());
        }

        let wanted: Vec<(UnitRef, i64)> = items.iter().map(|i| (i.unit, i.quantity)).collect();
        let reservation = reserve_all(&self.ledger, &wanted).map_err(lost_race)?;

        let order = match Order::place(PlaceOrder {
            order_id: OrderId::new(AggregateId::new()),
            buyer_id,
            items,
            shipping: request.shipping,
            delivery_preference: request.delivery_preference,
            notes: request.notes,
            occurred_at: Utc::now(),
        }) {
            Ok(order) => order,
            Err(err) => {
                reservation.rollback(&self.ledger);
                return Err(err.into());
            }
        };

        if let Err(err) = self.orders.insert(order.clone()) {
            warn!(order_id = %order.order_id(), error = %err, "order insert failed; releasing stock");
            reservation.rollback(&self.ledger);
            return Err(err.into());
        }

        info!(
            order_id = %order.order_id(),
            buyer = %buyer_id,
            items = order.items().len(),
            units = reservation.total_units(),
            total = %order.total_amount(),
            "order placed"
        );
        Ok(order)
    }
}

/// Another placement took the stock between the re-check and the reserve.
/// The buyer sees the same shape of error as a failed re-check.
fn lost_race(err: StockError) -> ServiceError {
    match err {
        StockError::InsufficientStock {
            unit,
            available,
            requested,
        } => OrderError::InventoryExceeded(vec![LineShortfall {
            unit,
            available,
            requested,
        }])
        .into(),
        other => other.into(),
    }
}
