use chrono::Utc;
use tracing::{debug, error, info, warn};

use supplyflow_auth::{Actor, Permission, authorize};
use supplyflow_core::aggregate::execute;
use supplyflow_core::{AggregateRoot, ExpectedVersion};
use supplyflow_inventory::StockLedger;
use supplyflow_orders::{
    Order, OrderCommand, OrderEvent, OrderId, OrderStatus, RecordTracking, StockEffect,
    TransitionStatus,
};

use super::ServiceError;
use crate::order_store::{OrderStore, StoreError};

/// Applies status transitions to stored orders.
///
/// Each attempt is load → decide → compare-and-save against the loaded
/// version. Of two concurrent transitions on one order only one commits; the
/// other reloads and is judged against the new status (usually ending in
/// `IllegalTransition`). Stock is released only after a commit, so a release
/// happens at most once per transition.
pub struct OrderStateMachine<S, L> {
    orders: S,
    ledger: L,
    max_retries: u32,
}

impl<S, L> OrderStateMachine<S, L>
where
    S: OrderStore,
    L: StockLedger,
{
    pub fn new(orders: S, ledger: L, max_retries: u32) -> Self {
        Self {
            orders,
            ledger,
            max_retries,
        }
    }

    /// Move an order to `to`, attaching `tracking_number` when shipping.
    pub fn transition(
        &self,
        actor: &Actor,
        order_id: OrderId,
        to: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, ServiceError> {
        authorize(actor, &Permission::ORDERS_TRANSITION)?;

        self.run(
            order_id,
            OrderCommand::Transition(TransitionStatus {
                actor: actor.role,
                to,
                tracking_number,
                occurred_at: Utc::now(),
            }),
        )
    }

    /// Attach or correct the tracking number without touching the status.
    pub fn record_tracking(
        &self,
        actor: &Actor,
        order_id: OrderId,
        tracking_number: String,
    ) -> Result<Order, ServiceError> {
        authorize(actor, &Permission::ORDERS_TRANSITION)?;

        self.run(
            order_id,
            OrderCommand::RecordTracking(RecordTracking {
                actor: actor.role,
                tracking_number,
                occurred_at: Utc::now(),
            }),
        )
    }

    fn run(&self, order_id: OrderId, command: OrderCommand) -> Result<Order, ServiceError> {
        let mut attempt = 0;

        loop {
            let mut order = self
                .orders
                .get(order_id)?
                .ok_or_else(|| ServiceError::NotFound(format!("order {order_id}")))?;
            let expected = ExpectedVersion::Exact(order.version());

            let events = execute(&mut order, &command)?;
            if events.is_empty() {
                debug!(order_id = %order_id, status = %order.status(), "transition is a no-op");
                return Ok(order);
            }

            match self.orders.save(order.clone(), expected) {
                Ok(previous) => {
                    if previous.status() != order.status() {
                        info!(
                            order_id = %order_id,
                            from = %previous.status(),
                            to = %order.status(),
                            "order status changed"
                        );
                    }
                    self.apply_stock_effects(&order, &events);
                    return Ok(order);
                }
                Err(StoreError::Concurrency(msg)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(order_id = %order_id, attempt, reason = %msg, "stale order; retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn apply_stock_effects(&self, order: &Order, events: &[OrderEvent]) {
        let releases = events
            .iter()
            .filter_map(OrderEvent::as_status_change)
            .any(|change| change.effect == StockEffect::ReleaseAll);
        if !releases {
            return;
        }

        for (unit, qty) in order.stock_lines() {
            match self.ledger.release(&unit, qty) {
                Ok(on_hand) => debug!(order_id = %order.order_id(), unit = %unit, qty, on_hand, "stock returned"),
                // The status change is committed; the count needs manual repair.
                Err(err) => error!(
                    order_id = %order.order_id(),
                    unit = %unit,
                    qty,
                    error = %err,
                    "failed to return stock for closed order"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;
    use supplyflow_catalog::{ProductId, UnitRef};
    use supplyflow_core::{AggregateId, UserId};
    use supplyflow_orders::{DeliveryPreference, OrderError, OrderItem, PlaceOrder, ShippingInfo};

    use super::*;
    use crate::{InMemoryOrderStore, InMemoryStockLedger};

    struct Fixture {
        machine: OrderStateMachine<Arc<InMemoryOrderStore>, Arc<InMemoryStockLedger>>,
        ledger: Arc<InMemoryStockLedger>,
        unit: UnitRef,
        order_id: OrderId,
    }

    /// A pending order for 3 units, with 2 left on hand after its
    /// reservation.
    fn fixture() -> Fixture {
        let orders = Arc::new(InMemoryOrderStore::new());
        let ledger = Arc::new(InMemoryStockLedger::new());
        let unit = UnitRef::product(ProductId::new(AggregateId::new()));
        ledger.track(unit, 2).unwrap();

        let order = Order::place(PlaceOrder {
            order_id: OrderId::new(AggregateId::new()),
            buyer_id: UserId::new(),
            items: vec![OrderItem {
                unit,
                name: "Cheese".to_string(),
                quantity: 3,
                price: dec!(7.00),
            }],
            shipping: ShippingInfo {
                recipient_name: "Store 5".to_string(),
                phone: "555".to_string(),
                address: "Mall unit 5".to_string(),
                city: "North Haverbrook".to_string(),
                postal_code: None,
            },
            delivery_preference: DeliveryPreference::Express,
            notes: None,
            occurred_at: Utc::now(),
        })
        .unwrap();
        let order_id = order.order_id();
        orders.insert(order).unwrap();

        Fixture {
            machine: OrderStateMachine::new(orders, ledger.clone(), 3),
            ledger,
            unit,
            order_id,
        }
    }

    fn admin() -> Actor {
        Actor::admin(UserId::new())
    }

    fn warehouse() -> Actor {
        Actor::warehouse(UserId::new())
    }

    #[test]
    fn reject_returns_stock_once() {
        let f = fixture();

        let order = f
            .machine
            .transition(&admin(), f.order_id, OrderStatus::Rejected, None)
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Rejected);
        assert_eq!(f.ledger.available(&f.unit).unwrap(), 5);

        let err = f
            .machine
            .transition(&admin(), f.order_id, OrderStatus::Approved, None)
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Order(OrderError::IllegalTransition {
                from: OrderStatus::Rejected,
                to: OrderStatus::Approved
            })
        );
        assert_eq!(f.ledger.available(&f.unit).unwrap(), 5);
    }

    #[test]
    fn approve_touches_no_stock() {
        let f = fixture();
        f.machine
            .transition(&admin(), f.order_id, OrderStatus::Approved, None)
            .unwrap();
        assert_eq!(f.ledger.available(&f.unit).unwrap(), 2);
    }

    #[test]
    fn warehouse_cannot_act_on_pending_orders() {
        let f = fixture();
        for to in OrderStatus::ALL {
            assert!(
                f.machine
                    .transition(&warehouse(), f.order_id, to, None)
                    .is_err(),
                "{to}"
            );
        }
        assert_eq!(f.ledger.available(&f.unit).unwrap(), 2);
    }

    #[test]
    fn buyers_cannot_transition() {
        let f = fixture();
        let err = f
            .machine
            .transition(&Actor::buyer(UserId::new()), f.order_id, OrderStatus::Cancelled, None)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn ship_with_tracking_then_correct_it() {
        let f = fixture();
        f.machine
            .transition(&admin(), f.order_id, OrderStatus::Approved, None)
            .unwrap();
        f.machine
            .transition(&warehouse(), f.order_id, OrderStatus::Packed, None)
            .unwrap();
        let shipped = f
            .machine
            .transition(
                &warehouse(),
                f.order_id,
                OrderStatus::Shipped,
                Some("TRK-1".to_string()),
            )
            .unwrap();
        assert_eq!(shipped.tracking_number(), Some("TRK-1"));

        let corrected = f
            .machine
            .record_tracking(&warehouse(), f.order_id, "TRK-2".to_string())
            .unwrap();
        assert_eq!(corrected.status(), OrderStatus::Shipped);
        assert_eq!(corrected.tracking_number(), Some("TRK-2"));
    }

    #[test]
    fn unknown_order_is_not_found() {
        let f = fixture();
        let err = f
            .machine
            .transition(
                &admin(),
                OrderId::new(AggregateId::new()),
                OrderStatus::Approved,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
