//! Change notification around order writes.

use tracing::{debug, warn};

use supplyflow_core::{AggregateRoot, ExpectedVersion, UserId};
use supplyflow_events::{EventBus, EventEnvelope};
use supplyflow_orders::{Order, OrderId, OrderNotification, OrderStatus};

use crate::order_store::{OrderStore, StoreError};

pub const ORDER_AGGREGATE_TYPE: &str = "orders.order";

pub type OrderEnvelope = EventEnvelope<OrderNotification>;

/// Order store adapter that publishes notifications after each committed
/// write.
///
/// - `insert` publishes `OrderPlaced`.
/// - `save` publishes `OrderStatusChanged` only when the status it replaced
///   differs from the status it wrote. The old status comes back from the
///   store's compare-and-save, so nothing is stashed between calls.
///
/// Publication happens strictly after the commit. A publish failure is
/// logged, not returned: the write already happened and callers must not
/// treat it as undone.
pub struct ChangeNotifier<S, B> {
    store: S,
    bus: B,
}

impl<S, B> ChangeNotifier<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }

    pub fn into_parts(self) -> (S, B) {
        (self.store, self.bus)
    }
}

impl<S, B> ChangeNotifier<S, B>
where
    B: EventBus<OrderEnvelope>,
{
    fn publish(&self, notification: OrderNotification) {
        let order = notification.order();
        let envelope = EventEnvelope::wrap(
            order.order_id().0,
            ORDER_AGGREGATE_TYPE,
            order.version(),
            notification,
        );

        let order_id = envelope.aggregate_id();
        let event_type = envelope.event_type().to_string();
        match self.bus.publish(envelope) {
            Ok(()) => debug!(order_id = %order_id, event_type, "order notification published"),
            Err(err) => warn!(
                order_id = %order_id,
                event_type,
                error = ?err,
                "order notification publish failed after commit"
            ),
        }
    }
}

impl<S, B> OrderStore for ChangeNotifier<S, B>
where
    S: OrderStore,
    B: EventBus<OrderEnvelope>,
{
    fn insert(&self, order: Order) -> Result<(), StoreError> {
        self.store.insert(order.clone())?;
        self.publish(OrderNotification::placed(order));
        Ok(())
    }

    fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.store.get(id)
    }

    fn save(&self, order: Order, expected: ExpectedVersion) -> Result<Order, StoreError> {
        let previous = self.store.save(order.clone(), expected)?;

        if previous.status() != order.status() {
            self.publish(OrderNotification::status_changed(order, previous.status()));
        }

        Ok(previous)
    }

    fn list_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, StoreError> {
        self.store.list_for_buyer(buyer_id)
    }

    fn list_by_status(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        self.store.list_by_status(status)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rust_decimal_macros::dec;
    use supplyflow_auth::Role;
    use supplyflow_catalog::{ProductId, UnitRef};
    use supplyflow_core::AggregateId;
    use supplyflow_core::aggregate::execute;
    use supplyflow_events::{Event, InMemoryEventBus};
    use supplyflow_orders::{
        DeliveryPreference, OrderCommand, OrderItem, PlaceOrder, RecordTracking, ShippingInfo,
        TransitionStatus,
    };

    use super::*;
    use crate::order_store::InMemoryOrderStore;

    type Bus = Arc<InMemoryEventBus<OrderEnvelope>>;

    fn setup() -> (ChangeNotifier<InMemoryOrderStore, Bus>, Bus) {
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        (ChangeNotifier::new(InMemoryOrderStore::new(), bus.clone()), bus)
    }

    fn new_order() -> Order {
        Order::place(PlaceOrder {
            order_id: OrderId::new(AggregateId::new()),
            buyer_id: UserId::new(),
            items: vec![OrderItem {
                unit: UnitRef::product(ProductId::new(AggregateId::new())),
                name: "Cups".to_string(),
                quantity: 10,
                price: dec!(0.20),
            }],
            shipping: ShippingInfo {
                recipient_name: "Store 9".to_string(),
                phone: "555".to_string(),
                address: "Back door".to_string(),
                city: "Ogdenville".to_string(),
                postal_code: None,
            },
            delivery_preference: DeliveryPreference::Standard,
            notes: None,
            occurred_at: Utc::now(),
        })
        .unwrap()
    }

    fn step(order: &mut Order, role: Role, to: OrderStatus) {
        execute(
            order,
            &OrderCommand::Transition(TransitionStatus {
                actor: role,
                to,
                tracking_number: None,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
    }

    fn save(notifier: &ChangeNotifier<InMemoryOrderStore, Bus>, order: &Order, loaded: u64) {
        notifier
            .save(order.clone(), ExpectedVersion::Exact(loaded))
            .unwrap();
    }

    #[test]
    fn insert_publishes_order_placed() {
        let (notifier, bus) = setup();
        let sub = bus.subscribe();
        let order = new_order();

        notifier.insert(order.clone()).unwrap();

        let published = sub.drain();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].payload().event_type(), "orders.order.placed");
        assert_eq!(published[0].payload().order(), &order);
        assert_eq!(published[0].aggregate_type(), ORDER_AGGREGATE_TYPE);
    }

    #[test]
    fn status_change_publishes_exactly_once_with_old_status() {
        let (notifier, bus) = setup();
        let mut order = new_order();
        notifier.insert(order.clone()).unwrap();
        let sub = bus.subscribe();

        let loaded = order.version();
        step(&mut order, Role::Admin, OrderStatus::Approved);
        save(&notifier, &order, loaded);

        let published = sub.drain();
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].payload().status_change(),
            Some((OrderStatus::Pending, OrderStatus::Approved))
        );
    }

    #[test]
    fn status_and_tracking_in_one_save_fire_once() {
        let (notifier, bus) = setup();
        let mut order = new_order();
        notifier.insert(order.clone()).unwrap();

        let loaded = order.version();
        step(&mut order, Role::Admin, OrderStatus::Approved);
        step(&mut order, Role::Warehouse, OrderStatus::Packed);
        save(&notifier, &order, loaded);

        let sub = bus.subscribe();
        let loaded = order.version();
        execute(
            &mut order,
            &OrderCommand::Transition(TransitionStatus {
                actor: Role::Warehouse,
                to: OrderStatus::Shipped,
                tracking_number: Some("TRK-77".to_string()),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        save(&notifier, &order, loaded);

        let published = sub.drain();
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].payload().status_change(),
            Some((OrderStatus::Packed, OrderStatus::Shipped))
        );
        assert_eq!(published[0].payload().order().tracking_number(), Some("TRK-77"));
    }

    #[test]
    fn tracking_only_save_publishes_nothing() {
        let (notifier, bus) = setup();
        let mut order = new_order();
        notifier.insert(order.clone()).unwrap();

        let loaded = order.version();
        step(&mut order, Role::Admin, OrderStatus::Approved);
        step(&mut order, Role::Warehouse, OrderStatus::Packed);
        save(&notifier, &order, loaded);

        let sub = bus.subscribe();
        let loaded = order.version();
        execute(
            &mut order,
            &OrderCommand::RecordTracking(RecordTracking {
                actor: Role::Warehouse,
                tracking_number: "TRK-1".to_string(),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        save(&notifier, &order, loaded);

        assert!(sub.drain().is_empty());
    }

    #[test]
    fn failed_save_publishes_nothing() {
        let (notifier, bus) = setup();
        let mut order = new_order();
        notifier.insert(order.clone()).unwrap();
        let sub = bus.subscribe();

        step(&mut order, Role::Admin, OrderStatus::Approved);
        let err = notifier
            .save(order, ExpectedVersion::Exact(99))
            .unwrap_err();

        assert!(matches!(err, StoreError::Concurrency(_)));
        assert!(sub.drain().is_empty());
    }
}
