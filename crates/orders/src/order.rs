use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use supplyflow_auth::Role;
use supplyflow_catalog::UnitRef;
use supplyflow_core::{Aggregate, AggregateId, AggregateRoot, DomainError, UserId, ValueObject};
use supplyflow_events::Event;

use crate::{OrderError, OrderStatus, StockEffect};

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPreference {
    #[default]
    Standard,
    Express,
    Pickup,
}

/// Where and to whom the order goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub recipient_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl ValueObject for ShippingInfo {}

impl ShippingInfo {
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("recipient_name", &self.recipient_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} cannot be empty")));
            }
        }
        Ok(())
    }
}

/// One line of a placed order.
///
/// `price` is captured when the order is placed and never follows later
/// catalog price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub unit: UnitRef,
    pub name: String,
    pub quantity: i64,
    pub price: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    buyer_id: UserId,
    status: OrderStatus,
    items: Vec<OrderItem>,
    total_amount: Decimal,
    shipping: ShippingInfo,
    delivery_preference: DeliveryPreference,
    notes: Option<String>,
    tracking_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    packed_at: Option<DateTime<Utc>>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    version: u64,
}

/// Everything needed to create an order from a cart snapshot whose stock has
/// already been reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping: ShippingInfo,
    pub delivery_preference: DeliveryPreference,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Order {
    /// Build a new `pending` order at version 1.
    pub fn place(cmd: PlaceOrder) -> Result<Self, OrderError> {
        if cmd.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        for item in &cmd.items {
            if item.quantity < 1 {
                return Err(OrderError::Validation(format!(
                    "quantity for {} must be positive",
                    item.unit
                )));
            }
            if item.price.is_sign_negative() {
                return Err(OrderError::Validation(format!(
                    "price for {} cannot be negative",
                    item.unit
                )));
            }
        }
        cmd.shipping.validate()?;

        let total_amount = cmd.items.iter().map(OrderItem::line_total).sum();

        Ok(Self {
            id: cmd.order_id,
            buyer_id: cmd.buyer_id,
            status: OrderStatus::Pending,
            items: cmd.items,
            total_amount,
            shipping: cmd.shipping,
            delivery_preference: cmd.delivery_preference,
            notes: non_blank(cmd.notes),
            tracking_number: None,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
            approved_at: None,
            packed_at: None,
            shipped_at: None,
            delivered_at: None,
            rejected_at: None,
            cancelled_at: None,
            version: 1,
        })
    }

    pub fn order_id(&self) -> OrderId {
        self.id
    }

    pub fn buyer_id(&self) -> UserId {
        self.buyer_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    pub fn delivery_preference(&self) -> DeliveryPreference {
        self.delivery_preference
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn packed_at(&self) -> Option<DateTime<Utc>> {
        self.packed_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn rejected_at(&self) -> Option<DateTime<Utc>> {
        self.rejected_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// Statuses `role` could move this order to right now.
    pub fn next_statuses_for(&self, role: Role) -> Vec<OrderStatus> {
        self.status.next_statuses_for(role)
    }

    /// `(unit, quantity)` pairs to hand back to the ledger.
    pub fn stock_lines(&self) -> Vec<(UnitRef, i64)> {
        self.items.iter().map(|i| (i.unit, i.quantity)).collect()
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: move the order to another status.
///
/// `tracking_number` is only accepted together with `shipped` (or on a
/// same-status request, where it becomes a plain annotation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionStatus {
    pub actor: Role,
    pub to: OrderStatus,
    pub tracking_number: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: attach or correct a tracking number without a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTracking {
    pub actor: Role,
    pub tracking_number: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    Transition(TransitionStatus),
    RecordTracking(RecordTracking),
}

/// Event: StatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub actor: Role,
    pub effect: StockEffect,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TrackingNumberRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingNumberRecorded {
    pub order_id: OrderId,
    pub tracking_number: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    StatusChanged(StatusChanged),
    TrackingNumberRecorded(TrackingNumberRecorded),
}

impl OrderEvent {
    pub fn as_status_change(&self) -> Option<&StatusChanged> {
        match self {
            OrderEvent::StatusChanged(e) => Some(e),
            OrderEvent::TrackingNumberRecorded(_) => None,
        }
    }
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::StatusChanged(_) => "orders.order.status_changed",
            OrderEvent::TrackingNumberRecorded(_) => "orders.order.tracking_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::StatusChanged(e) => e.occurred_at,
            OrderEvent::TrackingNumberRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = OrderError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::StatusChanged(e) => {
                self.status = e.to;
                let at = Some(e.occurred_at);
                match e.to {
                    OrderStatus::Approved => self.approved_at = at,
                    OrderStatus::Packed => self.packed_at = at,
                    OrderStatus::Shipped => self.shipped_at = at,
                    OrderStatus::Delivered => self.delivered_at = at,
                    OrderStatus::Rejected => self.rejected_at = at,
                    OrderStatus::Cancelled => self.cancelled_at = at,
                    OrderStatus::Pending => {}
                }
                self.updated_at = e.occurred_at;
            }
            OrderEvent::TrackingNumberRecorded(e) => {
                self.tracking_number = Some(e.tracking_number.clone());
                self.updated_at = e.occurred_at;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::Transition(cmd) => self.handle_transition(cmd),
            OrderCommand::RecordTracking(cmd) => self.handle_record_tracking(cmd),
        }
    }
}

impl Order {
    fn handle_transition(&self, cmd: &TransitionStatus) -> Result<Vec<OrderEvent>, OrderError> {
        let from = self.status;
        let to = cmd.to;
        let tracking = non_blank(cmd.tracking_number.clone());

        if from.is_terminal() {
            return Err(OrderError::IllegalTransition { from, to });
        }

        if to == from {
            // Not a transition. Still refuse actors with no say over the
            // order in its current status.
            if from.next_statuses_for(cmd.actor).is_empty() {
                return Err(OrderError::Forbidden {
                    role: cmd.actor,
                    from,
                    to,
                });
            }
            return match tracking {
                Some(tracking_number) => self.handle_record_tracking(&RecordTracking {
                    actor: cmd.actor,
                    tracking_number,
                    occurred_at: cmd.occurred_at,
                }),
                None => Ok(vec![]),
            };
        }

        let rule = from
            .rule_to(to)
            .ok_or(OrderError::IllegalTransition { from, to })?;

        if rule.actor != cmd.actor {
            return Err(OrderError::Forbidden {
                role: cmd.actor,
                from,
                to,
            });
        }

        if tracking.is_some() && to != OrderStatus::Shipped {
            return Err(OrderError::Validation(
                "a tracking number can only be attached when shipping".to_string(),
            ));
        }

        let mut events = vec![OrderEvent::StatusChanged(StatusChanged {
            order_id: self.id,
            from,
            to,
            actor: cmd.actor,
            effect: rule.effect,
            occurred_at: cmd.occurred_at,
        })];

        if let Some(tracking_number) = tracking {
            if self.tracking_number.as_deref() != Some(tracking_number.as_str()) {
                events.push(OrderEvent::TrackingNumberRecorded(TrackingNumberRecorded {
                    order_id: self.id,
                    tracking_number,
                    occurred_at: cmd.occurred_at,
                }));
            }
        }

        Ok(events)
    }

    fn handle_record_tracking(&self, cmd: &RecordTracking) -> Result<Vec<OrderEvent>, OrderError> {
        if !cmd.actor.is_staff() {
            return Err(OrderError::Forbidden {
                role: cmd.actor,
                from: self.status,
                to: self.status,
            });
        }

        if !matches!(self.status, OrderStatus::Packed | OrderStatus::Shipped) {
            return Err(OrderError::Validation(format!(
                "cannot record a tracking number on a {} order",
                self.status
            )));
        }

        let tracking_number = cmd.tracking_number.trim();
        if tracking_number.is_empty() {
            return Err(OrderError::Validation(
                "tracking_number cannot be empty".to_string(),
            ));
        }

        if self.tracking_number.as_deref() == Some(tracking_number) {
            return Ok(vec![]);
        }

        Ok(vec![OrderEvent::TrackingNumberRecorded(TrackingNumberRecorded {
            order_id: self.id,
            tracking_number: tracking_number.to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use supplyflow_catalog::ProductId;
    use supplyflow_core::aggregate::execute;

    fn test_order_id() -> OrderId {
        OrderId::new(AggregateId::new())
    }

    fn test_unit() -> UnitRef {
        UnitRef::product(ProductId::new(AggregateId::new()))
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_shipping() -> ShippingInfo {
        ShippingInfo {
            recipient_name: "Store 12".to_string(),
            phone: "+1 555 0100".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: None,
        }
    }

    fn place(items: Vec<OrderItem>) -> Result<Order, OrderError> {
        Order::place(PlaceOrder {
            order_id: test_order_id(),
            buyer_id: UserId::new(),
            items,
            shipping: test_shipping(),
            delivery_preference: DeliveryPreference::Standard,
            notes: Some("  ".to_string()),
            occurred_at: test_time(),
        })
    }

    fn pending_order() -> Order {
        place(vec![OrderItem {
            unit: test_unit(),
            name: "Frying oil".to_string(),
            quantity: 3,
            price: dec!(12.50),
        }])
        .unwrap()
    }

    fn transition(role: Role, to: OrderStatus) -> OrderCommand {
        OrderCommand::Transition(TransitionStatus {
            actor: role,
            to,
            tracking_number: None,
            occurred_at: test_time(),
        })
    }

    fn advance(order: &mut Order, steps: &[(Role, OrderStatus)]) {
        for (role, to) in steps {
            execute(order, &transition(*role, *to)).unwrap();
        }
    }

    #[test]
    fn placed_order_is_pending_with_captured_total() {
        let order = place(vec![
            OrderItem {
                unit: test_unit(),
                name: "Buns".to_string(),
                quantity: 4,
                price: dec!(2.25),
            },
            OrderItem {
                unit: test_unit(),
                name: "Patties".to_string(),
                quantity: 2,
                price: dec!(10.00),
            },
        ])
        .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_amount(), dec!(29.00));
        assert_eq!(order.version(), 1);
        assert_eq!(order.notes(), None);
    }

    #[test]
    fn empty_order_is_rejected() {
        assert_eq!(place(vec![]).unwrap_err(), OrderError::EmptyCart);
    }

    #[test]
    fn blank_shipping_field_is_rejected() {
        let mut cmd_shipping = test_shipping();
        cmd_shipping.city = " ".to_string();
        let err = Order::place(PlaceOrder {
            order_id: test_order_id(),
            buyer_id: UserId::new(),
            items: pending_order().items().to_vec(),
            shipping: cmd_shipping,
            delivery_preference: DeliveryPreference::Express,
            notes: None,
            occurred_at: test_time(),
        })
        .unwrap_err();
        assert!(matches!(err, OrderError::Validation(msg) if msg.contains("city")));
    }

    #[test]
    fn full_lifecycle_pending_to_delivered() {
        let mut order = pending_order();
        advance(
            &mut order,
            &[
                (Role::Admin, OrderStatus::Approved),
                (Role::Warehouse, OrderStatus::Packed),
                (Role::Warehouse, OrderStatus::Shipped),
                (Role::Warehouse, OrderStatus::Delivered),
            ],
        );

        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.approved_at().is_some());
        assert!(order.packed_at().is_some());
        assert!(order.shipped_at().is_some());
        assert!(order.delivered_at().is_some());
        assert_eq!(order.version(), 5);
    }

    #[test]
    fn rejection_carries_release_effect() {
        let order = pending_order();
        let events = order.handle(&transition(Role::Admin, OrderStatus::Rejected)).unwrap();

        let change = events[0].as_status_change().unwrap();
        assert_eq!(change.from, OrderStatus::Pending);
        assert_eq!(change.to, OrderStatus::Rejected);
        assert_eq!(change.effect, StockEffect::ReleaseAll);
    }

    #[test]
    fn rejected_order_refuses_everything_afterwards() {
        let mut order = pending_order();
        advance(&mut order, &[(Role::Admin, OrderStatus::Rejected)]);

        for to in OrderStatus::ALL {
            for role in [Role::Buyer, Role::Warehouse, Role::Admin] {
                let err = order.handle(&transition(role, to)).unwrap_err();
                assert_eq!(
                    err,
                    OrderError::IllegalTransition {
                        from: OrderStatus::Rejected,
                        to
                    }
                );
            }
        }
    }

    #[test]
    fn warehouse_cannot_touch_pending_order() {
        let order = pending_order();
        for to in OrderStatus::ALL {
            assert!(order.handle(&transition(Role::Warehouse, to)).is_err(), "{to}");
        }
    }

    #[test]
    fn skipping_a_step_is_illegal() {
        let order = pending_order();
        let err = order.handle(&transition(Role::Admin, OrderStatus::Shipped)).unwrap_err();
        assert_eq!(
            err,
            OrderError::IllegalTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped
            }
        );
    }

    #[test]
    fn same_status_is_a_no_op() {
        let order = pending_order();
        let events = order.handle(&transition(Role::Admin, OrderStatus::Pending)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn shipping_with_tracking_records_both() {
        let mut order = pending_order();
        advance(
            &mut order,
            &[
                (Role::Admin, OrderStatus::Approved),
                (Role::Warehouse, OrderStatus::Packed),
            ],
        );

        let events = execute(
            &mut order,
            &OrderCommand::Transition(TransitionStatus {
                actor: Role::Warehouse,
                to: OrderStatus::Shipped,
                tracking_number: Some(" 1Z999 ".to_string()),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.tracking_number(), Some("1Z999"));
    }

    #[test]
    fn tracking_only_save_keeps_status() {
        let mut order = pending_order();
        advance(
            &mut order,
            &[
                (Role::Admin, OrderStatus::Approved),
                (Role::Warehouse, OrderStatus::Packed),
                (Role::Warehouse, OrderStatus::Shipped),
            ],
        );

        let events = execute(
            &mut order,
            &OrderCommand::RecordTracking(RecordTracking {
                actor: Role::Warehouse,
                tracking_number: "TRK-1".to_string(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(events.len(), 1);
        assert!(events[0].as_status_change().is_none());
        assert_eq!(order.status(), OrderStatus::Shipped);
    }

    #[test]
    fn tracking_on_non_shipping_transition_is_invalid() {
        let order = pending_order();
        let err = order
            .handle(&OrderCommand::Transition(TransitionStatus {
                actor: Role::Admin,
                to: OrderStatus::Approved,
                tracking_number: Some("X".to_string()),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn buyer_cannot_record_tracking() {
        let mut order = pending_order();
        advance(
            &mut order,
            &[
                (Role::Admin, OrderStatus::Approved),
                (Role::Warehouse, OrderStatus::Packed),
            ],
        );
        let err = order
            .handle(&OrderCommand::RecordTracking(RecordTracking {
                actor: Role::Buyer,
                tracking_number: "X".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden { role: Role::Buyer, .. }));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let order = pending_order();
        let before = order.clone();

        let events1 = order.handle(&transition(Role::Admin, OrderStatus::Approved));
        let events2 = order.handle(&transition(Role::Admin, OrderStatus::Approved));

        assert_eq!(order, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn serialized_order_carries_its_own_item_prices() {
        let order = pending_order();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["items"][0]["price"], "12.50");
        assert_eq!(json["total_amount"], "37.50");
        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_role() -> impl Strategy<Value = Role> {
            prop_oneof![Just(Role::Buyer), Just(Role::Warehouse), Just(Role::Admin)]
        }

        fn any_status() -> impl Strategy<Value = OrderStatus> {
            (0usize..OrderStatus::ALL.len()).prop_map(|i| OrderStatus::ALL[i])
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: status only ever moves along a table row whose actor
            /// matches, and rejected commands leave the order untouched.
            #[test]
            fn status_moves_only_along_the_table(
                attempts in prop::collection::vec((any_role(), any_status()), 1..25)
            ) {
                let mut order = pending_order();

                for (role, to) in attempts {
                    let before = order.clone();
                    match execute(&mut order, &transition(role, to)) {
                        Ok(events) => {
                            if before.status() == to {
                                prop_assert!(events.is_empty());
                            } else {
                                let r = before.status().rule_to(to);
                                prop_assert!(r.is_some());
                                prop_assert_eq!(r.unwrap().actor, role);
                                prop_assert_eq!(order.status(), to);
                            }
                        }
                        Err(_) => prop_assert_eq!(&order, &before),
                    }
                }
            }
        }
    }
}
