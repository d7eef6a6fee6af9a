//! Change notifications published after an order write has committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyflow_events::Event;

use crate::{Order, OrderStatus};

/// What downstream consumers (mail, push, audit) are told about an order.
///
/// Each variant carries a full snapshot of the order as committed, so
/// consumers never need to read the store back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderNotification {
    OrderPlaced {
        order: Order,
        occurred_at: DateTime<Utc>,
    },
    OrderStatusChanged {
        order: Order,
        old_status: OrderStatus,
        occurred_at: DateTime<Utc>,
    },
}

impl OrderNotification {
    pub fn placed(order: Order) -> Self {
        let occurred_at = order.created_at();
        OrderNotification::OrderPlaced { order, occurred_at }
    }

    pub fn status_changed(order: Order, old_status: OrderStatus) -> Self {
        let occurred_at = order.updated_at();
        OrderNotification::OrderStatusChanged {
            order,
            old_status,
            occurred_at,
        }
    }

    pub fn order(&self) -> &Order {
        match self {
            OrderNotification::OrderPlaced { order, .. } => order,
            OrderNotification::OrderStatusChanged { order, .. } => order,
        }
    }

    /// `(old, new)` for status changes.
    pub fn status_change(&self) -> Option<(OrderStatus, OrderStatus)> {
        match self {
            OrderNotification::OrderPlaced { .. } => None,
            OrderNotification::OrderStatusChanged {
                order, old_status, ..
            } => Some((*old_status, order.status())),
        }
    }
}

impl Event for OrderNotification {
    fn event_type(&self) -> &'static str {
        match self {
            OrderNotification::OrderPlaced { .. } => "orders.order.placed",
            OrderNotification::OrderStatusChanged { .. } => "orders.order.status_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderNotification::OrderPlaced { occurred_at, .. } => *occurred_at,
            OrderNotification::OrderStatusChanged { occurred_at, .. } => *occurred_at,
        }
    }
}
