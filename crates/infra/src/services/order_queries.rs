use supplyflow_auth::{Actor, Permission, authorize};
use supplyflow_orders::{Order, OrderId, OrderStatus};

use super::ServiceError;
use crate::order_store::OrderStore;

/// Read side for buyers, staff and downstream invoicing/reporting.
///
/// Buyers only ever see their own orders; another buyer's order is reported
/// as missing rather than forbidden.
pub struct OrderQueries<S> {
    orders: S,
}

impl<S: OrderStore> OrderQueries<S> {
    pub fn new(orders: S) -> Self {
        Self { orders }
    }

    pub fn get(&self, actor: &Actor, order_id: OrderId) -> Result<Order, ServiceError> {
        let order = self
            .orders
            .get(order_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("order {order_id}")))?;

        if authorize(actor, &Permission::ORDERS_READ_ALL).is_ok() {
            return Ok(order);
        }
        authorize(actor, &Permission::ORDERS_READ_OWN)?;
        if order.buyer_id() != actor.user_id {
            return Err(ServiceError::NotFound(format!("order {order_id}")));
        }
        Ok(order)
    }

    /// Staff may filter by status; buyers get their own orders, optionally
    /// filtered the same way.
    pub fn list(
        &self,
        actor: &Actor,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, ServiceError> {
        if authorize(actor, &Permission::ORDERS_READ_ALL).is_ok() {
            return Ok(self.orders.list_by_status(status)?);
        }

        authorize(actor, &Permission::ORDERS_READ_OWN)?;
        let mut own = self.orders.list_for_buyer(actor.user_id)?;
        if let Some(status) = status {
            own.retain(|o| o.status() == status);
        }
        Ok(own)
    }
}
