use std::collections::HashMap;
use std::sync::RwLock;

use supplyflow_core::{AggregateRoot, ExpectedVersion, UserId};
use supplyflow_orders::{Order, OrderId, OrderStatus};

use super::r#trait::{OrderStore, StoreError};

/// In-memory order store.
///
/// Intended for tests/dev and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect(&self, keep: impl Fn(&Order) -> bool) -> Result<Vec<Order>, StoreError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let mut out: Vec<Order> = orders.values().filter(|o| keep(o)).cloned().collect();
        out.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.order_id().cmp(&a.order_id()))
        });
        Ok(out)
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let id = order.order_id();
        if orders.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("order {id} already exists")));
        }
        orders.insert(id, order);
        Ok(())
    }

    fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(orders.get(&id).cloned())
    }

    fn save(&self, order: Order, expected: ExpectedVersion) -> Result<Order, StoreError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let id = order.order_id();
        let current = orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;

        expected
            .check(current.version())
            .map_err(|e| StoreError::Concurrency(format!("order {id}: {}", e.detail())))?;

        Ok(std::mem::replace(current, order))
    }

    fn list_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, StoreError> {
        self.collect(|o| o.buyer_id() == buyer_id)
    }

    fn list_by_status(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        self.collect(|o| status.is_none_or(|s| o.status() == s))
    }
}
