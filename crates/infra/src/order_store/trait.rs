use std::sync::Arc;

use thiserror::Error;

use supplyflow_core::{ExpectedVersion, UserId};
use supplyflow_orders::{Order, OrderId, OrderStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The stored version moved since the caller read it.
    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("record not found: {0}")]
    NotFound(String),

    /// Backend failure. The only store error that is not a business outcome.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Versioned order storage.
pub trait OrderStore: Send + Sync {
    /// Persist a freshly placed order. Fails with `Duplicate` if the id is
    /// taken.
    fn insert(&self, order: Order) -> Result<(), StoreError>;

    fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Replace the stored order if its version matches `expected`.
    ///
    /// Returns the snapshot that was replaced; the comparison and the write
    /// happen under one lock, so `previous.status()` is exactly the status
    /// this save moved away from.
    fn save(&self, order: Order, expected: ExpectedVersion) -> Result<Order, StoreError>;

    /// Newest first.
    fn list_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, StoreError>;

    /// Newest first. `None` lists every order.
    fn list_by_status(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn insert(&self, order: Order) -> Result<(), StoreError> {
        (**self).insert(order)
    }

    fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).get(id)
    }

    fn save(&self, order: Order, expected: ExpectedVersion) -> Result<Order, StoreError> {
        (**self).save(order, expected)
    }

    fn list_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, StoreError> {
        (**self).list_for_buyer(buyer_id)
    }

    fn list_by_status(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        (**self).list_by_status(status)
    }
}
