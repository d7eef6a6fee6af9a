//! Per-buyer cart storage.

use std::collections::HashMap;
use std::sync::RwLock;

use supplyflow_cart::{Cart, CartLine};
use supplyflow_core::UserId;

use crate::StoreError;

/// Carts keyed by buyer.
///
/// A buyer with no stored cart has an empty one. Mutations run under the
/// write lock so two requests from the same buyer cannot interleave.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<UserId, Cart>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, buyer_id: UserId) -> Result<Cart, StoreError> {
        let carts = self
            .carts
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(carts
            .get(&buyer_id)
            .cloned()
            .unwrap_or_else(|| Cart::new(buyer_id)))
    }

    /// Remove the buyer's cart and hand its lines over, in one write-lock
    /// scope. A second caller for the same buyer gets an empty cart.
    pub fn take(&self, buyer_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        let mut carts = self
            .carts
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(carts
            .remove(&buyer_id)
            .map(|cart| cart.snapshot())
            .unwrap_or_default())
    }

    /// Give back lines obtained from [`take`](Self::take).
    pub fn restore(&self, buyer_id: UserId, lines: Vec<CartLine>) -> Result<(), StoreError> {
        if lines.is_empty() {
            return Ok(());
        }
        self.modify(buyer_id, |cart| cart.restore(lines))
    }

    /// Run `f` against the buyer's cart. The cart is kept whether `f`
    /// succeeds or not; `Cart` itself guarantees a failed mutation changes
    /// nothing.
    pub fn modify<R>(
        &self,
        buyer_id: UserId,
        f: impl FnOnce(&mut Cart) -> R,
    ) -> Result<R, StoreError> {
        let mut carts = self
            .carts
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let cart = carts
            .entry(buyer_id)
            .or_insert_with(|| Cart::new(buyer_id));
        Ok(f(cart))
    }

    pub fn clear(&self, buyer_id: UserId) -> Result<i64, StoreError> {
        self.modify(buyer_id, Cart::clear)
    }
}
