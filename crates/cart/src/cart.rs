use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use supplyflow_catalog::UnitRef;
use supplyflow_core::UserId;
use supplyflow_inventory::{StockError, StockLedger};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Check-time failure with buyer-facing context.
    #[error(
        "only {available} available for {unit} (requested {requested}, already in cart {already_in_cart})"
    )]
    InventoryExceeded {
        unit: UnitRef,
        available: i64,
        requested: i64,
        already_in_cart: i64,
    },

    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(i64),

    #[error("{0} is not in the cart")]
    NotFound(UnitRef),

    #[error(transparent)]
    Stock(#[from] StockError),
}

/// One line of a cart: a unit and how many the buyer wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub unit: UnitRef,
    pub quantity: i64,
}

/// What the UI needs after a successful mutation.
///
/// `remaining_inventory` is floored at zero for display; the checks
/// themselves use the signed difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMutation {
    pub cart_count: i64,
    pub product_cart_quantity: i64,
    pub remaining_inventory: i64,
}

impl CartMutation {
    fn new(cart_count: i64, product_cart_quantity: i64, available: i64) -> Self {
        Self {
            cart_count,
            product_cart_quantity,
            remaining_inventory: (available - product_cart_quantity).max(0),
        }
    }
}

/// A single buyer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    buyer_id: UserId,
    lines: Vec<CartLine>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(buyer_id: UserId) -> Self {
        Self {
            buyer_id,
            lines: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn buyer_id(&self) -> UserId {
        self.buyer_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines (the cart badge number).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn quantity_of(&self, unit: &UnitRef) -> i64 {
        self.line(unit).map_or(0, |l| l.quantity)
    }

    /// Read-only copy of the lines in insertion order.
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    /// Add `qty` of `unit`, merging into an existing line.
    pub fn add<L>(&mut self, ledger: &L, unit: UnitRef, qty: i64) -> Result<CartMutation, CartError>
    where
        L: StockLedger + ?Sized,
    {
        if qty < 1 {
            return Err(CartError::InvalidQuantity(qty));
        }

        let already_in_cart = self.quantity_of(&unit);
        let total = already_in_cart
            .checked_add(qty)
            .ok_or(CartError::InvalidQuantity(qty))?;

        let check = ledger.check_availability(&unit, total)?;
        if !check.is_satisfied() {
            return Err(CartError::InventoryExceeded {
                unit,
                available: check.available,
                requested: qty,
                already_in_cart,
            });
        }

        match self.line_mut(&unit) {
            Some(line) => line.quantity = total,
            None => self.lines.push(CartLine { unit, quantity: qty }),
        }
        self.touch();

        Ok(CartMutation::new(self.item_count(), total, check.available))
    }

    /// Replace the quantity of an existing line.
    pub fn update<L>(
        &mut self,
        ledger: &L,
        unit: UnitRef,
        new_qty: i64,
    ) -> Result<CartMutation, CartError>
    where
        L: StockLedger + ?Sized,
    {
        if new_qty < 1 {
            return Err(CartError::InvalidQuantity(new_qty));
        }

        let already_in_cart = self
            .line(&unit)
            .map(|l| l.quantity)
            .ok_or(CartError::NotFound(unit))?;

        let check = ledger.check_availability(&unit, new_qty)?;
        if !check.is_satisfied() {
            return Err(CartError::InventoryExceeded {
                unit,
                available: check.available,
                requested: new_qty,
                already_in_cart,
            });
        }

        if let Some(line) = self.line_mut(&unit) {
            line.quantity = new_qty;
        }
        self.touch();

        Ok(CartMutation::new(self.item_count(), new_qty, check.available))
    }

    /// Drop a line. Nothing was reserved, so the ledger is only read to
    /// report what is left; an unreadable unit reports zero.
    pub fn remove<L>(&mut self, ledger: &L, unit: UnitRef) -> Result<CartMutation, CartError>
    where
        L: StockLedger + ?Sized,
    {
        let before = self.lines.len();
        self.lines.retain(|l| l.unit != unit);
        if self.lines.len() == before {
            return Err(CartError::NotFound(unit));
        }
        self.touch();

        let available = ledger.available(&unit).unwrap_or(0);
        Ok(CartMutation::new(self.item_count(), 0, available))
    }

    /// Remove every line. Returns how many units were dropped.
    pub fn clear(&mut self) -> i64 {
        let removed = self.item_count();
        self.lines.clear();
        self.touch();
        removed
    }

    /// Put back lines that were taken out for a placement that failed.
    /// Quantities add onto whatever the buyer put in the cart meanwhile.
    pub fn restore(&mut self, lines: Vec<CartLine>) {
        for taken in lines {
            match self.line_mut(&taken.unit) {
                Some(line) => line.quantity += taken.quantity,
                None => self.lines.push(taken),
            }
        }
        self.touch();
    }

    fn line(&self, unit: &UnitRef) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.unit == unit)
    }

    fn line_mut(&mut self, unit: &UnitRef) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| &l.unit == unit)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
