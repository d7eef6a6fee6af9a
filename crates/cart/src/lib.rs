//! Buyer shopping cart.
//!
//! A cart never holds stock. Every mutation re-checks the ledger and refuses
//! quantities that exceed what is on hand *right now*, but that answer can go
//! stale; order placement re-validates and reserves atomically.

pub mod cart;

pub use cart::{Cart, CartError, CartLine, CartMutation};
