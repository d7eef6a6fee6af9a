//! Catalog read model consumed by the ordering core.
//!
//! Catalog management (creating products, editing prices, search) happens
//! elsewhere; this crate only defines what a sellable unit *is* and the
//! read access the cart and order crates need.

pub mod catalog;
pub mod unit;

pub use catalog::Catalog;
pub use unit::{ProductId, SellableUnit, UnitRef, VariantId};
