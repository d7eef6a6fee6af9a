//! `supplyflow-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog,
//! inventory, cart and order crates (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, UserId};
pub use value_object::ValueObject;
