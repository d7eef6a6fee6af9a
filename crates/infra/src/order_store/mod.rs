//! Order persistence boundary.
//!
//! Orders are stored as whole snapshots. Every write after the first is a
//! compare-and-save against the version the caller loaded, which is what
//! makes a status transition one atomic read-modify-write.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryOrderStore;
pub use r#trait::{OrderStore, StoreError};
