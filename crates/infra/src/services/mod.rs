//! Application services: the operations the HTTP layer calls.
//!
//! Each service checks the caller's permission first, then composes the
//! domain types with the stores. None of them hold state of their own.

pub mod cart_service;
pub mod catalog_admin;
pub mod error;
pub mod order_factory;
pub mod order_queries;
pub mod state_machine;

pub use cart_service::{CartService, CartView, CartViewLine};
pub use catalog_admin::CatalogAdmin;
pub use error::ServiceError;
pub use order_factory::{OrderFactory, PlacementRequest};
pub use order_queries::OrderQueries;
pub use state_machine::OrderStateMachine;
