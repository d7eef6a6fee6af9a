//! Infrastructure layer: in-memory adapters, the order orchestration
//! services built on top of them, the notification worker and configuration.

pub mod cart_store;
pub mod catalog;
pub mod config;
pub mod notifier;
pub mod order_store;
pub mod services;
pub mod stock;
pub mod workers;


pub use cart_store::InMemoryCartStore;
pub use catalog::InMemoryCatalog;
pub use config::{AppConfig, ConfigError};
pub use notifier::{ChangeNotifier, ORDER_AGGREGATE_TYPE, OrderEnvelope};
pub use order_store::{InMemoryOrderStore, OrderStore, StoreError};
pub use services::{
    CartService, CartView, CartViewLine, CatalogAdmin, OrderFactory, OrderQueries,
    OrderStateMachine, PlacementRequest, ServiceError,
};
pub use stock::InMemoryStockLedger;
