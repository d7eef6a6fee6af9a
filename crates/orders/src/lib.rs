//! Order lifecycle domain module.
//!
//! This crate contains the order aggregate and its status machine as pure,
//! deterministic domain logic (no IO, no storage). Stock side effects are
//! *described* by the transition table and carried out by the caller.

pub mod error;
pub mod notification;
pub mod order;
pub mod status;

pub use error::{LineShortfall, OrderError};
pub use notification::OrderNotification;
pub use order::{
    DeliveryPreference, Order, OrderCommand, OrderEvent, OrderId, OrderItem, PlaceOrder,
    RecordTracking, ShippingInfo, StatusChanged, TrackingNumberRecorded, TransitionStatus,
};
pub use status::{OrderStatus, StockEffect, TRANSITIONS, TransitionRule};
