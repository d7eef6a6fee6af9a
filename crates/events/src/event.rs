use chrono::{DateTime, Utc};

/// A fact about an order that has already been committed.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, e.g. `orders.order.placed`.
    fn event_type(&self) -> &'static str;

    /// Payload schema version.
    fn version(&self) -> u32;

    fn occurred_at(&self) -> DateTime<Utc>;
}
