//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances with the same attribute
/// values are interchangeable. `UnitRef` (product + optional variant) and
/// `ShippingInfo` are the main examples in this workspace; an order item is
/// *not* a value object because it belongs to exactly one order.
///
/// Value objects are immutable. To "modify" one, build a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
