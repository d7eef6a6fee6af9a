use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "cart.write"). The wildcard `"*"`
/// grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission(Cow::Borrowed("*"));
    pub const CART_WRITE: Permission = Permission(Cow::Borrowed("cart.write"));
    pub const ORDERS_PLACE: Permission = Permission(Cow::Borrowed("orders.place"));
    pub const ORDERS_READ_OWN: Permission = Permission(Cow::Borrowed("orders.read.own"));
    pub const ORDERS_READ_ALL: Permission = Permission(Cow::Borrowed("orders.read.all"));
    pub const ORDERS_TRANSITION: Permission = Permission(Cow::Borrowed("orders.transition"));
    pub const CATALOG_MANAGE: Permission = Permission(Cow::Borrowed("catalog.manage"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
