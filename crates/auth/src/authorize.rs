use thiserror::Error;

use crate::{Actor, Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' lacks permission '{permission}'")]
    Forbidden { role: Role, permission: String },
}

/// Static role→permission policy.
///
/// Admin holds the wildcard. Which status transitions each role may perform
/// is decided by the order transition table, not here; this policy only
/// gates access to the operation at all.
pub fn permissions_for(role: Role) -> Vec<Permission> {
    match role {
        Role::Buyer => vec![
            Permission::CART_WRITE,
            Permission::ORDERS_PLACE,
            Permission::ORDERS_READ_OWN,
        ],
        Role::Warehouse => vec![Permission::ORDERS_READ_ALL, Permission::ORDERS_TRANSITION],
        Role::Admin => vec![Permission::WILDCARD],
    }
}

/// Authorize an actor for one permission.
///
/// - No IO
/// - No business logic (pure policy check)
pub fn authorize(actor: &Actor, required: &Permission) -> Result<(), AuthzError> {
    let granted = permissions_for(actor.role)
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: actor.role,
            permission: required.as_str().to_string(),
        })
    }
}
