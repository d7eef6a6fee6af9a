use serde::{Deserialize, Serialize};

use supplyflow_core::UserId;

use crate::Role;

/// An authenticated user acting in exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn buyer(user_id: UserId) -> Self {
        Self::new(user_id, Role::Buyer)
    }

    pub fn warehouse(user_id: UserId) -> Self {
        Self::new(user_id, Role::Warehouse)
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }
}
