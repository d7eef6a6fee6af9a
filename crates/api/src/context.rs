use supplyflow_auth::{Actor, Role};
use supplyflow_core::UserId;

/// Who is making the request, as asserted by the upstream auth layer.
///
/// This is immutable and present for every route except `/health`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            actor: Actor::new(user_id, role),
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn user_id(&self) -> UserId {
        self.actor.user_id
    }

    pub fn role(&self) -> Role {
        self.actor.role
    }
}
