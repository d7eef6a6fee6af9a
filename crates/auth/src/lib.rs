//! `supplyflow-auth` — role-based authorization boundary.
//!
//! Authentication happens upstream; this crate only models *who* is acting
//! (an [`Actor`] with one [`Role`]) and what each role may do.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, authorize, permissions_for};
pub use permissions::Permission;
pub use principal::Actor;
pub use roles::Role;
