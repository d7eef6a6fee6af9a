use axum::{Router, routing::get};

pub mod admin;
pub mod cart;
pub mod orders;
pub mod system;

/// Router for all endpoints that need an identity.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
}
