use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};

use supplyflow_infra::ServiceError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(view_cart).delete(clear_cart))
        .route("/items", post(add_item).put(update_item).delete(remove_item))
}

pub async fn view_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.carts.view(ctx.actor()) {
        Ok(view) => Json(view).into_response(),
        Err(e) => cart_error(e),
    }
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::UnitRequest>,
) -> axum::response::Response {
    let unit = match dto::parse_unit(&body.unit_id, body.variant_id.as_deref()) {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match services
        .carts
        .add(ctx.actor(), unit, body.quantity.unwrap_or(1))
    {
        Ok(m) => Json(dto::CartResponse::from_mutation(m, "added to cart")).into_response(),
        Err(e) => cart_error(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::UnitRequest>,
) -> axum::response::Response {
    let unit = match dto::parse_unit(&body.unit_id, body.variant_id.as_deref()) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let Some(quantity) = body.quantity else {
        return cart_error(ServiceError::Validation("quantity is required".into()));
    };

    match services.carts.update(ctx.actor(), unit, quantity) {
        Ok(m) => Json(dto::CartResponse::from_mutation(m, "cart updated")).into_response(),
        Err(e) => cart_error(e),
    }
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::UnitRequest>,
) -> axum::response::Response {
    let unit = match dto::parse_unit(&body.unit_id, body.variant_id.as_deref()) {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match services.carts.remove(ctx.actor(), unit) {
        Ok(m) => Json(dto::CartResponse::from_mutation(m, "removed from cart")).into_response(),
        Err(e) => cart_error(e),
    }
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.carts.clear(ctx.actor()) {
        Ok(removed) => Json(json!({
            "success": true,
            "removed": removed,
            "cart_count": 0,
        }))
        .into_response(),
        Err(e) => cart_error(e),
    }
}

/// Cart failures keep the storefront's `success` flag alongside the usual
/// error fields.
fn cart_error(err: ServiceError) -> axum::response::Response {
    let (status, mut body) = errors::service_error_body(&err);
    if let Value::Object(fields) = &mut body {
        fields.insert("success".into(), Value::Bool(false));
    }
    (status, Json(body)).into_response()
}
