use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use supplyflow_orders::OrderId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(place_order).get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id/status", post(transition_order))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::PlaceOrderRequest>,
) -> axum::response::Response {
    match services.factory.place(ctx.actor(), body.into_placement()) {
        Ok(order) => (
            StatusCode::CREATED,
            Json(dto::OrderView::for_role(order, ctx.role())),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(query): Query<dto::ListOrdersQuery>,
) -> axum::response::Response {
    let status = match query.status.as_deref().map(dto::parse_status).transpose() {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.queries.list(ctx.actor(), status) {
        Ok(orders) => {
            let views: Vec<_> = orders
                .into_iter()
                .map(|o| dto::OrderView::for_role(o, ctx.role()))
                .collect();
            Json(views).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id = match dto::parse_id("order id", &id) {
        Ok(id) => OrderId(id),
        Err(resp) => return resp,
    };

    match services.queries.get(ctx.actor(), order_id) {
        Ok(order) => Json(dto::OrderView::for_role(order, ctx.role())).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn transition_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::TransitionRequest>,
) -> axum::response::Response {
    let order_id = match dto::parse_id("order id", &id) {
        Ok(id) => OrderId(id),
        Err(resp) => return resp,
    };
    let to = match dto::parse_status(&body.status) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services
        .machine
        .transition(ctx.actor(), order_id, to, body.tracking_number)
    {
        Ok(order) => Json(dto::OrderView::for_role(order, ctx.role())).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
