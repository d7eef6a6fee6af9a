use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde_json::json;

use supplyflow_catalog::{ProductId, SellableUnit, UnitRef, VariantId};
use supplyflow_core::AggregateId;
use supplyflow_infra::ServiceError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/units", post(register_unit))
        .route("/units/restock", post(restock_unit))
}

pub async fn register_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::RegisterUnitRequest>,
) -> axum::response::Response {
    let product = match body.unit_id.as_deref() {
        Some(raw) => match dto::parse_id("unit_id", raw) {
            Ok(id) => ProductId::new(id),
            Err(resp) => return resp,
        },
        None => ProductId::new(AggregateId::new()),
    };
    let unit = match body.variant_id.as_deref() {
        Some(raw) => match dto::parse_id("variant_id", raw) {
            Ok(id) => UnitRef::variant(product, VariantId::new(id)),
            Err(resp) => return resp,
        },
        None => UnitRef::product(product),
    };

    let listed = match SellableUnit::with_adjustment(
        unit,
        body.name,
        body.base_price,
        body.price_adjustment,
    ) {
        Ok(u) => u,
        Err(e) => return errors::service_error_to_response(ServiceError::from(e)),
    };

    match services.admin.register_unit(ctx.actor(), listed, body.on_hand) {
        Ok((unit, on_hand)) => (
            StatusCode::CREATED,
            Json(json!({
                "unit": unit,
                "on_hand": on_hand,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn restock_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::RestockRequest>,
) -> axum::response::Response {
    let unit = match dto::parse_unit(&body.unit_id, body.variant_id.as_deref()) {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match services.admin.restock(ctx.actor(), unit, body.quantity) {
        Ok(on_hand) => Json(json!({ "unit": unit, "on_hand": on_hand })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
