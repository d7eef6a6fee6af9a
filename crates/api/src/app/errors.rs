use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use tracing::error;

use supplyflow_auth::AuthzError;
use supplyflow_cart::CartError;
use supplyflow_infra::{ServiceError, StoreError};
use supplyflow_inventory::StockError;
use supplyflow_orders::OrderError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Status code and JSON body for a service failure.
///
/// Business outcomes carry the context a client needs to explain them
/// (which unit, how many are left, which transition was refused).
pub fn service_error_body(err: &ServiceError) -> (StatusCode, Value) {
    let message = err.to_string();
    let (status, code, context) = match err {
        ServiceError::Forbidden(AuthzError::Forbidden { role, permission }) => (
            StatusCode::FORBIDDEN,
            "forbidden",
            json!({ "role": role, "permission": permission }),
        ),

        ServiceError::Cart(CartError::InventoryExceeded {
            unit,
            available,
            requested,
            already_in_cart,
        }) => (
            StatusCode::CONFLICT,
            "inventory_exceeded",
            json!({
                "unit": unit,
                "available": available,
                "requested": requested,
                "already_in_cart": already_in_cart,
            }),
        ),
        ServiceError::Cart(CartError::InvalidQuantity(_)) => {
            (StatusCode::BAD_REQUEST, "invalid_quantity", Value::Null)
        }
        ServiceError::Cart(CartError::NotFound(unit)) => (
            StatusCode::NOT_FOUND,
            "not_in_cart",
            json!({ "unit": unit }),
        ),
        ServiceError::Cart(CartError::Stock(stock)) => return stock_error_body(stock, message),

        ServiceError::Order(OrderError::IllegalTransition { from, to }) => (
            StatusCode::CONFLICT,
            "illegal_transition",
            json!({ "from": from, "to": to }),
        ),
        ServiceError::Order(OrderError::Forbidden { role, from, to }) => (
            StatusCode::FORBIDDEN,
            "forbidden_transition",
            json!({ "role": role, "from": from, "to": to }),
        ),
        ServiceError::Order(OrderError::InventoryExceeded(lines)) => (
            StatusCode::CONFLICT,
            "inventory_exceeded",
            json!({ "lines": lines }),
        ),
        ServiceError::Order(OrderError::EmptyCart) => {
            (StatusCode::BAD_REQUEST, "empty_cart", Value::Null)
        }
        ServiceError::Order(OrderError::Validation(_)) | ServiceError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "validation_error", Value::Null)
        }

        ServiceError::Stock(stock) => return stock_error_body(stock, message),

        ServiceError::Store(StoreError::Concurrency(_)) => {
            (StatusCode::CONFLICT, "conflict", Value::Null)
        }
        ServiceError::Store(StoreError::Duplicate(_)) => {
            (StatusCode::CONFLICT, "duplicate", Value::Null)
        }
        ServiceError::Store(StoreError::NotFound(_)) | ServiceError::NotFound(_) => {
            (StatusCode::NOT_FOUND, "not_found", Value::Null)
        }
        ServiceError::Store(StoreError::Unavailable(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable", Value::Null)
        }
    };

    (status, body(code, message, context))
}

fn stock_error_body(err: &StockError, message: String) -> (StatusCode, Value) {
    let (status, code, context) = match err {
        StockError::InsufficientStock {
            unit,
            available,
            requested,
        } => (
            StatusCode::CONFLICT,
            "insufficient_stock",
            json!({ "unit": unit, "available": available, "requested": requested }),
        ),
        StockError::UnknownUnit(unit) => (
            StatusCode::NOT_FOUND,
            "unknown_unit",
            json!({ "unit": unit }),
        ),
        StockError::InvalidQuantity(_) => {
            (StatusCode::BAD_REQUEST, "invalid_quantity", Value::Null)
        }
        StockError::Unavailable(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "stock_unavailable",
            Value::Null,
        ),
    };
    (status, body(code, message, context))
}

fn body(code: &'static str, message: String, context: Value) -> Value {
    let mut body = json!({ "error": code, "message": message });
    if let (Value::Object(fields), Value::Object(extra)) = (&mut body, context) {
        fields.extend(extra);
    }
    body
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    if err.is_fatal() {
        error!(error = %err, "service failure");
    }
    let (status, body) = service_error_body(&err);
    (status, axum::Json(body)).into_response()
}
