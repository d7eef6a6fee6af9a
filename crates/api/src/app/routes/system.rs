use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::context::ActorContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<ActorContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": ctx.user_id().to_string(),
        "role": ctx.role(),
    }))
}
