use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use supplyflow_auth::Role;
use supplyflow_core::UserId;

use crate::app::errors::json_error;
use crate::context::ActorContext;

/// Header carrying the authenticated user's id (UUID).
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the user's role (`buyer`, `warehouse` or `admin`).
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Turn the identity headers set by the upstream auth layer into an
/// [`ActorContext`] request extension. Missing or malformed headers are 401.
pub async fn identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let actor = extract_actor(req.headers())
        .map_err(|reason| json_error(StatusCode::UNAUTHORIZED, "unauthenticated", reason))?;

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

fn extract_actor(headers: &HeaderMap) -> Result<ActorContext, &'static str> {
    let user_id: UserId = header(headers, USER_ID_HEADER)?
        .parse()
        .map_err(|_| "x-user-id is not a valid id")?;

    let role: Role = header(headers, USER_ROLE_HEADER)?
        .parse()
        .map_err(|_| "x-user-role is not a known role")?;

    Ok(ActorContext::new(user_id, role))
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, &'static str> {
    let value = headers
        .get(name)
        .ok_or("missing identity header")?
        .to_str()
        .map_err(|_| "identity header is not valid text")?
        .trim();

    if value.is_empty() {
        return Err("missing identity header");
    }
    Ok(value)
}
