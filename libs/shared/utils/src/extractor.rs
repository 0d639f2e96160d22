use axum::{body::Body, http::Request, middleware::Next, response::Response};
use uuid::Uuid;

use shared_models::auth::{Actor, Role};
use shared_models::error::AppError;

/// Parse a `role:uuid` bearer token into an [`Actor`]. Authentication proper
/// happens outside this core; the token arriving here is already-verified
/// attribution from that layer.
pub fn parse_actor_token(token: &str) -> Result<Actor, AppError> {
    let (role, id) = token
        .split_once(':')
        .ok_or_else(|| AppError::Auth("Malformed actor token".to_string()))?;

    let role: Role = role
        .parse()
        .map_err(|e: String| AppError::Auth(e))?;
    let id = Uuid::parse_str(id)
        .map_err(|_| AppError::Auth("Actor token carries an invalid id".to_string()))?;

    Ok(Actor { id, role })
}

/// Middleware attaching the calling [`Actor`] as a request extension.
pub async fn actor_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Authorization must be a bearer token".to_string()))?;

    let actor = parse_actor_token(token)?;
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}
