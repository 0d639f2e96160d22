//! Helpers shared by the per-cell integration tests.

use axum::body::Body;
use axum::http::Request;
use uuid::Uuid;

use shared_models::auth::{Actor, Role};

pub fn test_actor(role: Role) -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role,
    }
}

pub fn bearer_for(actor: &Actor) -> String {
    format!("Bearer {}:{}", actor.role, actor.id)
}

/// JSON request carrying the actor's bearer token, for `Router::oneshot`.
pub fn authed_json_request(
    method: &str,
    uri: &str,
    actor: &Actor,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", bearer_for(actor))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_get(uri: &str, actor: &Actor) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", bearer_for(actor))
        .body(Body::empty())
        .unwrap()
}
