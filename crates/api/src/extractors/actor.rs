//! The acting user, taken from the `x-actor-id` header.
//!
//! Authentication happens in front of this service; the header only carries
//! who is acting, for audit fields and logs.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde_json::json;

use kasa_shared::types::UserId;

/// Header carrying the acting user's ID.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Extractor for the acting user on mutating routes.
///
/// ```ignore
/// async fn handler(actor: Actor) -> impl IntoResponse {
///     let user_id = actor.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub UserId);

impl Actor {
    /// Returns the acting user's ID.
    #[must_use]
    pub const fn user_id(self) -> UserId {
        self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_HEADER) else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "ACTOR_REQUIRED",
                    "message": format!("{ACTOR_HEADER} header is required")
                })),
            ));
        };

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<UserId>().ok())
            .map(Actor)
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "INVALID_ACTOR",
                        "message": format!("{ACTOR_HEADER} must be a UUID")
                    })),
                )
            })
    }
}
