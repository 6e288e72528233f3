//! Bearer-token session middleware.
//!
//! Extracts `Authorization: Bearer <token>`, verifies it against the
//! identity provider, and injects the resulting [`clerk::AuthSession`] into
//! request extensions for downstream handlers. A missing or rejected token
//! answers `401 {error: "Unauthorized"}` before the handler runs.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use crate::state::AppState;
use crate::types::ErrorRes;

/// Require a valid identity-provider session.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = match bearer_token(req.headers()) {
        Some(token) => match state.clerk.verify_token(token).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("session verification failed: {e}");
                return unauthorized();
            }
        },
        None => return unauthorized(),
    };

    req.extensions_mut().insert(session);
    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorRes::new("Unauthorized")),
    )
        .into_response()
}
