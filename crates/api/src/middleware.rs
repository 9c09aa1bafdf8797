use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::AppState;
use crate::error::MessageBody;
use flockkit_auth::{Claims, verify_token};

/// Extract and verify the bearer token from the Authorization header.
///
/// One-shot per request: absent header, bad signature, and lapsed expiry
/// all terminate with 403 and are never retried.
pub fn claims_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Claims, Response> {
    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| forbidden("Missing or invalid Authorization header"))?;

    verify_token(token, state.service.jwt_secret())
        .map_err(|_| forbidden("Missing or invalid authorization"))
}

fn forbidden(message: &str) -> Response {
    let body = MessageBody {
        message: message.to_string(),
    };
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

/// Middleware for bearer-protected routes: on success the decoded claims
/// are attached to the request for handlers to pick up.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let claims = claims_from_headers(&state, request.headers())?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Extractor for the verified session claims.
/// Use this in handlers behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl<S> axum::extract::FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<MessageBody>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| {
                let body = MessageBody {
                    message: "Not authenticated".to_string(),
                };
                (StatusCode::FORBIDDEN, Json(body))
            })
    }
}
