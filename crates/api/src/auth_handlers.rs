use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, MessageBody};
use crate::middleware::AuthClaims;
use crate::state::AppState;
use flockkit_auth::Claims;
use flockkit_store::{Account, AccountKind};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub account: Account,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<AccountKind>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = payload.role.as_deref().unwrap_or(kind.as_str());
    let account = state
        .service
        .register(kind, &payload.email, &payload.username, &payload.password, role)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<AccountKind>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, account) = state
        .service
        .login(kind, &payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse { token, account }))
}

pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<AccountKind>,
    Json(payload): Json<RequestResetRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    state
        .service
        .request_password_reset(kind, &payload.email)
        .await?;

    Ok(Json(MessageBody {
        message: "Password reset email sent".to_string(),
    }))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    state
        .service
        .perform_password_reset(&payload.token, &payload.new_password)
        .await?;

    Ok(Json(MessageBody {
        message: "Password has been reset".to_string(),
    }))
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    state.service.verify_email(&token).await?;

    Ok(Json(MessageBody {
        message: "Email verified".to_string(),
    }))
}

/// Bearer-protected probe returning the caller's session claims.
pub async fn me(AuthClaims(claims): AuthClaims) -> Json<Claims> {
    Json(claims)
}
