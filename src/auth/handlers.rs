use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::types::{AccessClaims, LoginRequest, RefreshRequest, RegisterRequest, SessionTokens};
use crate::shared::{AppError, AppState};

/// POST /auth/login
///
/// Verifies credentials and returns an access + refresh token pair
#[instrument(name = "login", skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    Json(dto): Json<LoginRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    let tokens = state.auth_service.login(&dto.email, &dto.password).await?;
    info!("Login request completed");
    Ok(Json(tokens))
}

/// POST /auth/register
///
/// Creates an account and returns the same pair a login would
#[instrument(name = "register", skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    Json(dto): Json<RegisterRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    let tokens = state
        .auth_service
        .register(&dto.username, &dto.email, &dto.password)
        .await?;
    info!("Registration request completed");
    Ok(Json(tokens))
}

/// POST /auth/refresh
///
/// Exchanges a single-use refresh token for a new pair
#[instrument(name = "refresh", skip(state, dto))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(dto): Json<RefreshRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    let tokens = state.auth_service.refresh(&dto.refresh_token).await?;
    info!("Refresh request completed");
    Ok(Json(tokens))
}

/// POST /auth/logout
///
/// Revokes the presented refresh token; always succeeds for the client
#[instrument(name = "logout", skip(state, dto))]
pub async fn logout(
    State(state): State<AppState>,
    Json(dto): Json<RefreshRequest>,
) -> Result<Json<Value>, AppError> {
    state.auth_service.logout(&dto.refresh_token).await?;
    Ok(Json(json!({ "logged_out": true })))
}

/// GET /auth/profile (protected)
///
/// Echoes the authenticated caller's claims
#[instrument(name = "profile", skip(claims))]
pub async fn profile(Extension(claims): Extension<AccessClaims>) -> Json<AccessClaims> {
    Json(claims)
}
