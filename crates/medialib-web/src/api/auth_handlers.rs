use std::time::Instant;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use medialib_core::Principal;

use crate::auth::jwt;
use crate::dto::{LoginRequest, LoginResponse, SuccessResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if !state.config.has_auth() {
        // Dev mode: every caller is anonymous
        let (token, expires_at) = jwt::create_token(
            &state.config.auth.jwt_secret,
            state.config.auth.jwt_ttl_hours,
            Principal::ANONYMOUS,
        )?;
        return Ok(Json(LoginResponse { token, expires_at }));
    }

    let user_config = state
        .config
        .find_user(&body.username)
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

    let password = body.password;
    let hash = user_config.password_hash.clone();

    let valid = tokio::task::spawn_blocking(move || {
        crate::auth::password::verify_password(&hash, &password)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if !valid {
        tracing::warn!("Failed login attempt for user: {}", body.username);
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    tracing::info!("Password verified successfully for user: {}", body.username);

    let (token, expires_at) = jwt::create_token(
        &state.config.auth.jwt_secret,
        state.config.auth.jwt_ttl_hours,
        &body.username,
    )?;
    Ok(Json(LoginResponse { token, expires_at }))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token {
        if let Ok(claims) = jwt::verify_token(&state.config.auth.jwt_secret, token) {
            state
                .revoked_tokens
                .insert(claims.jti.clone(), Instant::now());
            tracing::info!(
                "Token revoked for user: {} (jti: {})",
                claims.sub,
                claims.jti
            );
        }
    }

    Ok(Json(SuccessResponse::ok()))
}
