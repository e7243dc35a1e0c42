use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use medialib_core::Principal;

use crate::error::AppError;
use crate::state::AppState;

pub struct AuthUser {
    pub sub: String,
}

impl AuthUser {
    pub fn principal(&self) -> Principal {
        Principal::new(self.sub.clone())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // If no users are configured, skip auth (dev mode)
        if !state.config.has_auth() {
            return Ok(AuthUser {
                sub: Principal::ANONYMOUS.to_string(),
            });
        }

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

        let claims = super::jwt::verify_token(&state.config.auth.jwt_secret, token)
            .map_err(|_| AppError::Auth("Invalid or expired token".to_string()))?;

        if state.revoked_tokens.contains_key(&claims.jti) {
            return Err(AppError::Auth("Token has been revoked".to_string()));
        }

        Ok(AuthUser { sub: claims.sub })
    }
}
