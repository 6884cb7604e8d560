pub mod jwt;
pub mod password;

use crate::{error::AppError, modules::state::AppState};
use axum::{async_trait, extract::FromRequestParts};
use http::{header::AUTHORIZATION, request::Parts};
use std::sync::Arc;

const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Caller identity taken from a valid token.
///
/// The token is read from `Authorization: Bearer <token>` first, then from `x-auth-token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let from_authorization = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    let from_custom = || {
        parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
    };

    from_authorization
        .or_else(from_custom)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<Arc<AppState>>()
            .cloned()
            .ok_or_else(|| AppError::Internal(String::from("application state is not installed")))?;

        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized(String::from("No token, authorization denied")))?;

        let claims = jwt::validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::info!("rejected token: {}", e);
            AppError::Unauthorized(String::from("Token is not valid"))
        })?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}
