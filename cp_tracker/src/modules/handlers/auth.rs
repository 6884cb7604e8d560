use super::user::{current_user, UserResponse};
use crate::{
    error::{AppError, AppResult},
    modules::{
        auth::{jwt, password, AuthUser},
        repository::StoreError,
        state::AppState,
    },
    types::tables::{NewUser, User},
};
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const USER_EXISTS: &str = "User already exists";
const INVALID_CREDENTIALS: &str = "Invalid Credentials";

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

fn issue_token(state: &AppState, user: &User) -> AppResult<Json<TokenResponse>> {
    let token = jwt::generate_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))?;
    Ok(Json(TokenResponse { token }))
}

pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    body.validate().map_err(|e| {
        AppError::BadRequest(format!("Validation error: [{}]", e).replace('\n', ", "))
    })?;
    let username = body.username.trim().to_string();
    let email = body.email.trim().to_lowercase();

    if state.users.find_by_email(&email).await?.is_some()
        || state.users.find_by_username(&username).await?.is_some()
    {
        return Err(AppError::BadRequest(String::from(USER_EXISTS)));
    }

    let password_hash = password::hash_password(&body.password)
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))?;
    let user = match state
        .users
        .create(&NewUser {
            username,
            email,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::Conflict(_)) => return Err(AppError::BadRequest(String::from(USER_EXISTS))),
        Err(e) => return Err(e.into()),
    };
    tracing::info!("user {} registered", user.username);

    issue_token(&state, &user)
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    body.validate()
        .map_err(|_| AppError::BadRequest(String::from(INVALID_CREDENTIALS)))?;

    let user = state
        .users
        .find_by_email(body.email.trim())
        .await?
        .ok_or_else(|| AppError::BadRequest(String::from(INVALID_CREDENTIALS)))?;

    let verified = password::verify_password(&body.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("failed to verify password: {}", e)))?;
    if !verified {
        return Err(AppError::BadRequest(String::from(INVALID_CREDENTIALS)));
    }

    issue_token(&state, &user)
}

pub async fn get_user(
    user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> AppResult<Json<UserResponse>> {
    let user = current_user(&state, &user).await?;
    Ok(Json(UserResponse::from(user)))
}
