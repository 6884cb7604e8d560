use crate::{
    error::{AppError, AppResult},
    modules::{auth::AuthUser, state::AppState},
    types::tables::{ProfileUpdate, User},
};
use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

/// Characters a platform handle may contain. Empty unlinks the platform.
static HANDLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]*$").unwrap());

fn validate_handle(value: &str) -> Result<(), ValidationError> {
    let handle = value.trim();
    if HANDLE.is_match(handle) && handle != "." && handle != ".." {
        Ok(())
    } else {
        Err(ValidationError::new("invalid handle"))
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HandlesResponse {
    pub codeforces: String,
    pub leetcode: String,
    pub codechef: String,
}

/// Public view of a user; the credential hash never leaves the server.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub bio: String,
    pub handles: HandlesResponse,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            bio: user.bio,
            handles: HandlesResponse {
                codeforces: user.codeforces_handle,
                leetcode: user.leetcode_handle,
                codechef: user.codechef_handle,
            },
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct ProfileUpdateRequest {
    #[validate(length(max = 64), custom = "validate_handle")]
    pub codeforces: Option<String>,
    #[validate(length(max = 64), custom = "validate_handle")]
    pub leetcode: Option<String>,
    #[validate(length(max = 64), custom = "validate_handle")]
    pub codechef: Option<String>,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
}

impl ProfileUpdateRequest {
    /// Handles are trimmed so that whitespace alone unlinks the platform.
    fn into_update(self) -> ProfileUpdate {
        let trimmed = |value: Option<String>| value.map(|value| value.trim().to_string());
        ProfileUpdate {
            codeforces: trimmed(self.codeforces),
            leetcode: trimmed(self.leetcode),
            codechef: trimmed(self.codechef),
            name: self.name,
            bio: self.bio,
        }
    }
}

pub(crate) async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<User> {
    state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("User not found")))
}

pub async fn get_profile(
    user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> AppResult<Json<UserResponse>> {
    let user = current_user(&state, &user).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Updates only the provided fields. Never triggers a sync.
pub async fn update_profile(
    user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<ProfileUpdateRequest>,
) -> AppResult<Json<UserResponse>> {
    body.validate().map_err(|e| {
        AppError::BadRequest(format!("Validation error: [{}]", e).replace('\n', ", "))
    })?;

    let updated = state
        .users
        .update_profile(user.id, &body.into_update())
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("User not found")))?;
    tracing::info!("profile of {} updated", updated.username);

    Ok(Json(UserResponse::from(updated)))
}
