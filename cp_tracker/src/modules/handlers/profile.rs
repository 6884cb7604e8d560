use super::user::current_user;
use crate::{
    error::AppResult,
    modules::{auth::AuthUser, state::AppState, stats::ProfileStats},
};
use axum::{extract::Extension, Json};
use std::sync::Arc;

/// Live platform numbers over the cached snapshot. Partial upstream failures still answer 200.
pub async fn get_stats(
    user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> AppResult<Json<ProfileStats>> {
    let user = current_user(&state, &user).await?;
    Ok(Json(state.stats.profile_stats(&user).await))
}
