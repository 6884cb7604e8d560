use crate::{
    error::{AppError, AppResult},
    modules::{auth::AuthUser, state::AppState},
    types::tables::UpsolveEntry,
};
use axum::{
    extract::{Extension, Path},
    Json,
};
use cp_tracker_libs::api::MessageResponse;
use std::sync::Arc;

/// Newest first.
pub async fn list_upsolves(
    user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> AppResult<Json<Vec<UpsolveEntry>>> {
    let entries = state.upsolves.list_by_user(user.id).await?;
    Ok(Json(entries))
}

/// Owner-only removal. A malformed id is reported like a missing one.
pub async fn delete_upsolve(
    user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let not_found = || AppError::NotFound(String::from("Problem not found"));

    let id: i64 = id.parse().map_err(|_| not_found())?;
    let entry = state.upsolves.find_by_id(id).await?.ok_or_else(not_found)?;
    if entry.user_id != user.id {
        tracing::warn!("user {} tried to delete upsolve {} of another user", user.id, id);
        return Err(AppError::Unauthorized(String::from("User not authorized")));
    }

    state.upsolves.delete_by_id(id).await?;
    Ok(Json(MessageResponse {
        msg: String::from("Problem removed"),
    }))
}
