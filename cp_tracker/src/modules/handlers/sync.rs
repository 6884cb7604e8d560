use crate::{
    error::AppResult,
    modules::{auth::AuthUser, state::AppState, sync::SyncResults},
};
use axum::{extract::Extension, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub results: SyncResults,
}

pub async fn sync(
    user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> AppResult<Json<SyncResponse>> {
    let results = state.sync.sync_user(user.id).await?;
    Ok(Json(SyncResponse {
        message: String::from("Sync Complete"),
        results,
    }))
}
