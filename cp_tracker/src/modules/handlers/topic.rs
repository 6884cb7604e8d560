use crate::{
    error::{AppError, AppResult},
    modules::state::AppState,
    types::tables::Topic,
};
use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;

pub async fn list_topics(Extension(state): Extension<Arc<AppState>>) -> AppResult<Json<Vec<Topic>>> {
    Ok(Json(state.topics.list().await?))
}

pub async fn get_topic(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<Topic>> {
    state
        .topics
        .find_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(String::from("Topic not found")))
}
