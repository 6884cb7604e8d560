pub mod auth;
pub mod problem;
pub mod profile;
pub mod sync;
pub mod topic;
pub mod upsolve;
pub mod user;

use crate::modules::state::AppState;
use axum::{extract::Extension, http::StatusCode};
use std::sync::Arc;

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(Extension(state): Extension<Arc<AppState>>) -> StatusCode {
    match state.users.ping().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("database is not ready: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
