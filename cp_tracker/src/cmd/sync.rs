use crate::{cmd::connect, config::AppConfig, modules::state::AppState, types::tables::User};
use anyhow::{bail, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Username to reconcile.
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    username: Option<String>,
    /// Reconcile every user with a linked handle.
    #[arg(long)]
    all: bool,
}

/// Syncs every user in turn. A failing user is logged and skipped; their names are returned.
async fn sync_users(state: &AppState, users: &[User]) -> Vec<String> {
    let mut failed = Vec::new();
    for user in users.iter() {
        match state.sync.sync(user).await {
            Ok(results) => tracing::info!(
                "synced {}: codeforces +{}/-{}, leetcode +{}/-{}",
                user.username,
                results.codeforces.added,
                results.codeforces.removed,
                results.leetcode.added,
                results.leetcode.removed
            ),
            Err(e) => {
                tracing::error!("sync of {} failed: {:?}", user.username, e);
                failed.push(user.username.clone());
            }
        }
    }
    failed
}

pub async fn run(args: SyncArgs) -> Result<()> {
    let config = AppConfig::from_env()?;
    let pool = connect(&config.database).await?;
    let state = AppState::connect(config, pool.clone())?;

    let users = match args.username {
        Some(username) => match state.users.find_by_username(&username).await? {
            Some(user) => vec![user],
            None => {
                let message = format!("user {} does not exist", username);
                tracing::error!(message);
                bail!(message);
            }
        },
        None => state.users.list_linked().await?,
    };

    tracing::info!("start sync for {} user(s)", users.len());
    let failed = sync_users(&state, &users).await;
    pool.close().await;

    if !failed.is_empty() {
        let message = format!("sync failed for {} of {} user(s): {}", failed.len(), users.len(), failed.join(", "));
        tracing::error!(message);
        bail!(message);
    }
    Ok(())
}
