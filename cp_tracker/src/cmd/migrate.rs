use crate::{cmd::connect, config::DatabaseConfig};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct MigrateArgs {}

pub async fn run(_args: MigrateArgs) -> Result<()> {
    let config = DatabaseConfig::from_env()?;
    let pool = connect(&config).await?;
    pool.close().await;

    tracing::info!("database schema is up to date");
    Ok(())
}
