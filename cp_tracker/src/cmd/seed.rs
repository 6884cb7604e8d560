use crate::{
    cmd::{connect, SeedDomain},
    config::DatabaseConfig,
    modules::repository::{
        PgProblemRepository, PgTopicRepository, ProblemRepository, TopicRepository,
    },
    types::tables::{NewProblem, NewTopic},
};
use anyhow::{Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct SeedArgs {
    domain: SeedDomain,
    file: PathBuf,
}

async fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = tokio::fs::read_to_string(path).await.with_context(|| {
        let message = format!("couldn't read seed file {}", path.display());
        tracing::error!(message);
        message
    })?;

    serde_json::from_str(&content).with_context(|| {
        let message = format!("{} is not a JSON array of seed records", path.display());
        tracing::error!(message);
        message
    })
}

pub async fn run(args: SeedArgs) -> Result<()> {
    let config = DatabaseConfig::from_env()?;
    let pool = connect(&config).await?;

    let count = match args.domain {
        SeedDomain::Problems => {
            let problems: Vec<NewProblem> = load(&args.file).await?;
            PgProblemRepository::new(pool.clone())
                .upsert_many(&problems)
                .await?
        }
        SeedDomain::Topics => {
            let topics: Vec<NewTopic> = load(&args.file).await?;
            PgTopicRepository::new(pool.clone())
                .upsert_many(&topics)
                .await?
        }
    };
    pool.close().await;

    tracing::info!("{} {} seeded from {}", count, args.domain, args.file.display());
    Ok(())
}
