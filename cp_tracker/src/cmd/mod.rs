pub mod migrate;
pub mod seed;
pub mod server;
pub mod sync;

use crate::{config::DatabaseConfig, modules::migration::MIGRATOR};
use anyhow::{Context, Result};
use clap::ValueEnum;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;

#[derive(Debug, ValueEnum, Clone)]
pub enum SeedDomain {
    Problems,
    Topics,
}

impl fmt::Display for SeedDomain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SeedDomain::Problems => write!(f, "problems"),
            SeedDomain::Topics => write!(f, "topics"),
        }
    }
}

/// Opens the pool and brings the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .with_context(|| {
            let message = "Failed to create database connection pool.";
            tracing::error!(message);
            message
        })?;

    MIGRATOR.run(&pool).await.with_context(|| {
        let message = "Failed to apply database migrations.";
        tracing::error!(message);
        message
    })?;

    Ok(pool)
}
