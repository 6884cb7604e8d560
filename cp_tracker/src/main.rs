mod cmd;
mod config;
mod error;
mod modules;
mod types;

use crate::cmd::{
    migrate::{self, MigrateArgs},
    seed::{self, SeedArgs},
    server::{self, ServerArgs},
    sync::{self, SyncArgs},
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, process::ExitCode, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, time::OffsetTime},
};

#[derive(Debug, Parser)]
#[command(name = "cp_tracker")]
#[command(about = "Competitive programming tracker backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Server(ServerArgs),
    /// Reconcile upsolve queues once.
    Sync(SyncArgs),
    /// Load the problem catalog or the topics from a JSON file.
    Seed(SeedArgs),
    /// Apply database migrations and exit.
    Migrate(MigrateArgs),
}

fn main() -> ExitCode {
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or(String::from("info"));
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_str(&log_level).unwrap_or(LevelFilter::INFO).into())
        .from_env_lossy();
    let format = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_timer(OffsetTime::local_rfc_3339().expect("couldn't determine local time offset"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(format)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    let result = match Cli::parse().command {
        Commands::Server(args) => runtime.block_on(server::run(args)),
        Commands::Sync(args) => runtime.block_on(sync::run(args)),
        Commands::Seed(args) => runtime.block_on(seed::run(args)),
        Commands::Migrate(args) => runtime.block_on(migrate::run(args)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("command failed: {:?}", e);
            ExitCode::FAILURE
        }
    }
}
