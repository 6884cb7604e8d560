use crate::{
    config::{AppConfig, PlatformConfig},
    modules::{
        repository::{
            PgProblemRepository, PgTopicRepository, PgUpsolveRepository, PgUserRepository,
            ProblemRepository, TopicRepository, UpsolveRepository, UserRepository,
        },
        stats::StatsAggregator,
        sync::SyncEngine,
    },
};
use anyhow::{Context, Result};
use cp_tracker_libs::{
    codeforces::{CodeforcesApi, CodeforcesClient},
    leetcode::{LeetCodeApi, LeetCodeClient},
};
use sqlx::postgres::PgPool;
use std::sync::Arc;

/// Everything a request handler needs, shared behind one `Arc`.
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserRepository>,
    pub upsolves: Arc<dyn UpsolveRepository>,
    pub problems: Arc<dyn ProblemRepository>,
    pub topics: Arc<dyn TopicRepository>,
    pub sync: SyncEngine,
    pub stats: StatsAggregator,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        upsolves: Arc<dyn UpsolveRepository>,
        problems: Arc<dyn ProblemRepository>,
        topics: Arc<dyn TopicRepository>,
        codeforces: Arc<dyn CodeforcesApi>,
        leetcode: Arc<dyn LeetCodeApi>,
    ) -> Self {
        let sync = SyncEngine::new(
            users.clone(),
            upsolves.clone(),
            codeforces.clone(),
            leetcode.clone(),
            config.sync.clone(),
        );
        let stats = StatsAggregator::new(
            users.clone(),
            codeforces,
            leetcode,
            config.sync.codeforces_submissions,
        );

        Self {
            config,
            users,
            upsolves,
            problems,
            topics,
            sync,
            stats,
        }
    }

    /// Postgres repositories and live platform clients.
    pub fn connect(config: AppConfig, pool: PgPool) -> Result<Self> {
        let (codeforces, leetcode) = platform_clients(&config.platforms)?;
        Ok(Self::new(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgUpsolveRepository::new(pool.clone())),
            Arc::new(PgProblemRepository::new(pool.clone())),
            Arc::new(PgTopicRepository::new(pool)),
            codeforces,
            leetcode,
        ))
    }
}

pub fn platform_clients(
    config: &PlatformConfig,
) -> Result<(Arc<dyn CodeforcesApi>, Arc<dyn LeetCodeApi>)> {
    let codeforces = CodeforcesClient::new(&config.codeforces_api_url)
        .with_context(|| {
            let message = format!(
                "couldn't create Codeforces client. check the value of CODEFORCES_API_URL `{}`",
                config.codeforces_api_url
            );
            tracing::error!(message);
            message
        })?
        .with_submissions_timeout(config.codeforces_submissions_timeout);

    let leetcode = LeetCodeClient::new(
        &config.leetcode_graphql_url,
        &config.leetcode_submissions_url,
    )
    .with_context(|| {
        let message = "couldn't create LeetCode client. check the values of LEETCODE_GRAPHQL_URL and LEETCODE_SUBMISSIONS_URL";
        tracing::error!(message);
        message
    })?;

    Ok((Arc::new(codeforces), Arc::new(leetcode)))
}
