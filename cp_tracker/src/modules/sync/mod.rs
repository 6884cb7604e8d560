pub mod codeforces;
pub mod leetcode;
pub mod policy;

use crate::{
    modules::repository::{StoreError, UpsolveRepository, UserRepository},
    types::tables::{NewUpsolve, User},
};
use chrono::Utc;
use cp_tracker_libs::{
    codeforces::{model::Problem, CodeforcesApi},
    leetcode::LeetCodeApi,
    FetchError, Platform,
};
use futures::{stream, StreamExt, TryStreamExt};
use policy::DivisionPolicy;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch platform data")]
    FetchError(#[from] FetchError),
    #[error("failed to apply reconciliation")]
    StoreError(#[from] StoreError),
    #[error("user {0} not found")]
    UserNotFound(i64),
}

type Result<T> = std::result::Result<T, SyncError>;

/// A problem the engine wants in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueCandidate {
    pub problem_id: String,
    pub title: String,
    pub url: String,
    pub difficulty: i32,
}

/// Queue changes decided for one platform, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    pub to_add: Vec<QueueCandidate>,
    pub to_remove: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlatformDelta {
    pub added: u32,
    pub removed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncResults {
    pub codeforces: PlatformDelta,
    pub leetcode: PlatformDelta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub recent_contests: usize,
    pub missed_contest_days: i64,
    pub codeforces_submissions: u32,
    pub leetcode_submissions: u32,
    pub standings_concurrency: usize,
    pub policy: DivisionPolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            recent_contests: 10,
            missed_contest_days: 30,
            codeforces_submissions: 1000,
            leetcode_submissions: 20,
            standings_concurrency: 2,
            policy: DivisionPolicy::default(),
        }
    }
}

pub struct SyncEngine {
    users: Arc<dyn UserRepository>,
    upsolves: Arc<dyn UpsolveRepository>,
    codeforces: Arc<dyn CodeforcesApi>,
    leetcode: Arc<dyn LeetCodeApi>,
    settings: SyncSettings,
}

impl SyncEngine {
    pub fn new(
        users: Arc<dyn UserRepository>,
        upsolves: Arc<dyn UpsolveRepository>,
        codeforces: Arc<dyn CodeforcesApi>,
        leetcode: Arc<dyn LeetCodeApi>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            users,
            upsolves,
            codeforces,
            leetcode,
            settings,
        }
    }

    pub async fn sync_user(&self, user_id: i64) -> Result<SyncResults> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(SyncError::UserNotFound(user_id))?;
        self.sync(&user).await
    }

    /// Reconciles both platforms concurrently.
    ///
    /// A fetch failure on one platform becomes a zero delta for it; store failures abort the sync.
    pub async fn sync(&self, user: &User) -> Result<SyncResults> {
        tracing::info!("Start to sync user {}.", user.username);
        let (codeforces, leetcode) = tokio::join!(
            self.sync_platform(user, Platform::Codeforces),
            self.sync_platform(user, Platform::LeetCode),
        );
        let results = SyncResults {
            codeforces: codeforces?,
            leetcode: leetcode?,
        };
        tracing::info!(
            "User {} synced: codeforces +{}/-{}, leetcode +{}/-{}",
            user.username,
            results.codeforces.added,
            results.codeforces.removed,
            results.leetcode.added,
            results.leetcode.removed
        );

        Ok(results)
    }

    async fn sync_platform(&self, user: &User, platform: Platform) -> Result<PlatformDelta> {
        let handle = match user.handle(platform) {
            Some(handle) => handle,
            None => return Ok(PlatformDelta::default()),
        };

        let result = match platform {
            Platform::Codeforces => self.sync_codeforces(user.id, handle).await,
            Platform::LeetCode => self.sync_leetcode(user.id, handle).await,
        };

        match result {
            Err(SyncError::FetchError(e)) => {
                tracing::warn!(
                    "{} sync for user {} skipped: {:?}",
                    platform,
                    user.username,
                    e
                );
                Ok(PlatformDelta::default())
            }
            other => other,
        }
    }

    async fn sync_codeforces(&self, user_id: i64, handle: &str) -> Result<PlatformDelta> {
        let (history, contests) = tokio::try_join!(
            self.codeforces.user_rating(handle),
            self.codeforces.contest_list()
        )?;

        let missed = codeforces::missed_contests(
            &history,
            &contests,
            Utc::now().timestamp(),
            self.settings.missed_contest_days,
        );
        let last = codeforces::last_contest(&history);
        self.users
            .save_contest_snapshot(user_id, last.as_ref(), &missed)
            .await?;

        let window = codeforces::recent_window(&history, self.settings.recent_contests);
        let api = &self.codeforces;
        let contest_ids: Vec<i64> = window.iter().map(|contest| contest.contest_id).collect();
        let standings = stream::iter(contest_ids)
            .map(move |contest_id| async move {
                api.contest_problems(contest_id)
                    .await
                    .map(|problems| (contest_id, problems))
            })
            .buffer_unordered(self.settings.standings_concurrency.max(1))
            .try_collect::<HashMap<i64, Vec<Problem>>>();
        let (submissions, problems) = tokio::try_join!(
            self.codeforces
                .user_status(handle, self.settings.codeforces_submissions),
            standings
        )?;

        let solved = codeforces::solved_keys(&submissions);
        let queued = self
            .upsolves
            .problem_ids(user_id, Platform::Codeforces)
            .await?;
        let plan = codeforces::plan_queue(
            &window,
            &problems,
            &solved,
            &queued,
            &self.settings.policy,
        );

        self.apply(user_id, Platform::Codeforces, plan).await
    }

    async fn sync_leetcode(&self, user_id: i64, handle: &str) -> Result<PlatformDelta> {
        let submissions = self
            .leetcode
            .recent_submissions(handle, self.settings.leetcode_submissions)
            .await?;
        let queued = self.upsolves.problem_ids(user_id, Platform::LeetCode).await?;
        let plan = leetcode::plan_queue(&submissions, &queued);

        self.apply(user_id, Platform::LeetCode, plan).await
    }

    /// Writes the plan. Counts only rows that actually changed.
    async fn apply(
        &self,
        user_id: i64,
        platform: Platform,
        plan: Reconciliation,
    ) -> Result<PlatformDelta> {
        let mut delta = PlatformDelta::default();

        for problem_id in plan.to_remove.iter() {
            if self
                .upsolves
                .delete_by_key(user_id, platform, problem_id)
                .await?
            {
                delta.removed += 1;
            }
        }

        for candidate in plan.to_add.into_iter() {
            let entry = NewUpsolve {
                user_id,
                platform,
                problem_id: candidate.problem_id,
                title: candidate.title,
                url: candidate.url,
                difficulty: candidate.difficulty,
            };
            if self.upsolves.create(&entry).await?.is_some() {
                delta.added += 1;
            }
        }

        Ok(delta)
    }
}
