use crate::{
    modules::repository::UserRepository,
    types::{
        profile::{CodeforcesStats, LastContest, LeetCodeStats, MissedContest},
        tables::User,
    },
};
use cp_tracker_libs::{
    codeforces::{model::Submission, CodeforcesApi},
    leetcode::LeetCodeApi,
    FetchError, Platform,
};
use serde::Serialize;
use std::{collections::HashSet, sync::Arc};

const FETCH_FAILED: &str = "Failed to fetch data";

/// Distinct accepted problems. Archive problems have no contest id and are told apart
/// by name and index instead.
fn solved_count(submissions: &[Submission]) -> i64 {
    submissions
        .iter()
        .filter(|submission| submission.is_accepted())
        .map(|submission| {
            let problem = &submission.problem;
            problem
                .key()
                .unwrap_or_else(|| format!("archive:{}:{}", problem.name, problem.index))
        })
        .collect::<HashSet<String>>()
        .len() as i64
}

/// Per-platform slot of the stats view: the numbers, or an error marker when neither
/// a live answer nor a cached snapshot exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlatformView<T> {
    Available(T),
    Unavailable { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesView {
    #[serde(flatten)]
    pub stats: CodeforcesStats,
    pub last_contest: Option<LastContest>,
    pub missed_contests: Vec<MissedContest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileStats {
    pub codeforces: Option<PlatformView<CodeforcesView>>,
    pub leetcode: Option<PlatformView<LeetCodeStats>>,
}

pub struct StatsAggregator {
    users: Arc<dyn UserRepository>,
    codeforces: Arc<dyn CodeforcesApi>,
    leetcode: Arc<dyn LeetCodeApi>,
    submissions: u32,
}

impl StatsAggregator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        codeforces: Arc<dyn CodeforcesApi>,
        leetcode: Arc<dyn LeetCodeApi>,
        submissions: u32,
    ) -> Self {
        Self {
            users,
            codeforces,
            leetcode,
            submissions,
        }
    }

    /// Live numbers merged over the cached snapshot.
    ///
    /// Never fails: a platform that cannot be fetched falls back to its cache. The contest
    /// snapshot always comes from the stored user since only the sync engine writes it.
    pub async fn profile_stats(&self, user: &User) -> ProfileStats {
        let (codeforces, leetcode) = tokio::join!(self.codeforces_view(user), self.leetcode_view(user));
        ProfileStats {
            codeforces,
            leetcode,
        }
    }

    async fn codeforces_view(&self, user: &User) -> Option<PlatformView<CodeforcesView>> {
        let cached = user.codeforces_stats.as_ref().map(|stats| stats.0.clone());
        let view = |stats: CodeforcesStats| CodeforcesView {
            stats,
            last_contest: user.last_contest.as_ref().map(|contest| contest.0.clone()),
            missed_contests: user.missed_contests.0.clone(),
        };

        let handle = match user.handle(Platform::Codeforces) {
            Some(handle) => handle,
            None => return cached.map(|stats| PlatformView::Available(view(stats))),
        };

        match self.fetch_codeforces(handle, cached.as_ref()).await {
            Ok(stats) => {
                if let Err(e) = self.users.save_codeforces_stats(user.id, &stats).await {
                    tracing::error!("failed to save codeforces stats of {}: {:?}", user.username, e);
                }
                Some(PlatformView::Available(view(stats)))
            }
            Err(e) => {
                tracing::warn!("codeforces stats of {} unavailable: {:?}", user.username, e);
                Some(match cached {
                    Some(stats) => PlatformView::Available(view(stats)),
                    None => PlatformView::Unavailable {
                        error: String::from(FETCH_FAILED),
                    },
                })
            }
        }
    }

    async fn fetch_codeforces(
        &self,
        handle: &str,
        cached: Option<&CodeforcesStats>,
    ) -> Result<CodeforcesStats, FetchError> {
        let info = self.codeforces.user_info(handle).await?;
        let problems_solved = match self.codeforces.user_status(handle, self.submissions).await {
            Ok(submissions) => solved_count(&submissions),
            Err(e) => {
                tracing::warn!("codeforces submissions of {} unavailable: {:?}", handle, e);
                cached.map(|stats| stats.problems_solved).unwrap_or(0)
            }
        };

        Ok(CodeforcesStats {
            handle: info.handle,
            rating: info.rating.unwrap_or(0),
            rank: info.rank.unwrap_or_else(|| String::from("Unrated")),
            max_rating: info.max_rating.unwrap_or(0),
            problems_solved,
        })
    }

    async fn leetcode_view(&self, user: &User) -> Option<PlatformView<LeetCodeStats>> {
        let cached = user.leetcode_stats.as_ref().map(|stats| stats.0.clone());

        let handle = match user.handle(Platform::LeetCode) {
            Some(handle) => handle,
            None => return cached.map(PlatformView::Available),
        };

        match self.leetcode.profile_stats(handle).await {
            Ok(stats) => {
                if let Err(e) = self.users.save_leetcode_stats(user.id, &stats).await {
                    tracing::error!("failed to save leetcode stats of {}: {:?}", user.username, e);
                }
                Some(PlatformView::Available(stats))
            }
            Err(e) => {
                tracing::warn!("leetcode stats of {} unavailable: {:?}", user.username, e);
                Some(match cached {
                    Some(stats) => PlatformView::Available(stats),
                    None => PlatformView::Unavailable {
                        error: String::from(FETCH_FAILED),
                    },
                })
            }
        }
    }
}
