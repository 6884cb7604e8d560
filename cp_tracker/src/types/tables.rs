use crate::types::profile::{CodeforcesStats, LastContest, LeetCodeStats, MissedContest};
use chrono::{DateTime, Utc};
use cp_tracker_libs::Platform;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub bio: String,
    pub codeforces_handle: String,
    pub leetcode_handle: String,
    pub codechef_handle: String,
    pub codeforces_stats: Option<Json<CodeforcesStats>>,
    pub leetcode_stats: Option<Json<LeetCodeStats>>,
    pub last_contest: Option<Json<LastContest>>,
    pub missed_contests: Json<Vec<MissedContest>>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Linked handle on the platform; an empty string means not linked.
    pub fn handle(&self, platform: Platform) -> Option<&str> {
        let handle = match platform {
            Platform::Codeforces => self.codeforces_handle.trim(),
            Platform::LeetCode => self.leetcode_handle.trim(),
        };
        if handle.is_empty() {
            None
        } else {
            Some(handle)
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial profile edit; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub codeforces: Option<String>,
    pub leetcode: Option<String>,
    pub codechef: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsolveEntry {
    pub id: i64,
    pub user_id: i64,
    pub platform: String,
    pub problem_id: String,
    pub title: String,
    pub url: String,
    pub difficulty: i32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUpsolve {
    pub user_id: i64,
    pub platform: Platform,
    pub problem_id: String,
    pub title: String,
    pub url: String,
    pub difficulty: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Problem {
    pub id: i64,
    pub platform: String,
    pub problem_id: String,
    pub title: String,
    pub url: String,
    pub difficulty: Option<i32>,
    pub tags: Vec<String>,
    pub acceptance_rate: Option<f64>,
}

/// Catalog entry as it appears in a seed file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProblem {
    pub platform: Platform,
    pub problem_id: String,
    pub title: String,
    pub url: String,
    pub difficulty: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub acceptance_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicProblem {
    pub name: String,
    pub url: String,
    pub difficulty: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub tier: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub content: String,
    pub code_template: Option<String>,
    pub problems: Json<Vec<TopicProblem>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTopic {
    pub slug: String,
    pub title: String,
    pub tier: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
    pub content: String,
    pub code_template: Option<String>,
    #[serde(default)]
    pub problems: Vec<TopicProblem>,
}
