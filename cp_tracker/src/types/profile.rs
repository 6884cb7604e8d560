use serde::{Deserialize, Serialize};

pub use cp_tracker_libs::leetcode::LeetCodeStats;

/// Live Codeforces numbers, refreshed on every profile view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesStats {
    pub handle: String,
    pub rating: i32,
    pub rank: String,
    pub max_rating: i32,
    pub problems_solved: i64,
}

/// Most recent rated contest, written only by the reconciliation engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LastContest {
    pub contest_id: i64,
    pub contest_name: String,
    pub time_seconds: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MissedContest {
    pub id: i64,
    pub name: String,
    pub start_time: i64,
}
