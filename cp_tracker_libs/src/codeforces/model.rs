use serde::{Deserialize, Serialize};

/// Envelope every Codeforces API method responds with.
#[derive(Serialize, Deserialize, Debug)]
pub struct CodeforcesResponse<T> {
    pub status: String,
    pub comment: Option<String>,
    pub result: Option<T>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub handle: String,
    pub rating: Option<i32>,
    pub rank: Option<String>,
    #[serde(alias = "maxRating")]
    pub max_rating: Option<i32>,
    #[serde(alias = "maxRank")]
    pub max_rank: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Problem {
    #[serde(alias = "contestId")]
    pub contest_id: Option<i64>,
    pub index: String,
    pub name: String,
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Problem {
    /// Queue key of the problem, e.g. `1900C`.
    ///
    /// Problems without a contest id (acmsguru archive) have no key.
    pub fn key(&self) -> Option<String> {
        self.contest_id
            .map(|contest_id| format!("{}{}", contest_id, self.index))
    }

    pub fn url(&self) -> Option<String> {
        self.contest_id.map(|contest_id| {
            format!(
                "https://codeforces.com/contest/{}/problem/{}",
                contest_id, self.index
            )
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: i64,
    #[serde(alias = "contestId")]
    pub contest_id: Option<i64>,
    #[serde(alias = "creationTimeSeconds")]
    pub creation_time_seconds: i64,
    pub problem: Problem,
    pub verdict: Option<String>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.verdict.as_deref() == Some("OK")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RatingChange {
    #[serde(alias = "contestId")]
    pub contest_id: i64,
    #[serde(alias = "contestName")]
    pub contest_name: String,
    pub handle: String,
    pub rank: i64,
    #[serde(alias = "ratingUpdateTimeSeconds")]
    pub rating_update_time_seconds: i64,
    #[serde(alias = "oldRating")]
    pub old_rating: i32,
    #[serde(alias = "newRating")]
    pub new_rating: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Contest {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub phase: String,
    #[serde(alias = "durationSeconds")]
    pub duration_seconds: Option<i64>,
    #[serde(alias = "startTimeSeconds")]
    pub start_time_seconds: Option<i64>,
}

impl Contest {
    pub fn is_finished(&self) -> bool {
        self.phase == "FINISHED"
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Standings {
    pub contest: Contest,
    pub problems: Vec<Problem>,
}
