use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GraphQLError {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserProfileData {
    #[serde(alias = "allQuestionsCount", default)]
    pub all_questions_count: Vec<DifficultyCount>,
    #[serde(alias = "matchedUser")]
    pub matched_user: Option<MatchedUser>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MatchedUser {
    pub profile: UserProfile,
    #[serde(alias = "submitStats")]
    pub submit_stats: SubmitStats,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserProfile {
    pub ranking: Option<i64>,
    pub reputation: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubmitStats {
    #[serde(alias = "acSubmissionNum")]
    pub ac_submission_num: Vec<DifficultyCount>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DifficultyCount {
    pub difficulty: String,
    pub count: i64,
    pub submissions: Option<i64>,
}

/// Solved counts of a LeetCode user, normalized for display and caching.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeStats {
    pub total_solved: i64,
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
    pub ranking: i64,
    #[serde(default)]
    pub total_questions: i64,
}

impl LeetCodeStats {
    /// Build the snapshot from a profile query answer.
    ///
    /// Counts are looked up by difficulty label rather than by position.
    pub fn from_profile(data: &UserProfileData, user: &MatchedUser) -> Self {
        let solved = |label: &str| {
            user.submit_stats
                .ac_submission_num
                .iter()
                .find(|count| count.difficulty.eq_ignore_ascii_case(label))
                .map(|count| count.count)
                .unwrap_or(0)
        };
        let total_questions = data
            .all_questions_count
            .iter()
            .find(|count| count.difficulty.eq_ignore_ascii_case("All"))
            .map(|count| count.count)
            .unwrap_or(0);

        LeetCodeStats {
            total_solved: solved("All"),
            easy: solved("Easy"),
            medium: solved("Medium"),
            hard: solved("Hard"),
            ranking: user.profile.ranking.unwrap_or(0),
            total_questions,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubmissionList {
    pub count: Option<i64>,
    #[serde(default)]
    pub submission: Vec<Submission>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Submission {
    pub title: String,
    #[serde(alias = "titleSlug")]
    pub title_slug: String,
    #[serde(alias = "statusDisplay")]
    pub status_display: String,
    pub timestamp: Option<String>,
    pub lang: Option<String>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.status_display == "Accepted"
    }

    pub fn url(&self) -> String {
        format!("https://leetcode.com/problems/{}/", self.title_slug)
    }
}
