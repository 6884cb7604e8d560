use crate::{leetcode::model::*, platform::FetchError};
use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client, Response, Url};
use serde_json::json;

type Result<T> = std::result::Result<T, FetchError>;

const PROFILE_QUERY: &str = r#"
query getUserProfile($username: String!) {
  allQuestionsCount {
    difficulty
    count
  }
  matchedUser(username: $username) {
    profile {
      ranking
      reputation
    }
    submitStats {
      acSubmissionNum {
        difficulty
        count
        submissions
      }
    }
  }
}
"#;

// The GraphQL endpoint rejects requests without a browser-like agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[async_trait]
pub trait LeetCodeApi: Send + Sync {
    async fn profile_stats(&self, username: &str) -> Result<LeetCodeStats>;
    /// Most recent submissions first, at most `limit` of them.
    async fn recent_submissions(&self, username: &str, limit: u32) -> Result<Vec<Submission>>;
}

pub struct LeetCodeClient {
    graphql_url: Url,
    submissions_url: Url,
    client: Client,
}

impl LeetCodeClient {
    /// - graphql_url: the official GraphQL endpoint
    /// - submissions_url: base url of the unofficial submissions mirror
    pub fn new(graphql_url: &str, submissions_url: &str) -> Result<Self> {
        let graphql_url = Url::parse(graphql_url)?;
        let mut submissions_url = Url::parse(submissions_url)?;
        if !submissions_url.path().ends_with('/') {
            let path = format!("{}/", submissions_url.path());
            submissions_url.set_path(&path);
        }
        let submissions_url = submissions_url.join("userSubmission/")?;

        let client = Client::builder().gzip(true).build()?;
        Ok(LeetCodeClient {
            graphql_url,
            submissions_url,
            client,
        })
    }

    /// Mirror url of one user. The name is pushed as a single encoded path segment, so it
    /// can never leave `userSubmission/` on the configured host.
    fn user_submissions_url(&self, username: &str) -> Result<Url> {
        if matches!(username.trim(), "" | "." | "..") {
            return Err(FetchError::UserNotFound(username.to_string()));
        }

        let mut url = self.submissions_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::ParseError(String::from("submissions url cannot be a base")))?
            .pop_if_empty()
            .push(username);
        Ok(url)
    }

    async fn read_body(res: Response) -> Result<String> {
        match res.error_for_status_ref() {
            Ok(_) => Ok(res.text().await?),
            Err(_) => Err(FetchError::StatusError(res.status().as_u16())),
        }
    }
}

#[async_trait]
impl LeetCodeApi for LeetCodeClient {
    async fn profile_stats(&self, username: &str) -> Result<LeetCodeStats> {
        let res = self
            .client
            .post(self.graphql_url.clone())
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .json(&json!({
                "query": PROFILE_QUERY,
                "variables": { "username": username },
            }))
            .send()
            .await?;
        let body = Self::read_body(res).await?;
        let response: GraphQLResponse<UserProfileData> = serde_json::from_str(&body)?;

        let data = response.data.ok_or_else(|| {
            let message = response
                .errors
                .first()
                .map(|error| error.message.clone())
                .unwrap_or_else(|| String::from("`data` is missing in GraphQL response"));
            FetchError::ParseError(message)
        })?;
        let user = data
            .matched_user
            .as_ref()
            .ok_or_else(|| FetchError::UserNotFound(username.to_string()))?;

        Ok(LeetCodeStats::from_profile(&data, user))
    }

    async fn recent_submissions(&self, username: &str, limit: u32) -> Result<Vec<Submission>> {
        let url = self.user_submissions_url(username)?;
        let res = self
            .client
            .get(url)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;
        let body = Self::read_body(res).await?;
        let list: SubmissionList = serde_json::from_str(&body)?;

        Ok(list.submission)
    }
}
