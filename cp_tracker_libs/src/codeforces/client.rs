use crate::{codeforces::model::*, platform::FetchError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

type Result<T> = std::result::Result<T, FetchError>;

/// Read-only view of the Codeforces API used by the tracker.
#[async_trait]
pub trait CodeforcesApi: Send + Sync {
    async fn user_info(&self, handle: &str) -> Result<UserInfo>;
    /// Most recent submissions first, at most `count` of them.
    async fn user_status(&self, handle: &str, count: u32) -> Result<Vec<Submission>>;
    /// Rated participations, oldest first.
    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>>;
    async fn contest_list(&self) -> Result<Vec<Contest>>;
    async fn contest_problems(&self, contest_id: i64) -> Result<Vec<Problem>>;
}

pub struct CodeforcesClient {
    user_info_url: Url,
    user_status_url: Url,
    user_rating_url: Url,
    contest_list_url: Url,
    contest_standings_url: Url,
    submissions_timeout: Duration,
    client: Client,
}

impl CodeforcesClient {
    pub fn new(api_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(api_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().gzip(true).build()?;
        Ok(CodeforcesClient {
            user_info_url: base_url.join("user.info")?,
            user_status_url: base_url.join("user.status")?,
            user_rating_url: base_url.join("user.rating")?,
            contest_list_url: base_url.join("contest.list")?,
            contest_standings_url: base_url.join("contest.standings")?,
            submissions_timeout: Duration::from_secs(10),
            client,
        })
    }

    pub fn with_submissions_timeout(mut self, timeout: Duration) -> Self {
        self.submissions_timeout = timeout;
        self
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let res = request.send().await?;
        let status = res.status();
        let body = res.text().await?;

        // Failed calls still answer with the envelope (usually 400) and a comment.
        let envelope: CodeforcesResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                if status.is_success() {
                    return Err(FetchError::DeserializeError(e));
                }
                return Err(FetchError::StatusError(status.as_u16()));
            }
        };

        match envelope.status.as_str() {
            "OK" => envelope.result.ok_or_else(|| {
                FetchError::ParseError(String::from("`result` is missing in OK response"))
            }),
            _ => {
                let comment = envelope
                    .comment
                    .unwrap_or_else(|| format!("status {}", status.as_u16()));
                tracing::debug!("Codeforces API rejected the call: {}", comment);
                Err(FetchError::ApiError(comment))
            }
        }
    }
}

#[async_trait]
impl CodeforcesApi for CodeforcesClient {
    async fn user_info(&self, handle: &str) -> Result<UserInfo> {
        let request = self
            .client
            .get(self.user_info_url.clone())
            .query(&[("handles", handle)]);
        let users: Vec<UserInfo> = self.call(request).await?;

        users
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::UserNotFound(handle.to_string()))
    }

    async fn user_status(&self, handle: &str, count: u32) -> Result<Vec<Submission>> {
        let request = self
            .client
            .get(self.user_status_url.clone())
            .query(&[
                ("handle", handle),
                ("from", "1"),
                ("count", count.to_string().as_ref()),
            ])
            .timeout(self.submissions_timeout);
        self.call(request).await
    }

    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>> {
        let request = self
            .client
            .get(self.user_rating_url.clone())
            .query(&[("handle", handle)]);
        self.call(request).await
    }

    async fn contest_list(&self) -> Result<Vec<Contest>> {
        let request = self
            .client
            .get(self.contest_list_url.clone())
            .query(&[("gym", "false")]);
        self.call(request).await
    }

    async fn contest_problems(&self, contest_id: i64) -> Result<Vec<Problem>> {
        // A one-row page is enough; only the problem set is needed.
        let request = self.client.get(self.contest_standings_url.clone()).query(&[
            ("contestId", contest_id.to_string().as_ref()),
            ("from", "1"),
            ("count", "1"),
        ]);
        let standings: Standings = self.call(request).await?;

        Ok(standings.problems)
    }
}
