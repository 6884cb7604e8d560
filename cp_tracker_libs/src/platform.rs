use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to request to upstream api")]
    RequestError(#[from] reqwest::Error),
    #[error("upstream api responded with status {0}")]
    StatusError(u16),
    #[error("upstream api rejected the request: {0}")]
    ApiError(String),
    #[error("failed to deserialize JSON data")]
    DeserializeError(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    ParseError(String),
    #[error("user {0} not found")]
    UserNotFound(String),
    #[error("invalid api url given")]
    InvalidUrlError(#[from] url::ParseError),
}

/// External judge a queue entry or cached snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Codeforces,
    #[serde(rename = "leetcode")]
    LeetCode,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Codeforces => "codeforces",
            Platform::LeetCode => "leetcode",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "codeforces" => Ok(Platform::Codeforces),
            "leetcode" => Ok(Platform::LeetCode),
            other => Err(format!("unknown platform `{}`", other)),
        }
    }
}
