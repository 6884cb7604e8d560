use serde::{Deserialize, Deserializer, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ErrorResponse {
    pub msg: String,
}

impl ErrorResponse {
    pub fn new(msg: impl ToString) -> Self {
        Self {
            msg: msg.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct MessageResponse {
    pub msg: String,
}

/// Half-open integer range `[from, to)`; either bound may be omitted.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq, Clone)]
pub struct RangeFilterParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<i32>,
}

impl RangeFilterParameter {
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, value: i32) -> bool {
        self.from.map(|from| from <= value).unwrap_or(true)
            && self.to.map(|to| value < to).unwrap_or(true)
    }
}

/// Accepts `a,b,c` in a query string as a list.
pub fn deserialize_optional_comma_separated<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|value| {
        value
            .split(',')
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect()
    }))
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse<P, D>
where
    P: Serialize,
    D: Serialize,
{
    pub stats: SearchResultStats<P>,
    pub items: Vec<D>,
    pub message: Option<String>,
}

impl<P, D> SearchResultResponse<P, D>
where
    P: Serialize,
    D: Serialize,
{
    pub fn error(params: P, message: impl ToString) -> Self {
        Self {
            stats: SearchResultStats {
                time: 0,
                total: 0,
                index: 0,
                pages: 0,
                count: 0,
                params: params,
            },
            items: Vec::new(),
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResultStats<P> {
    pub time: u32,
    pub total: u32,
    pub index: u32,
    pub pages: u32,
    pub count: u32,
    pub params: P,
}
