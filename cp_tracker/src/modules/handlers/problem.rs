use crate::{
    modules::{
        auth::AuthUser,
        repository::{ProblemQuery, ProblemSort},
        state::AppState,
    },
    types::tables::Problem,
};
use axum::{
    async_trait,
    extract::{Extension, FromRequestParts},
    http::StatusCode,
    Json,
};
use cp_tracker_libs::{
    api::{
        deserialize_optional_comma_separated, RangeFilterParameter, SearchResultResponse,
        SearchResultStats,
    },
    Platform,
};
use http::request::Parts;
use once_cell::sync::Lazy;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::{collections::HashSet, sync::Arc};
use tokio::time::Instant;
use validator::{Validate, ValidationError};

const DEFAULT_LIMIT: u32 = 50;

static VALID_SORT_OPTIONS: Lazy<HashSet<&str>> =
    Lazy::new(|| HashSet::from(["difficulty", "-difficulty", "title", "-title"]));

fn validate_sort_field(value: &str) -> Result<(), ValidationError> {
    if VALID_SORT_OPTIONS.contains(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid sort field"))
    }
}

fn validate_platforms(values: &Vec<String>) -> Result<(), ValidationError> {
    if values
        .iter()
        .all(|value| value.parse::<Platform>().is_ok())
    {
        Ok(())
    } else {
        Err(ValidationError::new("invalid platform"))
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq, Clone, Default)]
pub struct ProblemSearchParameter {
    #[validate(length(max = 200))]
    pub keyword: Option<String>,
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<u32>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterParameter>,
    #[validate(custom = "validate_sort_field")]
    pub sort: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq, Clone, Default)]
pub struct FilterParameter {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_comma_separated"
    )]
    #[validate(custom = "validate_platforms")]
    platform: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_comma_separated"
    )]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    difficulty: Option<RangeFilterParameter>,
}

impl ProblemSearchParameter {
    pub fn to_query(&self) -> ProblemQuery {
        let rows = self.limit.unwrap_or(DEFAULT_LIMIT);
        let page = self.page.unwrap_or(1);
        let filter = self.filter.clone().unwrap_or_default();
        let platforms = filter
            .platform
            .unwrap_or_default()
            .iter()
            .filter_map(|platform| platform.parse::<Platform>().ok())
            .map(|platform| platform.to_string())
            .collect();

        ProblemQuery {
            keyword: self.keyword.clone(),
            platforms,
            tags: filter.tags.unwrap_or_default(),
            difficulty_from: filter.difficulty.as_ref().and_then(|range| range.from),
            difficulty_to: filter.difficulty.as_ref().and_then(|range| range.to),
            sort: self
                .sort
                .as_ref()
                .and_then(|sort| sort.parse::<ProblemSort>().ok())
                .unwrap_or_default(),
            limit: rows as i64,
            offset: (page as i64 - 1) * rows as i64,
        }
    }
}

pub struct ValidatedProblemSearchParameter<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedProblemSearchParameter<T>
where
    T: DeserializeOwned + Validate + Serialize + Default + Clone,
    S: Send + Sync,
{
    type Rejection = (
        StatusCode,
        Json<SearchResultResponse<T, ProblemResponse>>,
    );

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let value: T = serde_structuredqs::from_str(query).map_err(|rejection| {
            tracing::error!("Parsing error: {}", rejection);
            (
                StatusCode::BAD_REQUEST,
                Json(SearchResultResponse::<T, ProblemResponse>::error(
                    T::default(),
                    format!("invalid format query string: [{}]", rejection),
                )),
            )
        })?;

        value.validate().map_err(|rejection| {
            tracing::error!("Validation error: {}", rejection);
            (
                StatusCode::BAD_REQUEST,
                Json(SearchResultResponse::<T, ProblemResponse>::error(
                    value.clone(),
                    format!("Validation error: [{}]", rejection).replace('\n', ", "),
                )),
            )
        })?;

        Ok(ValidatedProblemSearchParameter(value))
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProblemResponse {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub rating: Option<i32>,
    pub tags: Vec<String>,
    pub url: String,
}

impl From<Problem> for ProblemResponse {
    fn from(problem: Problem) -> Self {
        Self {
            id: problem.problem_id,
            name: problem.title,
            platform: problem.platform,
            rating: problem.difficulty,
            tags: problem.tags,
            url: problem.url,
        }
    }
}

pub async fn search_problem(
    _user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    ValidatedProblemSearchParameter(params): ValidatedProblemSearchParameter<
        ProblemSearchParameter,
    >,
) -> (
    StatusCode,
    Json<SearchResultResponse<ProblemSearchParameter, ProblemResponse>>,
) {
    let start_process = Instant::now();

    let (total, problems) = match state.problems.search(&params.to_query()).await {
        Ok(res) => res,
        Err(e) => {
            tracing::error!("request failed cause: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchResultResponse::error(params, "unexpected error")),
            );
        }
    };

    let time: u32 = Instant::now().duration_since(start_process).as_millis() as u32;
    let total: u32 = total as u32;
    let count: u32 = problems.len() as u32;
    let rows: u32 = params.limit.unwrap_or(DEFAULT_LIMIT);
    let index: u32 = params.page.unwrap_or(1);
    let pages: u32 = (total + rows - 1) / rows;

    tracing::info!(
        target: "querylog",
        "elapsed_time={} hits={} params={}",
        time, total, serde_json::to_string(&params).unwrap_or(String::from(""))
    );

    let stats = SearchResultStats {
        time,
        total,
        index,
        count,
        pages,
        params,
    };

    (
        StatusCode::OK,
        Json(SearchResultResponse {
            stats,
            items: problems.into_iter().map(ProblemResponse::from).collect(),
            message: None,
        }),
    )
}
