use super::Result;
use crate::types::tables::{NewProblem, Problem};
use async_trait::async_trait;
use sqlx::{
    postgres::{PgPool, Postgres},
    QueryBuilder,
};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProblemSort {
    #[default]
    Platform,
    DifficultyAsc,
    DifficultyDesc,
    TitleAsc,
    TitleDesc,
}

impl ProblemSort {
    fn order_by(&self) -> &'static str {
        match self {
            ProblemSort::Platform => r#""platform" ASC, "problem_id" ASC"#,
            ProblemSort::DifficultyAsc => r#""difficulty" ASC NULLS LAST, "id" ASC"#,
            ProblemSort::DifficultyDesc => r#""difficulty" DESC NULLS LAST, "id" ASC"#,
            ProblemSort::TitleAsc => r#""title" ASC, "id" ASC"#,
            ProblemSort::TitleDesc => r#""title" DESC, "id" ASC"#,
        }
    }
}

impl FromStr for ProblemSort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "difficulty" => Ok(ProblemSort::DifficultyAsc),
            "-difficulty" => Ok(ProblemSort::DifficultyDesc),
            "title" => Ok(ProblemSort::TitleAsc),
            "-title" => Ok(ProblemSort::TitleDesc),
            other => Err(format!("invalid sort field `{}`", other)),
        }
    }
}

/// Catalog search condition. Empty collections and `None` bounds do not filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProblemQuery {
    pub keyword: Option<String>,
    pub platforms: Vec<String>,
    pub tags: Vec<String>,
    pub difficulty_from: Option<i32>,
    pub difficulty_to: Option<i32>,
    pub sort: ProblemSort,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait ProblemRepository: Send + Sync {
    /// Returns the total hit count and the requested page.
    async fn search(&self, query: &ProblemQuery) -> Result<(i64, Vec<Problem>)>;
    async fn upsert_many(&self, problems: &[NewProblem]) -> Result<usize>;
}

pub struct PgProblemRepository {
    pool: PgPool,
}

impl PgProblemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE metacharacters so the keyword matches literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &ProblemQuery) {
    builder.push(" WHERE TRUE");
    if let Some(keyword) = query.keyword.as_ref().filter(|k| !k.trim().is_empty()) {
        let pattern = format!("%{}%", escape_like(keyword.trim()));
        builder
            .push(r#" AND ("title" ILIKE "#)
            .push_bind(pattern.clone())
            .push(r#" OR "problem_id" ILIKE "#)
            .push_bind(pattern)
            .push(")");
    }
    if !query.platforms.is_empty() {
        builder
            .push(r#" AND "platform" = ANY("#)
            .push_bind(query.platforms.clone())
            .push(")");
    }
    if !query.tags.is_empty() {
        builder
            .push(r#" AND "tags" && "#)
            .push_bind(query.tags.clone());
    }
    if let Some(from) = query.difficulty_from {
        builder.push(r#" AND "difficulty" >= "#).push_bind(from);
    }
    if let Some(to) = query.difficulty_to {
        builder.push(r#" AND "difficulty" < "#).push_bind(to);
    }
}

#[async_trait]
impl ProblemRepository for PgProblemRepository {
    async fn search(&self, query: &ProblemQuery) -> Result<(i64, Vec<Problem>)> {
        let mut count = QueryBuilder::<Postgres>::new(r#"SELECT COUNT(*) FROM "problems""#);
        push_conditions(&mut count, query);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(
            r#"SELECT "id", "platform", "problem_id", "title", "url", "difficulty", "tags", "acceptance_rate" FROM "problems""#,
        );
        push_conditions(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort.order_by())
            .push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);
        let problems: Vec<Problem> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok((total, problems))
    }

    /// MERGE INTO keyed on `(platform, problem_id)`; the whole batch is rolled back on the first failure.
    async fn upsert_many(&self, problems: &[NewProblem]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        for problem in problems.iter() {
            let result = sqlx::query(
                r#"
                MERGE INTO "problems"
                USING
                    (VALUES($1, $2, $3, $4, $5::INTEGER, $6::TEXT[], $7::DOUBLE PRECISION)) AS problem(platform, problem_id, title, url, difficulty, tags, acceptance_rate)
                ON
                    "problems"."platform" = problem.platform AND "problems"."problem_id" = problem.problem_id
                WHEN MATCHED THEN
                    UPDATE SET ("title", "url", "difficulty", "tags", "acceptance_rate", "updated_at") = (problem.title, problem.url, problem.difficulty, problem.tags, problem.acceptance_rate, NOW())
                WHEN NOT MATCHED THEN
                    INSERT ("platform", "problem_id", "title", "url", "difficulty", "tags", "acceptance_rate")
                    VALUES (problem.platform, problem.problem_id, problem.title, problem.url, problem.difficulty, problem.tags, problem.acceptance_rate);
                "#,
            )
            .bind(problem.platform.as_str())
            .bind(&problem.problem_id)
            .bind(&problem.title)
            .bind(&problem.url)
            .bind(problem.difficulty)
            .bind(&problem.tags)
            .bind(problem.acceptance_rate)
            .execute(&mut tx)
            .await;

            if let Err(e) = result {
                tracing::error!(
                    "an error occurred at saving problem {}/{}.",
                    problem.platform,
                    problem.problem_id
                );
                tx.rollback().await?;
                return Err(e.into());
            }
        }

        tx.commit().await?;
        Ok(problems.len())
    }
}
