use super::Result;
use crate::types::tables::{NewUpsolve, UpsolveEntry};
use async_trait::async_trait;
use cp_tracker_libs::Platform;
use sqlx::postgres::PgPool;
use std::collections::HashSet;

#[async_trait]
pub trait UpsolveRepository: Send + Sync {
    /// Queue of the user, newest first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<UpsolveEntry>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UpsolveEntry>>;
    /// Inserts the entry unless `(user, platform, problem_id)` is already queued.
    /// Returns `None` in that case.
    async fn create(&self, entry: &NewUpsolve) -> Result<Option<UpsolveEntry>>;
    async fn delete_by_id(&self, id: i64) -> Result<bool>;
    async fn delete_by_key(&self, user_id: i64, platform: Platform, problem_id: &str)
        -> Result<bool>;
    async fn problem_ids(&self, user_id: i64, platform: Platform) -> Result<HashSet<String>>;
}

pub struct PgUpsolveRepository {
    pool: PgPool,
}

impl PgUpsolveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UpsolveRepository for PgUpsolveRepository {
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<UpsolveEntry>> {
        let entries = sqlx::query_as::<_, UpsolveEntry>(
            r#"
            SELECT * FROM "upsolves"
            WHERE "user_id" = $1
            ORDER BY "added_at" DESC, "id" DESC;
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UpsolveEntry>> {
        let entry = sqlx::query_as::<_, UpsolveEntry>(r#"SELECT * FROM "upsolves" WHERE "id" = $1;"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn create(&self, entry: &NewUpsolve) -> Result<Option<UpsolveEntry>> {
        let entry = sqlx::query_as::<_, UpsolveEntry>(
            r#"
            INSERT INTO "upsolves" ("user_id", "platform", "problem_id", "title", "url", "difficulty")
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ("user_id", "platform", "problem_id") DO NOTHING
            RETURNING *;
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.platform.as_str())
        .bind(&entry.problem_id)
        .bind(&entry.title)
        .bind(&entry.url)
        .bind(entry.difficulty)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM "upsolves" WHERE "id" = $1;"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_key(
        &self,
        user_id: i64,
        platform: Platform,
        problem_id: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"DELETE FROM "upsolves" WHERE "user_id" = $1 AND "platform" = $2 AND "problem_id" = $3;"#,
        )
        .bind(user_id)
        .bind(platform.as_str())
        .bind(problem_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn problem_ids(&self, user_id: i64, platform: Platform) -> Result<HashSet<String>> {
        let ids: Vec<(String,)> = sqlx::query_as(
            r#"SELECT "problem_id" FROM "upsolves" WHERE "user_id" = $1 AND "platform" = $2;"#,
        )
        .bind(user_id)
        .bind(platform.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
