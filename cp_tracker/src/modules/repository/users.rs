use super::{classify, Result};
use crate::types::{
    profile::{CodeforcesStats, LastContest, LeetCodeStats, MissedContest},
    tables::{NewUser, ProfileUpdate, User},
};
use async_trait::async_trait;
use sqlx::{postgres::PgPool, types::Json};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn ping(&self) -> Result<()>;
    /// Fails with `Conflict` when the username or email is taken.
    async fn create(&self, user: &NewUser) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Users with at least one syncable handle.
    async fn list_linked(&self) -> Result<Vec<User>>;
    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<Option<User>>;
    async fn save_codeforces_stats(&self, id: i64, stats: &CodeforcesStats) -> Result<()>;
    async fn save_leetcode_stats(&self, id: i64, stats: &LeetCodeStats) -> Result<()>;
    /// Replaces the missed contest list wholesale. `last_contest` of `None` keeps the stored one.
    async fn save_contest_snapshot(
        &self,
        id: i64,
        last_contest: Option<&LastContest>,
        missed_contests: &[MissedContest],
    ) -> Result<()>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO "users" ("username", "email", "password_hash")
            VALUES ($1, $2, $3)
            RETURNING *;
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "user"))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "users" WHERE "id" = $1;"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(r#"SELECT * FROM "users" WHERE LOWER("email") = LOWER($1);"#)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "users" WHERE "username" = $1;"#)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_linked(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM "users"
            WHERE TRIM("codeforces_handle") <> '' OR TRIM("leetcode_handle") <> ''
            ORDER BY "id";
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE "users" SET
                "codeforces_handle" = COALESCE($2, "codeforces_handle"),
                "leetcode_handle" = COALESCE($3, "leetcode_handle"),
                "codechef_handle" = COALESCE($4, "codechef_handle"),
                "name" = COALESCE($5, "name"),
                "bio" = COALESCE($6, "bio"),
                "updated_at" = NOW()
            WHERE "id" = $1
            RETURNING *;
            "#,
        )
        .bind(id)
        .bind(&update.codeforces)
        .bind(&update.leetcode)
        .bind(&update.codechef)
        .bind(&update.name)
        .bind(&update.bio)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn save_codeforces_stats(&self, id: i64, stats: &CodeforcesStats) -> Result<()> {
        sqlx::query(r#"UPDATE "users" SET "codeforces_stats" = $2 WHERE "id" = $1;"#)
            .bind(id)
            .bind(Json(stats))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_leetcode_stats(&self, id: i64, stats: &LeetCodeStats) -> Result<()> {
        sqlx::query(r#"UPDATE "users" SET "leetcode_stats" = $2 WHERE "id" = $1;"#)
            .bind(id)
            .bind(Json(stats))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_contest_snapshot(
        &self,
        id: i64,
        last_contest: Option<&LastContest>,
        missed_contests: &[MissedContest],
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE "users" SET
                "last_contest" = COALESCE($2, "last_contest"),
                "missed_contests" = $3
            WHERE "id" = $1;
            "#,
        )
        .bind(id)
        .bind(last_contest.map(Json))
        .bind(Json(missed_contests))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
