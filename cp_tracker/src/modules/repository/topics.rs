use super::Result;
use crate::types::tables::{NewTopic, Topic};
use async_trait::async_trait;
use sqlx::{postgres::PgPool, types::Json};

#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Bronze → Platinum, then by title.
    async fn list(&self) -> Result<Vec<Topic>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Topic>>;
    async fn upsert_many(&self, topics: &[NewTopic]) -> Result<usize>;
}

pub struct PgTopicRepository {
    pool: PgPool,
}

impl PgTopicRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TopicRepository for PgTopicRepository {
    async fn list(&self) -> Result<Vec<Topic>> {
        let topics = sqlx::query_as::<_, Topic>(
            r#"
            SELECT * FROM "topics"
            ORDER BY
                CASE "tier"
                    WHEN 'Bronze' THEN 0
                    WHEN 'Silver' THEN 1
                    WHEN 'Gold' THEN 2
                    WHEN 'Platinum' THEN 3
                END,
                "title";
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(topics)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Topic>> {
        let topic = sqlx::query_as::<_, Topic>(r#"SELECT * FROM "topics" WHERE "slug" = $1;"#)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(topic)
    }

    async fn upsert_many(&self, topics: &[NewTopic]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        for topic in topics.iter() {
            let result = sqlx::query(
                r#"
                MERGE INTO "topics"
                USING
                    (VALUES($1, $2, $3, $4::TEXT[], $5, $6, $7::TEXT, $8::JSONB)) AS topic(slug, title, tier, tags, summary, content, code_template, problems)
                ON
                    "topics"."slug" = topic.slug
                WHEN MATCHED THEN
                    UPDATE SET ("title", "tier", "tags", "summary", "content", "code_template", "problems") = (topic.title, topic.tier, topic.tags, topic.summary, topic.content, topic.code_template, topic.problems)
                WHEN NOT MATCHED THEN
                    INSERT ("slug", "title", "tier", "tags", "summary", "content", "code_template", "problems")
                    VALUES (topic.slug, topic.title, topic.tier, topic.tags, topic.summary, topic.content, topic.code_template, topic.problems);
                "#,
            )
            .bind(&topic.slug)
            .bind(&topic.title)
            .bind(&topic.tier)
            .bind(&topic.tags)
            .bind(&topic.summary)
            .bind(&topic.content)
            .bind(&topic.code_template)
            .bind(Json(&topic.problems))
            .execute(&mut tx)
            .await;

            if let Err(e) = result {
                tracing::error!("an error occurred at saving topic {}.", topic.slug);
                tx.rollback().await?;
                return Err(e.into());
            }
        }

        tx.commit().await?;
        Ok(topics.len())
    }
}
