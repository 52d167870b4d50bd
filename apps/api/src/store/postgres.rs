use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::document::{Document, DocumentRow, GenerationHistoryRecord};
use crate::models::profile::{Education, Experience, Profile, Skill};
use crate::models::user::User;
use crate::store::{Store, StoreError, StoreResult};

// Ties fall back to `seq`, the insertion-order column.
const EXPERIENCES_QUERY: &str = r#"
    SELECT e.id, e.profile_id, e.company, e.position, e.start_date, e.end_date,
           e.is_current, e.description, COALESCE(e.achievements, '{}') AS achievements,
           e.created_at
    FROM experiences e
    JOIN profiles p ON p.id = e.profile_id
    WHERE p.user_id = $1
    ORDER BY e.start_date DESC, e.seq ASC
"#;

const EDUCATION_QUERY: &str = r#"
    SELECT ed.id, ed.profile_id, ed.institution, ed.degree, ed.field_of_study,
           ed.start_date, ed.end_date, ed.gpa, ed.created_at
    FROM education ed
    JOIN profiles p ON p.id = ed.profile_id
    WHERE p.user_id = $1
    ORDER BY ed.start_date DESC, ed.seq ASC
"#;

const SKILLS_QUERY: &str = r#"
    SELECT s.id, s.profile_id, s.name, s.category, s.proficiency_level, s.created_at
    FROM skills s
    JOIN profiles p ON p.id = s.profile_id
    WHERE p.user_id = $1
    ORDER BY s.category, s.name, s.seq ASC
"#;

/// `Store` backed by the service's PostgreSQL database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn load_user(&self, user_id: Uuid) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, free_generations_left, is_premium, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("User {user_id} not found")))
    }

    async fn load_profile(&self, user_id: Uuid) -> StoreResult<Profile> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, phone, location, linkedin_url, github_url, website_url,
                   summary, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Profile for user {user_id} not found")))
    }

    async fn load_experiences(&self, user_id: Uuid) -> StoreResult<Vec<Experience>> {
        let rows = sqlx::query_as::<_, Experience>(EXPERIENCES_QUERY)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn load_education(&self, user_id: Uuid) -> StoreResult<Vec<Education>> {
        let rows = sqlx::query_as::<_, Education>(EDUCATION_QUERY)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn load_skills(&self, user_id: Uuid) -> StoreResult<Vec<Skill>> {
        let rows = sqlx::query_as::<_, Skill>(SKILLS_QUERY)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn save_document(&self, document: &Document) -> StoreResult<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents
                (id, user_id, type, title, content, template_id, job_title,
                 company_name, job_description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            RETURNING id, user_id, type, title, content, template_id, job_title,
                      company_name, job_description, status, created_at, updated_at
            "#,
        )
        .bind(document.id)
        .bind(document.user_id)
        .bind(document.kind.as_str())
        .bind(&document.title)
        .bind(&document.content)
        .bind(&document.template_id)
        .bind(&document.job_title)
        .bind(&document.company_name)
        .bind(&document.job_description)
        .bind(document.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Document::try_from(row).map_err(StoreError::Corrupt)
    }

    async fn save_history_record(&self, record: &GenerationHistoryRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO generation_history
                (id, user_id, document_id, prompt_tokens, completion_tokens,
                 total_cost, generation_time_ms, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.document_id)
        .bind(i64::from(record.prompt_tokens))
        .bind(i64::from(record.completion_tokens))
        .bind(record.total_cost)
        .bind(i64::try_from(record.generation_time_ms).unwrap_or(i64::MAX))
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn decrement_quota(&self, user_id: Uuid) -> StoreResult<bool> {
        // Single conditional UPDATE: concurrent callers serialize on the row lock
        // and the losers see zero affected rows.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET free_generations_left = free_generations_left - 1, updated_at = NOW()
            WHERE id = $1 AND free_generations_left > 0 AND is_premium = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        debug!(
            "Quota decrement for user {user_id} affected {} row(s)",
            result.rows_affected()
        );
        Ok(result.rows_affected() == 1)
    }
}
