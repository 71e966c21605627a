use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::api::job_application::models::{
    JobApplication, JobApplicationChanges, JobApplicationId, NewJobApplication, UserId,
};
use crate::db::models::JobApplicationRow;
use crate::db::store::{JobApplicationStore, StoreError};

const COLUMNS: &str =
    r#"id, user_id, link, title, "position", company, status, notes, created_at, updated_at"#;

/// Postgres-backed repository for job application operations
pub struct PgJobApplicationRepository {
    pool: Pool<Postgres>,
}

impl PgJobApplicationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobApplicationStore for PgJobApplicationRepository {
    async fn insert(&self, new: NewJobApplication) -> Result<JobApplication, StoreError> {
        debug!(
            "Inserting job application: user_id={}, company={}, status={}",
            new.user_id, new.company, new.status
        );

        let query = format!(
            r#"
            INSERT INTO job_applications (user_id, link, title, "position", company, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, JobApplicationRow>(&query)
            .bind(new.user_id)
            .bind(new.link)
            .bind(new.title)
            .bind(new.position)
            .bind(new.company)
            .bind(new.status.as_str())
            .bind(new.notes)
            .fetch_one(&self.pool)
            .await?;

        debug!("Job application inserted with id={}", row.id);
        row.try_into()
    }

    async fn find(&self, id: JobApplicationId) -> Result<Option<JobApplication>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM job_applications WHERE id = $1");

        sqlx::query_as::<_, JobApplicationRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(JobApplication::try_from)
            .transpose()
    }

    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<JobApplication>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM job_applications WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, JobApplicationRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        debug!("Fetched {} job applications for user_id={}", rows.len(), user_id);
        rows.into_iter().map(JobApplication::try_from).collect()
    }

    async fn update(
        &self,
        id: JobApplicationId,
        changes: JobApplicationChanges,
    ) -> Result<Option<JobApplication>, StoreError> {
        debug!("Updating job application id={}: {:?}", id, changes);

        // $7 says whether notes were supplied at all, so that NULL can clear them
        let query = format!(
            r#"
            UPDATE job_applications SET
                link = COALESCE($2, link),
                title = COALESCE($3, title),
                "position" = COALESCE($4, "position"),
                company = COALESCE($5, company),
                status = COALESCE($6, status),
                notes = CASE WHEN $7 THEN $8 ELSE notes END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        let notes_supplied = changes.notes.is_some();
        sqlx::query_as::<_, JobApplicationRow>(&query)
            .bind(id)
            .bind(changes.link)
            .bind(changes.title)
            .bind(changes.position)
            .bind(changes.company)
            .bind(changes.status.map(|s| s.as_str()))
            .bind(notes_supplied)
            .bind(changes.notes.flatten())
            .fetch_optional(&self.pool)
            .await?
            .map(JobApplication::try_from)
            .transpose()
    }

    async fn delete(&self, id: JobApplicationId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM job_applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let rows_affected = result.rows_affected();
        debug!("Delete of job application id={} affected {} rows", id, rows_affected);
        Ok(rows_affected > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
