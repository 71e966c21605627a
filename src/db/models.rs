use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::job_application::models::JobApplication;
use crate::db::store::StoreError;

/// Database representation of a job application with all fields
#[derive(Debug, FromRow)]
pub struct JobApplicationRow {
    pub id: i64,
    pub user_id: i64,
    pub link: String,
    pub title: String,
    pub position: String,
    pub company: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobApplicationRow> for JobApplication {
    type Error = StoreError;

    fn try_from(row: JobApplicationRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|reason| StoreError::CorruptRow {
            id: row.id,
            reason,
        })?;

        Ok(JobApplication {
            id: row.id,
            user_id: row.user_id,
            link: row.link,
            title: row.title,
            position: row.position,
            company: row.company,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
