use async_trait::async_trait;
use thiserror::Error;

use crate::api::job_application::models::{
    JobApplication, JobApplicationChanges, JobApplicationId, NewJobApplication, UserId,
};

/// Failures reported by a persistence backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back onto the domain model
    #[error("job application {id} is corrupt: {reason}")]
    CorruptRow { id: JobApplicationId, reason: String },
}

/// Persistence for the job application collection, keyed by `id`.
///
/// Each method is a single atomic operation against the backend.
#[async_trait]
pub trait JobApplicationStore: Send + Sync {
    async fn insert(&self, new: NewJobApplication) -> Result<JobApplication, StoreError>;

    async fn find(&self, id: JobApplicationId) -> Result<Option<JobApplication>, StoreError>;

    /// All applications owned by `user_id`, most recently created first
    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<JobApplication>, StoreError>;

    /// Applies `changes` and bumps `updated_at`. `None` if the row no longer exists.
    async fn update(
        &self,
        id: JobApplicationId,
        changes: JobApplicationChanges,
    ) -> Result<Option<JobApplication>, StoreError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: JobApplicationId) -> Result<bool, StoreError>;

    /// Connectivity check used by the health endpoints
    async fn ping(&self) -> Result<(), StoreError>;
}
