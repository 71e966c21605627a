use tracing::{debug, info};

use super::models::{
    JobApplication, JobApplicationChanges, JobApplicationDraft, JobApplicationId,
    NewJobApplication, UserId,
};
use crate::api::error::AppError;
use crate::db::JobApplicationStore;

/// Persists a new application owned by `caller`
///
/// The owner always comes from the caller identity, never from the request body.
///
/// # Returns
/// - `Ok(JobApplication)` - the stored record
/// - `Err(AppError::AuthenticationRequired)` - no caller identity
pub async fn create_job_application(
    store: &dyn JobApplicationStore,
    caller: Option<UserId>,
    draft: JobApplicationDraft,
) -> Result<JobApplication, AppError> {
    let user_id = caller.ok_or(AppError::AuthenticationRequired)?;

    let application = store
        .insert(NewJobApplication::owned_by(user_id, draft))
        .await?;

    info!(
        "Created job application id={} for user_id={}",
        application.id, user_id
    );
    Ok(application)
}

/// Every application owned by `caller`, most recently created first
pub async fn list_job_applications(
    store: &dyn JobApplicationStore,
    caller: UserId,
) -> Result<Vec<JobApplication>, AppError> {
    let applications = store.list_by_owner(caller).await?;
    debug!("Listed {} job applications for user_id={}", applications.len(), caller);
    Ok(applications)
}

/// Resolves a path id to its record. Runs before any authorization check.
pub async fn find_job_application(
    store: &dyn JobApplicationStore,
    id: JobApplicationId,
) -> Result<JobApplication, AppError> {
    store.find(id).await?.ok_or(AppError::NotFound(id))
}

/// Applies the supplied fields onto `application`
///
/// Fields equal to their current value are skipped; when nothing is left the
/// record is returned untouched without a write.
pub async fn update_job_application(
    store: &dyn JobApplicationStore,
    application: JobApplication,
    changes: JobApplicationChanges,
) -> Result<JobApplication, AppError> {
    let changes = changes.without_unchanged(&application);
    if changes.is_empty() {
        debug!("Update of job application id={} changes nothing", application.id);
        return Ok(application);
    }

    let id = application.id;
    let updated = store
        .update(id, changes)
        .await?
        .ok_or(AppError::NotFound(id))?;

    info!("Updated job application id={}", id);
    Ok(updated)
}

/// Hard-deletes `application`, returning whether the store removed it
pub async fn delete_job_application(
    store: &dyn JobApplicationStore,
    application: &JobApplication,
) -> Result<bool, AppError> {
    let deleted = store.delete(application.id).await?;
    if deleted {
        info!("Deleted job application id={}", application.id);
    }
    Ok(deleted)
}
