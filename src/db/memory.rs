use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::job_application::models::{
    JobApplication, JobApplicationChanges, JobApplicationId, NewJobApplication, UserId,
};
use crate::db::store::{JobApplicationStore, StoreError};

#[derive(Default)]
struct Inner {
    last_id: JobApplicationId,
    rows: BTreeMap<JobApplicationId, JobApplication>,
}

/// Process-local store, used with `STORAGE_BACKEND=memory` and in tests
#[derive(Default)]
pub struct MemoryJobApplicationStore {
    inner: RwLock<Inner>,
}

impl MemoryJobApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobApplicationStore for MemoryJobApplicationStore {
    async fn insert(&self, new: NewJobApplication) -> Result<JobApplication, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;

        let now = Utc::now();
        let application = JobApplication {
            id: inner.last_id,
            user_id: new.user_id,
            link: new.link,
            title: new.title,
            position: new.position,
            company: new.company,
            status: new.status,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(application.id, application.clone());

        debug!("Inserted job application id={} in memory", application.id);
        Ok(application)
    }

    async fn find(&self, id: JobApplicationId) -> Result<Option<JobApplication>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<JobApplication>, StoreError> {
        let inner = self.inner.read().await;
        let mut owned: Vec<JobApplication> = inner
            .rows
            .values()
            .filter(|application| application.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn update(
        &self,
        id: JobApplicationId,
        changes: JobApplicationChanges,
    ) -> Result<Option<JobApplication>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(application) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };

        changes.apply_to(application);
        application.updated_at = Utc::now();
        Ok(Some(application.clone()))
    }

    async fn delete(&self, id: JobApplicationId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
