use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type JobApplicationId = i64;

/// Where an application currently stands
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Interview,
    Approved,
    Rejected,
    InProgress,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Interview,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::InProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::InProgress => "in_progress",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status '{}'", s))
    }
}

/// A tracked job application, owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobApplication {
    pub id: JobApplicationId,
    pub user_id: UserId,
    pub link: String,
    pub title: String,
    pub position: String,
    pub company: String,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new application, before an owner is attached
#[derive(Debug, Clone, PartialEq)]
pub struct JobApplicationDraft {
    pub link: String,
    pub title: String,
    pub position: String,
    pub company: String,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

/// A draft bound to its owner, ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobApplication {
    pub user_id: UserId,
    pub link: String,
    pub title: String,
    pub position: String,
    pub company: String,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

impl NewJobApplication {
    pub fn owned_by(user_id: UserId, draft: JobApplicationDraft) -> Self {
        Self {
            user_id,
            link: draft.link,
            title: draft.title,
            position: draft.position,
            company: draft.company,
            status: draft.status,
            notes: draft.notes,
        }
    }
}

/// Partial update. `None` leaves a field untouched; for `notes`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobApplicationChanges {
    pub link: Option<String>,
    pub title: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub notes: Option<Option<String>>,
}

impl JobApplicationChanges {
    pub fn is_empty(&self) -> bool {
        self.link.is_none()
            && self.title.is_none()
            && self.position.is_none()
            && self.company.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }

    /// Drops every change that would leave `current` as it already is
    pub fn without_unchanged(self, current: &JobApplication) -> Self {
        Self {
            link: self.link.filter(|v| *v != current.link),
            title: self.title.filter(|v| *v != current.title),
            position: self.position.filter(|v| *v != current.position),
            company: self.company.filter(|v| *v != current.company),
            status: self.status.filter(|v| *v != current.status),
            notes: self.notes.filter(|v| *v != current.notes),
        }
    }

    /// Writes the supplied fields onto `application`
    pub fn apply_to(self, application: &mut JobApplication) {
        if let Some(link) = self.link {
            application.link = link;
        }
        if let Some(title) = self.title {
            application.title = title;
        }
        if let Some(position) = self.position {
            application.position = position;
        }
        if let Some(company) = self.company {
            application.company = company;
        }
        if let Some(status) = self.status {
            application.status = status;
        }
        if let Some(notes) = self.notes {
            application.notes = notes;
        }
    }
}
