use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, warn};

use crate::api::envelope::{Envelope, FieldErrors};
use crate::api::job_application::models::JobApplicationId;
use crate::db::StoreError;

/// Every way a job application request can fail, each mapped to one status code
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more fields violate the request rules
    #[error("validation failed for {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    Validation(FieldErrors),

    /// No caller identity could be resolved
    #[error("authentication required")]
    AuthenticationRequired,

    /// The caller does not own the target resource
    #[error("this action is unauthorized")]
    Forbidden,

    #[error("job application {0} not found")]
    NotFound(JobApplicationId),

    /// The path id is not a valid identifier, so nothing can match it
    #[error("no job application at {0}")]
    MalformedId(String),

    /// The store ran the delete but reported nothing removed
    #[error("failed to delete job application {0}")]
    DeleteFailed(JobApplicationId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Validation failure for a single field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Validation(errors)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::MalformedId(_) => StatusCode::NOT_FOUND,
            AppError::DeleteFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let envelope = match self {
            AppError::Validation(errors) => {
                warn!("Validation error: {}", self);
                Envelope::error("The given data was invalid.").with_errors(errors.clone())
            }
            AppError::AuthenticationRequired => {
                warn!("Rejected request without a caller identity");
                Envelope::error("Unauthenticated.")
            }
            AppError::Forbidden => {
                warn!("Authorization denied");
                Envelope::error("This action is unauthorized.")
            }
            AppError::NotFound(id) => {
                warn!("Job application not found: {}", id);
                Envelope::error("Job application not found")
            }
            AppError::MalformedId(path) => {
                warn!("No job application at {}", path);
                Envelope::error("Job application not found")
            }
            AppError::DeleteFailed(id) => {
                error!("Delete of job application {} removed nothing", id);
                Envelope::error("Failed to delete job application")
            }
            AppError::Store(e) => {
                // Log the full error, keep the response generic
                error!("Store error: {:?}", e);
                Envelope::error("Failed to process request")
            }
        };

        HttpResponse::build(self.status_code()).json(envelope)
    }
}
