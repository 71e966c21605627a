use actix_web::{web, HttpRequest};
use tracing::debug;
use validator::ValidationErrors;

use crate::api::envelope::FieldErrors;
use crate::api::error::AppError;

/// Flattens `validator` output into the field-keyed messages of the response envelope
pub fn field_errors(validation_errors: &ValidationErrors) -> FieldErrors {
    validation_errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("The {} field is invalid.", field))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
pub fn json_config() -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default().error_handler(json_error_handler)
}

/// Config for plain `web::Json` bodies whose rules run inside the handler
pub fn unvalidated_json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| body_error(err.to_string()))
}

fn json_error_handler(err: actix_web_validator::Error, _req: &HttpRequest) -> actix_web::Error {
    if let actix_web_validator::Error::Validate(validation_errors) = &err {
        return AppError::Validation(field_errors(validation_errors)).into();
    }
    body_error(err.to_string())
}

/// The body could not be read as a JSON object at all. Field type mismatches
/// never reach this point, they are reported by the request rules.
fn body_error(detail: String) -> actix_web::Error {
    debug!("Rejected request body: {}", detail);

    let message = if detail.contains("EOF while parsing") {
        "Request body is empty. Expected JSON payload"
    } else if detail.contains("invalid type") {
        "The request body must be a JSON object."
    } else if detail.contains("Content type") || detail.contains("content type") {
        "Expected a JSON request body"
    } else {
        "Invalid JSON format"
    };
    AppError::invalid_field("body", message).into()
}

impl From<ValidationErrors> for AppError {
    fn from(validation_errors: ValidationErrors) -> Self {
        AppError::Validation(field_errors(&validation_errors))
    }
}

/// Path ids that do not parse can never match a record, so they are reported as not found
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| {
        debug!("Unresolvable path {}: {}", req.path(), err);
        AppError::MalformedId(req.path().to_string()).into()
    })
}
