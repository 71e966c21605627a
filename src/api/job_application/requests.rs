use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use url::Url;
use validator::{Validate, ValidationError};

use super::models::{ApplicationStatus, JobApplicationChanges, JobApplicationDraft};
use crate::api::error::AppError;

const MAX_TEXT_LENGTH: usize = 255;

/// A body field as it arrived, before any rule ran
///
/// Strings are trimmed and an empty result counts as `Null`, so a
/// whitespace-only value fails `required` the same way a missing one does.
/// Any non-string JSON value is kept as `WrongType` instead of failing the
/// whole body, so the error can name the field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FieldValue {
    Null,
    Text(String),
    WrongType,
}

impl FieldValue {
    fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Null | FieldValue::WrongType => None,
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => FieldValue::Null,
            Value::String(text) => match text.trim() {
                "" => FieldValue::Null,
                trimmed => FieldValue::Text(trimmed.to_string()),
            },
            _ => FieldValue::WrongType,
        })
    }
}

fn rule_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    err
}

fn text<'a>(field: &str, value: &'a FieldValue) -> Result<&'a str, ValidationError> {
    match value {
        FieldValue::Text(text) => Ok(text.as_str()),
        FieldValue::Null => Err(rule_error("required", format!("The {} field is required.", field))),
        FieldValue::WrongType => Err(rule_error("string", format!("The {} field must be a string.", field))),
    }
}

fn short_text(field: &str, value: &FieldValue) -> Result<(), ValidationError> {
    if text(field, value)?.chars().count() > MAX_TEXT_LENGTH {
        return Err(rule_error(
            "max",
            format!("The {} field must not be greater than {} characters.", field, MAX_TEXT_LENGTH),
        ));
    }
    Ok(())
}

/// Only absolute http(s) URLs with a host are accepted
fn validate_link(value: &FieldValue) -> Result<(), ValidationError> {
    let link = text("link", value)?;
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()) => Ok(()),
        _ => Err(rule_error("url", "The link field must be a valid URL.".to_string())),
    }
}

fn validate_title(value: &FieldValue) -> Result<(), ValidationError> {
    short_text("title", value)
}

fn validate_position(value: &FieldValue) -> Result<(), ValidationError> {
    short_text("position", value)
}

fn validate_company(value: &FieldValue) -> Result<(), ValidationError> {
    short_text("company", value)
}

/// Rejects anything outside the status enum. The same set applies to create and update.
fn validate_status(value: &FieldValue) -> Result<(), ValidationError> {
    match value {
        FieldValue::Null => Ok(()),
        FieldValue::WrongType => Err(rule_error("string", "The status field must be a string.".to_string())),
        FieldValue::Text(status) if status.parse::<ApplicationStatus>().is_ok() => Ok(()),
        FieldValue::Text(status) => {
            let mut err = rule_error("in", "The selected status is invalid.".to_string());
            err.add_param(Cow::from("value"), status);
            Err(err)
        }
    }
}

fn validate_notes(value: &FieldValue) -> Result<(), ValidationError> {
    match value {
        FieldValue::WrongType => Err(rule_error("string", "The notes field must be a string.".to_string())),
        FieldValue::Null | FieldValue::Text(_) => Ok(()),
    }
}

/// Body of `POST /job-applications`
///
/// Unknown keys, `user_id` included, are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct StoreJobApplicationRequest {
    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "The link field is required."), custom(function = "validate_link"))]
    pub link: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "The title field is required."), custom(function = "validate_title"))]
    pub title: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "The position field is required."), custom(function = "validate_position"))]
    pub position: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "The company field is required."), custom(function = "validate_company"))]
    pub company: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_status"))]
    pub status: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_notes"))]
    pub notes: Option<FieldValue>,
}

impl StoreJobApplicationRequest {
    /// Converts an already validated request into a draft, defaulting `status` to pending
    pub fn into_draft(self) -> Result<JobApplicationDraft, AppError> {
        let status = match self.status.and_then(FieldValue::into_text) {
            Some(status) => parse_status(&status)?,
            None => ApplicationStatus::default(),
        };

        Ok(JobApplicationDraft {
            link: required(self.link, "link")?,
            title: required(self.title, "title")?,
            position: required(self.position, "position")?,
            company: required(self.company, "company")?,
            status,
            notes: self.notes.and_then(FieldValue::into_text),
        })
    }
}

/// Body of `PUT|PATCH /job-applications/{id}`
///
/// Only supplied fields are validated and applied. A supplied `null` fails
/// the rules for `link`, `title`, `position` and `company`. `notes: null`
/// clears the notes; `status: null` is the same as leaving it out.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateJobApplicationRequest {
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_link"))]
    pub link: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_title"))]
    pub title: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_position"))]
    pub position: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_company"))]
    pub company: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_status"))]
    pub status: Option<FieldValue>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_notes"))]
    pub notes: Option<FieldValue>,
}

impl UpdateJobApplicationRequest {
    pub fn into_changes(self) -> Result<JobApplicationChanges, AppError> {
        Ok(JobApplicationChanges {
            link: self.link.and_then(FieldValue::into_text),
            title: self.title.and_then(FieldValue::into_text),
            position: self.position.and_then(FieldValue::into_text),
            company: self.company.and_then(FieldValue::into_text),
            status: self
                .status
                .and_then(FieldValue::into_text)
                .as_deref()
                .map(parse_status)
                .transpose()?,
            notes: self.notes.map(FieldValue::into_text),
        })
    }
}

/// Marks a key that appeared in the body, even with a `null` value
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn required(value: Option<FieldValue>, field: &str) -> Result<String, AppError> {
    value
        .and_then(FieldValue::into_text)
        .ok_or_else(|| AppError::invalid_field(field, format!("The {} field is required.", field)))
}

fn parse_status(status: &str) -> Result<ApplicationStatus, AppError> {
    status
        .parse()
        .map_err(|_| AppError::invalid_field("status", "The selected status is invalid."))
}
