//! Required-field checks for request bodies.
//!
//! Each resource has a fixed list of required fields checked in order; the
//! first one that is missing, not a string, or empty produces the error.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// (body key, label used in the message)
type RequiredField = (&'static str, &'static str);

pub const POSTING_FIELDS: &[RequiredField] = &[("jobTitle", "Job Title")];

pub const CANDIDATE_FIELDS: &[RequiredField] = &[
    ("name", "Name"),
    ("email", "Email"),
    ("contactNumber", "Contact Number"),
    ("office", "Office"),
    ("posting", "Posting"),
    ("source", "Source"),
    ("status", "Status"),
];

pub const NOTE_FIELDS: &[RequiredField] = &[
    ("title", "Title"),
    ("content", "Content"),
    ("author", "Author"),
];

pub const CREDENTIAL_FIELDS: &[RequiredField] = &[("email", "Email"), ("password", "Password")];

pub const REFRESH_FIELDS: &[RequiredField] = &[("refresh_token", "Refresh Token")];

pub fn validate_posting(body: &Value) -> Result<(), ValidationError> {
    require(body, POSTING_FIELDS)
}

pub fn validate_candidate(body: &Value) -> Result<(), ValidationError> {
    require(body, CANDIDATE_FIELDS)
}

pub fn validate_note(body: &Value) -> Result<(), ValidationError> {
    require(body, NOTE_FIELDS)
}

pub fn validate_credentials(body: &Value) -> Result<(), ValidationError> {
    require(body, CREDENTIAL_FIELDS)
}

pub fn validate_refresh(body: &Value) -> Result<(), ValidationError> {
    require(body, REFRESH_FIELDS)
}

fn require(body: &Value, fields: &[RequiredField]) -> Result<(), ValidationError> {
    for (key, label) in fields {
        if !is_present(body.get(key)) {
            return Err(ValidationError::Empty(label));
        }
    }
    Ok(())
}

/// Present means a non-empty JSON string. Numbers, booleans and nulls don't count.
pub fn is_present(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.is_empty())
}
