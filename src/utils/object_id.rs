// src/utils/object_id.rs

//! Document identifiers.
//!
//! Ids are UUIDs stored in canonical hyphenated lowercase form. Inputs are
//! format-checked only; whether the referenced document exists is never checked here.

use uuid::Uuid;
use validator::ValidationError;

/// Generates a fresh identifier for a new document.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parses any accepted identifier form and returns the canonical stored form.
pub fn normalize(id: &str) -> Option<String> {
    Uuid::parse_str(id.trim()).ok().map(|uuid| uuid.to_string())
}

pub fn is_valid(id: &str) -> bool {
    normalize(id).is_some()
}

/// `validator` hook for identifier fields on input DTOs.
pub fn validate_object_id(id: &str) -> Result<(), ValidationError> {
    if is_valid(id) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_object_id"))
    }
}
