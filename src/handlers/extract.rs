//! JSON body extraction with client-friendly errors.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use std::collections::HashMap;

use crate::error::ApiError;

/// Business-rule checks that run after deserialization succeeded.
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Unwrap a JSON body, turning axum's rejection into `ApiError::InvalidJson`.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    result.map(|Json(v)| v).map_err(ApiError::from)
}

pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    let value = extract_json(result)?;
    value.validate()?;
    Ok(value)
}

/// Fail with a field map naming every blank field.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    let missing: HashMap<String, String> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| (name.to_string(), "This field is required".to_string()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Missing required fields", Some(missing)))
    }
}
