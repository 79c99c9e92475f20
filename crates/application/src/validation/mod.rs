//! Validation Framework
//!
//! Validates every request reaching the services before any side effect runs.
//! Field failures are collected, then surfaced as a single validation error.

mod attachment;
mod issue;
mod provisioning;

pub use attachment::*;
pub use issue::*;
pub use provisioning::*;

use civic_issues_domain::errors::ValidationError;
use civic_issues_domain::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Validation result containing all errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether validation passed
    pub valid: bool,
    /// Field-level errors
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// Object-level errors
    pub object_errors: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            valid: true,
            field_errors: BTreeMap::new(),
            object_errors: Vec::new(),
        }
    }

    /// Create a failed validation result with a single error
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            field_errors: BTreeMap::new(),
            object_errors: vec![message.into()],
        }
    }

    /// Add a field-level error
    pub fn add_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Add an object-level error
    pub fn add_object_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.object_errors.push(message.into());
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }

        for (field, errors) in other.field_errors {
            self.field_errors.entry(field).or_default().extend(errors);
        }

        self.object_errors.extend(other.object_errors);
    }

    /// Convert to a domain error if invalid
    ///
    /// A single field failure keeps its field name; anything more is reported
    /// as a list of messages.
    pub fn to_error(&self) -> Option<AppError> {
        if self.valid {
            return None;
        }

        let mut messages = Vec::new();
        for (field, errors) in &self.field_errors {
            for error in errors {
                messages.push((field.as_str(), error.as_str()));
            }
        }

        let error = match (messages.as_slice(), self.object_errors.as_slice()) {
            ([(field, message)], []) => ValidationError::field(*field, *message),
            ([], [message]) => ValidationError::Multiple(vec![message.clone()]),
            _ => ValidationError::Multiple(
                messages
                    .iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .chain(self.object_errors.iter().cloned())
                    .collect(),
            ),
        };

        Some(AppError::Validation(error))
    }

    /// Ensure validation passed, returning error if not
    pub fn ensure_valid(&self) -> Result<(), AppError> {
        match self.to_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Trait for validatable types
pub trait Validatable {
    /// Validate the type and return a result
    fn validate_all(&self) -> ValidationResult;
}

/// Common validation rules
pub struct ValidationRules;

impl ValidationRules {
    /// Required text: non-blank after trimming
    pub fn validate_required(value: &str, field: &str) -> ValidationResult {
        let mut result = ValidationResult::success();
        if value.trim().is_empty() {
            result.add_field_error(field, "Cannot be empty");
        }
        result
    }

    /// Validate a string length, counted in characters
    pub fn validate_length(
        value: &str,
        field: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> ValidationResult {
        let mut result = ValidationResult::success();
        let len = value.trim().chars().count();

        if let Some(min_len) = min {
            if len < min_len {
                result.add_field_error(field, format!("Must be at least {} characters", min_len));
            }
        }

        if let Some(max_len) = max {
            if len > max_len {
                result.add_field_error(field, format!("Must be {} characters or less", max_len));
            }
        }

        result
    }

    /// Validate an email address
    pub fn validate_email(email: &str) -> ValidationResult {
        let mut result = ValidationResult::success();

        if email.is_empty() {
            result.add_field_error("email", "Email cannot be empty");
            return result;
        }

        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            result.add_field_error("email", "Invalid email format");
            return result;
        }

        let (local, domain) = (parts[0], parts[1]);

        if local.is_empty() || domain.is_empty() {
            result.add_field_error("email", "Invalid email format");
            return result;
        }

        if !domain.contains('.') {
            result.add_field_error("email", "Invalid email domain");
        }

        if email.len() > 254 {
            result.add_field_error("email", "Email must be 254 characters or less");
        }

        result
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180]
    pub fn validate_coordinates(lat: f64, lon: f64) -> ValidationResult {
        let mut result = ValidationResult::success();

        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            result.add_field_error("latitude", "Latitude must be between -90 and 90");
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            result.add_field_error("longitude", "Longitude must be between -180 and 180");
        }

        result
    }

    /// Validate a positive, finite radius
    pub fn validate_radius(radius_meters: f64) -> ValidationResult {
        let mut result = ValidationResult::success();
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            result.add_field_error("radius", "Radius must be a positive number of meters");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_result_merge() {
        let mut result1 = ValidationResult::success();
        result1.add_field_error("field1", "error1");

        let mut result2 = ValidationResult::success();
        result2.add_field_error("field2", "error2");

        result1.merge(result2);

        assert!(!result1.valid);
        assert_eq!(result1.field_errors.len(), 2);
    }

    #[test]
    fn test_single_field_error_keeps_field() {
        let mut result = ValidationResult::success();
        result.add_field_error("title", "Cannot be empty");

        match result.ensure_valid() {
            Err(AppError::Validation(ValidationError::FieldValidation { field, .. })) => {
                assert_eq!(field, "title")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(ValidationRules::validate_email("asha@ward7.gov.in").valid);
        assert!(!ValidationRules::validate_email("invalid").valid);
        assert!(!ValidationRules::validate_email("@example.com").valid);
        assert!(!ValidationRules::validate_email("user@localhost").valid);
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(ValidationRules::validate_coordinates(90.0, -180.0).valid);
        assert!(!ValidationRules::validate_coordinates(91.0, 0.0).valid);
        assert!(!ValidationRules::validate_coordinates(0.0, f64::NAN).valid);
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(ValidationRules::validate_length("ಬೆಂಗಳೂರು", "title", Some(1), Some(20)).valid);
        assert!(!ValidationRules::validate_length("   ", "title", Some(1), None).valid);
    }
}
