//! Provisioning request validation rules

use super::{Validatable, ValidationResult, ValidationRules};
use serde::{Deserialize, Serialize};

/// Create an office at a fixed location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOfficeRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Validatable for CreateOfficeRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.merge(ValidationRules::validate_length(&self.name, "name", Some(1), Some(200)));
        result.merge(ValidationRules::validate_coordinates(self.latitude, self.longitude));
        result
    }
}

/// Add an authority employee to an office
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorityRequest {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub department_name: Option<String>,
}

impl Validatable for CreateAuthorityRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.merge(ValidationRules::validate_length(&self.name, "name", Some(1), Some(100)));
        result.merge(ValidationRules::validate_email(&self.email));
        result.merge(ValidationRules::validate_length(&self.role, "role", Some(1), Some(100)));
        result
    }
}

/// Register a citizen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCitizenRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Validatable for CreateCitizenRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.merge(ValidationRules::validate_length(&self.name, "name", Some(1), Some(100)));

        if let Some(ref phone) = self.phone {
            let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
            let legal = phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'));
            if !legal || !(7..=15).contains(&digits) {
                result.add_field_error("phone", "Phone must contain 7 to 15 digits");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_office_coordinates_checked() {
        let request = CreateOfficeRequest {
            name: "Ward 7".to_string(),
            latitude: 95.0,
            longitude: 0.0,
        };
        assert!(request.validate_all().field_errors.contains_key("latitude"));
    }

    #[test]
    fn test_citizen_phone_format() {
        let mut request = CreateCitizenRequest {
            name: "Ravi".to_string(),
            phone: Some("+91 98450-12345".to_string()),
        };
        assert!(request.validate_all().valid);

        request.phone = Some("call me".to_string());
        assert!(!request.validate_all().valid);
    }
}
