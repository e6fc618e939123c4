//! # Input Validation
//!
//! Credential and profile field checks run before any gateway call.
//!
//! ## Field Rules
//! ```text
//! ┌───────────────┬──────────┬──────────┬──────────────────────────────┐
//! │ Field         │ Min      │ Max      │ Notes                        │
//! ├───────────────┼──────────┼──────────┼──────────────────────────────┤
//! │ email         │ required │ 255      │ trimmed, local@domain.tld    │
//! │ password      │ 6        │ 100      │ not trimmed                  │
//! │ full_name     │ 2        │ 100      │ trimmed                      │
//! │ employee_id   │ 3        │ 50       │ trimmed                      │
//! │ department    │ optional │ 100      │ trimmed, empty → None        │
//! └───────────────┴──────────┴──────────┴──────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::ProfileAttributes;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const EMAIL_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 100;
pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 100;
pub const EMPLOYEE_ID_MIN: usize = 3;
pub const EMPLOYEE_ID_MAX: usize = 50;
pub const DEPARTMENT_MAX: usize = 100;

fn check_length(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates an email address and returns it trimmed.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }
    if email.chars().count() > EMAIL_MAX {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: EMAIL_MAX,
        });
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::invalid_format("email", "missing @"));
    };

    let domain_ok = domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !domain.ends_with('.');

    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) || domain.contains('@') {
        return Err(ValidationError::invalid_format("email", "expected name@domain.tld"));
    }

    Ok(email.to_string())
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    check_length("password", password, PASSWORD_MIN, PASSWORD_MAX)
}

pub fn validate_full_name(full_name: &str) -> ValidationResult<String> {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(ValidationError::required("full_name"));
    }
    check_length("full_name", full_name, FULL_NAME_MIN, FULL_NAME_MAX)?;
    Ok(full_name.to_string())
}

pub fn validate_employee_id(employee_id: &str) -> ValidationResult<String> {
    let employee_id = employee_id.trim();
    if employee_id.is_empty() {
        return Err(ValidationError::required("employee_id"));
    }
    check_length("employee_id", employee_id, EMPLOYEE_ID_MIN, EMPLOYEE_ID_MAX)?;
    Ok(employee_id.to_string())
}

/// Blank departments become `None`.
pub fn validate_department(department: Option<&str>) -> ValidationResult<Option<String>> {
    match department.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            check_length("department", value, 0, DEPARTMENT_MAX)?;
            Ok(Some(value.to_string()))
        }
    }
}

/// Sign-in input. Returns the normalized email.
pub fn validate_credentials(email: &str, password: &str) -> ValidationResult<String> {
    let email = validate_email(email)?;
    validate_password(password)?;
    Ok(email)
}

/// Sign-up input. Returns the normalized email and profile attributes.
pub fn validate_sign_up(
    email: &str,
    password: &str,
    attributes: &ProfileAttributes,
) -> ValidationResult<(String, ProfileAttributes)> {
    let email = validate_credentials(email, password)?;
    let normalized = ProfileAttributes {
        full_name: validate_full_name(&attributes.full_name)?,
        employee_id: validate_employee_id(&attributes.employee_id)?,
        department: validate_department(attributes.department.as_deref())?,
        role: attributes
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
    };
    Ok((email, normalized))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(full_name: &str, employee_id: &str) -> ProfileAttributes {
        ProfileAttributes {
            full_name: full_name.to_string(),
            employee_id: employee_id.to_string(),
            department: Some("  ".to_string()),
            role: None,
        }
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("  ana@example.com ").unwrap(), "ana@example.com");
        assert!(matches!(validate_email(""), Err(ValidationError::Required { .. })));
        assert!(validate_email("ana.example.com").is_err());
        assert!(validate_email("ana@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@@example.com").is_err());
        assert!(validate_email("a na@example.com").is_err());

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(validate_email(&long), Err(ValidationError::TooLong { .. })));
    }

    #[test]
    fn test_validate_password_bounds() {
        assert!(matches!(validate_password("12345"), Err(ValidationError::TooShort { min: 6, .. })));
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"x".repeat(100)).is_ok());
        assert!(validate_password(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_profile_fields() {
        assert_eq!(validate_full_name(" Ana Rojas ").unwrap(), "Ana Rojas");
        assert!(validate_full_name("A").is_err());
        assert!(validate_employee_id("E1").is_err());
        assert_eq!(validate_employee_id("EMP001").unwrap(), "EMP001");
        assert_eq!(validate_department(Some("   ")).unwrap(), None);
        assert!(validate_department(Some(&"d".repeat(101))).is_err());
    }

    #[test]
    fn test_validate_sign_up_normalizes() {
        let (email, attrs) =
            validate_sign_up("ana@example.com", "secret1", &attributes(" Ana ", " EMP001 ")).unwrap();
        assert_eq!(email, "ana@example.com");
        assert_eq!(attrs.full_name, "Ana");
        assert_eq!(attrs.employee_id, "EMP001");
        assert_eq!(attrs.department, None);

        assert!(validate_sign_up("ana@example.com", "secret1", &attributes("Ana", "E")).is_err());
    }
}
