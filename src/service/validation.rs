//! Request validation for client fields.

use crate::error::AppError;
use crate::model::{ClientFields, NewClient};
use once_cell::sync::Lazy;
use regex::Regex;

/// Column width of every text column.
pub const MAX_FIELD_LENGTH: usize = 255;

const REQUIRED: &[&str] = &["first_name", "last_name", "email"];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body. All required fields must be present and non-blank.
    pub fn validate_new(fields: ClientFields) -> Result<NewClient, AppError> {
        for col in REQUIRED {
            let present = fields
                .supplied()
                .iter()
                .any(|(name, _)| name == col);
            if !present {
                return Err(AppError::Validation(format!("{} is required", col)));
            }
        }
        Self::validate_partial(&fields)?;
        match fields {
            ClientFields {
                first_name: Some(first_name),
                last_name: Some(last_name),
                email: Some(email),
                phone,
                company,
                address,
                city,
                postal_code,
                country,
            } => Ok(NewClient {
                first_name,
                last_name,
                email,
                phone,
                company,
                address,
                city,
                postal_code,
                country,
            }),
            _ => Err(AppError::Validation("first_name, last_name and email are required".into())),
        }
    }

    /// Validate only the supplied fields (for PUT). Required is not enforced for missing fields.
    pub fn validate_partial(fields: &ClientFields) -> Result<(), AppError> {
        for (col, value) in fields.supplied() {
            validate_field(col, value)?;
        }
        Ok(())
    }
}

fn validate_field(col: &str, value: &str) -> Result<(), AppError> {
    if REQUIRED.contains(&col) && value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", col)));
    }
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            col, MAX_FIELD_LENGTH
        )));
    }
    if col == "email" && !EMAIL_RE.is_match(value) {
        return Err(AppError::Validation(format!("{} must be a valid email", col)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(first: &str, last: &str, email: &str) -> ClientFields {
        ClientFields {
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            email: Some(email.into()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_minimal_client() {
        let new = RequestValidator::validate_new(fields("A", "B", "a@b.com")).unwrap();
        assert_eq!(new.email, "a@b.com");
        assert_eq!(new.phone, None);
    }

    #[test]
    fn missing_required_field() {
        let mut f = fields("A", "B", "a@b.com");
        f.last_name = None;
        let err = RequestValidator::validate_new(f).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "last_name is required"));
    }

    #[test]
    fn blank_required_field() {
        let err = RequestValidator::validate_new(fields("  ", "B", "a@b.com")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn bad_email() {
        for email in ["nope", "a@b", "a b@c.com", "@b.com"] {
            assert!(
                RequestValidator::validate_new(fields("A", "B", email)).is_err(),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn email_check_is_repeatable() {
        for _ in 0..3 {
            assert!(validate_field("email", "a@b.com").is_ok());
            assert!(validate_field("email", "a@b").is_err());
        }
    }

    #[test]
    fn too_long() {
        let mut f = fields("A", "B", "a@b.com");
        f.city = Some("x".repeat(MAX_FIELD_LENGTH + 1));
        assert!(RequestValidator::validate_new(f).is_err());
    }

    #[test]
    fn partial_skips_missing_required() {
        let f = ClientFields {
            city: Some("Utrecht".into()),
            ..Default::default()
        };
        assert!(RequestValidator::validate_partial(&f).is_ok());
    }

    #[test]
    fn partial_checks_supplied_email() {
        let f = ClientFields {
            email: Some("broken".into()),
            ..Default::default()
        };
        assert!(RequestValidator::validate_partial(&f).is_err());
    }

    #[test]
    fn optional_fields_may_be_empty() {
        let mut f = fields("A", "B", "a@b.com");
        f.phone = Some(String::new());
        assert!(RequestValidator::validate_new(f).is_ok());
    }
}
