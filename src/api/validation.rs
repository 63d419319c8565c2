use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::ApiError;

pub const MAX_TEXT_LENGTH: usize = 255;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Largest price accepted, matching a NUMERIC(5, 2) column
const MAX_PRICE_CENTS: i64 = 99_999;

/// Collects per-field messages; the first message for a field wins
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Record a check result against `field`
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    /// Unwrap a required value, recording an error when absent
    pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid input", Some(self.errors)))
        }
    }
}

/// Non-blank text of at most 255 characters
pub fn text(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(BLANK.to_string());
    }
    max_length(value)
}

pub fn max_length(value: &str) -> Result<(), String> {
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            MAX_TEXT_LENGTH
        ));
    }
    Ok(())
}

/// Structural email check: one `@`, a local part and a dotted domain
pub fn email(value: &str) -> Result<(), String> {
    let invalid = || Err("Enter a valid email address.".to_string());

    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return invalid();
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return invalid();
    };
    if local.is_empty() || local.contains('@') {
        return invalid();
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return invalid();
    }
    max_length(value)
}

pub fn password(value: &str, min_length: usize) -> Result<(), String> {
    if value.chars().count() < min_length {
        return Err(format!(
            "Ensure this field has at least {} characters.",
            min_length
        ));
    }
    max_length(value)
}

pub fn time_minutes(value: i32) -> Result<(), String> {
    if value < 0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    Ok(())
}

/// At most 5 digits with 2 decimal places, not negative
pub fn price(value: Decimal) -> Result<(), String> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    let normalized = value.normalize();
    if normalized.scale() > 2 {
        return Err("Ensure that there are no more than 2 decimal places.".to_string());
    }
    if normalized > Decimal::new(MAX_PRICE_CENTS, 2) {
        return Err("Ensure that there are no more than 5 digits in total.".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn collects_first_error_per_field() {
        let mut errors = FieldErrors::new();
        assert!(errors.errors.is_empty());
        errors.check("title", text(""));
        errors.check("title", text(&"x".repeat(300)));
        assert_eq!(errors.require::<i32>("price", None), None);

        let err = errors.into_result().unwrap_err().to_json();
        assert_eq!(err["field_errors"]["title"], BLANK);
        assert_eq!(err["field_errors"]["price"], REQUIRED);
    }

    #[test]
    fn emails() {
        assert!(email("test@example.com").is_ok());
        assert!(email("first.last+tag@sub.example.co.uk").is_ok());
        for bad in ["", "plainaddress", "@example.com", "a@b", "a@b.", "a b@c.com", "a@@b.com"] {
            assert!(email(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn passwords() {
        assert!(password("pw", 5).is_err());
        assert!(password("testpass123", 5).is_ok());
        assert!(password("12345", 5).is_ok());
        assert!(password("1234567", 8).is_err());
    }

    #[test]
    fn prices() {
        assert!(price(Decimal::from_str("5.50").unwrap()).is_ok());
        assert!(price(Decimal::from_str("999.99").unwrap()).is_ok());
        assert!(price(Decimal::ZERO).is_ok());
        assert!(price(Decimal::from_str("5.555").unwrap()).is_err());
        assert!(price(Decimal::from_str("1000.00").unwrap()).is_err());
        assert!(price(Decimal::from_str("-1.00").unwrap()).is_err());
    }

    #[test]
    fn minutes() {
        assert!(time_minutes(0).is_ok());
        assert!(time_minutes(-5).is_err());
    }
}
