//! Input validation shared by request handlers and the CLI.

use std::fmt;

pub const USER_NAME_LEN: (usize, usize) = (2, 100);
pub const PASSWORD_LEN: (usize, usize) = (6, 128);
pub const SKILL_NAME_LEN: (usize, usize) = (2, 80);
pub const STREET_LEN: (usize, usize) = (2, 120);
pub const CITY_LEN: (usize, usize) = (2, 80);
pub const STATE_LEN: (usize, usize) = (2, 50);
pub const ZIP_CODE_LEN: (usize, usize) = (2, 20);
pub const JOB_TITLE_LEN: (usize, usize) = (3, 120);
pub const JOB_DESCRIPTION_LEN: (usize, usize) = (10, 1024);
const EMAIL_MAX_LEN: usize = 255;

/// Rejected field with a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Trim `value` and check its length in characters
pub fn text_field(
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();

    if len < min || len > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {} characters", min, max),
        ));
    }
    Ok(trimmed.to_string())
}

/// Normalize an email (trimmed, lower-cased) and check its shape
pub fn email(value: &str) -> Result<String, ValidationError> {
    let normalized = value.trim().to_lowercase();
    let invalid = || ValidationError::new("email", "value is not a valid email address");

    if normalized.len() > EMAIL_MAX_LEN || normalized.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = normalized.split_once('@').ok_or_else(invalid)?;
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && domain
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'));

    if local.is_empty() || !domain_ok {
        return Err(invalid());
    }
    Ok(normalized)
}

/// Passwords are checked for length only and never trimmed
pub fn password(value: &str) -> Result<(), ValidationError> {
    let (min, max) = PASSWORD_LEN;
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::new(
            "password",
            format!("must be between {} and {} characters", min, max),
        ));
    }
    Ok(())
}

pub fn latitude(value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(v) if !v.is_finite() || !(-90.0..=90.0).contains(&v) => Err(ValidationError::new(
            "latitude",
            "latitude must be between -90 and 90 degrees",
        )),
        other => Ok(other),
    }
}

pub fn longitude(value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(v) if !v.is_finite() || !(-180.0..=180.0).contains(&v) => Err(ValidationError::new(
            "longitude",
            "longitude must be between -180 and 180 degrees",
        )),
        other => Ok(other),
    }
}

/// Coordinates that must both be present (addresses)
pub fn required_coordinates(
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<(f64, f64), ValidationError> {
    let lat = latitude(lat)?.ok_or_else(|| ValidationError::new("latitude", "field required"))?;
    let lng = longitude(lng)?.ok_or_else(|| ValidationError::new("longitude", "field required"))?;
    Ok((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_trims_and_counts_chars() {
        assert_eq!(
            text_field("name", "  Elétrica  ", SKILL_NAME_LEN).unwrap(),
            "Elétrica"
        );
        assert_eq!(text_field("name", "ção", (3, 3)).unwrap(), "ção");

        let err = text_field("name", " a ", SKILL_NAME_LEN).unwrap_err();
        assert_eq!(err.to_string(), "name: must be between 2 and 80 characters");
        assert!(text_field("title", &"x".repeat(121), JOB_TITLE_LEN).is_err());
    }

    #[test]
    fn test_email() {
        assert_eq!(email(" Joao@Obra.COM ").unwrap(), "joao@obra.com");
        assert!(email("joao.silva+obra@mail.example.br").is_ok());

        for bad in ["", "joao", "@obra.com", "joao@", "joao@obra", "jo ao@obra.com", "a@b@c.com", "joao@.com"] {
            assert!(email(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_password_length() {
        assert!(password("123456").is_ok());
        assert!(password("12345").is_err());
        assert!(password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_coordinate_ranges() {
        assert_eq!(latitude(Some(-90.0)).unwrap(), Some(-90.0));
        assert_eq!(latitude(None).unwrap(), None);
        assert_eq!(longitude(Some(180.0)).unwrap(), Some(180.0));

        assert_eq!(
            latitude(Some(90.5)).unwrap_err().message,
            "latitude must be between -90 and 90 degrees"
        );
        assert_eq!(
            longitude(Some(-181.0)).unwrap_err().message,
            "longitude must be between -180 and 180 degrees"
        );
        assert!(latitude(Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_required_coordinates() {
        assert_eq!(
            required_coordinates(Some(-23.5), Some(-46.6)).unwrap(),
            (-23.5, -46.6)
        );
        assert_eq!(
            required_coordinates(None, Some(1.0)).unwrap_err().field,
            "latitude"
        );
        assert_eq!(
            required_coordinates(Some(1.0), Some(200.0)).unwrap_err().field,
            "longitude"
        );
    }
}
