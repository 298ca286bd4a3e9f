//! Field validators shared by the entities.

use chrono::NaiveTime;

use crate::errors::ModelError;

pub fn validate_email(email: &str) -> Result<String, ModelError> {
    let e = email.trim().to_ascii_lowercase();
    let Some((local, domain)) = e.split_once('@') else {
        return Err(ModelError::field("email", "invalid email"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ModelError::field("email", "invalid email"));
    }
    if e.len() > 255 || e.chars().any(char::is_whitespace) {
        return Err(ModelError::field("email", "invalid email"));
    }
    Ok(e)
}

/// Non-empty after trimming and within `max` characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> Result<String, ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ModelError::field(field, "required"));
    }
    if v.chars().count() > max {
        return Err(ModelError::field(field, &format!("at most {} characters", max)));
    }
    Ok(v.to_string())
}

pub fn validate_max_len(field: &str, value: &str, max: usize) -> Result<String, ModelError> {
    let v = value.trim();
    if v.chars().count() > max {
        return Err(ModelError::field(field, &format!("at most {} characters", max)));
    }
    Ok(v.to_string())
}

/// Digits, spaces and `+()-` only; empty is allowed.
pub fn validate_phone(phone: &str) -> Result<String, ModelError> {
    let p = phone.trim();
    if p.len() > 32 || !p.chars().all(|c| c.is_ascii_digit() || " +()-".contains(c)) {
        return Err(ModelError::field("phone", "invalid phone number"));
    }
    Ok(p.to_string())
}

pub fn validate_day_of_week(day: i16) -> Result<i16, ModelError> {
    if !(0..=6).contains(&day) {
        return Err(ModelError::field("day_of_week", "must be within 0 (Monday)..=6 (Sunday)"));
    }
    Ok(day)
}

pub fn validate_time_range(field: &str, start: NaiveTime, end: NaiveTime) -> Result<(), ModelError> {
    if start >= end {
        return Err(ModelError::field(field, "start must be before end"));
    }
    Ok(())
}

pub fn validate_positive(field: &str, value: i32, max: i32) -> Result<i32, ModelError> {
    if value < 1 || value > max {
        return Err(ModelError::field(field, &format!("must be within 1..={}", max)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        assert_eq!(validate_email("  Jo@Example.COM ").unwrap(), "jo@example.com");
        assert!(validate_email("nobody").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn required_trims_and_bounds() {
        assert_eq!(validate_required("name", "  Cut ", 10).unwrap(), "Cut");
        assert!(validate_required("name", "   ", 10).is_err());
        assert!(validate_required("name", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn phone_allows_formatting_chars() {
        assert_eq!(validate_phone("+44 (0)7395-812669").unwrap(), "+44 (0)7395-812669");
        assert!(validate_phone("call me").is_err());
        assert_eq!(validate_phone("").unwrap(), "");
    }

    #[test]
    fn day_and_time_ranges() {
        assert!(validate_day_of_week(0).is_ok());
        assert!(validate_day_of_week(7).is_err());
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        assert!(validate_time_range("hours", nine, five).is_ok());
        assert!(validate_time_range("hours", five, nine).is_err());
        assert!(validate_time_range("hours", nine, nine).is_err());
    }
}
