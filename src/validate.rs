//! Shared input validation for tool parameters

use chrono::NaiveDate;

use crate::error::{Result, TravelError};

/// Validate a `YYYY-MM-DD` date string.
pub fn validate_date(value: &str, field: &str) -> Result<()> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            TravelError::validation(format!("{field} must be a valid date in YYYY-MM-DD format"))
        })
}

/// Validate and normalize a three-letter ISO 4217 currency code.
pub fn normalize_currency_code(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(TravelError::validation(format!(
            "'{value}' is not a valid three-letter currency code"
        )))
    }
}

/// Validate a latitude/longitude pair.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(TravelError::validation(format!(
            "latitude {latitude} is out of range [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(TravelError::validation(format!(
            "longitude {longitude} is out of range [-180, 180]"
        )));
    }
    Ok(())
}
