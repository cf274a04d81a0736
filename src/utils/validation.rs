use crate::utils::error::{CardsError, Result};
use std::fmt::Display;
use url::Url;

pub const MAX_MODULE_NAME_LENGTH: usize = 100;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl Display, reason: impl Into<String>) -> CardsError {
    CardsError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Only http(s) endpoints can be scraped.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_at_least<T: PartialOrd + Display + Copy>(field_name: &str, value: T, min: T) -> Result<()> {
    if value < min {
        return Err(invalid(field_name, value, format!("Value must be at least {}", min)));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// Module names are user input: non-empty after trimming and at most 100 characters.
pub fn validate_module_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;

    let length = name.trim().chars().count();
    if length > MAX_MODULE_NAME_LENGTH {
        return Err(invalid(
            field_name,
            name,
            format!(
                "Name is {} characters long, the limit is {}",
                length, MAX_MODULE_NAME_LENGTH
            ),
        ));
    }
    Ok(())
}
