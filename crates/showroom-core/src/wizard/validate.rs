//! Step validators.
//!
//! Each validator trims its input and returns the value to store, or a
//! `ValidationError` naming the field. Lengths count characters, not bytes.

use showroom_types::catalog::is_url;
use showroom_types::error::ValidationError;

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_SHORT_DESCRIPTION_CHARS: usize = 10;
pub const MIN_ADDITIONAL_INFO_CHARS: usize = 5;
pub const MIN_SEARCH_CHARS: usize = 2;

/// Literals that mean "leave additional info empty", compared
/// case-insensitively.
pub const SKIP_LITERALS: [&str; 3] = ["none", "no", "-"];

fn at_least(field: &'static str, raw: &str, min: usize) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    Ok(value.to_string())
}

pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    at_least("name", raw, MIN_NAME_CHARS)
}

pub fn validate_short_description(raw: &str) -> Result<String, ValidationError> {
    at_least("short description", raw, MIN_SHORT_DESCRIPTION_CHARS)
}

/// A skip literal maps to the empty string.
pub fn validate_additional_info(raw: &str) -> Result<String, ValidationError> {
    if is_skip(raw) {
        return Ok(String::new());
    }
    at_least("additional info", raw, MIN_ADDITIONAL_INFO_CHARS)
}

pub fn is_skip(raw: &str) -> bool {
    let value = raw.trim();
    SKIP_LITERALS
        .iter()
        .any(|literal| value.eq_ignore_ascii_case(literal))
}

pub fn validate_search_query(raw: &str) -> Result<String, ValidationError> {
    at_least("search", raw, MIN_SEARCH_CHARS)
}

/// Text submitted where an image is expected must be an http(s) URL with
/// something after the scheme.
pub fn validate_image_url(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) if is_url(value) && !rest.is_empty() && !rest.contains(char::is_whitespace) => {
            Ok(value.to_string())
        }
        _ => Err(ValidationError::new(
            "image",
            "send a photo or a link starting with http:// or https://",
        )),
    }
}
