//! User-facing messages for line errors.

use tsf_core::ParseError;

/// Message for a line error, or `None` for blank lines.
pub fn message(error: &ParseError, categories: &[String]) -> Option<String> {
    match error {
        ParseError::EmptyLine => None,
        ParseError::InvalidCategory => Some(format!(
            "Invalid category. Possible categories: {}",
            categories.join(", ")
        )),
        ParseError::InvalidTime => {
            Some("Invalid time format. Use X.Y or XhYm (e.g., 1.5 or 1h30m)".to_string())
        }
        other => Some(other.to_string()),
    }
}
