use crate::error::ApiError;

/// Longest label accepted, matching the VARCHAR(255) columns.
pub const MAX_LABEL_CHARS: usize = 255;

/// Validate a subject, topic or question reference and return it with
/// surrounding whitespace trimmed and inner runs collapsed.
///
/// # Examples
/// ```
/// use prx_api::validation::validate_label;
///
/// assert_eq!(validate_label("topic", "  Organic   Chemistry ").unwrap(), "Organic Chemistry");
/// assert!(validate_label("topic", "   ").is_err());
/// ```
pub fn validate_label(field: &str, value: &str) -> Result<String, ApiError> {
    let label = value.split_whitespace().collect::<Vec<_>>().join(" ");

    if label.is_empty() {
        return Err(ApiError::Validation(format!("{field} cannot be empty")));
    }

    if label.chars().count() > MAX_LABEL_CHARS {
        return Err(ApiError::Validation(format!(
            "{field} must be at most {MAX_LABEL_CHARS} characters"
        )));
    }

    if label.chars().any(char::is_control) {
        return Err(ApiError::Validation(format!(
            "{field} cannot contain control characters"
        )));
    }

    Ok(label)
}
