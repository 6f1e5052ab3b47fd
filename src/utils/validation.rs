//! Centralized validation and helper functions.

/// Maximum number of keywords accepted in a single query (DOS protection)
pub const MAX_KEYWORDS: usize = 200;

/// Maximum length of a single query keyword, in characters
pub const MAX_KEYWORD_LENGTH: usize = 200;

/// Upper bound on the number of recommendations returned by one query
pub const MAX_TOP_N: usize = 50;

/// Maximum number of labs accepted from a single corpus source
pub const MAX_LABS: usize = 100_000;

/// Maximum size of a corpus source file
pub const MAX_SOURCE_SIZE: u64 = 64 * 1024 * 1024; // 64MB

/// Maximum length of a lab ID accepted by lookups
pub const MAX_LAB_ID_LENGTH: usize = 128;

/// Convert usize to f64 for ratio calculations.
///
/// Counts here (keywords, labs, vocabulary terms) are far below the f64
/// mantissa limit.
#[inline]
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Clamp a requested result count into `1..=MAX_TOP_N`.
#[must_use]
pub fn clamp_top_n(requested: usize) -> usize {
    requested.clamp(1, MAX_TOP_N)
}

/// Check if adding another lab would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new lab.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_lab_limit(count: usize) -> Option<String> {
    if count >= MAX_LABS {
        Some(format!(
            "Too many labs: adding another would exceed maximum of {MAX_LABS}"
        ))
    } else {
        None
    }
}

/// Validation error types for externally supplied values
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Lab ID is empty")]
    EmptyLabId,
    #[error("Lab ID too long: exceeds {MAX_LAB_ID_LENGTH} characters")]
    LabIdTooLong,
    #[error("Lab ID contains invalid characters")]
    InvalidLabId,
}

/// Validate a lab ID received from a client.
///
/// IDs are produced as `{source-tag}-{sequence}` so only ASCII alphanumerics,
/// `-`, `_` and `.` are accepted.
///
/// # Errors
///
/// Returns `ValidationError::EmptyLabId` if the ID is blank,
/// `ValidationError::LabIdTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidLabId` if it contains other characters.
pub fn validate_lab_id(id: &str) -> Result<&str, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::EmptyLabId);
    }
    if id.len() > MAX_LAB_ID_LENGTH {
        return Err(ValidationError::LabIdTooLong);
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ValidationError::InvalidLabId);
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_top_n() {
        assert_eq!(clamp_top_n(0), 1);
        assert_eq!(clamp_top_n(10), 10);
        assert_eq!(clamp_top_n(10_000), MAX_TOP_N);
    }

    #[test]
    fn test_check_lab_limit() {
        assert!(check_lab_limit(0).is_none());
        assert!(check_lab_limit(MAX_LABS - 1).is_none());
        assert!(check_lab_limit(MAX_LABS).is_some());
    }

    #[test]
    fn test_validate_lab_id() {
        assert_eq!(validate_lab_id(" cs-12 ").unwrap(), "cs-12");
        assert!(validate_lab_id("caltech-bio_eng-3").is_ok());
        assert!(matches!(validate_lab_id(""), Err(ValidationError::EmptyLabId)));
        assert!(matches!(
            validate_lab_id("../etc/passwd"),
            Err(ValidationError::InvalidLabId)
        ));
        let long = "a".repeat(MAX_LAB_ID_LENGTH + 1);
        assert!(matches!(
            validate_lab_id(&long),
            Err(ValidationError::LabIdTooLong)
        ));
    }
}
