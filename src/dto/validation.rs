//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest countdown accepted for a single question, in seconds.
pub const MAX_TIME_LIMIT_SECS: u64 = 600;

/// Build a [`ValidationError`] with a human-readable message.
pub fn validation_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that an explicit question time limit is sensible.
///
/// # Examples
///
/// ```ignore
/// validate_time_limit(20)  // Ok
/// validate_time_limit(0)   // Err - no time to answer
/// validate_time_limit(901) // Err - longer than any reasonable round
/// ```
pub fn validate_time_limit(secs: u64) -> Result<(), ValidationError> {
    if secs == 0 {
        return Err(validation_error(
            "time_limit_zero",
            "time limit must be at least one second".into(),
        ));
    }

    if secs > MAX_TIME_LIMIT_SECS {
        return Err(validation_error(
            "time_limit_too_long",
            format!("time limit must not exceed {MAX_TIME_LIMIT_SECS} seconds (got {secs})"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time_limit_valid() {
        assert!(validate_time_limit(1).is_ok());
        assert!(validate_time_limit(20).is_ok());
        assert!(validate_time_limit(600).is_ok());
    }

    #[test]
    fn test_validate_time_limit_invalid() {
        assert!(validate_time_limit(0).is_err());
        assert!(validate_time_limit(601).is_err());
    }
}
