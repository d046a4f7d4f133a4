//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a participant name is non-empty once trimmed.
pub fn validate_participant_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("participant_name_empty");
        err.message = Some("Participant name must not be empty".into());
        return Err(err);
    }

    Ok(())
}

/// Validates the shape of a join code supplied by a client.
///
/// The actual match against the session's code happens later; this only
/// rejects obviously malformed input.
pub fn validate_join_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || code.len() > 16 {
        let mut err = ValidationError::new("join_code_length");
        err.message = Some("Join code must be between 1 and 16 characters".into());
        return Err(err);
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("join_code_format");
        err.message = Some("Join code must contain only letters and digits".into());
        return Err(err);
    }

    Ok(())
}
