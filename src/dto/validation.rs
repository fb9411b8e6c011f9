//! Validation helpers for DTOs.

use validator::ValidationError;

/// Maximum accepted nickname length, in characters.
const MAX_NICKNAME_CHARS: usize = 32;

/// Validates that a nickname has visible content and a sane length.
///
/// The identity key is the trimmed, lower-cased form, so a whitespace-only
/// nickname would collapse to an empty key and is rejected here.
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("nickname_blank");
        err.message = Some("Nickname must not be blank".into());
        return Err(err);
    }

    if trimmed.chars().count() > MAX_NICKNAME_CHARS {
        let mut err = ValidationError::new("nickname_length");
        err.message =
            Some(format!("Nickname must be at most {MAX_NICKNAME_CHARS} characters").into());
        return Err(err);
    }

    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("nickname_format");
        err.message = Some("Nickname must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_nickname_valid() {
        assert!(validate_nickname("Ada").is_ok());
        assert!(validate_nickname("  Ada Lovelace  ").is_ok());
        assert!(validate_nickname("gezgin42").is_ok());
    }

    #[test]
    fn test_validate_nickname_blank() {
        assert!(validate_nickname("").is_err());
        assert!(validate_nickname("   ").is_err());
        assert!(validate_nickname("\t\n").is_err());
    }

    #[test]
    fn test_validate_nickname_too_long_or_malformed() {
        assert!(validate_nickname(&"a".repeat(33)).is_err());
        assert!(validate_nickname("ada\u{0007}").is_err());
    }
}
