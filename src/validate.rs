use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_MAX_CODE_LENGTH: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Code is required")]
    Missing,

    #[error("Code cannot be empty")]
    Empty,

    #[error("Code is too long. Maximum {max} characters allowed.")]
    TooLong { max: usize },
}

// Checks run in order, first failure wins. Length is counted in UTF-16
// code units, which is what the browser-side character counter shows.
pub fn validate_code(code: Option<&Value>, max_len: usize) -> Result<&str, ValidationError> {
    let code = code.and_then(Value::as_str).ok_or(ValidationError::Missing)?;

    if code.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    if code.encode_utf16().count() > max_len {
        return Err(ValidationError::TooLong { max: max_len });
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_missing_and_non_string() {
        assert_eq!(validate_code(None, 10), Err(ValidationError::Missing));
        assert_eq!(validate_code(Some(&json!(42)), 10), Err(ValidationError::Missing));
        assert_eq!(validate_code(Some(&Value::Null), 10), Err(ValidationError::Missing));
        assert_eq!(
            validate_code(Some(&json!(["a"])), 10),
            Err(ValidationError::Missing)
        );
    }

    #[test]
    fn rejects_blank() {
        assert_eq!(validate_code(Some(&json!("")), 10), Err(ValidationError::Empty));
        assert_eq!(
            validate_code(Some(&json!(" \n\t ")), 10),
            Err(ValidationError::Empty)
        );
    }

    #[test]
    fn length_boundary() {
        let max = DEFAULT_MAX_CODE_LENGTH;
        let at_max = json!("x".repeat(max));
        let over = json!("x".repeat(max + 1));

        assert!(validate_code(Some(&at_max), max).is_ok());
        let err = validate_code(Some(&over), max).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { max });
        assert_eq!(
            err.to_string(),
            "Code is too long. Maximum 10000 characters allowed."
        );
    }

    #[test]
    fn untrimmed_length_counts() {
        // 3 chars of code plus padding pushes it over
        assert_eq!(
            validate_code(Some(&json!("  abc  ")), 5),
            Err(ValidationError::TooLong { max: 5 })
        );
    }

    #[test]
    fn astral_chars_count_twice() {
        assert!(validate_code(Some(&json!("🦀🦀")), 4).is_ok());
        assert!(validate_code(Some(&json!("🦀🦀🦀")), 4).is_err());
    }

    #[test]
    fn empty_message_mentions_emptiness() {
        assert!(ValidationError::Empty.to_string().contains("empty"));
    }
}
