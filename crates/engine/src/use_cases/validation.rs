//! Common validation helpers for request fields.

/// Validation error type. Messages are user-facing, matching the front end's
/// language.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{field_name} es requerido")]
    Missing { field_name: &'static str },

    #[error("{field_name} no puede estar vacío")]
    Empty { field_name: &'static str },
}

/// Require an optional request field to be present and non-blank.
pub fn require_present(
    value: Option<String>,
    field_name: &'static str,
) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::Missing { field_name }),
    }
}

/// Validate a string is non-empty after trimming.
pub fn require_non_empty(value: &str, field_name: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field_name });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_fields_pass_through() {
        assert_eq!(
            require_present(Some("Ana".into()), "nombre").expect("present"),
            "Ana"
        );
    }

    #[test]
    fn missing_and_blank_fields_are_rejected() {
        assert!(require_present(None, "nombre").is_err());
        assert!(require_present(Some("   ".into()), "nombre").is_err());
        assert!(require_non_empty("", "texto").is_err());
        assert!(require_non_empty("hola", "texto").is_ok());
    }

    #[test]
    fn messages_name_the_field() {
        let err = require_present(None, "token").expect_err("missing");
        assert_eq!(err.to_string(), "token es requerido");
    }
}
