//! Input validation for values interpolated into SQL text.

use thiserror::Error;

const MAX_IDENTIFIER_LENGTH: usize = 63;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier segment '{segment}' exceeds 63 characters")]
    TooLong { segment: String },
    #[error("identifier segment '{segment}' contains invalid characters")]
    InvalidCharacters { segment: String },
    #[error("identifier '{identifier}' has more than one schema qualifier")]
    TooManyQualifiers { identifier: String },
}

/// Validate a PostgreSQL identifier, optionally schema-qualified (`schema.name`).
///
/// Only unquoted identifiers are accepted: a letter or underscore followed by
/// letters, digits or underscores.
pub fn validate_sql_identifier(identifier: &str) -> Result<(), IdentifierError> {
    if identifier.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let segments: Vec<&str> = identifier.split('.').collect();
    if segments.len() > 2 {
        return Err(IdentifierError::TooManyQualifiers {
            identifier: identifier.to_string(),
        });
    }

    for segment in segments {
        if segment.len() > MAX_IDENTIFIER_LENGTH {
            return Err(IdentifierError::TooLong {
                segment: segment.to_string(),
            });
        }
        let mut chars = segment.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(IdentifierError::InvalidCharacters {
                segment: segment.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_and_qualified_names() {
        assert!(validate_sql_identifier("warm_team_cohort_dependency_cache").is_ok());
        assert!(validate_sql_identifier("analytics.warm_cache").is_ok());
        assert!(validate_sql_identifier("_private").is_ok());
    }

    #[test]
    fn test_rejects_injection_attempts() {
        assert_eq!(
            validate_sql_identifier("warm(1); --"),
            Err(IdentifierError::InvalidCharacters {
                segment: "warm(1); --".to_string()
            })
        );
        assert!(validate_sql_identifier("1warm").is_err());
        assert!(validate_sql_identifier("a.b.c").is_err());
        assert!(validate_sql_identifier("schema.").is_err());
        assert_eq!(validate_sql_identifier(""), Err(IdentifierError::Empty));
    }

    #[test]
    fn test_rejects_overlong_segments() {
        let long = "w".repeat(64);
        assert!(matches!(
            validate_sql_identifier(&long),
            Err(IdentifierError::TooLong { .. })
        ));
    }
}
