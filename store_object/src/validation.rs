//! Identifier validation
//!
//! Schema and column names end up inside double-quoted identifiers in
//! generated SQL. They are restricted to a conservative character set so a
//! name can never terminate the quoting.

use std::fmt;

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierError {
    /// Name contains invalid characters (only alphanumeric and underscore allowed)
    InvalidCharacters(String),
    /// Name is too long
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
    /// Name starts with invalid character (must start with letter or underscore)
    InvalidStartCharacter(String),
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in name '{}': only alphanumeric characters and underscores are allowed", name)
            }
            IdentifierError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            IdentifierError::Empty => {
                write!(f, "Name cannot be empty")
            }
            IdentifierError::InvalidStartCharacter(name) => {
                write!(f, "Name '{}' must start with a letter or underscore", name)
            }
        }
    }
}

impl std::error::Error for IdentifierError {}

/// Identifier length limit
const MAX_LENGTH: usize = 63;

/// Check that `name` is a usable identifier
pub fn validate_identifier(name: &str) -> Result<(), IdentifierError> {
    if name.is_empty() {
        return Err(IdentifierError::Empty);
    }

    if name.len() > MAX_LENGTH {
        return Err(IdentifierError::TooLong {
            name: name.to_string(),
            length: name.len(),
            max_length: MAX_LENGTH,
        });
    }

    let first_char = name.chars().next().ok_or(IdentifierError::Empty)?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(IdentifierError::InvalidStartCharacter(name.to_string()));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(IdentifierError::InvalidCharacters(name.to_string()));
    }

    Ok(())
}

/// Wrap a name in ANSI double quotes, doubling any embedded quote
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
