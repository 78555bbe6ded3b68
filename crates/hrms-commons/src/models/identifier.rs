//! Validated SQL identifiers.
//!
//! Table names arrive from request paths and end up inside statement text
//! (identifiers cannot be bound as parameters), so every name is checked
//! against an allow-list grammar before it is used:
//!
//! - first character is an ASCII letter or `_`
//! - remaining characters are ASCII letters, digits or `_`
//! - length is 1..=63
//! - not a reserved SQL keyword (case-insensitive)

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Longest identifier accepted (PostgreSQL NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Keywords that can never be used as a bare identifier.
const RESERVED_KEYWORDS: &[&str] = &[
    "all", "alter", "and", "as", "attach", "begin", "by", "case", "check", "commit", "create",
    "cross", "default", "delete", "detach", "distinct", "drop", "else", "end", "except", "exec",
    "execute", "exists", "from", "grant", "group", "having", "in", "index", "inner", "insert",
    "intersect", "into", "is", "join", "like", "limit", "not", "null", "on", "or", "order",
    "pragma", "primary", "references", "reindex", "replace", "revoke", "rollback", "select",
    "set", "table", "then", "transaction", "truncate", "union", "unique", "update", "using",
    "vacuum", "values", "view", "when", "where", "with",
];

/// Reason an identifier was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("identifier cannot be empty")]
    Empty,

    #[error("identifier is longer than {max} characters ({len})")]
    TooLong { len: usize, max: usize },

    #[error("identifier must start with a letter or underscore, found '{0}'")]
    InvalidStart(char),

    #[error("identifier contains forbidden character '{found}' at position {position}")]
    InvalidCharacter { found: char, position: usize },

    #[error("identifier '{0}' is a reserved SQL keyword")]
    ReservedKeyword(String),
}

/// Check `name` against the identifier grammar.
pub fn validate_identifier(name: &str) -> Result<(), IdentifierError> {
    validate_column_name(name)?;
    if is_reserved_keyword(name) {
        return Err(IdentifierError::ReservedKeyword(name.to_string()));
    }
    Ok(())
}

/// Character and length rules only, for names read from the catalog.
///
/// Column names are always emitted through [`quote_identifier`], so a
/// column called `order` or `group` is legal here.
pub fn validate_column_name(name: &str) -> Result<(), IdentifierError> {
    let first = name.chars().next().ok_or(IdentifierError::Empty)?;

    let len = name.chars().count();
    if len > MAX_IDENTIFIER_LEN {
        return Err(IdentifierError::TooLong {
            len,
            max: MAX_IDENTIFIER_LEN,
        });
    }

    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(IdentifierError::InvalidStart(first));
    }

    if let Some((position, found)) = name
        .chars()
        .enumerate()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(IdentifierError::InvalidCharacter { found, position });
    }

    Ok(())
}

/// Returns true when `name` is one of the reserved SQL keywords.
pub fn is_reserved_keyword(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    RESERVED_KEYWORDS.contains(&lowered.as_str())
}

/// Wrap an already validated identifier in double quotes for statement text.
///
/// The grammar forbids `"`, so no escaping is needed.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Type-safe wrapper for a table name that passed [`validate_identifier`].
///
/// The only way to build one is [`TableName::parse`], so holding a
/// `TableName` means the name is safe to embed in statement text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName(String);

impl TableName {
    /// Validate `raw` and wrap it. Case is preserved.
    pub fn parse(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        validate_identifier(&raw)?;
        Ok(Self(raw))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for use in statement text.
    pub fn quoted(&self) -> String {
        quote_identifier(&self.0)
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for TableName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_identifiers() {
        for name in ["orders", "employee_2", "_staging", "Tasks", "a", "auth_user"] {
            assert!(validate_identifier(name).is_ok(), "should accept '{}'", name);
        }
    }

    #[test]
    fn test_rejects_injection_attempts() {
        let hostile = [
            "users; DROP TABLE users",
            "users;",
            "\"users\"",
            "users'--",
            "users --",
            "user s",
            "users\t",
            "users\n",
            "orders)",
            "emp*",
        ];
        for name in hostile {
            assert!(validate_identifier(name).is_err(), "should reject {:?}", name);
        }
    }

    #[test]
    fn test_rejects_empty_and_leading_digit() {
        assert_eq!(validate_identifier(""), Err(IdentifierError::Empty));
        assert_eq!(
            validate_identifier("2fast"),
            Err(IdentifierError::InvalidStart('2'))
        );
    }

    #[test]
    fn test_reports_first_bad_character() {
        let err = validate_identifier("users; DROP TABLE users").unwrap_err();
        assert_eq!(
            err,
            IdentifierError::InvalidCharacter {
                found: ';',
                position: 5
            }
        );
    }

    #[test]
    fn test_rejects_reserved_keywords_any_case() {
        for name in ["select", "DROP", "Table", "union", "pragma"] {
            assert!(
                matches!(
                    validate_identifier(name),
                    Err(IdentifierError::ReservedKeyword(_))
                ),
                "should reject keyword '{}'",
                name
            );
        }
        // Keywords embedded in a longer name are fine.
        assert!(validate_identifier("selected_items").is_ok());
        assert!(validate_identifier("drop_log").is_ok());
    }

    #[test]
    fn test_rejects_non_ascii_and_overlong() {
        assert!(validate_identifier("employé").is_err());
        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(matches!(
            validate_identifier(&long),
            Err(IdentifierError::TooLong { .. })
        ));
        assert!(validate_identifier(&"a".repeat(MAX_IDENTIFIER_LEN)).is_ok());
    }

    #[test]
    fn test_column_names_allow_keywords() {
        for name in ["order", "group", "default", "Select"] {
            assert!(validate_column_name(name).is_ok(), "should accept column '{}'", name);
        }
        assert!(validate_column_name("a\"b").is_err());
        assert!(validate_column_name("").is_err());
    }

    #[test]
    fn test_table_name_preserves_case_and_quotes() {
        let name = TableName::parse("Departments").unwrap();
        assert_eq!(name.as_str(), "Departments");
        assert_eq!(name.quoted(), "\"Departments\"");
        assert_eq!(format!("{}", name), "Departments");
    }

    #[test]
    fn test_table_name_parse_rejects_invalid() {
        assert!(TableName::parse("orders; --").is_err());
    }
}
