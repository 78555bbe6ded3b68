//! Conversion of raw SQLite cells into [`Value`].
//!
//! SQLite stores each cell with its own storage class regardless of the
//! column's declared type, so decoding looks at both: the storage class
//! picks the raw representation, the declared type's affinity refines it
//! (booleans, numeric text).

use hrms_commons::{ColumnDescriptor, HrmsError, Result, Value};
use rusqlite::types::ValueRef;

/// Declared-type affinity, following SQLite's column affinity rules with a
/// boolean refinement checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredAffinity {
    Boolean,
    Integer,
    Real,
    Numeric,
    Text,
    Blob,
}

impl DeclaredAffinity {
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        if upper.starts_with("BOOL") {
            DeclaredAffinity::Boolean
        } else if upper.contains("INT") {
            DeclaredAffinity::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            DeclaredAffinity::Text
        } else if upper.is_empty() || upper.contains("BLOB") {
            DeclaredAffinity::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            DeclaredAffinity::Real
        } else {
            DeclaredAffinity::Numeric
        }
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            DeclaredAffinity::Integer | DeclaredAffinity::Real | DeclaredAffinity::Numeric
        )
    }
}

/// Decoder for one column, built once per scan from its descriptor.
#[derive(Debug, Clone)]
pub struct ColumnDecoder {
    name: String,
    affinity: DeclaredAffinity,
}

impl ColumnDecoder {
    pub fn for_column(column: &ColumnDescriptor) -> Self {
        Self {
            name: column.name.clone(),
            affinity: DeclaredAffinity::from_declared_type(&column.declared_type),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn affinity(&self) -> DeclaredAffinity {
        self.affinity
    }

    /// Coerce one raw cell. Every failure is a scan error naming the column.
    pub fn decode(&self, raw: ValueRef<'_>) -> Result<Value> {
        match raw {
            ValueRef::Null => Ok(Value::Null),
            ValueRef::Integer(i) => self.decode_integer(i),
            ValueRef::Real(f) => {
                if self.affinity == DeclaredAffinity::Boolean {
                    return Err(self.scan_error(format!("{} is not a boolean", f)));
                }
                Value::real(f).ok_or_else(|| self.scan_error(format!("non-finite real {}", f)))
            }
            ValueRef::Text(bytes) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| self.scan_error(format!("text is not valid UTF-8: {}", e)))?;
                self.decode_text(text)
            }
            ValueRef::Blob(bytes) => {
                if self.affinity == DeclaredAffinity::Boolean {
                    return Err(self.scan_error("blob is not a boolean"));
                }
                Ok(Value::Binary(bytes.to_vec()))
            }
        }
    }

    fn decode_integer(&self, i: i64) -> Result<Value> {
        if self.affinity != DeclaredAffinity::Boolean {
            return Ok(Value::integer(i));
        }
        match i {
            0 => Ok(Value::Boolean(false)),
            1 => Ok(Value::Boolean(true)),
            other => Err(self.scan_error(format!("{} is not a boolean", other))),
        }
    }

    fn decode_text(&self, text: &str) -> Result<Value> {
        match self.affinity {
            DeclaredAffinity::Boolean => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Boolean(true)),
                "false" | "0" => Ok(Value::Boolean(false)),
                _ => Err(self.scan_error(format!("'{}' is not a boolean", text))),
            },
            a if a.is_numeric() => {
                Ok(Value::decimal(text).unwrap_or_else(|| Value::Text(text.to_string())))
            }
            _ => Ok(Value::Text(text.to_string())),
        }
    }

    fn scan_error(&self, reason: impl Into<String>) -> HrmsError {
        HrmsError::scan(self.name.clone(), reason)
    }
}
