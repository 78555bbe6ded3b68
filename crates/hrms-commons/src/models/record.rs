//! Column descriptors, generic rows and result sets.

use super::value::Value;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One column as reported by the store catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Zero-based catalog position; fixes scan order.
    pub ordinal: usize,
    /// Declared type text exactly as the catalog reports it (may be empty).
    pub declared_type: String,
    pub nullable: bool,
}

impl ColumnDescriptor {
    pub fn new(
        name: impl Into<String>,
        ordinal: usize,
        declared_type: impl Into<String>,
        nullable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            ordinal,
            declared_type: declared_type.into(),
            nullable,
        }
    }
}

/// One row as an ordered column name → value mapping.
///
/// Serializes as a JSON object whose keys keep column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericRecord {
    entries: Vec<(String, Value)>,
}

impl GenericRecord {
    /// Zip `columns` with `values` in order.
    ///
    /// Returns `None` when the lengths differ; a record is never short or
    /// extended relative to its columns.
    pub fn zip(columns: &[ColumnDescriptor], values: Vec<Value>) -> Option<Self> {
        if columns.len() != values.len() {
            return None;
        }
        let entries = columns
            .iter()
            .map(|c| c.name.clone())
            .zip(values)
            .collect();
        Some(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for GenericRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Complete, immutable answer to a whole-table read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<GenericRecord>,
}

impl ResultSet {
    /// Assemble a result set, checking that every row carries exactly the
    /// column names, in order. Returns `None` on any mismatch.
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<GenericRecord>) -> Option<Self> {
        let shape_ok = rows.iter().all(|row| {
            row.len() == columns.len() && row.keys().eq(columns.iter().map(|c| c.name.as_str()))
        });
        if !shape_ok {
            return None;
        }
        Some(Self { columns, rows })
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn rows(&self) -> &[GenericRecord] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn into_parts(self) -> (Vec<ColumnDescriptor>, Vec<GenericRecord>) {
        (self.columns, self.rows)
    }
}
