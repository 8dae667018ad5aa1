//! Binlog Row Events
//!
//! Decoded row-change events as handed over by the replication stream
//! decoder. Values are positional and aligned with the table map's column
//! types, not with the currently known table schema.

use serde::{Deserialize, Serialize};

use super::column_type::ColumnTypeCode;
use crate::sql::Value;

/// Row event kinds we translate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowsEventKind {
    /// WRITE_ROWS (INSERT)
    Insert,
    /// UPDATE_ROWS (UPDATE)
    Update,
    /// DELETE_ROWS (DELETE)
    Delete,
}

impl RowsEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowsEventKind::Insert => "insert",
            RowsEventKind::Update => "update",
            RowsEventKind::Delete => "delete",
        }
    }
}

impl std::fmt::Display for RowsEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row tuple
pub type Row = Vec<Value>;

/// A decoded row-change event for a single table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowChangeEvent {
    /// Event kind
    pub kind: RowsEventKind,
    /// Schema (database) name
    pub schema: String,
    /// Table name
    pub table: String,
    /// Wire column types from the table map, one per value position
    #[serde(default)]
    pub column_types: Vec<ColumnTypeCode>,
    /// Row tuples; UPDATE events interleave (before, after) pairs
    pub rows: Vec<Row>,
}

impl RowChangeEvent {
    pub fn new(
        kind: RowsEventKind,
        schema: impl Into<String>,
        table: impl Into<String>,
        column_types: Vec<ColumnTypeCode>,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            kind,
            schema: schema.into(),
            table: table.into(),
            column_types,
            rows,
        }
    }

    /// Number of value positions carried by the event.
    ///
    /// Taken from the table map. Without one, the first row decides. Rows
    /// of any other width are malformed and fail on their own.
    pub fn column_count(&self) -> usize {
        if !self.column_types.is_empty() {
            return self.column_types.len();
        }
        self.rows.first().map_or(0, Vec::len)
    }

    /// `schema.table` key used by the schema catalog
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Parse one event from a JSON line
    pub fn from_json(line: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}
