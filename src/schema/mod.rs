//! Schema Snapshots
//!
//! Column layouts of tables as currently known, independent of any event,
//! plus the reconciliation of historical event layouts against them.

mod reconcile;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use reconcile::{
    check_row_columns, dropped_field_name, field_name, reconcile, SchemaDrift,
    UNKNOWN_FIELD_NAME_PREFIX,
};

/// One column as known from schema metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Column name
    #[serde(rename = "name")]
    pub field_name: String,
    /// Declared column type (`varchar(64)`, `mediumtext`, ...)
    #[serde(rename = "type")]
    pub field_type: String,
}

impl FieldInfo {
    pub fn new(field_name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            field_type: field_type.into(),
        }
    }
}

/// Table schema snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    /// Columns in declared order
    pub fields: Vec<FieldInfo>,
    /// Indices of the columns forming the primary or a unique key
    #[serde(default)]
    pub unique_key: Vec<usize>,
}

/// Schema snapshots keyed by `schema.table`
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    tables: HashMap<String, TableSchema>,
}

impl SchemaCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON object of `"schema.table": {fields, unique_key}`
    pub fn from_json(content: &str) -> Result<Self> {
        let tables: HashMap<String, TableSchema> = serde_json::from_str(content)?;

        for (name, table) in &tables {
            if let Some(bad) = table.unique_key.iter().find(|&&i| i >= table.fields.len()) {
                tracing::warn!(
                    "Unique key column {} of {} is outside its {} known columns",
                    bad,
                    name,
                    table.fields.len()
                );
            }
        }

        Ok(Self { tables })
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add or replace a table snapshot
    pub fn insert(&mut self, schema: &str, table: &str, snapshot: TableSchema) {
        self.tables.insert(format!("{}.{}", schema, table), snapshot);
    }

    /// Get the snapshot for a table
    pub fn get_table(&self, schema: &str, table: &str) -> Result<&TableSchema> {
        let key = format!("{}.{}", schema, table);
        self.tables.get(&key).ok_or(Error::UnknownTable(key))
    }

    /// Get all table names
    pub fn tables(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }
}
