//! Translation Output
//!
//! Statements produced for one event together with the units that could
//! not be translated.

use crate::binlog::Row;
use crate::error::Error;

/// Which statement was being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Insert,
    InsertForDeleteRollback,
    Delete,
    DeleteForInsertRollback,
    Update,
    UpdateForUpdateRollback,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Insert => "insert",
            StatementKind::InsertForDeleteRollback => "insert_for_delete_rollback",
            StatementKind::Delete => "delete",
            StatementKind::DeleteForInsertRollback => "delete_for_insert_rollback",
            StatementKind::Update => "update",
            StatementKind::UpdateForUpdateRollback => "update_for_update_rollback",
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit (INSERT chunk, DELETE row, UPDATE pair) that produced no statement
#[derive(Debug)]
pub struct StatementFailure {
    pub kind: StatementKind,
    pub schema: String,
    pub table: String,
    /// Rows of the failed unit
    pub rows: Vec<Row>,
    pub error: Error,
}

/// Result of translating one event
#[derive(Debug, Default)]
pub struct Translation {
    /// Rendered statements in emission order
    pub statements: Vec<String>,
    /// Units that failed, in encounter order
    pub failures: Vec<StatementFailure>,
}

impl Translation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rendered statement
    pub fn push(&mut self, sql: String) {
        self.statements.push(sql);
    }

    /// Record and report a failed unit
    pub fn fail(&mut self, kind: StatementKind, schema: &str, table: &str, rows: Vec<Row>, error: Error) {
        tracing::warn!(
            kind = %kind,
            schema,
            table,
            rows = ?rows,
            error = %error,
            "Fail to generate {} sql for {}.{}",
            kind,
            schema,
            table
        );
        self.failures.push(StatementFailure {
            kind,
            schema: schema.to_string(),
            table: table.to_string(),
            rows,
            error,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
