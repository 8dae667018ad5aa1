//! Abstract Statements
//!
//! Statements are assembled from typed columns and literal values and only
//! turned into text by a [`SqlRenderer`](super::SqlRenderer).

use super::{ColumnDef, Value};

/// Boolean expression tree used in WHERE clauses
#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr {
    /// `column = value` (`column IS NULL` for a NULL value)
    Eq { column: ColumnDef, value: Value },
    /// Conjunction of sub-expressions
    And(Vec<BoolExpr>),
}

impl BoolExpr {
    pub fn eq(column: ColumnDef, value: Value) -> Self {
        BoolExpr::Eq { column, value }
    }

    /// Columns referenced by this expression, in order
    pub fn columns(&self) -> Vec<&str> {
        match self {
            BoolExpr::Eq { column, .. } => vec![column.name.as_str()],
            BoolExpr::And(terms) => terms.iter().flat_map(|t| t.columns()).collect(),
        }
    }
}

/// Multi-row INSERT
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Value>>,
}

impl InsertStatement {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            table: table.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append one row of values
    pub fn add(&mut self, row: Vec<Value>) -> &mut Self {
        self.rows.push(row);
        self
    }
}

/// Single-table DELETE
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub predicate: Option<BoolExpr>,
}

impl DeleteStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            predicate: None,
        }
    }

    pub fn where_(mut self, predicate: BoolExpr) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

/// Single-table UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: String,
    pub assignments: Vec<(ColumnDef, Value)>,
    pub predicate: Option<BoolExpr>,
}

impl UpdateStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            predicate: None,
        }
    }

    /// Add `column = value` to the SET clause
    pub fn set(&mut self, column: ColumnDef, value: Value) -> &mut Self {
        self.assignments.push((column, value));
        self
    }

    pub fn where_(&mut self, predicate: BoolExpr) -> &mut Self {
        self.predicate = Some(predicate);
        self
    }
}

/// Any statement the translator emits
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl From<InsertStatement> for Statement {
    fn from(s: InsertStatement) -> Self {
        Statement::Insert(s)
    }
}

impl From<UpdateStatement> for Statement {
    fn from(s: UpdateStatement) -> Self {
        Statement::Update(s)
    }
}

impl From<DeleteStatement> for Statement {
    fn from(s: DeleteStatement) -> Self {
        Statement::Delete(s)
    }
}
