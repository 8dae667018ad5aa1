//! SQL Rendering
//!
//! Turns abstract statements into MySQL statement text.

use super::value::{hex, quote_str};
use super::{BoolExpr, ColumnDef, DeleteStatement, InsertStatement, Statement, UpdateStatement, Value};
use crate::error::{Error, Result};

/// Renders abstract statements to SQL text.
///
/// `schema` is the qualifier put in front of the table name, `None` for an
/// unqualified reference. Rendering can fail; callers treat a failure as
/// affecting only the statement at hand.
pub trait SqlRenderer: Send + Sync {
    fn render(&self, statement: &Statement, schema: Option<&str>) -> Result<String>;
}

/// Renderer producing MySQL/MariaDB syntax
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlRenderer;

impl SqlRenderer for MySqlRenderer {
    fn render(&self, statement: &Statement, schema: Option<&str>) -> Result<String> {
        match statement {
            Statement::Insert(s) => render_insert(s, schema),
            Statement::Update(s) => render_update(s, schema),
            Statement::Delete(s) => render_delete(s, schema),
        }
    }
}

fn render_error(msg: impl Into<String>) -> Error {
    Error::Render(msg.into())
}

/// Quote an identifier with backticks
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn table_ref(table: &str, schema: Option<&str>) -> Result<String> {
    if table.is_empty() {
        return Err(render_error("empty table name"));
    }
    Ok(match schema.filter(|s| !s.is_empty()) {
        Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(table)),
        None => quote_ident(table),
    })
}

/// Render a value as a literal for the given column
fn literal(column: &ColumnDef, value: &Value) -> Result<String> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(render_error(format!(
            "non-finite float {} for column {}",
            f, column.name
        ))),
        Value::Bytes(b) if !column.sql_type.is_binary() => Ok(match std::str::from_utf8(b) {
            Ok(s) => quote_str(s),
            Err(_) => format!("X'{}'", hex::encode(b)),
        }),
        v => Ok(v.to_sql()),
    }
}

fn render_predicate(expr: &BoolExpr) -> Result<String> {
    match expr {
        BoolExpr::Eq { column, value } if value.is_null() => {
            Ok(format!("{} IS NULL", quote_ident(&column.name)))
        }
        BoolExpr::Eq { column, value } => Ok(format!(
            "{} = {}",
            quote_ident(&column.name),
            literal(column, value)?
        )),
        BoolExpr::And(terms) => {
            if terms.is_empty() {
                return Err(render_error("empty AND expression"));
            }
            let parts = terms
                .iter()
                .map(|t| match t {
                    BoolExpr::And(_) => render_predicate(t).map(|s| format!("({})", s)),
                    _ => render_predicate(t),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(parts.join(" AND "))
        }
    }
}

fn where_clause(predicate: Option<&BoolExpr>) -> Result<String> {
    match predicate {
        Some(p) => render_predicate(p),
        None => Err(render_error("missing WHERE clause")),
    }
}

fn render_insert(stmt: &InsertStatement, schema: Option<&str>) -> Result<String> {
    let table = table_ref(&stmt.table, schema)?;
    if stmt.columns.is_empty() {
        return Err(render_error("no columns to insert"));
    }
    if stmt.rows.is_empty() {
        return Err(render_error("no rows to insert"));
    }

    let cols = stmt
        .columns
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut row_values = Vec::with_capacity(stmt.rows.len());
    for (i, row) in stmt.rows.iter().enumerate() {
        if row.len() != stmt.columns.len() {
            return Err(render_error(format!(
                "row {} has {} values for {} columns",
                i,
                row.len(),
                stmt.columns.len()
            )));
        }
        let vals = stmt
            .columns
            .iter()
            .zip(row)
            .map(|(c, v)| literal(c, v))
            .collect::<Result<Vec<_>>>()?;
        row_values.push(format!("({})", vals.join(", ")));
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        table,
        cols,
        row_values.join(", ")
    ))
}

fn render_update(stmt: &UpdateStatement, schema: Option<&str>) -> Result<String> {
    let table = table_ref(&stmt.table, schema)?;
    if stmt.assignments.is_empty() {
        return Err(render_error("no column updated"));
    }

    let sets = stmt
        .assignments
        .iter()
        .map(|(c, v)| Ok(format!("{} = {}", quote_ident(&c.name), literal(c, v)?)))
        .collect::<Result<Vec<_>>>()?;
    let where_part = where_clause(stmt.predicate.as_ref())?;

    Ok(format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        sets.join(", "),
        where_part
    ))
}

fn render_delete(stmt: &DeleteStatement, schema: Option<&str>) -> Result<String> {
    let table = table_ref(&stmt.table, schema)?;
    let where_part = where_clause(stmt.predicate.as_ref())?;
    Ok(format!("DELETE FROM {} WHERE {}", table, where_part))
}
