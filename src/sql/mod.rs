//! SQL Building Module
//!
//! Row values, typed column definitions, abstract statements and their
//! rendering to MySQL text.

mod column;
mod render;
mod statement;
mod value;

pub use column::{
    column_definitions, map_column_type, Charset, ColumnDef, MappedColumn, Nullability,
    SemanticType, UNKNOWN_FIELD_TYPE_NAME,
};
pub use render::{quote_ident, MySqlRenderer, SqlRenderer};
pub use statement::{BoolExpr, DeleteStatement, InsertStatement, Statement, UpdateStatement};
pub use value::{quote_str, Value};
