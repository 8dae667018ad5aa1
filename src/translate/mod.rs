//! Translation Module
//!
//! Converts decoded row events into replay or rollback SQL statements.

mod builder;
mod diff;
mod output;
mod translator;

pub use builder::{StatementBuilder, TableContext};
pub use diff::{BytesTypes, RowDiffer};
pub use output::{StatementFailure, StatementKind, Translation};
pub use translator::Translator;
