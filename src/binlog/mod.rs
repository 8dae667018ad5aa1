//! Binlog Row Event Module
//!
//! Types describing decoded row-based binlog events: the per-column wire
//! type codes from TABLE_MAP events and the row images of
//! WRITE/UPDATE/DELETE_ROWS events.

pub mod column_type;
mod event;

pub use column_type::ColumnTypeCode;
pub use event::{Row, RowChangeEvent, RowsEventKind};
