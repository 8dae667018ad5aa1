//! binlog2sql - Row Event to SQL Translation
//!
//! Translates row-based binlog events (INSERT / UPDATE / DELETE row images
//! already decoded from the replication stream) into SQL text, either to
//! replay the changes on another server or to roll them back.
//!
//! # Features
//!
//! - Type mapping from binlog wire column types to SQL column definitions
//! - Tolerance for tables altered after the events were written
//! - Minimal and full row image support, including unique-key matching
//! - Batched multi-row INSERTs
//! - Soft-delete flag handling that turns flag flips into INSERT / DELETE
//! - Per-row failure isolation: one bad row never loses the rest of an event

pub mod binlog;
pub mod config;
pub mod error;
pub mod schema;
pub mod sql;
pub mod translate;

pub use config::TranslatorConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::binlog::{ColumnTypeCode, Row, RowChangeEvent, RowsEventKind};
    pub use crate::config::{RowImage, TranslatorConfig};
    pub use crate::error::{Error, Result};
    pub use crate::schema::{FieldInfo, SchemaCatalog, TableSchema};
    pub use crate::sql::Value;
    pub use crate::translate::{Translation, Translator};
}
