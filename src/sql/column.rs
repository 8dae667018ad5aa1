//! Column Definitions and Type Mapping
//!
//! Maps binlog wire column types to the MySQL type name used for diffing
//! decisions and to a typed [`ColumnDef`] used when rendering statements.

use serde::{Deserialize, Serialize};

use crate::binlog::column_type::column_type::*;
use crate::binlog::ColumnTypeCode;
use crate::schema::{field_name, FieldInfo};

/// Type name used for columns whose wire type is not recognised
pub const UNKNOWN_FIELD_TYPE_NAME: &str = "unknown";

/// Character set of a string column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    /// utf8 with case-insensitive collation
    Utf8CaseInsensitive,
}

/// Semantic SQL type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemanticType {
    Int,
    Double,
    DateTime,
    String(Charset),
    Bytes,
    Unknown,
}

impl SemanticType {
    pub fn name(&self) -> &'static str {
        match self {
            SemanticType::Int => "int",
            SemanticType::Double => "double",
            SemanticType::DateTime => "datetime",
            SemanticType::String(_) => "string",
            SemanticType::Bytes => "bytes",
            SemanticType::Unknown => UNKNOWN_FIELD_TYPE_NAME,
        }
    }

    /// Values are rendered as raw bytes
    pub fn is_binary(&self) -> bool {
        matches!(self, SemanticType::Bytes | SemanticType::Unknown)
    }
}

/// Nullability of a column definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nullability {
    Nullable,
    NotNullable,
}

/// Typed column handle used to build statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: SemanticType,
    pub nullability: Nullability,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullability: Nullability::NotNullable,
        }
    }
}

/// Result of mapping one value position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    /// MySQL type name (`tinyint`, `blob`, `varchar`, ...)
    pub type_name: &'static str,
    /// Column type as declared in the schema snapshot (`text`, `varchar(20)`, ...)
    pub declared_type: String,
    /// Typed definition
    pub def: ColumnDef,
}

fn contains_text(declared_type: &str) -> bool {
    declared_type.to_lowercase().contains("text")
}

/// Map a wire column type to its type name and column definition.
///
/// Total over the wire type space: unrecognised codes map to
/// `unknown` with a bytes definition.
pub fn map_column_type(
    declared_type: &str,
    name: &str,
    column_type: ColumnTypeCode,
) -> (&'static str, ColumnDef) {
    use SemanticType::*;
    let text = String(Charset::Utf8CaseInsensitive);

    let (type_name, sql_type) = match column_type.real_type() {
        MYSQL_TYPE_NULL => (UNKNOWN_FIELD_TYPE_NAME, Unknown),
        MYSQL_TYPE_TINY => ("tinyint", Int),
        MYSQL_TYPE_SHORT => ("smallint", Int),
        MYSQL_TYPE_INT24 => ("mediumint", Int),
        MYSQL_TYPE_LONG => ("int", Int),
        MYSQL_TYPE_LONGLONG => ("bigint", Int),
        MYSQL_TYPE_BIT => ("bit", Int),
        MYSQL_TYPE_YEAR => ("year", Int),
        MYSQL_TYPE_ENUM => ("enum", Int),
        MYSQL_TYPE_SET => ("set", Int),
        MYSQL_TYPE_DECIMAL | MYSQL_TYPE_NEWDECIMAL => ("decimal", Double),
        MYSQL_TYPE_FLOAT => ("float", Double),
        MYSQL_TYPE_DOUBLE => ("double", Double),
        MYSQL_TYPE_TIMESTAMP | MYSQL_TYPE_TIMESTAMP2 => ("timestamp", DateTime),
        MYSQL_TYPE_DATETIME | MYSQL_TYPE_DATETIME2 => ("datetime", DateTime),
        // Rendered as text to keep the server's own formatting
        MYSQL_TYPE_TIME | MYSQL_TYPE_TIME2 => ("time", text),
        MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE => ("date", text),
        MYSQL_TYPE_TINY_BLOB | MYSQL_TYPE_MEDIUM_BLOB | MYSQL_TYPE_LONG_BLOB | MYSQL_TYPE_BLOB => {
            // TEXT columns travel as blobs
            if contains_text(declared_type) {
                ("blob", text)
            } else {
                ("blob", Bytes)
            }
        }
        MYSQL_TYPE_VARCHAR | MYSQL_TYPE_VAR_STRING => ("varchar", text),
        MYSQL_TYPE_STRING => ("char", text),
        MYSQL_TYPE_JSON => ("json", Bytes),
        MYSQL_TYPE_GEOMETRY => ("geometry", Bytes),
        _ => (UNKNOWN_FIELD_TYPE_NAME, Unknown),
    };

    (type_name, ColumnDef::new(name, sql_type))
}

/// Map the first `count` value positions of an event to column definitions.
///
/// `fields` must already be reconciled to at least `count` entries; wire
/// types missing from `column_types` are treated as NULL (unknown).
pub fn column_definitions(
    count: usize,
    fields: &[FieldInfo],
    column_types: &[ColumnTypeCode],
) -> Vec<MappedColumn> {
    (0..count)
        .map(|i| {
            let (name, declared_type) = match fields.get(i) {
                Some(f) => (f.field_name.clone(), f.field_type.clone()),
                None => (field_name(i, fields), UNKNOWN_FIELD_TYPE_NAME.to_string()),
            };
            let column_type = column_types.get(i).copied().unwrap_or(ColumnTypeCode::NULL);
            let (type_name, def) = map_column_type(&declared_type, &name, column_type);
            MappedColumn {
                type_name,
                declared_type,
                def,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(declared: &str, code: u8, meta: u16) -> (&'static str, SemanticType) {
        let (name, def) = map_column_type(declared, "c", ColumnTypeCode::new(code, meta));
        (name, def.sql_type)
    }

    #[test]
    fn test_integer_family() {
        for code in [
            MYSQL_TYPE_TINY,
            MYSQL_TYPE_SHORT,
            MYSQL_TYPE_INT24,
            MYSQL_TYPE_LONG,
            MYSQL_TYPE_LONGLONG,
            MYSQL_TYPE_BIT,
            MYSQL_TYPE_YEAR,
            MYSQL_TYPE_ENUM,
            MYSQL_TYPE_SET,
        ] {
            assert_eq!(map("", code, 0).1, SemanticType::Int, "code {}", code);
        }
        assert_eq!(map("", MYSQL_TYPE_LONGLONG, 0).0, "bigint");
    }

    #[test]
    fn test_temporal_types() {
        assert_eq!(map("", MYSQL_TYPE_DATETIME2, 0), ("datetime", SemanticType::DateTime));
        assert_eq!(map("", MYSQL_TYPE_TIMESTAMP2, 0), ("timestamp", SemanticType::DateTime));
        let text = SemanticType::String(Charset::Utf8CaseInsensitive);
        assert_eq!(map("", MYSQL_TYPE_TIME2, 0), ("time", text));
        assert_eq!(map("", MYSQL_TYPE_DATE, 0), ("date", text));
    }

    #[test]
    fn test_blob_vs_text() {
        assert_eq!(map("blob", MYSQL_TYPE_BLOB, 2), ("blob", SemanticType::Bytes));
        assert_eq!(
            map("MEDIUMTEXT", MYSQL_TYPE_BLOB, 3),
            ("blob", SemanticType::String(Charset::Utf8CaseInsensitive))
        );
        assert_eq!(map("json", MYSQL_TYPE_JSON, 4), ("json", SemanticType::Bytes));
        assert_eq!(map("", MYSQL_TYPE_GEOMETRY, 4), ("geometry", SemanticType::Bytes));
    }

    #[test]
    fn test_fixed_string_meta() {
        let enum_meta = ((MYSQL_TYPE_ENUM as u16) << 8) | 1;
        assert_eq!(map("enum('a','b')", MYSQL_TYPE_STRING, enum_meta), ("enum", SemanticType::Int));
        assert_eq!(
            map("char(4)", MYSQL_TYPE_STRING, 4),
            ("char", SemanticType::String(Charset::Utf8CaseInsensitive))
        );
    }

    #[test]
    fn test_mapping_is_total() {
        let closed = ["int", "double", "datetime", "string", "bytes", "unknown"];
        for code in 0..=u8::MAX {
            let (name, def) = map_column_type("", "c", ColumnTypeCode::new(code, 0));
            assert!(closed.contains(&def.sql_type.name()), "code {}", code);
            assert_eq!(def.nullability, Nullability::NotNullable);
            if def.sql_type == SemanticType::Unknown {
                assert_eq!(name, UNKNOWN_FIELD_TYPE_NAME);
                assert!(def.sql_type.is_binary());
            }
        }
        assert_eq!(map("", 100, 0), (UNKNOWN_FIELD_TYPE_NAME, SemanticType::Unknown));
    }

    #[test]
    fn test_column_definitions_pads_missing_types() {
        let fields = vec![
            FieldInfo::new("id", "int"),
            FieldInfo::new("body", "text"),
        ];
        let types = vec![ColumnTypeCode::new(MYSQL_TYPE_LONG, 0), ColumnTypeCode::new(MYSQL_TYPE_BLOB, 2)];

        let cols = column_definitions(3, &fields, &types);
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].def.name, "id");
        assert_eq!(cols[1].def.sql_type, SemanticType::String(Charset::Utf8CaseInsensitive));
        assert_eq!(cols[1].declared_type, "text");
        assert_eq!(cols[2].def.name, "unknown_field_1");
        assert_eq!(cols[2].type_name, UNKNOWN_FIELD_TYPE_NAME);
    }
}
