//! Row Diffing
//!
//! Decides which columns of an UPDATE go into its SET clause.

use crate::config::RowImage;
use crate::sql::{Value, UNKNOWN_FIELD_TYPE_NAME};

/// Type names whose values are compared as raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesTypes {
    names: Vec<String>,
}

impl BytesTypes {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names.into_iter().map(|n| n.to_lowercase()).collect(),
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(type_name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for BytesTypes {
    fn default() -> Self {
        Self::new(
            ["blob", "json", "geometry", UNKNOWN_FIELD_TYPE_NAME]
                .into_iter()
                .map(str::to_string),
        )
    }
}

/// Per-column change detection between a before and an after image
#[derive(Debug, Clone)]
pub struct RowDiffer {
    row_image: RowImage,
    bytes_types: BytesTypes,
}

impl RowDiffer {
    pub fn new(row_image: RowImage, bytes_types: BytesTypes) -> Self {
        Self {
            row_image,
            bytes_types,
        }
    }

    /// Whether the column moved from `before` to `after`.
    ///
    /// Full row images list every column. With minimal images, byte-stored
    /// types (other than TEXT, which also travels as a blob) are compared
    /// as byte strings, and a value that is not bytes counts as changed.
    pub fn changed(&self, before: &Value, after: &Value, type_name: &str, declared_type: &str) -> bool {
        if !self.row_image.is_minimal() {
            return true;
        }

        if self.bytes_types.contains(type_name) && !declared_type.to_lowercase().contains("text") {
            return match (before.as_bytes(), after.as_bytes()) {
                (Some(b), Some(a)) => b != a,
                _ => true,
            };
        }

        before != after
    }
}
