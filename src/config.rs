//! binlog2sql Configuration
//!
//! This module provides the configuration structures that control how
//! row events are translated into SQL.

use serde::{Deserialize, Serialize};

use crate::translate::BytesTypes;

/// Row image mode the source server was configured with (`binlog_row_image`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RowImage {
    /// Every column is logged in both before and after images
    #[default]
    Full,
    /// Only the columns needed to identify and change a row are logged
    Minimal,
}

impl RowImage {
    pub fn is_minimal(self) -> bool {
        self == RowImage::Minimal
    }
}

/// Main translator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Row image mode of the binlog being translated
    #[serde(default)]
    pub row_image: RowImage,

    /// Emit rollback statements instead of replay statements
    #[serde(default)]
    pub rollback: bool,

    /// Qualify table names with their schema
    #[serde(default = "default_true")]
    pub prefix_schema: bool,

    /// Maximum number of rows in one batched INSERT
    #[serde(default = "default_rows_per_insert")]
    pub rows_per_insert: usize,

    /// Number of trailing reserved metadata columns excluded from statements
    #[serde(default = "default_metadata_columns")]
    pub metadata_columns: usize,

    /// Name of the soft-delete flag column (empty disables the override)
    #[serde(default = "default_soft_delete_column")]
    pub soft_delete_column: String,

    /// Type names whose values are compared as raw bytes
    #[serde(default = "default_bytes_type_names")]
    pub bytes_type_names: Vec<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_rows_per_insert() -> usize {
    30
}

fn default_metadata_columns() -> usize {
    2
}

fn default_soft_delete_column() -> String {
    "__deleted".to_string()
}

fn default_bytes_type_names() -> Vec<String> {
    BytesTypes::default().names().map(str::to_string).collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            row_image: RowImage::default(),
            rollback: false,
            prefix_schema: default_true(),
            rows_per_insert: default_rows_per_insert(),
            metadata_columns: default_metadata_columns(),
            soft_delete_column: default_soft_delete_column(),
            bytes_type_names: default_bytes_type_names(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> crate::Result<Self> {
        let config: TranslatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.rows_per_insert == 0 {
            return Err(crate::Error::Config("rows_per_insert must be at least 1".into()));
        }

        if self.bytes_type_names.iter().any(|n| n.trim().is_empty()) {
            return Err(crate::Error::Config("bytes_type_names cannot contain empty names".into()));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(crate::Error::Config(format!(
                "logging.format must be pretty or json, got {}",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// Render the configuration as TOML (used by `binlog2sql init`)
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Build the byte-compared type set from the configured names
    pub fn bytes_types(&self) -> BytesTypes {
        BytesTypes::new(self.bytes_type_names.iter().cloned())
    }

    /// Soft-delete flag column, if the override is enabled
    pub fn soft_delete_column(&self) -> Option<&str> {
        Some(self.soft_delete_column.as_str()).filter(|c| !c.is_empty())
    }
}
