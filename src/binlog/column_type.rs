//! Binlog Column Types
//!
//! Wire type codes carried in TABLE_MAP events, paired with the per-column
//! metadata word the server writes next to them.

use serde::{Deserialize, Serialize};

/// Column type codes (MariaDB/MySQL `enum_field_types`)
#[allow(dead_code)]
pub mod column_type {
    pub const MYSQL_TYPE_DECIMAL: u8 = 0;
    pub const MYSQL_TYPE_TINY: u8 = 1;
    pub const MYSQL_TYPE_SHORT: u8 = 2;
    pub const MYSQL_TYPE_LONG: u8 = 3;
    pub const MYSQL_TYPE_FLOAT: u8 = 4;
    pub const MYSQL_TYPE_DOUBLE: u8 = 5;
    pub const MYSQL_TYPE_NULL: u8 = 6;
    pub const MYSQL_TYPE_TIMESTAMP: u8 = 7;
    pub const MYSQL_TYPE_LONGLONG: u8 = 8;
    pub const MYSQL_TYPE_INT24: u8 = 9;
    pub const MYSQL_TYPE_DATE: u8 = 10;
    pub const MYSQL_TYPE_TIME: u8 = 11;
    pub const MYSQL_TYPE_DATETIME: u8 = 12;
    pub const MYSQL_TYPE_YEAR: u8 = 13;
    pub const MYSQL_TYPE_NEWDATE: u8 = 14;
    pub const MYSQL_TYPE_VARCHAR: u8 = 15;
    pub const MYSQL_TYPE_BIT: u8 = 16;
    pub const MYSQL_TYPE_TIMESTAMP2: u8 = 17;
    pub const MYSQL_TYPE_DATETIME2: u8 = 18;
    pub const MYSQL_TYPE_TIME2: u8 = 19;

    pub const MYSQL_TYPE_JSON: u8 = 245;
    pub const MYSQL_TYPE_NEWDECIMAL: u8 = 246;
    pub const MYSQL_TYPE_ENUM: u8 = 247;
    pub const MYSQL_TYPE_SET: u8 = 248;
    pub const MYSQL_TYPE_TINY_BLOB: u8 = 249;
    pub const MYSQL_TYPE_MEDIUM_BLOB: u8 = 250;
    pub const MYSQL_TYPE_LONG_BLOB: u8 = 251;
    pub const MYSQL_TYPE_BLOB: u8 = 252;
    pub const MYSQL_TYPE_VAR_STRING: u8 = 253;
    pub const MYSQL_TYPE_STRING: u8 = 254;
    pub const MYSQL_TYPE_GEOMETRY: u8 = 255;
}

use column_type::*;

/// One column's wire type as delivered in the table map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTypeCode {
    /// Type code
    pub code: u8,
    /// Type metadata word
    #[serde(default)]
    pub meta: u16,
}

impl ColumnTypeCode {
    /// Placeholder for value positions the table map did not describe
    pub const NULL: ColumnTypeCode = ColumnTypeCode {
        code: MYSQL_TYPE_NULL,
        meta: 0,
    };

    pub fn new(code: u8, meta: u16) -> Self {
        Self { code, meta }
    }

    /// Resolve the physical type behind `MYSQL_TYPE_STRING`.
    ///
    /// CHAR, BINARY, ENUM and SET all travel as `MYSQL_TYPE_STRING`; when
    /// the metadata word is at least 256 its high byte carries the real
    /// type. If bits 0x30 of that byte are not both set, they were reused
    /// for the field length and the string tag has to be restored.
    pub fn real_type(&self) -> u8 {
        if self.code == MYSQL_TYPE_STRING && self.meta >= 256 {
            let b0 = (self.meta >> 8) as u8;
            if b0 & 0x30 != 0x30 {
                return b0 | 0x30;
            }
            return b0;
        }
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_type_passthrough() {
        assert_eq!(ColumnTypeCode::new(MYSQL_TYPE_LONG, 0).real_type(), MYSQL_TYPE_LONG);
        // Short CHAR: meta below 256 is just the length
        assert_eq!(ColumnTypeCode::new(MYSQL_TYPE_STRING, 40).real_type(), MYSQL_TYPE_STRING);
    }

    #[test]
    fn test_real_type_enum_and_set() {
        let enum_meta = ((MYSQL_TYPE_ENUM as u16) << 8) | 1;
        assert_eq!(ColumnTypeCode::new(MYSQL_TYPE_STRING, enum_meta).real_type(), MYSQL_TYPE_ENUM);

        let set_meta = ((MYSQL_TYPE_SET as u16) << 8) | 1;
        assert_eq!(ColumnTypeCode::new(MYSQL_TYPE_STRING, set_meta).real_type(), MYSQL_TYPE_SET);
    }

    #[test]
    fn test_real_type_long_char_restores_string_tag() {
        // CHAR(255) in utf8mb4: length bits stolen from 0x30 of the type byte
        let b0 = MYSQL_TYPE_STRING ^ 0x30;
        let meta = ((b0 as u16) << 8) | 0xfc;
        assert_eq!(ColumnTypeCode::new(MYSQL_TYPE_STRING, meta).real_type(), MYSQL_TYPE_STRING);
    }
}
