//! Column Reconciliation
//!
//! Aligns the value positions of a historical event with the column list
//! currently known for its table. The table may have been altered since
//! the event was written, so either side can be longer.
//!
//! Dropped-column ordinals are 1-based and counted from the first position
//! past the known columns: with two known columns, position 2 is
//! `unknown_field_1`, position 3 is `unknown_field_2`.

use super::FieldInfo;
use crate::sql::UNKNOWN_FIELD_TYPE_NAME;

/// Name prefix of columns the current schema no longer knows about
pub const UNKNOWN_FIELD_NAME_PREFIX: &str = "unknown_field_";

/// How an event's column count relates to the known schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDrift {
    /// Same number of columns
    Match,
    /// Table gained columns after the event was written
    ColumnsAdded,
    /// Table lost columns after the event was written
    ColumnsDropped,
}

impl SchemaDrift {
    /// Operator-facing explanation, `None` when columns match
    pub fn note(&self) -> Option<String> {
        match self {
            SchemaDrift::Match => None,
            SchemaDrift::ColumnsAdded => Some(
                "binlog row data missing some fields (altered table add column), ignoring missing fields"
                    .to_string(),
            ),
            SchemaDrift::ColumnsDropped => Some(format!(
                "some table fields missing (altered table drop column), mapping extra values to {}*",
                UNKNOWN_FIELD_NAME_PREFIX
            )),
        }
    }
}

/// Classify the drift between an event row width and the known columns
pub fn check_row_columns(row_len: usize, fields: &[FieldInfo]) -> SchemaDrift {
    match row_len.cmp(&fields.len()) {
        std::cmp::Ordering::Less => SchemaDrift::ColumnsAdded,
        std::cmp::Ordering::Greater => SchemaDrift::ColumnsDropped,
        std::cmp::Ordering::Equal => SchemaDrift::Match,
    }
}

/// Placeholder name for the `ordinal`-th (1-based) dropped column
pub fn dropped_field_name(ordinal: usize) -> String {
    format!("{}{}", UNKNOWN_FIELD_NAME_PREFIX, ordinal)
}

/// Name of the value at `index`, synthesised when past the known columns
pub fn field_name(index: usize, fields: &[FieldInfo]) -> String {
    match fields.get(index) {
        Some(f) => f.field_name.clone(),
        None => dropped_field_name(index - fields.len() + 1),
    }
}

/// Extend `fields` with placeholders so that every one of `row_len` values
/// has a column. Returns `fields` unchanged when it is already wide enough.
pub fn reconcile(row_len: usize, fields: &[FieldInfo]) -> Vec<FieldInfo> {
    let mut all = fields.to_vec();
    for index in fields.len()..row_len {
        all.push(FieldInfo::new(
            field_name(index, fields),
            UNKNOWN_FIELD_TYPE_NAME,
        ));
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(n: usize) -> Vec<FieldInfo> {
        (0..n).map(|i| FieldInfo::new(format!("c{}", i), "int")).collect()
    }

    #[test]
    fn test_check_row_columns() {
        assert_eq!(check_row_columns(3, &known(3)), SchemaDrift::Match);
        assert_eq!(check_row_columns(2, &known(3)), SchemaDrift::ColumnsAdded);
        assert_eq!(check_row_columns(4, &known(3)), SchemaDrift::ColumnsDropped);
        assert!(SchemaDrift::Match.note().is_none());
        assert!(SchemaDrift::ColumnsDropped.note().unwrap().contains(UNKNOWN_FIELD_NAME_PREFIX));
    }

    #[test]
    fn test_reconcile_no_drop() {
        let fields = known(3);
        assert_eq!(reconcile(3, &fields), fields);
        // Event older than an ADD COLUMN: known list is kept as is
        assert_eq!(reconcile(2, &fields), fields);
    }

    #[test]
    fn test_reconcile_one_dropped() {
        let fields = known(3);
        let all = reconcile(4, &fields);
        assert_eq!(all.len(), 4);
        assert_eq!(&all[..3], &fields[..]);
        assert_eq!(all[3], FieldInfo::new("unknown_field_1", UNKNOWN_FIELD_TYPE_NAME));
    }

    #[test]
    fn test_reconcile_all_but_one_dropped() {
        let fields = known(1);
        let all = reconcile(4, &fields);
        let names: Vec<_> = all.iter().map(|f| f.field_name.as_str()).collect();
        assert_eq!(names, ["c0", "unknown_field_1", "unknown_field_2", "unknown_field_3"]);
    }

    #[test]
    fn test_reconcile_empty_schema() {
        let all = reconcile(2, &[]);
        assert_eq!(all[0].field_name, "unknown_field_1");
        assert_eq!(all[1].field_name, "unknown_field_2");
    }

    #[test]
    fn test_field_name_agrees_with_reconcile() {
        let fields = known(2);
        let all = reconcile(5, &fields);
        for (i, f) in all.iter().enumerate() {
            assert_eq!(field_name(i, &fields), f.field_name);
        }
    }

    #[test]
    fn test_reconcile_is_pure() {
        let fields = known(2);
        assert_eq!(reconcile(4, &fields), reconcile(4, &fields));
        assert_eq!(fields, known(2));
    }
}
