//! Statement Builder
//!
//! Assembles INSERT / DELETE / UPDATE statements for the rows of one event
//! and renders them. The trailing metadata columns of a table never appear
//! in a statement.

use std::sync::Arc;

use super::diff::RowDiffer;
use super::output::{StatementKind, Translation};
use crate::binlog::Row;
use crate::config::RowImage;
use crate::error::{Error, Result};
use crate::sql::{
    BoolExpr, ColumnDef, DeleteStatement, InsertStatement, MappedColumn, SqlRenderer, Statement,
    UpdateStatement, Value,
};

/// Reconciled columns of the table an event belongs to
#[derive(Debug, Clone, Copy)]
pub struct TableContext<'a> {
    pub schema: &'a str,
    pub table: &'a str,
    /// One entry per value position, metadata columns included
    pub columns: &'a [MappedColumn],
    /// Indices of the unique key columns
    pub unique_key: &'a [usize],
}

/// Builds and renders statements for one table's rows
#[derive(Clone)]
pub struct StatementBuilder {
    renderer: Arc<dyn SqlRenderer>,
    differ: RowDiffer,
    row_image: RowImage,
    prefix_schema: bool,
    rows_per_insert: usize,
    metadata_columns: usize,
}

impl StatementBuilder {
    pub fn new(
        renderer: Arc<dyn SqlRenderer>,
        differ: RowDiffer,
        row_image: RowImage,
        prefix_schema: bool,
        rows_per_insert: usize,
        metadata_columns: usize,
    ) -> Self {
        Self {
            renderer,
            differ,
            row_image,
            prefix_schema,
            rows_per_insert: rows_per_insert.max(1),
            metadata_columns,
        }
    }

    /// Columns that take part in statements
    pub fn data_columns<'a>(&self, ctx: &TableContext<'a>) -> &'a [MappedColumn] {
        let n = ctx.columns.len().saturating_sub(self.metadata_columns);
        &ctx.columns[..n]
    }

    fn column_defs(&self, ctx: &TableContext<'_>) -> Vec<ColumnDef> {
        self.data_columns(ctx).iter().map(|c| c.def.clone()).collect()
    }

    fn render(&self, statement: Statement, ctx: &TableContext<'_>) -> Result<String> {
        let schema = if self.prefix_schema { Some(ctx.schema) } else { None };
        self.renderer.render(&statement, schema)
    }

    /// Multi-row INSERTs of at most `rows_per_insert` rows each.
    ///
    /// A chunk that fails is reported and skipped.
    pub fn build_insert_batch(
        &self,
        rows: &[Row],
        ctx: &TableContext<'_>,
        kind: StatementKind,
        out: &mut Translation,
    ) {
        for chunk in rows.chunks(self.rows_per_insert) {
            match self.insert_sql(chunk, ctx) {
                Ok(sql) => out.push(sql),
                Err(e) => out.fail(kind, ctx.schema, ctx.table, self.trim_rows(chunk, ctx), e),
            }
        }
    }

    /// One DELETE per row. A row that fails is reported and skipped.
    pub fn build_delete_batch(
        &self,
        rows: &[Row],
        ctx: &TableContext<'_>,
        kind: StatementKind,
        out: &mut Translation,
    ) {
        for row in rows {
            match self.delete_sql(row, ctx) {
                Ok(sql) => out.push(sql),
                Err(e) => out.fail(kind, ctx.schema, ctx.table, self.trim_rows(std::slice::from_ref(row), ctx), e),
            }
        }
    }

    /// Render a single-chunk INSERT
    pub fn insert_sql(&self, rows: &[Row], ctx: &TableContext<'_>) -> Result<String> {
        let mut stmt = InsertStatement::new(ctx.table, self.column_defs(ctx));
        for row in rows {
            stmt.add(self.data_values(row, ctx)?.to_vec());
        }
        self.render(stmt.into(), ctx)
    }

    /// Render the DELETE matching `row`
    pub fn delete_sql(&self, row: &Row, ctx: &TableContext<'_>) -> Result<String> {
        let stmt = DeleteStatement::new(ctx.table).where_(self.equal_conditions(row, ctx)?);
        self.render(stmt.into(), ctx)
    }

    /// Render the UPDATE moving a row from `old` to `new`
    pub fn update_sql(&self, new: &Row, old: &Row, ctx: &TableContext<'_>) -> Result<String> {
        let stmt = self.build_update(new, old, ctx)?;
        self.render(stmt.into(), ctx)
    }

    /// SET every column the differ reports changed between `old` and `new`,
    /// WHERE matching `old`
    pub fn build_update(&self, new: &Row, old: &Row, ctx: &TableContext<'_>) -> Result<UpdateStatement> {
        let columns = self.data_columns(ctx);
        let new_values = self.data_values(new, ctx)?;
        let old_values = self.data_values(old, ctx)?;

        let mut stmt = UpdateStatement::new(ctx.table);
        for ((column, after), before) in columns.iter().zip(new_values).zip(old_values) {
            if self
                .differ
                .changed(before, after, column.type_name, &column.declared_type)
            {
                stmt.set(column.def.clone(), after.clone());
            }
        }
        stmt.where_(self.equal_conditions(old, ctx)?);
        Ok(stmt)
    }

    /// Equality predicate identifying `row`.
    ///
    /// With minimal row images only the unique key columns are guaranteed
    /// to be present, so the predicate is restricted to them when a key is
    /// known. Otherwise every data column is matched.
    pub fn equal_conditions(&self, row: &Row, ctx: &TableContext<'_>) -> Result<BoolExpr> {
        let columns = self.data_columns(ctx);
        let values = self.data_values(row, ctx)?;

        if self.row_image.is_minimal() && !ctx.unique_key.is_empty() {
            let terms = ctx
                .unique_key
                .iter()
                .map(|&index| match (columns.get(index), values.get(index)) {
                    (Some(column), Some(value)) => Ok(BoolExpr::eq(column.def.clone(), value.clone())),
                    _ => Err(Error::KeyColumnOutOfRange {
                        index,
                        columns: columns.len(),
                    }),
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(BoolExpr::And(terms));
        }

        Ok(BoolExpr::And(
            columns
                .iter()
                .zip(values)
                .map(|(column, value)| BoolExpr::eq(column.def.clone(), value.clone()))
                .collect(),
        ))
    }

    /// Fail rows whose width differs from the event's column count
    pub fn check_width(&self, row: &Row, ctx: &TableContext<'_>) -> Result<()> {
        if row.len() != ctx.columns.len() {
            return Err(Error::RowWidth {
                expected: ctx.columns.len(),
                actual: row.len(),
            });
        }
        Ok(())
    }

    /// The data values of a row of the expected width
    fn data_values<'r>(&self, row: &'r Row, ctx: &TableContext<'_>) -> Result<&'r [Value]> {
        self.check_width(row, ctx)?;
        Ok(&row[..self.data_columns(ctx).len()])
    }

    /// Rows without their metadata columns, for failure reports
    pub fn trim_rows(&self, rows: &[Row], ctx: &TableContext<'_>) -> Vec<Row> {
        let n = self.data_columns(ctx).len();
        rows.iter().map(|r| r.iter().take(n).cloned().collect()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binlog::column_type::column_type::*;
    use crate::binlog::ColumnTypeCode;
    use crate::schema::FieldInfo;
    use crate::sql::{column_definitions, MySqlRenderer};
    use crate::translate::BytesTypes;

    fn builder(row_image: RowImage, rows_per_insert: usize) -> StatementBuilder {
        StatementBuilder::new(
            Arc::new(MySqlRenderer),
            RowDiffer::new(row_image, BytesTypes::default()),
            row_image,
            true,
            rows_per_insert,
            2,
        )
    }

    /// id int, name varchar, photo blob, plus two metadata columns
    fn columns() -> Vec<MappedColumn> {
        let fields = vec![
            FieldInfo::new("id", "int(11)"),
            FieldInfo::new("name", "varchar(32)"),
            FieldInfo::new("photo", "blob"),
            FieldInfo::new("__seq", "bigint"),
            FieldInfo::new("__deleted", "tinyint"),
        ];
        let types = vec![
            ColumnTypeCode::new(MYSQL_TYPE_LONG, 0),
            ColumnTypeCode::new(MYSQL_TYPE_VARCHAR, 32),
            ColumnTypeCode::new(MYSQL_TYPE_BLOB, 2),
            ColumnTypeCode::new(MYSQL_TYPE_LONGLONG, 0),
            ColumnTypeCode::new(MYSQL_TYPE_TINY, 0),
        ];
        column_definitions(5, &fields, &types)
    }

    fn row(id: i64, name: &str, photo: &[u8]) -> Row {
        vec![
            Value::Int(id),
            Value::String(name.into()),
            Value::Bytes(photo.to_vec()),
            Value::Int(100 + id),
            Value::Int(0),
        ]
    }

    fn ctx<'a>(columns: &'a [MappedColumn], unique_key: &'a [usize]) -> TableContext<'a> {
        TableContext {
            schema: "shop",
            table: "users",
            columns,
            unique_key,
        }
    }

    #[test]
    fn test_insert_batch_chunking() {
        let cols = columns();
        let rows: Vec<Row> = (1..=5).map(|i| row(i, "n", b"p")).collect();
        let mut out = Translation::new();

        builder(RowImage::Full, 2).build_insert_batch(&rows, &ctx(&cols, &[]), StatementKind::Insert, &mut out);

        assert!(out.is_clean());
        assert_eq!(out.statements.len(), 3);
        let counts: Vec<usize> = out.statements.iter().map(|s| s.matches("), (").count() + 1).collect();
        assert_eq!(counts, vec![2, 2, 1]);
        assert_eq!(
            out.statements[2],
            "INSERT INTO `shop`.`users` (`id`, `name`, `photo`) VALUES (5, 'n', X'70')"
        );
    }

    #[test]
    fn test_insert_chunk_failure_is_isolated() {
        let cols = columns();
        let mut rows: Vec<Row> = (1..=4).map(|i| row(i, "n", b"p")).collect();
        rows[2] = vec![Value::Int(3)];
        let mut out = Translation::new();

        builder(RowImage::Full, 2).build_insert_batch(&rows, &ctx(&cols, &[]), StatementKind::Insert, &mut out);

        assert_eq!(out.statements.len(), 1);
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].rows.len(), 2);
        assert_eq!(out.failures[0].kind, StatementKind::Insert);
        assert!(matches!(out.failures[0].error, Error::RowWidth { expected: 5, actual: 1 }));
    }

    #[test]
    fn test_wide_row_fails_alone() {
        let cols = columns();
        let mut wide = row(2, "n", b"p");
        wide.push(Value::Int(99));
        let b = builder(RowImage::Full, 10);

        let err = b.delete_sql(&wide, &ctx(&cols, &[])).unwrap_err();
        assert!(matches!(err, Error::RowWidth { expected: 5, actual: 6 }));

        let err = b.update_sql(&wide, &row(2, "m", b"p"), &ctx(&cols, &[])).unwrap_err();
        assert!(matches!(err, Error::RowWidth { .. }));
    }

    #[test]
    fn test_delete_full_row_predicate() {
        let cols = columns();
        let sql = builder(RowImage::Full, 10)
            .delete_sql(&row(1, "ann", b"\x01"), &ctx(&cols, &[0]))
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM `shop`.`users` WHERE `id` = 1 AND `name` = 'ann' AND `photo` = X'01'"
        );
    }

    #[test]
    fn test_delete_minimal_uses_unique_key() {
        let cols = columns();
        let b = builder(RowImage::Minimal, 10);
        let pred = b.equal_conditions(&row(1, "ann", b""), &ctx(&cols, &[0, 1])).unwrap();
        assert_eq!(pred.columns(), vec!["id", "name"]);

        // No key known: all data columns
        let pred = b.equal_conditions(&row(1, "ann", b""), &ctx(&cols, &[])).unwrap();
        assert_eq!(pred.columns(), vec!["id", "name", "photo"]);
    }

    #[test]
    fn test_unique_key_out_of_range() {
        let cols = columns();
        // Index 3 is a metadata column
        let err = builder(RowImage::Minimal, 10)
            .equal_conditions(&row(1, "ann", b""), &ctx(&cols, &[3]))
            .unwrap_err();
        assert!(matches!(err, Error::KeyColumnOutOfRange { index: 3, columns: 3 }));
    }

    #[test]
    fn test_delete_batch_failure_isolation() {
        let cols = columns();
        let mut rows: Vec<Row> = (1..=5).map(|i| row(i, "n", b"p")).collect();
        rows[1][1] = Value::Float(f64::INFINITY);
        let mut out = Translation::new();

        builder(RowImage::Full, 10).build_delete_batch(&rows, &ctx(&cols, &[]), StatementKind::Delete, &mut out);

        assert_eq!(out.statements.len(), 4);
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].rows[0][0], Value::Int(2));
        assert_eq!(out.failures[0].rows[0].len(), 3);
    }

    #[test]
    fn test_update_minimal_sets_changed_only() {
        let cols = columns();
        let before = row(1, "ann", b"\x01\x02");
        let mut after = before.clone();
        after[1] = Value::String("bea".into());

        let stmt = builder(RowImage::Minimal, 10)
            .build_update(&after, &before, &ctx(&cols, &[0]))
            .unwrap();
        assert_eq!(stmt.assignments.len(), 1);
        assert_eq!(stmt.assignments[0].0.name, "name");
        assert_eq!(stmt.predicate.as_ref().unwrap().columns(), vec!["id"]);
    }

    #[test]
    fn test_update_full_sets_everything() {
        let cols = columns();
        let before = row(1, "ann", b"\x01");
        let after = row(1, "bea", b"\x01");

        let sql = builder(RowImage::Full, 10)
            .update_sql(&after, &before, &ctx(&cols, &[0]))
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE `shop`.`users` SET `id` = 1, `name` = 'bea', `photo` = X'01' \
             WHERE `id` = 1 AND `name` = 'ann' AND `photo` = X'01'"
        );
    }

    #[test]
    fn test_update_without_changes_fails_to_render() {
        let cols = columns();
        let before = row(1, "ann", b"\x01");
        let err = builder(RowImage::Minimal, 10)
            .update_sql(&before, &before, &ctx(&cols, &[0]))
            .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn test_unqualified_tables() {
        let cols = columns();
        let b = StatementBuilder::new(
            Arc::new(MySqlRenderer),
            RowDiffer::new(RowImage::Full, BytesTypes::default()),
            RowImage::Full,
            false,
            10,
            2,
        );
        let sql = b.delete_sql(&row(1, "a", b""), &ctx(&cols, &[])).unwrap();
        assert!(sql.starts_with("DELETE FROM `users` WHERE"));
    }
}
