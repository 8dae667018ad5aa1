//! Event Translator
//!
//! Turns one row-change event into replay or rollback SQL.
//!
//! | event  | replay                 | rollback                 |
//! |--------|------------------------|--------------------------|
//! | INSERT | batched INSERT         | DELETE per row           |
//! | DELETE | DELETE per row         | batched INSERT           |
//! | UPDATE | SET after, WHERE before| SET before, WHERE after  |
//!
//! UPDATE pairs whose soft-delete flag flips are emitted as INSERT or
//! DELETE instead, see [`Translator::translate_update`].

use std::sync::Arc;

use super::builder::{StatementBuilder, TableContext};
use super::diff::RowDiffer;
use super::output::{StatementKind, Translation};
use crate::binlog::{Row, RowChangeEvent, RowsEventKind};
use crate::config::TranslatorConfig;
use crate::error::{Error, Result};
use crate::schema::{check_row_columns, reconcile, SchemaCatalog, TableSchema};
use crate::sql::{column_definitions, MappedColumn, MySqlRenderer, SqlRenderer};

/// What an UPDATE pair turns into once the soft-delete flag is considered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SoftDelete {
    /// Flag went 0 -> 1
    Deleted,
    /// Flag went 1 -> 0
    Undeleted,
    /// Flag absent or unchanged
    Unchanged,
}

/// Stateless translator from row events to SQL statements
#[derive(Clone)]
pub struct Translator {
    builder: StatementBuilder,
    rollback: bool,
    soft_delete_column: Option<String>,
}

impl Translator {
    /// Create a translator rendering MySQL syntax
    pub fn new(config: &TranslatorConfig) -> Self {
        Self::with_renderer(config, Arc::new(MySqlRenderer))
    }

    /// Create a translator with a custom renderer
    pub fn with_renderer(config: &TranslatorConfig, renderer: Arc<dyn SqlRenderer>) -> Self {
        let differ = RowDiffer::new(config.row_image, config.bytes_types());
        Self {
            builder: StatementBuilder::new(
                renderer,
                differ,
                config.row_image,
                config.prefix_schema,
                config.rows_per_insert,
                config.metadata_columns,
            ),
            rollback: config.rollback,
            soft_delete_column: config.soft_delete_column().map(str::to_string),
        }
    }

    /// Whether rollback statements are produced
    pub fn is_rollback(&self) -> bool {
        self.rollback
    }

    /// Translate an event using the catalog snapshot of its table
    pub fn translate_from(&self, catalog: &SchemaCatalog, event: &RowChangeEvent) -> Result<Translation> {
        let table = catalog.get_table(&event.schema, &event.table)?;
        Ok(self.translate(event, table))
    }

    /// Translate one event against the currently known table schema.
    ///
    /// Never fails as a whole: units that cannot be translated are listed
    /// in [`Translation::failures`].
    pub fn translate(&self, event: &RowChangeEvent, table: &TableSchema) -> Translation {
        let count = event.column_count();
        if let Some(note) = check_row_columns(count, &table.fields).note() {
            tracing::info!("{}.{}: {}", event.schema, event.table, note);
        }

        let fields = reconcile(count, &table.fields);
        let columns = column_definitions(count, &fields, &event.column_types);
        let ctx = TableContext {
            schema: &event.schema,
            table: &event.table,
            columns: &columns,
            unique_key: &table.unique_key,
        };

        let mut out = Translation::new();
        match event.kind {
            RowsEventKind::Insert => self.translate_insert(&event.rows, &ctx, &mut out),
            RowsEventKind::Delete => self.translate_delete(&event.rows, &ctx, &mut out),
            RowsEventKind::Update => self.translate_update(&event.rows, &ctx, &mut out),
        }

        tracing::debug!(
            "Translated {} event on {}.{}: {} statements, {} failures",
            event.kind,
            event.schema,
            event.table,
            out.statements.len(),
            out.failures.len()
        );
        out
    }

    /// INSERT rows: batched INSERTs, or one DELETE per row on rollback
    pub fn translate_insert(&self, rows: &[Row], ctx: &TableContext<'_>, out: &mut Translation) {
        if self.rollback {
            self.builder
                .build_delete_batch(rows, ctx, StatementKind::DeleteForInsertRollback, out);
        } else {
            self.builder.build_insert_batch(rows, ctx, StatementKind::Insert, out);
        }
    }

    /// DELETE rows: one DELETE per row, or batched INSERTs on rollback
    pub fn translate_delete(&self, rows: &[Row], ctx: &TableContext<'_>, out: &mut Translation) {
        if self.rollback {
            self.builder
                .build_insert_batch(rows, ctx, StatementKind::InsertForDeleteRollback, out);
        } else {
            self.builder.build_delete_batch(rows, ctx, StatementKind::Delete, out);
        }
    }

    /// UPDATE rows, given as interleaved (before, after) pairs.
    ///
    /// When the table's last column is the soft-delete flag, a 0 -> 1 flip
    /// replays as an INSERT of the before row (rolled back as its DELETE)
    /// and a 1 -> 0 flip replays as a DELETE of the before row (rolled back
    /// as its INSERT). Any other pair is a regular UPDATE.
    pub fn translate_update(&self, rows: &[Row], ctx: &TableContext<'_>, out: &mut Translation) {
        let kind = if self.rollback {
            StatementKind::UpdateForUpdateRollback
        } else {
            StatementKind::Update
        };

        for (pair_index, pair) in rows.chunks(2).enumerate() {
            let (before, after) = match pair {
                [before, after] => (before, after),
                _ => {
                    let error = Error::UnpairedUpdateRow { index: pair_index * 2 };
                    out.fail(kind, ctx.schema, ctx.table, self.builder.trim_rows(pair, ctx), error);
                    continue;
                }
            };

            let result = self
                .builder
                .check_width(before, ctx)
                .and_then(|_| self.builder.check_width(after, ctx))
                .and_then(|_| self.soft_delete(before, after, ctx.columns))
                .and_then(|flag| match (flag, self.rollback) {
                    (SoftDelete::Deleted, false) | (SoftDelete::Undeleted, true) => {
                        self.builder.insert_sql(std::slice::from_ref(before), ctx)
                    }
                    (SoftDelete::Undeleted, false) | (SoftDelete::Deleted, true) => {
                        self.builder.delete_sql(before, ctx)
                    }
                    (SoftDelete::Unchanged, false) => self.builder.update_sql(after, before, ctx),
                    (SoftDelete::Unchanged, true) => self.builder.update_sql(before, after, ctx),
                });

            match result {
                Ok(sql) => out.push(sql),
                Err(e) => out.fail(kind, ctx.schema, ctx.table, self.builder.trim_rows(pair, ctx), e),
            }
        }
    }

    /// Classify a pair by the soft-delete flag in the last column
    fn soft_delete(&self, before: &Row, after: &Row, columns: &[MappedColumn]) -> Result<SoftDelete> {
        let Some(flag_column) = self.soft_delete_column.as_deref() else {
            return Ok(SoftDelete::Unchanged);
        };
        let Some(last) = columns.last().filter(|c| c.def.name == flag_column) else {
            return Ok(SoftDelete::Unchanged);
        };

        let index = columns.len() - 1;
        let decode = |row: &Row| {
            let value = row.get(index);
            value.and_then(|v| v.as_i64()).ok_or_else(|| Error::SoftDeleteFlag {
                column: last.def.name.clone(),
                value: value.map_or_else(|| "<missing>".to_string(), |v| v.to_sql()),
            })
        };

        Ok(match (decode(before)?, decode(after)?) {
            (0, 1) => SoftDelete::Deleted,
            (1, 0) => SoftDelete::Undeleted,
            _ => SoftDelete::Unchanged,
        })
    }
}
