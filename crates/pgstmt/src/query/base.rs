//! Builder state shared by every statement.

use std::sync::Arc;

use crate::error::{StmtError, StmtResult};
use crate::fmt::{ArgAppender, Formatter, QueryAppender, QueryBuf};
use crate::fragment::{QueryWithArgs, append_list};
use crate::model::{IntoModel, Model};
use crate::schema::{Field, Table};

/// Statement flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryFlags(u8);

impl QueryFlags {
    /// Render a primary-key predicate from the bound model.
    pub const WHERE_PK: QueryFlags = QueryFlags(1);
    /// Only soft-deleted rows.
    pub const DELETED: QueryFlags = QueryFlags(1 << 1);
    /// Soft-deleted and live rows.
    pub const ALL_WITH_DELETED: QueryFlags = QueryFlags(1 << 2);
    /// DELETE removes rows instead of stamping the soft-delete field.
    pub const FORCE_DELETE: QueryFlags = QueryFlags(1 << 3);

    pub fn has(self, flag: QueryFlags) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn set(&mut self, flag: QueryFlags) {
        self.0 |= flag.0;
    }

    pub fn remove(&mut self, flag: QueryFlags) {
        self.0 &= !flag.0;
    }
}

pub(crate) struct WithQuery<'a> {
    name: String,
    query: Box<dyn QueryAppender + Send + Sync + 'a>,
}

/// Model binding, table and column lists, flags and the sticky error.
#[derive(Default)]
pub struct BaseQuery<'a> {
    pub(crate) model: Option<Model<'a>>,
    pub(crate) table: Option<&'static Table>,
    pub(crate) with: Vec<WithQuery<'a>>,
    pub(crate) model_table: QueryWithArgs,
    pub(crate) tables: Vec<QueryWithArgs>,
    pub(crate) columns: Option<Vec<QueryWithArgs>>,
    pub(crate) flags: QueryFlags,
    pub(crate) err: Option<StmtError>,
}

impl<'a> BaseQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_model<M: IntoModel<'a>>(&mut self, model: M) {
        match model.into_model() {
            Ok(model) => {
                self.table = Some(model.table());
                self.model = Some(model);
            }
            Err(err) => self.set_err(err),
        }
    }

    /// Record `err` unless an error is already stored.
    pub fn set_err(&mut self, err: StmtError) {
        if self.err.is_some() {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "pgstmt.sql", error = %err, "statement builder error");
        self.err = Some(err);
    }

    pub fn err(&self) -> Option<&StmtError> {
        self.err.as_ref()
    }

    /// Fail with a copy of the sticky error, if any.
    pub(crate) fn check_err(&self) -> StmtResult<()> {
        match &self.err {
            Some(err) => Err(err.duplicate()),
            None => Ok(()),
        }
    }

    pub fn flags(&self) -> QueryFlags {
        self.flags
    }

    pub fn table(&self) -> Option<&'static Table> {
        self.table
    }

    pub fn model(&self) -> Option<&Model<'a>> {
        self.model.as_ref()
    }

    pub fn mark_where_pk(&mut self) {
        self.flags.set(QueryFlags::WHERE_PK);
    }

    fn check_soft_delete(&self) -> StmtResult<()> {
        let Some(table) = self.table else {
            return Err(StmtError::SoftDelete(
                "can't use soft deletes without a table".to_string(),
            ));
        };
        if table.soft_delete_field().is_none() {
            return Err(StmtError::SoftDelete(format!(
                "{table} does not have a soft delete field"
            )));
        }
        // set_model binds table and model together, so this only fires if a
        // table is ever bound without a model.
        if self.model.is_none() {
            return Err(StmtError::SoftDelete(
                "can't use soft deletes without a table model".to_string(),
            ));
        }
        Ok(())
    }

    /// Only soft-deleted rows: `WHERE deleted_at IS NOT NULL`.
    pub fn where_deleted(&mut self) {
        if let Err(err) = self.check_soft_delete() {
            self.set_err(err);
            return;
        }
        self.flags.set(QueryFlags::DELETED);
        self.flags.remove(QueryFlags::ALL_WITH_DELETED);
    }

    /// Soft-deleted rows are included, no soft-delete filter is rendered.
    pub fn where_all_with_deleted(&mut self) {
        if let Err(err) = self.check_soft_delete() {
            self.set_err(err);
            return;
        }
        self.flags.set(QueryFlags::ALL_WITH_DELETED);
        self.flags.remove(QueryFlags::DELETED);
    }

    /// Whether the soft-delete filter is rendered in WHERE.
    pub fn is_soft_delete(&self) -> bool {
        self.table.is_some_and(|t| {
            t.soft_delete_field().is_some()
                && !self.flags.has(QueryFlags::ALL_WITH_DELETED)
                && (!self.flags.has(QueryFlags::FORCE_DELETE) || self.flags.has(QueryFlags::DELETED))
        })
    }

    pub fn add_with(&mut self, name: impl Into<String>, query: impl QueryAppender + Send + Sync + 'a) {
        self.with.push(WithQuery {
            name: name.into(),
            query: Box::new(query),
        });
    }

    pub(crate) fn append_with(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        if self.with.is_empty() {
            return Ok(());
        }

        buf.push_str("WITH ");
        for (i, with) in self.with.iter().enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            fmter.append_ident(buf, &with.name);
            if let Some(cols) = with.query.as_columns_appender() {
                buf.push_str(" (");
                cols.append_columns(fmter, buf)?;
                buf.push(')');
            }
            buf.push_str(" AS (");
            with.query.append_query(fmter, buf)?;
            buf.push(')');
        }
        buf.push(' ');
        Ok(())
    }

    pub fn add_table(&mut self, table: QueryWithArgs) {
        self.tables.push(table);
    }

    pub fn add_column(&mut self, column: QueryWithArgs) {
        self.columns.get_or_insert_with(Vec::new).push(column);
    }

    pub fn set_model_table(&mut self, expr: QueryWithArgs) {
        self.model_table = expr;
    }

    /// Remove `columns` from the column list, starting from the table's
    /// fields when no list was set.
    pub fn exclude_column<S: AsRef<str>>(&mut self, columns: &[S]) {
        if self.columns.is_none() {
            let Some(table) = self.table else {
                self.set_err(StmtError::NoTable);
                return;
            };
            self.columns = Some(
                table
                    .fields()
                    .iter()
                    .map(|f| QueryWithArgs::ident(f.sql_name()))
                    .collect(),
            );
        }

        for column in columns {
            let column = column.as_ref();
            if !self.remove_column(column) {
                self.set_err(StmtError::ColumnNotFound(column.to_string()));
                break;
            }
        }
    }

    fn remove_column(&mut self, column: &str) -> bool {
        let Some(columns) = self.columns.as_mut() else {
            return false;
        };
        match columns.iter().position(|c| c.args.is_none() && c.query == column) {
            Some(i) => {
                columns.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn columns(&self) -> Option<&[QueryWithArgs]> {
        self.columns.as_deref()
    }

    fn has_columns(&self) -> bool {
        self.columns.as_ref().is_some_and(|c| !c.is_empty())
    }

    pub(crate) fn model_has_table_name(&self) -> bool {
        !self.model_table.is_zero() || self.table.is_some()
    }

    pub fn has_tables(&self) -> bool {
        self.model_has_table_name() || !self.tables.is_empty()
    }

    pub(crate) fn append_first_table(
        &self,
        fmter: &Formatter<'_>,
        buf: &mut QueryBuf,
    ) -> StmtResult<()> {
        self.append_first_table_inner(fmter, buf, false)
    }

    pub(crate) fn append_first_table_with_alias(
        &self,
        fmter: &Formatter<'_>,
        buf: &mut QueryBuf,
    ) -> StmtResult<()> {
        self.append_first_table_inner(fmter, buf, true)
    }

    fn append_first_table_inner(
        &self,
        fmter: &Formatter<'_>,
        buf: &mut QueryBuf,
        with_alias: bool,
    ) -> StmtResult<()> {
        if !self.model_table.is_zero() {
            return self.model_table.append_query(fmter, buf);
        }

        if let Some(table) = self.table {
            fmter.append_ident(buf, table.sql_name());
            if with_alias && table.alias() != table.sql_name() {
                buf.push_str(" AS ");
                fmter.append_ident(buf, table.alias());
            }
            return Ok(());
        }

        match self.tables.first() {
            Some(first) => first.append_query(fmter, buf),
            None => Err(StmtError::NoTable),
        }
    }

    pub(crate) fn has_multi_tables(&self) -> bool {
        if self.model_has_table_name() {
            !self.tables.is_empty()
        } else {
            self.tables.len() >= 2
        }
    }

    pub(crate) fn append_other_tables(
        &self,
        fmter: &Formatter<'_>,
        buf: &mut QueryBuf,
    ) -> StmtResult<()> {
        let tables = if self.model_has_table_name() {
            &self.tables[..]
        } else {
            self.tables.get(1..).unwrap_or_default()
        };
        append_list(fmter, buf, tables)
    }

    pub(crate) fn append_columns(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        append_list(fmter, buf, self.columns.as_deref().unwrap_or_default())
    }

    fn require_table(&self) -> StmtResult<&'static Table> {
        self.table.ok_or(StmtError::NoTable)
    }

    /// Fields selected by the column list, or every field when there is none.
    pub fn get_fields(&self) -> StmtResult<Vec<Arc<Field>>> {
        let table = self.require_table()?;
        if !self.has_columns() {
            return Ok(table.fields().to_vec());
        }
        self.resolve_fields(table, false)
    }

    /// Like [`get_fields`](Self::get_fields) without primary keys.
    pub fn get_data_fields(&self) -> StmtResult<Vec<Arc<Field>>> {
        let table = self.require_table()?;
        if !self.has_columns() {
            return Ok(table.data_fields().to_vec());
        }
        self.resolve_fields(table, true)
    }

    fn resolve_fields(&self, table: &'static Table, omit_pk: bool) -> StmtResult<Vec<Arc<Field>>> {
        let columns = self.columns.as_deref().unwrap_or_default();
        let mut fields = Vec::with_capacity(columns.len());
        for col in columns {
            // expressions are not column references
            if col.args.is_some() {
                continue;
            }
            let field = table.field(&col.query)?;
            if omit_pk && field.is_pk() {
                continue;
            }
            fields.push(Arc::clone(field));
        }
        Ok(fields)
    }
}

/// Append `fields` comma-separated, qualified by `alias` when given.
pub(crate) fn append_field_names(
    fmter: &Formatter<'_>,
    buf: &mut QueryBuf,
    alias: Option<&str>,
    fields: &[Arc<Field>],
) {
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        if let Some(alias) = alias {
            fmter.append_ident(buf, alias);
            buf.push('.');
        }
        fmter.append_ident(buf, f.sql_name());
    }
}

impl ArgAppender for BaseQuery<'_> {
    fn append_arg(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf, name: &str) -> bool {
        let Some(table) = self.table else {
            return false;
        };

        match name {
            "TableName" => fmter.append_ident(buf, table.sql_name()),
            "TableAlias" => fmter.append_ident(buf, table.alias()),
            "PKs" => append_field_names(fmter, buf, None, table.pks()),
            "TablePKs" => append_field_names(fmter, buf, Some(table.alias()), table.pks()),
            "Columns" => append_field_names(fmter, buf, None, table.fields()),
            "TableColumns" => append_field_names(fmter, buf, Some(table.alias()), table.fields()),
            _ => return false,
        }
        true
    }
}
