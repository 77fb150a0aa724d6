use std::sync::Arc;

use crate::error::{StmtError, StmtResult};
use crate::fmt::{Formatter, QueryAppender, QueryBuf};
use crate::fragment::QueryWithArgs;
use crate::model::Model;
use crate::query::base::{BaseQuery, append_field_names};
use crate::query::returning::ReturningQuery;
use crate::query::set::SetQuery;
use crate::query::values::CustomValueQuery;
use crate::query::{Operation, Statement};
use crate::schema::{Entity, Field};
use crate::value::Arg;

/// `INSERT` statement.
///
/// Rows come from the bound model: one row for an entity, one per element for
/// [`rows`](crate::model::rows). Without a model only [`value`](Self::value)
/// columns are inserted.
#[must_use]
#[derive(Default)]
pub struct InsertQuery<'a> {
    base: BaseQuery<'a>,
    returning: ReturningQuery,
    values: CustomValueQuery,
    on_conflict: QueryWithArgs,
    set: SetQuery,
}

impl<'a> InsertQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    impl_base_builder!(base);

    /// Override (model column) or add (other column) a value expression.
    pub fn value(mut self, column: &str, query: &str, args: Vec<Arg>) -> Self {
        self.values.add_value(self.base.table(), column, query, args);
        self
    }

    /// `ON CONFLICT <expr>`, e.g. `"(id) DO UPDATE"`.
    pub fn on_conflict(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.on_conflict = QueryWithArgs::safe(query, args);
        self
    }

    /// Assignment for `ON CONFLICT ... DO UPDATE`.
    pub fn set(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.set.add_set(QueryWithArgs::safe(query, args));
        self
    }

    pub fn returning(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.returning.add_returning(QueryWithArgs::safe(query, args));
        self
    }

    /// Return a model column. Ignored when [`returning`](Self::returning) was used.
    pub fn returning_column(mut self, column: &str) -> Self {
        let field = match self.base.table() {
            Some(table) => table.field(column).map(Arc::clone),
            None => Err(StmtError::NoTable),
        };
        match field {
            Ok(field) => self.returning.add_returning_field(&field),
            Err(err) => self.base.set_err(err),
        }
        self
    }

    fn append_columns_list(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf, fields: &[Arc<Field>]) {
        buf.push_str(" (");
        append_field_names(fmter, buf, None, fields);
        for (i, extra) in self.values.extra_values().iter().enumerate() {
            if i > 0 || !fields.is_empty() {
                buf.push_str(", ");
            }
            fmter.append_ident(buf, &extra.column);
        }
        buf.push(')');
    }

    fn append_row(
        &self,
        fmter: &Formatter<'_>,
        buf: &mut QueryBuf,
        fields: &[Arc<Field>],
        entity: Option<&dyn Entity>,
    ) -> StmtResult<()> {
        buf.push('(');
        let mut first = true;
        for field in fields {
            if !first {
                buf.push_str(", ");
            }
            first = false;
            match (self.values.model_value(field.sql_name()), entity) {
                (Some(custom), _) => custom.append_query(fmter, buf)?,
                (None, Some(entity)) => field.append_value(fmter, buf, entity),
                (None, None) => buf.push_str("DEFAULT"),
            }
        }
        for extra in self.values.extra_values() {
            if !first {
                buf.push_str(", ");
            }
            first = false;
            extra.value.append_query(fmter, buf)?;
        }
        buf.push(')');
        Ok(())
    }
}

impl QueryAppender for InsertQuery<'_> {
    fn append_query(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        let base = &self.base;
        base.check_err()?;
        let fmter = fmter.with_model(base);

        base.append_with(&fmter, buf)?;

        buf.push_str("INSERT INTO ");
        base.append_first_table_with_alias(&fmter, buf)?;

        match base.model() {
            Some(model @ Model::Type(table)) => {
                return Err(StmtError::Unsupported(format!(
                    "Insert does not support {} of {table} without rows",
                    model.kind_name()
                )));
            }
            Some(model) => {
                let rows = model.rows();
                if rows.is_empty() {
                    return Err(StmtError::Other("Insert query has no rows".to_string()));
                }
                let fields = base.get_fields()?;
                self.append_columns_list(&fmter, buf, &fields);
                buf.push_str(" VALUES ");
                for (i, row) in rows.into_iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    self.append_row(&fmter, buf, &fields, Some(row))?;
                }
            }
            None => {
                if self.values.extra_values().is_empty() {
                    return Err(StmtError::Other("Insert query has no values".to_string()));
                }
                self.append_columns_list(&fmter, buf, &[]);
                buf.push_str(" VALUES ");
                self.append_row(&fmter, buf, &[], None)?;
            }
        }

        if !self.on_conflict.is_zero() {
            buf.push_str(" ON CONFLICT ");
            self.on_conflict.append_query(&fmter, buf)?;
            if !self.set.is_empty() {
                self.set.append_set(&fmter, buf)?;
            }
        }

        self.returning.append_returning(&fmter, buf)
    }
}

impl Statement for InsertQuery<'_> {
    fn operation(&self) -> Operation {
        Operation::Insert
    }
}
