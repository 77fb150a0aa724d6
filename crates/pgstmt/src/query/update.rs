use crate::error::{StmtError, StmtResult};
use crate::fmt::{Formatter, QueryAppender, QueryBuf};
use crate::fragment::QueryWithArgs;
use crate::model::Model;
use crate::query::returning::ReturningQuery;
use crate::query::set::SetQuery;
use crate::query::values::CustomValueQuery;
use crate::query::where_clause::WhereBaseQuery;
use crate::query::{Operation, Statement};
use crate::value::Arg;

/// `UPDATE` statement.
///
/// Explicit [`set`](Self::set) assignments win; otherwise an entity model
/// updates its non-PK columns. A WHERE clause (or [`where_pk`](Self::where_pk))
/// is required.
#[must_use]
#[derive(Default)]
pub struct UpdateQuery<'a> {
    q: WhereBaseQuery<'a>,
    returning: ReturningQuery,
    set: SetQuery,
    values: CustomValueQuery,
}

impl<'a> UpdateQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    impl_base_builder!(q.base);
    impl_where_builder!(q);

    /// Assignment, e.g. `set("name = ?", args!["bob"])`.
    pub fn set(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.set.add_set(QueryWithArgs::safe(query, args));
        self
    }

    /// Override (model column) or add (other column) a value expression.
    pub fn value(mut self, column: &str, query: &str, args: Vec<Arg>) -> Self {
        self.values.add_value(self.q.base.table(), column, query, args);
        self
    }

    pub fn returning(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.returning.add_returning(QueryWithArgs::safe(query, args));
        self
    }

    fn append_model_set(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        let base = &self.q.base;
        let entity = match base.model() {
            Some(Model::Struct { entity, .. }) => Some(*entity),
            Some(model @ Model::Slice { .. }) => {
                return Err(StmtError::Unsupported(format!(
                    "Update does not support {} without Set",
                    model.kind_name()
                )));
            }
            _ => None,
        };

        let fields = match entity {
            Some(_) => base.get_data_fields()?,
            None => Vec::new(),
        };
        if fields.is_empty() && self.values.extra_values().is_empty() {
            return Err(StmtError::Other(
                "Update query requires Set clause or a model".to_string(),
            ));
        }

        buf.push_str(" SET ");
        let mut first = true;
        for field in &fields {
            if !first {
                buf.push_str(", ");
            }
            first = false;
            fmter.append_ident(buf, field.sql_name());
            buf.push_str(" = ");
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
            fmter.append_ident(buf, &extra.column);
            buf.push_str(" = ");
            extra.value.append_query(fmter, buf)?;
        }
        Ok(())
    }
}

impl QueryAppender for UpdateQuery<'_> {
    fn append_query(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        let base = &self.q.base;
        base.check_err()?;
        let fmter = fmter.with_model(base);

        base.append_with(&fmter, buf)?;

        buf.push_str("UPDATE ");
        base.append_first_table_with_alias(&fmter, buf)?;

        if self.set.is_empty() {
            self.append_model_set(&fmter, buf)?;
        } else {
            self.set.append_set(&fmter, buf)?;
        }

        if base.has_multi_tables() {
            buf.push_str(" FROM ");
            base.append_other_tables(&fmter, buf)?;
        }

        self.q.must_append_where(&fmter, buf)?;
        self.returning.append_returning(&fmter, buf)
    }
}

impl Statement for UpdateQuery<'_> {
    fn operation(&self) -> Operation {
        Operation::Update
    }
}
