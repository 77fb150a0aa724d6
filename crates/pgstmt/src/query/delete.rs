use chrono::Utc;

use crate::error::StmtResult;
use crate::fmt::{Formatter, QueryAppender, QueryBuf};
use crate::fragment::QueryWithArgs;
use crate::query::base::QueryFlags;
use crate::query::returning::ReturningQuery;
use crate::query::where_clause::WhereBaseQuery;
use crate::query::{Operation, Statement};
use crate::value::{Arg, Value};

/// `DELETE` statement.
///
/// On a table with a soft-delete field this renders an `UPDATE` that stamps
/// the field with the current time, unless [`force_delete`](Self::force_delete)
/// is set. A WHERE clause (or [`where_pk`](Self::where_pk)) is required.
#[must_use]
#[derive(Default)]
pub struct DeleteQuery<'a> {
    q: WhereBaseQuery<'a>,
    returning: ReturningQuery,
}

impl<'a> DeleteQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    impl_base_builder!(q.base);
    impl_where_builder!(q);

    /// Remove rows even when the table supports soft deletes.
    pub fn force_delete(mut self) -> Self {
        self.q.base.flags.set(QueryFlags::FORCE_DELETE);
        self
    }

    pub fn returning(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.returning.add_returning(QueryWithArgs::safe(query, args));
        self
    }

    fn soft_delete_column(&self) -> Option<&str> {
        if self.q.base.flags().has(QueryFlags::FORCE_DELETE) {
            return None;
        }
        self.q
            .base
            .table()
            .and_then(|t| t.soft_delete_field())
            .map(|f| f.sql_name())
    }
}

impl QueryAppender for DeleteQuery<'_> {
    fn append_query(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        let base = &self.q.base;
        base.check_err()?;
        let fmter = fmter.with_model(base);

        base.append_with(&fmter, buf)?;

        if let Some(column) = self.soft_delete_column() {
            buf.push_str("UPDATE ");
            base.append_first_table_with_alias(&fmter, buf)?;
            buf.push_str(" SET ");
            fmter.append_ident(buf, column);
            buf.push_str(" = ");
            fmter.append_value(buf, &Value::Timestamp(Utc::now()));
            if base.has_multi_tables() {
                buf.push_str(" FROM ");
                base.append_other_tables(&fmter, buf)?;
            }
        } else {
            buf.push_str("DELETE FROM ");
            base.append_first_table_with_alias(&fmter, buf)?;
            if base.has_multi_tables() {
                buf.push_str(" USING ");
                base.append_other_tables(&fmter, buf)?;
            }
        }

        self.q.must_append_where(&fmter, buf)?;
        self.returning.append_returning(&fmter, buf)
    }
}

impl Statement for DeleteQuery<'_> {
    fn operation(&self) -> Operation {
        Operation::Delete
    }
}
