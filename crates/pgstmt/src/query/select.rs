use std::fmt::Write as _;

use crate::error::{StmtError, StmtResult};
use crate::fmt::{ColumnsAppender, Formatter, QueryAppender, QueryBuf};
use crate::fragment::{QueryWithArgs, append_list};
use crate::query::base::append_field_names;
use crate::query::where_clause::WhereBaseQuery;
use crate::query::{Operation, Statement};
use crate::value::Arg;

/// `SELECT` statement.
///
/// Without explicit columns the bound table's fields are selected, qualified by its alias.
/// An explicit list emptied by [`exclude_column`](Self::exclude_column) fails to render.
#[must_use]
#[derive(Default)]
pub struct SelectQuery<'a> {
    q: WhereBaseQuery<'a>,

    distinct: bool,
    group: Vec<QueryWithArgs>,
    order: Vec<QueryWithArgs>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'a> SelectQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    impl_base_builder!(q.base);
    impl_where_builder!(q);

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn group(mut self, column: &str) -> Self {
        self.group.push(QueryWithArgs::ident(column));
        self
    }

    pub fn group_expr(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.group.push(QueryWithArgs::safe(query, args));
        self
    }

    /// Order by `"column"` or `"column DESC"`.
    pub fn order(mut self, order: &str) -> Self {
        let frag = match order.split_once(' ') {
            Some((column, dir)) => {
                QueryWithArgs::safe(format!("? {}", dir.trim().to_uppercase()), vec![Arg::ident(column)])
            }
            None => QueryWithArgs::ident(order),
        };
        self.order.push(frag);
        self
    }

    pub fn order_expr(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.order.push(QueryWithArgs::safe(query, args));
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    fn append_select_columns(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        let base = &self.q.base;
        match base.columns() {
            Some([]) => {
                return Err(StmtError::Other(
                    "Select query has an empty column list".to_string(),
                ));
            }
            Some(_) => return base.append_columns(fmter, buf),
            None => {}
        }
        match base.table() {
            Some(table) => append_field_names(fmter, buf, Some(table.alias()), table.fields()),
            None => buf.push('*'),
        }
        Ok(())
    }
}

impl QueryAppender for SelectQuery<'_> {
    fn append_query(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        let base = &self.q.base;
        base.check_err()?;
        let fmter = fmter.with_model(base);

        base.append_with(&fmter, buf)?;

        buf.push_str("SELECT ");
        if self.distinct {
            buf.push_str("DISTINCT ");
        }
        self.append_select_columns(&fmter, buf)?;

        if base.has_tables() {
            buf.push_str(" FROM ");
            base.append_first_table_with_alias(&fmter, buf)?;
            if base.has_multi_tables() {
                buf.push_str(", ");
                base.append_other_tables(&fmter, buf)?;
            }
        }

        self.q.append_where(&fmter, buf)?;

        if !self.group.is_empty() {
            buf.push_str(" GROUP BY ");
            append_list(&fmter, buf, &self.group)?;
        }
        if !self.order.is_empty() {
            buf.push_str(" ORDER BY ");
            append_list(&fmter, buf, &self.order)?;
        }
        if let Some(limit) = self.limit {
            let _ = write!(buf, " LIMIT {limit}");
        }
        if let Some(offset) = self.offset {
            let _ = write!(buf, " OFFSET {offset}");
        }
        Ok(())
    }

    fn as_columns_appender(&self) -> Option<&dyn ColumnsAppender> {
        let base = &self.q.base;
        let known = base.columns().is_some() || base.table().is_some();
        known.then_some(self as &dyn ColumnsAppender)
    }
}

impl ColumnsAppender for SelectQuery<'_> {
    /// Output column names, unqualified.
    fn append_columns(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        let base = &self.q.base;
        if base.columns().is_some() {
            return base.append_columns(fmter, buf);
        }
        if let Some(table) = base.table() {
            append_field_names(fmter, buf, None, table.fields());
        }
        Ok(())
    }
}

impl Statement for SelectQuery<'_> {
    fn operation(&self) -> Operation {
        Operation::Select
    }
}
