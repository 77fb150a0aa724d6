use crate::error::StmtResult;
use crate::fmt::{Formatter, QueryAppender, QueryBuf};
use crate::fragment::{QueryWithArgs, append_list};
use crate::query::where_clause::WhereBaseQuery;
use crate::query::{Operation, Statement};
use crate::value::Arg;

/// `CREATE INDEX` statement.
///
/// ```ignore
/// let q = CreateIndexQuery::new()
///     .table("users")
///     .unique()
///     .if_not_exists()
///     .index("users_email_idx")
///     .column("email")
///     .and_where("deleted_at IS NULL", args![]);
/// // CREATE UNIQUE INDEX IF NOT EXISTS users_email_idx ON users (email) WHERE (deleted_at IS NULL)
/// ```
#[must_use]
#[derive(Default)]
pub struct CreateIndexQuery<'a> {
    q: WhereBaseQuery<'a>,

    unique: bool,
    fulltext: bool,
    spatial: bool,
    concurrently: bool,
    if_not_exists: bool,

    index: QueryWithArgs,
    using: QueryWithArgs,
    include: Vec<QueryWithArgs>,
}

impl<'a> CreateIndexQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    impl_base_builder!(q.base);
    impl_where_builder!(q);

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn fulltext(mut self) -> Self {
        self.fulltext = true;
        self
    }

    pub fn spatial(mut self) -> Self {
        self.spatial = true;
        self
    }

    pub fn concurrently(mut self) -> Self {
        self.concurrently = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Index name.
    pub fn index(mut self, name: &str) -> Self {
        self.index = QueryWithArgs::ident(name);
        self
    }

    pub fn index_expr(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.index = QueryWithArgs::safe(query, args);
        self
    }

    /// Index method, e.g. `"gin"`.
    pub fn using(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.using = QueryWithArgs::safe(query, args);
        self
    }

    pub fn include(mut self, column: &str) -> Self {
        self.include.push(QueryWithArgs::ident(column));
        self
    }

    pub fn include_expr(mut self, query: &str, args: Vec<Arg>) -> Self {
        self.include.push(QueryWithArgs::safe(query, args));
        self
    }
}

impl QueryAppender for CreateIndexQuery<'_> {
    fn append_query(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        self.q.base.check_err()?;
        let fmter = fmter.with_model(&self.q.base);

        buf.push_str("CREATE ");
        if self.unique {
            buf.push_str("UNIQUE ");
        }
        if self.fulltext {
            buf.push_str("FULLTEXT ");
        }
        if self.spatial {
            buf.push_str("SPATIAL ");
        }
        buf.push_str("INDEX ");
        if self.concurrently {
            buf.push_str("CONCURRENTLY ");
        }
        if self.if_not_exists {
            buf.push_str("IF NOT EXISTS ");
        }

        self.index.append_query(&fmter, buf)?;

        buf.push_str(" ON ");
        self.q.base.append_first_table(&fmter, buf)?;

        if !self.using.is_zero() {
            buf.push_str(" USING ");
            self.using.append_query(&fmter, buf)?;
        }

        buf.push_str(" (");
        self.q.base.append_columns(&fmter, buf)?;
        buf.push(')');

        if !self.include.is_empty() {
            buf.push_str(" INCLUDE (");
            append_list(&fmter, buf, &self.include)?;
            buf.push(')');
        }

        self.q.append_where(&fmter, buf)
    }
}

impl Statement for CreateIndexQuery<'_> {
    fn operation(&self) -> Operation {
        Operation::CreateIndex
    }
}
