//! Statement builders.
//!
//! Every statement is a plain owned value built with chained calls. Builder
//! mistakes don't fail the call; the first one is kept and returned when the
//! statement is rendered.
//!
//! ```ignore
//! use pgstmt::prelude::*;
//!
//! let q = SelectQuery::new()
//!     .model(type_of::<User>())
//!     .and_where("u.name = ?", args!["alice"])
//!     .where_group(" OR ", |g| {
//!         g.and_where("u.age > ?", args![18]).and_where("u.vip", args![]);
//!     })
//!     .limit(10);
//!
//! let built = q.build(&PgDialect)?;
//! // SELECT u.id, u.name, u.age, u.vip, u.deleted_at FROM users AS u
//! //   WHERE (u.name = $1) OR ((u.age > $2) AND (u.vip)) AND u.deleted_at IS NULL LIMIT 10
//! ```

#[macro_use]
mod macros;

mod base;
mod delete;
mod index_create;
mod insert;
mod returning;
mod select;
mod set;
mod update;
mod values;
mod where_clause;

#[cfg(test)]
mod tests;

pub use base::{BaseQuery, QueryFlags};
pub use delete::DeleteQuery;
pub use index_create::CreateIndexQuery;
pub use insert::InsertQuery;
pub use returning::ReturningQuery;
pub use select::SelectQuery;
pub use set::SetQuery;
pub use update::UpdateQuery;
pub use values::{ColumnValue, CustomValueQuery};
pub use where_clause::{WhereBaseQuery, WhereQuery};

use crate::error::StmtResult;
use crate::fmt::{BuiltQuery, Dialect, Formatter, QueryAppender, QueryBuf};

/// Kind of statement, reported to hooks and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
    CreateIndex,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::CreateIndex => "create_index",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete statement that can be rendered and executed.
pub trait Statement: QueryAppender {
    fn operation(&self) -> Operation;

    /// Render with `$n` placeholders and collected arguments.
    fn build(&self, dialect: &dyn Dialect) -> StmtResult<BuiltQuery> {
        render(self, &Formatter::bind(dialect))
    }

    /// Render with values inlined as literals.
    fn to_sql(&self, dialect: &dyn Dialect) -> StmtResult<String> {
        render(self, &Formatter::literal(dialect)).map(|b| b.sql)
    }

    /// Render with `?` in place of every value.
    fn to_template(&self, dialect: &dyn Dialect) -> StmtResult<String> {
        render(self, &Formatter::template(dialect)).map(|b| b.sql)
    }
}

pub(crate) fn render<Q: QueryAppender + ?Sized>(
    query: &Q,
    fmter: &Formatter<'_>,
) -> StmtResult<BuiltQuery> {
    let mut buf = QueryBuf::new();
    query.append_query(fmter, &mut buf)?;
    Ok(buf.into_built())
}
