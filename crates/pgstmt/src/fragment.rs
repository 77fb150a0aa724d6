//! SQL fragments: a piece of SQL text plus its positional arguments.

use crate::error::StmtResult;
use crate::fmt::{Formatter, QueryBuf};
use crate::value::Arg;

/// SQL text with optional positional arguments.
///
/// - `args == None` with non-empty text is a raw identifier.
/// - `args == None` with empty text is a zero fragment (a punctuation marker in WHERE lists).
#[derive(Debug, Clone, Default)]
pub struct QueryWithArgs {
    pub query: String,
    pub args: Option<Vec<Arg>>,
}

impl QueryWithArgs {
    /// A raw identifier, quoted by the dialect when rendered.
    pub fn ident(name: impl Into<String>) -> Self {
        Self {
            query: name.into(),
            args: None,
        }
    }

    /// An SQL expression. Non-empty text always carries an argument list.
    pub fn safe(query: impl Into<String>, args: Vec<Arg>) -> Self {
        let query = query.into();
        let args = if query.is_empty() && args.is_empty() {
            None
        } else {
            Some(args)
        };
        Self { query, args }
    }

    pub fn is_zero(&self) -> bool {
        self.query.is_empty() && self.args.is_none()
    }

    pub fn is_ident(&self) -> bool {
        self.args.is_none() && !self.query.is_empty()
    }

    pub fn append_query(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        match &self.args {
            None if self.query.is_empty() => Ok(()),
            None => {
                fmter.append_ident(buf, &self.query);
                Ok(())
            }
            Some(args) => fmter.append_query(buf, &self.query, args),
        }
    }
}

/// A fragment joined to the previous one by `sep`.
#[derive(Debug, Clone)]
pub struct QueryWithSep {
    pub query: QueryWithArgs,
    pub sep: String,
}

impl QueryWithSep {
    pub fn new(query: impl Into<String>, args: Vec<Arg>, sep: impl Into<String>) -> Self {
        Self {
            query: QueryWithArgs::safe(query, args),
            sep: sep.into(),
        }
    }

    /// Separator-only marker.
    pub fn punct(sep: impl Into<String>) -> Self {
        Self::new("", Vec::new(), sep)
    }

    pub fn is_punct(&self) -> bool {
        self.query.is_zero()
    }

    /// Marker opening a group (`" AND ("`).
    pub fn is_group_open(&self) -> bool {
        self.is_punct() && self.sep.ends_with('(')
    }

    /// Drop the join keyword. A group-opening marker keeps its `(`.
    pub fn strip_join(&mut self) {
        if self.is_group_open() {
            self.sep = "(".to_string();
        } else {
            self.sep.clear();
        }
    }
}

/// Append `items` comma-separated.
pub(crate) fn append_list(
    fmter: &Formatter<'_>,
    buf: &mut QueryBuf,
    items: &[QueryWithArgs],
) -> StmtResult<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        item.append_query(fmter, buf)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fmt::PgDialect;

    #[test]
    fn safe_without_args_is_not_an_ident() {
        let q = QueryWithArgs::safe("count(*)", Vec::new());
        assert!(!q.is_ident());
        assert!(!q.is_zero());
        assert!(QueryWithArgs::safe("", Vec::new()).is_zero());
        assert!(QueryWithArgs::ident("name").is_ident());
    }

    #[test]
    fn ident_goes_through_dialect() {
        let f = Formatter::literal(&PgDialect);
        let mut buf = QueryBuf::new();
        append_list(
            &f,
            &mut buf,
            &[
                QueryWithArgs::ident("Name"),
                QueryWithArgs::safe("lower(?)", crate::args!["X"]),
            ],
        )
        .unwrap();
        assert_eq!(buf.sql(), r#""Name", lower('X')"#);
    }

    #[test]
    fn punct_marker() {
        let p = QueryWithSep::punct(" OR (");
        assert!(p.is_punct());
        assert_eq!(p.sep, " OR (");
    }

    #[test]
    fn strip_join_keeps_group_paren() {
        let mut open = QueryWithSep::punct(" OR (");
        open.strip_join();
        assert_eq!(open.sep, "(");

        let mut pred = QueryWithSep::new("a", Vec::new(), " AND ");
        pred.strip_join();
        assert_eq!(pred.sep, "");
        assert!(!pred.is_group_open());
    }
}
