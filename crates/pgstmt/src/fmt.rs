//! Dialect quoting and placeholder substitution.
//!
//! A [`Formatter`] walks fragment text and replaces:
//!
//! - positional `?` with the next fragment argument,
//! - named `?Name` with whatever the bound model (an [`ArgAppender`]) supplies.
//!
//! How values come out depends on the [`RenderMode`]:
//!
//! | mode       | `?` with a value        |
//! |------------|-------------------------|
//! | `Literal`  | quoted SQL literal      |
//! | `Bind`     | `$n`, value collected   |
//! | `Template` | `?` left in place       |

use std::fmt::Write as _;

use crate::error::StmtResult;
use crate::value::{Arg, Value};

/// Dialect-specific quoting.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Append an identifier, quoting it when required. Dotted names are
    /// handled part by part.
    fn append_ident(&self, buf: &mut String, ident: &str);

    /// Append `value` as an inline SQL literal.
    fn append_value(&self, buf: &mut String, value: &Value);

    /// Append the bind placeholder for the 1-based parameter `index`.
    fn placeholder(&self, buf: &mut String, index: usize);
}

/// The bundled PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgDialect;

fn is_bare_ident(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
}

fn push_quoted(buf: &mut String, s: &str, quote: char) {
    buf.push(quote);
    for c in s.chars() {
        if c == quote {
            buf.push(quote);
        }
        buf.push(c);
    }
    buf.push(quote);
}

impl Dialect for PgDialect {
    fn name(&self) -> &'static str {
        "pg"
    }

    fn append_ident(&self, buf: &mut String, ident: &str) {
        for (i, part) in ident.split('.').enumerate() {
            if i > 0 {
                buf.push('.');
            }
            let already_quoted = part.len() >= 2 && part.starts_with('"') && part.ends_with('"');
            if part == "*" || already_quoted || is_bare_ident(part) {
                buf.push_str(part);
            } else {
                push_quoted(buf, part, '"');
            }
        }
    }

    fn append_value(&self, buf: &mut String, value: &Value) {
        match value {
            Value::Null => buf.push_str("NULL"),
            Value::Bool(true) => buf.push_str("TRUE"),
            Value::Bool(false) => buf.push_str("FALSE"),
            Value::Int(v) => {
                let _ = write!(buf, "{v}");
            }
            Value::Float(v) => {
                if v.is_nan() {
                    buf.push_str("'NaN'");
                } else if v.is_infinite() {
                    buf.push_str(if *v > 0.0 { "'Infinity'" } else { "'-Infinity'" });
                } else {
                    let _ = write!(buf, "{v}");
                }
            }
            Value::Text(s) => push_quoted(buf, s, '\''),
            Value::Bytes(b) => {
                buf.push_str("'\\x");
                for byte in b {
                    let _ = write!(buf, "{byte:02x}");
                }
                buf.push('\'');
            }
            Value::Json(v) => push_quoted(buf, &v.to_string(), '\''),
            Value::Timestamp(ts) => {
                let _ = write!(buf, "'{}'", ts.format("%Y-%m-%d %H:%M:%S%.6f%:z"));
            }
            Value::Uuid(u) => {
                let _ = write!(buf, "'{}'", u.hyphenated());
            }
        }
    }

    fn placeholder(&self, buf: &mut String, index: usize) {
        let _ = write!(buf, "${index}");
    }
}

/// How values are written into the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Values are inlined as quoted literals.
    Literal,
    /// Values become `$n` placeholders and are collected into the buffer.
    Bind,
    /// Values become `?`; used to inspect a statement's shape.
    Template,
}

/// Render target: SQL text plus the arguments collected in bind mode.
#[derive(Debug, Clone, Default)]
pub struct QueryBuf {
    sql: String,
    args: Vec<Value>,
}

impl QueryBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Length of the SQL text written so far.
    pub fn len(&self) -> usize {
        self.sql.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_built(self) -> BuiltQuery {
        BuiltQuery {
            sql: self.sql,
            args: self.args,
        }
    }
}

impl std::fmt::Write for QueryBuf {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.sql.push_str(s);
        Ok(())
    }
}

/// A rendered statement: SQL text and its bind arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Something that renders itself as a complete SQL statement or expression.
pub trait QueryAppender {
    fn append_query(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()>;

    /// Set when the statement can list its own output columns (for `WITH name (cols)`).
    fn as_columns_appender(&self) -> Option<&dyn ColumnsAppender> {
        None
    }
}

/// A statement that can enumerate the columns it produces.
pub trait ColumnsAppender {
    fn append_columns(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()>;
}

/// Resolves named `?Name` placeholders.
///
/// Returns `false` to decline, in which case the placeholder is written back verbatim.
pub trait ArgAppender {
    fn append_arg(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf, name: &str) -> bool;
}

/// Substitutes placeholders and quotes values for a [`Dialect`].
#[derive(Clone, Copy)]
pub struct Formatter<'a> {
    dialect: &'a dyn Dialect,
    mode: RenderMode,
    model: Option<&'a dyn ArgAppender>,
}

impl<'a> Formatter<'a> {
    pub fn new(dialect: &'a dyn Dialect, mode: RenderMode) -> Self {
        Self {
            dialect,
            mode,
            model: None,
        }
    }

    pub fn literal(dialect: &'a dyn Dialect) -> Self {
        Self::new(dialect, RenderMode::Literal)
    }

    pub fn bind(dialect: &'a dyn Dialect) -> Self {
        Self::new(dialect, RenderMode::Bind)
    }

    pub fn template(dialect: &'a dyn Dialect) -> Self {
        Self::new(dialect, RenderMode::Template)
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn is_template(&self) -> bool {
        self.mode == RenderMode::Template
    }

    /// Same formatter, resolving named placeholders through `model`.
    pub fn with_model<'b>(&self, model: &'b dyn ArgAppender) -> Formatter<'b>
    where
        'a: 'b,
    {
        Formatter {
            dialect: self.dialect,
            mode: self.mode,
            model: Some(model),
        }
    }

    pub fn append_ident(&self, buf: &mut QueryBuf, name: &str) {
        self.dialect.append_ident(&mut buf.sql, name);
    }

    pub fn append_value(&self, buf: &mut QueryBuf, value: &Value) {
        match self.mode {
            RenderMode::Template => buf.push('?'),
            RenderMode::Literal => self.dialect.append_value(&mut buf.sql, value),
            RenderMode::Bind => {
                buf.args.push(value.clone());
                self.dialect.placeholder(&mut buf.sql, buf.args.len());
            }
        }
    }

    pub fn append_arg(&self, buf: &mut QueryBuf, arg: &Arg) -> StmtResult<()> {
        match arg {
            Arg::Value(v) => self.append_value(buf, v),
            Arg::Ident(name) => self.append_ident(buf, name),
            Arg::Safe(sql) => buf.push_str(sql),
            Arg::Query(q) => q.append_query(self, buf)?,
        }
        Ok(())
    }

    /// Append `query`, replacing its placeholders.
    ///
    /// Positional `?` beyond the supplied args stay as `?`; so does every
    /// positional `?` in template mode.
    pub fn append_query(&self, buf: &mut QueryBuf, query: &str, args: &[Arg]) -> StmtResult<()> {
        let mut next = 0;
        let mut rest = query;

        while let Some(pos) = rest.find('?') {
            buf.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];

            let name_len = rest
                .char_indices()
                .find(|&(i, c)| {
                    !(c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()))
                })
                .map_or(rest.len(), |(i, _)| i);

            if name_len > 0 {
                let name = &rest[..name_len];
                rest = &rest[name_len..];
                let resolved = match self.model {
                    Some(model) => model.append_arg(self, buf, name),
                    None => false,
                };
                if !resolved {
                    buf.push('?');
                    buf.push_str(name);
                }
                continue;
            }

            match args.get(next) {
                Some(arg) if !self.is_template() => {
                    self.append_arg(buf, arg)?;
                    next += 1;
                }
                _ => buf.push('?'),
            }
        }

        buf.push_str(rest);
        Ok(())
    }
}

impl std::fmt::Debug for Formatter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formatter")
            .field("dialect", &self.dialect.name())
            .field("mode", &self.mode)
            .field("model", &self.model.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(fmter: &Formatter<'_>, query: &str, args: &[Arg]) -> QueryBuf {
        let mut buf = QueryBuf::new();
        fmter.append_query(&mut buf, query, args).unwrap();
        buf
    }

    #[test]
    fn ident_quoting() {
        let mut s = String::new();
        PgDialect.append_ident(&mut s, "public.users");
        assert_eq!(s, "public.users");

        let mut s = String::new();
        PgDialect.append_ident(&mut s, "UserTable.*");
        assert_eq!(s, r#""UserTable".*"#);

        let mut s = String::new();
        PgDialect.append_ident(&mut s, r#"we"ird"#);
        assert_eq!(s, r#""we""ird""#);
    }

    #[test]
    fn literal_values() {
        let mut s = String::new();
        PgDialect.append_value(&mut s, &Value::Text("it's".into()));
        assert_eq!(s, "'it''s'");

        let mut s = String::new();
        PgDialect.append_value(&mut s, &Value::Bytes(vec![0xde, 0xad]));
        assert_eq!(s, r"'\xdead'");

        let mut s = String::new();
        PgDialect.append_value(&mut s, &Value::Float(f64::NEG_INFINITY));
        assert_eq!(s, "'-Infinity'");
    }

    #[test]
    fn positional_literal() {
        let f = Formatter::literal(&PgDialect);
        let buf = render(&f, "id = ? AND name = ?", &crate::args![5, "bob"]);
        assert_eq!(buf.sql(), "id = 5 AND name = 'bob'");
    }

    #[test]
    fn positional_bind_collects_args() {
        let f = Formatter::bind(&PgDialect);
        let buf = render(&f, "a = ? OR b = ?", &crate::args![1, true]);
        assert_eq!(buf.sql(), "a = $1 OR b = $2");
        assert_eq!(buf.args(), &[Value::Int(1), Value::Bool(true)]);
    }

    #[test]
    fn missing_args_and_template_keep_question_mark() {
        let f = Formatter::literal(&PgDialect);
        assert_eq!(render(&f, "a = ? AND b = ?", &crate::args![1]).sql(), "a = 1 AND b = ?");

        let f = Formatter::template(&PgDialect);
        assert_eq!(render(&f, "a = ?", &crate::args![1]).sql(), "a = ?");
    }

    #[test]
    fn ident_and_safe_args() {
        let f = Formatter::bind(&PgDialect);
        let buf = render(&f, "? = ?", &[Arg::ident("Name"), Arg::safe("now()")]);
        assert_eq!(buf.sql(), r#""Name" = now()"#);
        assert!(buf.args().is_empty());
    }

    struct Named;

    impl ArgAppender for Named {
        fn append_arg(&self, _fmter: &Formatter<'_>, buf: &mut QueryBuf, name: &str) -> bool {
            if name == "TableName" {
                buf.push_str("users");
                return true;
            }
            false
        }
    }

    #[test]
    fn named_args_resolve_through_model() {
        let base = Formatter::literal(&PgDialect);
        let f = base.with_model(&Named);
        let buf = render(&f, "SELECT * FROM ?TableName WHERE ?Other = ?", &crate::args![1]);
        assert_eq!(buf.sql(), "SELECT * FROM users WHERE ?Other = 1");

        let buf = render(&base, "?TableName", &[]);
        assert_eq!(buf.sql(), "?TableName");
    }
}
