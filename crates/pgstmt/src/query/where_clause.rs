//! WHERE clause composition.

use crate::error::{StmtError, StmtResult};
use crate::fmt::{Formatter, QueryBuf};
use crate::fragment::QueryWithSep;
use crate::model::Model;
use crate::query::base::{BaseQuery, QueryFlags, append_field_names};
use crate::schema::{Entity, Table};
use crate::value::Arg;

/// An ordered list of predicates, each joined to the previous one by its own separator.
#[derive(Debug, Clone, Default)]
pub struct WhereQuery {
    pub(crate) where_: Vec<QueryWithSep>,
}

impl WhereQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// `AND`-joined predicate.
    pub fn and_where(&mut self, query: impl Into<String>, args: Vec<Arg>) -> &mut Self {
        self.add_where(QueryWithSep::new(query, args, " AND "));
        self
    }

    /// `OR`-joined predicate.
    pub fn or_where(&mut self, query: impl Into<String>, args: Vec<Arg>) -> &mut Self {
        self.add_where(QueryWithSep::new(query, args, " OR "));
        self
    }

    /// Parenthesized group joined by `sep` (e.g. `" AND "`). An empty group adds nothing.
    pub fn where_group(&mut self, sep: &str, f: impl FnOnce(&mut WhereQuery)) -> &mut Self {
        let mut group = WhereQuery::new();
        f(&mut group);

        if let Some(first) = group.where_.first_mut() {
            first.strip_join();
            self.add_where(QueryWithSep::punct(format!("{sep}(")));
            self.where_.append(&mut group.where_);
            self.add_where(QueryWithSep::punct(")"));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.where_.is_empty()
    }

    pub fn predicates(&self) -> &[QueryWithSep] {
        &self.where_
    }

    pub(crate) fn add_where(&mut self, where_: QueryWithSep) {
        self.where_.push(where_);
    }

    fn append_predicates(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        for (i, where_) in self.where_.iter().enumerate() {
            if i > 0 {
                buf.push_str(&where_.sep);
            } else if where_.is_group_open() {
                buf.push('(');
            }
            if where_.is_punct() {
                continue;
            }
            buf.push('(');
            where_.query.append_query(fmter, buf)?;
            buf.push(')');
        }
        Ok(())
    }
}

/// Base state plus a WHERE list: the common core of SELECT, UPDATE, DELETE and CREATE INDEX.
#[derive(Default)]
pub struct WhereBaseQuery<'a> {
    pub(crate) base: BaseQuery<'a>,
    pub(crate) where_q: WhereQuery,
}

impl<'a> WhereBaseQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self) -> &BaseQuery<'a> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseQuery<'a> {
        &mut self.base
    }

    pub fn where_query(&self) -> &WhereQuery {
        &self.where_q
    }

    pub fn where_query_mut(&mut self) -> &mut WhereQuery {
        &mut self.where_q
    }

    /// WHERE for write statements: at least one predicate or `WHERE_PK` is required.
    pub fn must_append_where(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        if self.where_q.is_empty() && !self.base.flags.has(QueryFlags::WHERE_PK) {
            return Err(StmtError::MissingWhere);
        }
        self.append_where(fmter, buf)
    }

    /// ` WHERE <predicates> AND <soft delete> AND <pk>`, each part only when present.
    pub fn append_where(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        let soft_delete = self.base.is_soft_delete();
        let where_pk = self.base.flags.has(QueryFlags::WHERE_PK);
        if self.where_q.is_empty() && !soft_delete && !where_pk {
            return Ok(());
        }

        buf.push_str(" WHERE ");
        let start = buf.len();

        self.where_q.append_predicates(fmter, buf)?;

        if soft_delete {
            if buf.len() > start {
                buf.push_str(" AND ");
            }
            self.append_where_soft_delete(fmter, buf);
        }

        if where_pk {
            if buf.len() > start {
                buf.push_str(" AND ");
            }
            self.append_where_pk(fmter, buf)?;
        }

        Ok(())
    }

    fn append_where_soft_delete(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) {
        let Some(table) = self.base.table else {
            return;
        };
        let Some(field) = table.soft_delete_field() else {
            return;
        };
        fmter.append_ident(buf, table.alias());
        buf.push('.');
        fmter.append_ident(buf, field.sql_name());
        if self.base.flags.has(QueryFlags::DELETED) {
            buf.push_str(" IS NOT NULL");
        } else {
            buf.push_str(" IS NULL");
        }
    }

    /// Primary-key predicate built from the bound model's values.
    pub fn append_where_pk(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        let table = self.base.table.ok_or(StmtError::NoTable)?;
        table.check_pks()?;

        match &self.base.model {
            Some(Model::Struct { entity, .. }) => {
                append_where_pk_struct(fmter, buf, table, *entity);
                Ok(())
            }
            Some(Model::Slice { rows, .. }) => {
                append_where_pk_slice(fmter, buf, table, rows);
                Ok(())
            }
            Some(other) => Err(StmtError::Unsupported(format!(
                "WherePK does not support {}",
                other.kind_name()
            ))),
            None => Err(StmtError::Unsupported(
                "WherePK does not support a query without a model".to_string(),
            )),
        }
    }
}

fn append_where_pk_struct(
    fmter: &Formatter<'_>,
    buf: &mut QueryBuf,
    table: &Table,
    entity: &dyn Entity,
) {
    buf.push('(');
    for (i, pk) in table.pks().iter().enumerate() {
        if i > 0 {
            buf.push_str(" AND ");
        }
        fmter.append_ident(buf, table.alias());
        buf.push('.');
        fmter.append_ident(buf, pk.sql_name());
        buf.push_str(" = ");
        if fmter.is_template() {
            buf.push('?');
        } else {
            pk.append_value(fmter, buf, entity);
        }
    }
    buf.push(')');
}

fn append_where_pk_slice(
    fmter: &Formatter<'_>,
    buf: &mut QueryBuf,
    table: &Table,
    rows: &[&dyn Entity],
) {
    let pks = table.pks();
    let multi = pks.len() > 1;

    if multi {
        buf.push('(');
    }
    append_field_names(fmter, buf, Some(table.alias()), pks);
    if multi {
        buf.push(')');
    }

    buf.push_str(" IN (");
    let template = fmter.is_template();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            // the shape of one row is enough for a template
            if template {
                break;
            }
            buf.push_str(", ");
        }
        if multi {
            buf.push('(');
        }
        for (j, pk) in pks.iter().enumerate() {
            if j > 0 {
                buf.push_str(", ");
            }
            if template {
                buf.push('?');
            } else {
                pk.append_value(fmter, buf, *row);
            }
        }
        if multi {
            buf.push(')');
        }
    }
    buf.push(')');
}
