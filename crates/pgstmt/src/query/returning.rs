use std::sync::Arc;

use crate::error::StmtResult;
use crate::fmt::{Formatter, QueryBuf};
use crate::fragment::{QueryWithArgs, append_list};
use crate::query::base::append_field_names;
use crate::schema::Field;

/// RETURNING clause: explicit expressions, or fields collected from the model.
#[derive(Debug, Clone, Default)]
pub struct ReturningQuery {
    pub(crate) returning: Vec<QueryWithArgs>,
    pub(crate) returning_fields: Vec<Arc<Field>>,
}

impl ReturningQuery {
    pub fn add_returning(&mut self, ret: QueryWithArgs) {
        self.returning.push(ret);
    }

    /// Ignored once explicit expressions were added.
    pub fn add_returning_field(&mut self, field: &Arc<Field>) {
        if !self.returning.is_empty() {
            return;
        }
        if self.returning_fields.iter().any(|f| Arc::ptr_eq(f, field)) {
            return;
        }
        self.returning_fields.push(Arc::clone(field));
    }

    /// `RETURNING NULL` switches the clause off.
    pub fn has_returning(&self) -> bool {
        if let [only] = self.returning.as_slice()
            && only.query.eq_ignore_ascii_case("null")
        {
            return false;
        }
        !self.returning.is_empty() || !self.returning_fields.is_empty()
    }

    pub fn append_returning(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        if !self.has_returning() {
            return Ok(());
        }

        buf.push_str(" RETURNING ");
        if !self.returning.is_empty() {
            return append_list(fmter, buf, &self.returning);
        }
        append_field_names(fmter, buf, None, &self.returning_fields);
        Ok(())
    }
}
