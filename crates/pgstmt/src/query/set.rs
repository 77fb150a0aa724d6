use crate::error::StmtResult;
use crate::fmt::{Formatter, QueryBuf};
use crate::fragment::{QueryWithArgs, append_list};

/// Explicit `SET` assignments.
#[derive(Debug, Clone, Default)]
pub struct SetQuery {
    pub(crate) set: Vec<QueryWithArgs>,
}

impl SetQuery {
    pub fn add_set(&mut self, set: QueryWithArgs) {
        self.set.push(set);
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn append_set(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf) -> StmtResult<()> {
        buf.push_str(" SET ");
        append_list(fmter, buf, &self.set)
    }
}
