//! Convenient imports for typical `pgstmt` usage.
//!
//! ```ignore
//! use pgstmt::prelude::*;
//! ```

pub use crate::args;
pub use crate::{
    Arg, CreateIndexQuery, Db, DbConfig, DeleteQuery, Entity, Field, FromValue, GenericClient,
    InsertQuery, PgDialect, ScanKind, SelectQuery, Statement, StmtError, StmtResult, Table,
    TableCell, UpdateQuery, Value, rows, type_of,
};
