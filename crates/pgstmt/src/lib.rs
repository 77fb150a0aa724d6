//! # pgstmt
//!
//! A model-driven SQL statement builder for PostgreSQL.
//!
//! ## Features
//!
//! - **Model binding**: bind an entity, a collection of entities or just a type;
//!   tables, columns and primary keys come from the entity's [`Table`]
//! - **Sticky errors**: builder calls never fail, the first mistake is reported
//!   when the statement is rendered
//! - **Soft deletes**: tables with a soft-delete field filter deleted rows, and
//!   `DELETE` stamps the field instead of removing the row
//! - **Three render modes**: inline literals, `$n` bind parameters, or a `?` template
//! - **Safe defaults**: `UPDATE` and `DELETE` require a WHERE clause
//! - **Query hooks**: timing, tracing and slow-query warnings around execution
//!
//! ## Example
//!
//! ```ignore
//! use pgstmt::prelude::*;
//!
//! let db = Db::new(client);
//!
//! // SELECT u.id, u.name, u.deleted_at FROM users AS u
//! //   WHERE (u.name = $1) AND u.deleted_at IS NULL LIMIT 10
//! let users: Vec<User> = db
//!     .scan_all(&db.new_select().model(type_of::<User>()).and_where("u.name = ?", args!["alice"]).limit(10))
//!     .await?;
//!
//! // UPDATE users AS u SET deleted_at = $1 WHERE u.deleted_at IS NULL AND (u.id = $2)
//! db.exec(&db.new_delete().model(&users[0]).where_pk()).await?;
//! ```

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod fmt;
pub mod fragment;
pub mod hook;
pub mod model;
pub mod prelude;
pub mod query;
pub mod scan;
pub mod schema;
pub mod value;

pub use client::GenericClient;
pub use config::DbConfig;
pub use db::{Db, QueryOutcome};
pub use error::{StmtError, StmtResult};
pub use fmt::{
    ArgAppender, BuiltQuery, ColumnsAppender, Dialect, Formatter, PgDialect, QueryAppender,
    QueryBuf, RenderMode,
};
pub use fragment::{QueryWithArgs, QueryWithSep};
pub use hook::{QueryEvent, QueryHook};
pub use model::{IntoModel, Model, Rows, TypeOf, rows, type_of};
pub use query::{
    BaseQuery, CreateIndexQuery, DeleteQuery, InsertQuery, Operation, QueryFlags, SelectQuery,
    Statement, UpdateQuery, WhereQuery,
};
pub use scan::{ScanKind, ScannerFn};
pub use schema::{Entity, Field, Table, TableBuilder, TableCell};
pub use value::{Arg, FromValue, Value};

#[cfg(feature = "tracing")]
pub use hook::TracingHook;
