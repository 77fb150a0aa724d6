//! Error types for pgstmt

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pgstmt operations
pub type StmtResult<T> = Result<T, StmtError>;

/// Errors raised while building, rendering or executing a statement.
///
/// Builder mistakes (the structural and resolution variants) are recorded on
/// the statement when they happen and surface when it is rendered.
#[derive(Debug, Error)]
pub enum StmtError {
    /// No model, table expression or table reference was supplied
    #[error("query does not have a table")]
    NoTable,

    /// UPDATE or DELETE without any predicate
    #[error("Update and Delete queries require Where clause (try WherePK)")]
    MissingWhere,

    /// `exclude_column` named a column that is not in the column list
    #[error("can't find column={0:?}")]
    ColumnNotFound(String),

    /// A column reference does not resolve against the bound table
    #[error("{table} does not have column={column:?}")]
    UnknownColumn { table: String, column: String },

    /// A primary-key predicate was requested on a table without primary keys
    #[error("{0} does not have primary keys")]
    NoPrimaryKey(String),

    /// Soft-delete filter misuse
    #[error("{0}")]
    SoftDelete(String),

    /// Operation not supported for the bound model kind
    #[error("{0}")]
    Unsupported(String),

    /// Entity-to-model resolution failure
    #[error("Model error: {0}")]
    Model(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl StmtError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Copy of this error, used to hand out the sticky builder error from `&self`.
    ///
    /// Driver errors cannot be cloned and degrade to [`StmtError::Other`] with
    /// the same message.
    pub fn duplicate(&self) -> Self {
        match self {
            Self::NoTable => Self::NoTable,
            Self::MissingWhere => Self::MissingWhere,
            Self::ColumnNotFound(c) => Self::ColumnNotFound(c.clone()),
            Self::UnknownColumn { table, column } => Self::unknown_column(table, column),
            Self::NoPrimaryKey(t) => Self::NoPrimaryKey(t.clone()),
            Self::SoftDelete(m) => Self::SoftDelete(m.clone()),
            Self::Unsupported(m) => Self::Unsupported(m.clone()),
            Self::Model(m) => Self::Model(m.clone()),
            Self::Query(e) => Self::Other(e.to_string()),
            Self::Decode { column, message } => Self::decode(column, message),
            Self::NotFound(m) => Self::NotFound(m.clone()),
            Self::Timeout(d) => Self::Timeout(*d),
            Self::Other(m) => Self::Other(m.clone()),
        }
    }

    /// Wrap a driver error, turning "no rows" style failures into [`StmtError::NotFound`].
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            // no_data_found
            if db_err.code().code() == "P0002" {
                return Self::NotFound(db_err.message().to_string());
            }
        }
        Self::Query(err)
    }
}
