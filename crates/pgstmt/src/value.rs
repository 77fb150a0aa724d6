//! Bindable values and query arguments.

use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

use crate::error::{StmtError, StmtResult};
use crate::fmt::QueryAppender;

/// A scalar value that can be rendered as a literal or sent as a bind parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in decode errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Json(_) => "json",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => {
                if *ty == Type::TIMESTAMP {
                    v.naive_utc().to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Uuid(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Conversion from a scanned [`Value`] back into a Rust field type.
///
/// `NULL` becomes the type's zero value, except for `Option<T>` which becomes `None`.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> StmtResult<Self>;
}

fn mismatch<T>(value: &Value) -> StmtError {
    StmtError::decode(
        "",
        format!(
            "can't scan {} into {}",
            value.kind_name(),
            std::any::type_name::<T>()
        ),
    )
}

impl FromValue for Value {
    fn from_value(value: Value) -> StmtResult<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> StmtResult<Self> {
        match value {
            Value::Null => Ok(false),
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: Value) -> StmtResult<Self> {
                    match value {
                        Value::Null => Ok(0),
                        Value::Int(v) => <$t>::try_from(v)
                            .map_err(|e| StmtError::decode("", e.to_string())),
                        Value::Text(s) => s
                            .parse::<$t>()
                            .map_err(|e| StmtError::decode("", e.to_string())),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i16, i32, i64, u32);

impl FromValue for f64 {
    fn from_value(value: Value) -> StmtResult<Self> {
        match value {
            Value::Null => Ok(0.0),
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> StmtResult<Self> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Text(v) => Ok(v),
            Value::Bytes(v) => {
                String::from_utf8(v).map_err(|e| StmtError::decode("", e.to_string()))
            }
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> StmtResult<Self> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Bytes(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> StmtResult<Self> {
        match value {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Json(v) => Ok(v),
            Value::Text(s) => {
                serde_json::from_str(&s).map_err(|e| StmtError::decode("", e.to_string()))
            }
            Value::Bytes(b) => {
                serde_json::from_slice(&b).map_err(|e| StmtError::decode("", e.to_string()))
            }
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> StmtResult<Self> {
        match value {
            Value::Null => Ok(DateTime::<Utc>::UNIX_EPOCH),
            Value::Timestamp(v) => Ok(v),
            Value::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|v| v.with_timezone(&Utc))
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f").map(|v| v.and_utc())
                })
                .map_err(|e| StmtError::decode("", e.to_string())),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> StmtResult<Self> {
        match value {
            Value::Null => Ok(Uuid::nil()),
            Value::Uuid(v) => Ok(v),
            Value::Text(s) => Uuid::parse_str(&s).map_err(|e| StmtError::decode("", e.to_string())),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> StmtResult<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

/// One positional argument of a SQL fragment.
///
/// Plain values are quoted as literals (or bound as `$n`); the other variants
/// are spliced into the SQL text.
#[derive(Clone)]
pub enum Arg {
    Value(Value),
    /// Identifier, quoted by the dialect when needed.
    Ident(String),
    /// Trusted SQL text, written as is.
    Safe(String),
    /// Nested statement rendered with the same formatter.
    Query(Arc<dyn QueryAppender + Send + Sync>),
}

impl Arg {
    pub fn ident(name: impl Into<String>) -> Self {
        Arg::Ident(name.into())
    }

    pub fn safe(sql: impl Into<String>) -> Self {
        Arg::Safe(sql.into())
    }

    pub fn query(query: impl QueryAppender + Send + Sync + 'static) -> Self {
        Arg::Query(Arc::new(query))
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Arg::Ident(s) => f.debug_tuple("Ident").field(s).finish(),
            Arg::Safe(s) => f.debug_tuple("Safe").field(s).finish(),
            Arg::Query(_) => f.write_str("Query(..)"),
        }
    }
}

impl<T: Into<Value>> From<T> for Arg {
    fn from(v: T) -> Self {
        Arg::Value(v.into())
    }
}

/// Build a `Vec<Arg>` from heterogeneous values.
///
/// ```ignore
/// q.and_where("id = ? AND name = ?", args![5, "alice"]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::value::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::value::Arg::from($arg)),+]
    };
}
