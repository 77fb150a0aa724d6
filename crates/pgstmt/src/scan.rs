//! Row decoding.
//!
//! Each [`Field`] is decoded by a [`ScannerFn`] chosen in this order:
//!
//! 1. the field's custom decoder,
//! 2. [`scan_json`] when the field is tagged `json`,
//! 3. the [`SCANNERS`] entry for the field's [`ScanKind`].

use chrono::{DateTime, NaiveDateTime, Utc};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Type};
use uuid::Uuid;

use crate::error::{StmtError, StmtResult};
use crate::schema::{Entity, Field};
use crate::value::Value;

/// Decodes column `idx` of a row.
pub type ScannerFn = fn(&Row, usize) -> StmtResult<Value>;

/// Storage class of a field; indexes [`SCANNERS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanKind {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
    Json,
    Timestamp,
    Uuid,
}

/// Default scanner per [`ScanKind`], in declaration order.
pub static SCANNERS: [ScannerFn; 8] = [
    scan_bool,
    scan_int,
    scan_float,
    scan_text,
    scan_bytes,
    scan_json,
    scan_timestamp,
    scan_uuid,
];

pub fn scanner(kind: ScanKind) -> ScannerFn {
    SCANNERS[kind as usize]
}

pub fn field_scanner(field: &Field) -> ScannerFn {
    if let Some(decoder) = field.custom_decoder() {
        return decoder;
    }
    if field.is_json() {
        return scan_json;
    }
    scanner(field.kind())
}

fn column_name(row: &Row, idx: usize) -> &str {
    row.columns().get(idx).map_or("?", |c| c.name())
}

fn column_type(row: &Row, idx: usize) -> Option<&Type> {
    row.columns().get(idx).map(|c| c.type_())
}

/// Read column `idx` as `Option<T>`, mapping driver failures to a decode error.
pub fn get<'r, T: FromSql<'r>>(row: &'r Row, idx: usize) -> StmtResult<Option<T>> {
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| StmtError::decode(column_name(row, idx), e.to_string()))
}

fn or_null<T>(v: Option<T>, f: impl FnOnce(T) -> Value) -> Value {
    v.map_or(Value::Null, f)
}

pub fn scan_bool(row: &Row, idx: usize) -> StmtResult<Value> {
    Ok(or_null(get::<bool>(row, idx)?, Value::Bool))
}

pub fn scan_int(row: &Row, idx: usize) -> StmtResult<Value> {
    let v = match column_type(row, idx) {
        Some(&Type::INT2) => get::<i16>(row, idx)?.map(i64::from),
        Some(&Type::INT4) => get::<i32>(row, idx)?.map(i64::from),
        Some(&Type::OID) => get::<u32>(row, idx)?.map(i64::from),
        _ => get::<i64>(row, idx)?,
    };
    Ok(or_null(v, Value::Int))
}

pub fn scan_float(row: &Row, idx: usize) -> StmtResult<Value> {
    let v = match column_type(row, idx) {
        Some(&Type::FLOAT4) => get::<f32>(row, idx)?.map(f64::from),
        _ => get::<f64>(row, idx)?,
    };
    Ok(or_null(v, Value::Float))
}

pub fn scan_text(row: &Row, idx: usize) -> StmtResult<Value> {
    Ok(or_null(get::<String>(row, idx)?, Value::Text))
}

pub fn scan_bytes(row: &Row, idx: usize) -> StmtResult<Value> {
    Ok(or_null(get::<Vec<u8>>(row, idx)?, Value::Bytes))
}

/// JSON from `json`/`jsonb`, or parsed from a text or bytea column.
pub fn scan_json(row: &Row, idx: usize) -> StmtResult<Value> {
    let parse_err = |e: serde_json::Error| StmtError::decode(column_name(row, idx), e.to_string());
    let v = match column_type(row, idx) {
        Some(&Type::JSON) | Some(&Type::JSONB) => get::<serde_json::Value>(row, idx)?,
        Some(&Type::BYTEA) => get::<Vec<u8>>(row, idx)?
            .map(|b| serde_json::from_slice(&b))
            .transpose()
            .map_err(parse_err)?,
        _ => get::<String>(row, idx)?
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(parse_err)?,
    };
    Ok(or_null(v, Value::Json))
}

pub fn scan_timestamp(row: &Row, idx: usize) -> StmtResult<Value> {
    let v = match column_type(row, idx) {
        Some(&Type::TIMESTAMP) => get::<NaiveDateTime>(row, idx)?.map(|v| v.and_utc()),
        _ => get::<DateTime<Utc>>(row, idx)?,
    };
    Ok(or_null(v, Value::Timestamp))
}

pub fn scan_uuid(row: &Row, idx: usize) -> StmtResult<Value> {
    Ok(or_null(get::<Uuid>(row, idx)?, Value::Uuid))
}

/// Decode a row into a fresh `T`. Every column must map to a field of `T`'s table.
pub fn scan_entity<T: Entity + Default>(row: &Row) -> StmtResult<T> {
    let table = T::table()?;
    let mut entity = T::default();

    for (idx, column) in row.columns().iter().enumerate() {
        let field = table.field(column.name())?;
        let value = field_scanner(field)(row, idx)?;
        entity
            .set_field_value(field, value)
            .map_err(|err| match err {
                StmtError::Decode { message, .. } => StmtError::decode(column.name(), message),
                other => other,
            })?;
    }

    Ok(entity)
}
