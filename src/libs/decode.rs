use sqlx::types::JsonValue;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{Column, ColumnIndex, Decode, Row as SqlxRow, Type, TypeInfo, ValueRef};
use tracing::debug;
use uuid::Uuid;

use crate::libs::value::{Row, Value};

/// Driver-specific attempt run after the signed integers, for types only
/// some engines have (MySQL unsigned integers).
pub(crate) type ExtraDecode<R> = fn(&R, usize) -> Option<Option<Value>>;

fn try_decode<'r, R, T>(row: &'r R, index: usize) -> Option<Option<T>>
where
    R: SqlxRow,
    usize: ColumnIndex<R>,
    T: Decode<'r, R::Database> + Type<R::Database>,
{
    row.try_get::<Option<T>, usize>(index).ok()
}

fn declared_boolean(type_name: &str) -> bool {
    type_name.eq_ignore_ascii_case("BOOLEAN") || type_name.eq_ignore_ascii_case("BOOL")
}

/// `u64` that does not fit `i64` is kept exact as text.
pub(crate) fn unsigned_value(n: u64) -> Value {
    i64::try_from(n)
        .map(Value::Int)
        .unwrap_or_else(|_| Value::Text(n.to_string()))
}

/// Normalizes a driver row into an ordered column map.
///
/// Columns declared `BOOLEAN`/`BOOL` are read as bool first, since SQLite and
/// MySQL store them as integers. Otherwise each column is tried as integer,
/// `extra`, float, bool, text, JSON, bytes, uuid, then date/time; JSON,
/// uuid and date/time values become text. SQL NULL becomes [`Value::Null`],
/// and so does any type none of those accept (`NUMERIC`/`DECIMAL` among
/// them; cast those to text in the query to read them).
pub(crate) fn decode_row<R>(row: &R, extra: ExtraDecode<R>) -> Row
where
    R: SqlxRow,
    usize: ColumnIndex<R>,
    for<'r> i64: Decode<'r, R::Database>,
    i64: Type<R::Database>,
    for<'r> i32: Decode<'r, R::Database>,
    i32: Type<R::Database>,
    for<'r> i16: Decode<'r, R::Database>,
    i16: Type<R::Database>,
    for<'r> f64: Decode<'r, R::Database>,
    f64: Type<R::Database>,
    for<'r> f32: Decode<'r, R::Database>,
    f32: Type<R::Database>,
    for<'r> bool: Decode<'r, R::Database>,
    bool: Type<R::Database>,
    for<'r> String: Decode<'r, R::Database>,
    String: Type<R::Database>,
    for<'r> JsonValue: Decode<'r, R::Database>,
    JsonValue: Type<R::Database>,
    for<'r> Vec<u8>: Decode<'r, R::Database>,
    Vec<u8>: Type<R::Database>,
    for<'r> Uuid: Decode<'r, R::Database>,
    Uuid: Type<R::Database>,
    for<'r> DateTime<Utc>: Decode<'r, R::Database>,
    DateTime<Utc>: Type<R::Database>,
    for<'r> NaiveDateTime: Decode<'r, R::Database>,
    NaiveDateTime: Type<R::Database>,
    for<'r> NaiveDate: Decode<'r, R::Database>,
    NaiveDate: Type<R::Database>,
    for<'r> NaiveTime: Decode<'r, R::Database>,
    NaiveTime: Type<R::Database>,
{
    let mut map = Row::with_capacity(row.columns().len());
    for col in row.columns() {
        let i = col.ordinal();
        let boolean = declared_boolean(col.type_info().name());

        let decoded = if let Some(v) = boolean.then(|| try_decode::<R, bool>(row, i)).flatten() {
            Some(v.map(Value::Bool))
        } else if let Some(v) = try_decode::<R, i64>(row, i) {
            Some(v.map(Value::Int))
        } else if let Some(v) = try_decode::<R, i32>(row, i) {
            Some(v.map(|n| Value::Int(n.into())))
        } else if let Some(v) = try_decode::<R, i16>(row, i) {
            Some(v.map(|n| Value::Int(n.into())))
        } else if let Some(v) = extra(row, i) {
            Some(v)
        } else if let Some(v) = try_decode::<R, f64>(row, i) {
            Some(v.map(Value::Float))
        } else if let Some(v) = try_decode::<R, f32>(row, i) {
            Some(v.map(|n| Value::Float(n.into())))
        } else if let Some(v) = try_decode::<R, bool>(row, i) {
            Some(v.map(Value::Bool))
        } else if let Some(v) = try_decode::<R, String>(row, i) {
            Some(v.map(Value::Text))
        } else if let Some(v) = try_decode::<R, JsonValue>(row, i) {
            Some(v.map(|j| Value::Text(j.to_string())))
        } else if let Some(v) = try_decode::<R, Vec<u8>>(row, i) {
            Some(v.map(Value::Bytes))
        } else if let Some(v) = try_decode::<R, Uuid>(row, i) {
            Some(v.map(|u| Value::Text(u.to_string())))
        } else if let Some(v) = try_decode::<R, DateTime<Utc>>(row, i) {
            Some(v.map(|t| Value::Text(t.to_rfc3339())))
        } else if let Some(v) = try_decode::<R, NaiveDateTime>(row, i) {
            Some(v.map(|t| Value::Text(t.to_string())))
        } else if let Some(v) = try_decode::<R, NaiveDate>(row, i) {
            Some(v.map(|d| Value::Text(d.to_string())))
        } else {
            try_decode::<R, NaiveTime>(row, i).map(|v| v.map(|t| Value::Text(t.to_string())))
        };

        let value = match decoded {
            Some(v) => v.unwrap_or(Value::Null),
            None => {
                let present = row.try_get_raw(i).map(|raw| !raw.is_null()).unwrap_or(false);
                if present {
                    debug!(
                        column = col.name(),
                        column_type = col.type_info().name(),
                        "column type cannot be decoded, reading it as null"
                    );
                }
                Value::Null
            }
        };
        map.insert(col.name().to_string(), value);
    }
    map
}

/// No engine-specific types beyond the shared cascade.
pub(crate) fn no_extra<R>(_: &R, _: usize) -> Option<Option<Value>> {
    None
}
