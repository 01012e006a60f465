//! # Row Decoding
//!
//! Converts backend rows into `column -> JSON value` maps. Binary cells are
//! coerced to text; any cell that cannot be decoded is a scan error and aborts
//! the remaining rows.
//!
//! Postgres values that have no JSON counterpart (arrays, intervals, network
//! addresses) are rendered the way `psql` prints them. A column type with no
//! known rendering is a scan error naming the type.

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::types::{Oid, PgInterval};
use sqlx::postgres::{PgHasArrayType, PgRow, PgTypeInfo, PgTypeKind, PgValueFormat, Postgres};
use sqlx::{Column, ColumnIndex, Decode, Row, Type, TypeInfo, ValueRef};
use uuid::Uuid;

use super::errors::{ExecutionError, ExecutionResult};

/// One materialized result row
pub type ResultRow = Map<String, Value>;

/// Decode a Postgres row
pub fn decode_pg_row(row: &PgRow) -> ExecutionResult<ResultRow> {
    let mut out = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_pg_cell(row, index, column.type_info())?;
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

/// Decode a MySQL row
pub fn decode_mysql_row(row: &MySqlRow) -> ExecutionResult<ResultRow> {
    let mut out = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_mysql_cell(row, index, column.type_info().name())?;
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn decode_pg_cell(row: &PgRow, index: usize, type_info: &PgTypeInfo) -> ExecutionResult<Value> {
    let raw = row.try_get_raw(index).map_err(|e| scan_error(index, e))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_info.name() {
        "BOOL" => Value::Bool(get(row, index)?),
        "INT2" => Value::from(get::<_, i16>(row, index)?),
        "INT4" => Value::from(get::<_, i32>(row, index)?),
        "INT8" => Value::from(get::<_, i64>(row, index)?),
        "OID" => Value::from(get::<_, Oid>(row, index)?.0),
        "FLOAT4" => float(f64::from(get::<_, f32>(row, index)?)),
        "FLOAT8" => float(get::<_, f64>(row, index)?),
        "NUMERIC" => Value::String(get::<_, Decimal>(row, index)?.to_string()),
        "UUID" => Value::String(get::<_, Uuid>(row, index)?.to_string()),
        "JSON" | "JSONB" => get::<_, Value>(row, index)?,
        "TIMESTAMPTZ" => Value::String(get::<_, DateTime<Utc>>(row, index)?.to_rfc3339()),
        "TIMESTAMP" => Value::String(get::<_, NaiveDateTime>(row, index)?.to_string()),
        "DATE" => Value::String(get::<_, NaiveDate>(row, index)?.to_string()),
        "TIME" => Value::String(get::<_, NaiveTime>(row, index)?.to_string()),
        "INTERVAL" => Value::String(format_interval(&get(row, index)?)),
        "BYTEA" => Value::String(text_from_bytes(get(row, index)?)),
        name @ ("INET" | "CIDR") => {
            let bytes = raw
                .as_bytes()
                .map_err(|e| ExecutionError::Scan(format!("column {}: {}", index, e)))?;
            let text = match raw.format() {
                PgValueFormat::Text => text_from_bytes(bytes.to_vec()),
                PgValueFormat::Binary => format_inet(bytes, name == "CIDR").ok_or_else(|| {
                    ExecutionError::Scan(format!("column {}: malformed {} value", index, name))
                })?,
            };
            Value::String(text)
        }
        "TEXT[]" | "VARCHAR[]" | "CHAR[]" | "NAME[]" => array::<String>(row, index)?,
        "BOOL[]" => array::<bool>(row, index)?,
        "INT2[]" => array::<i16>(row, index)?,
        "INT4[]" => array::<i32>(row, index)?,
        "INT8[]" => array::<i64>(row, index)?,
        "FLOAT4[]" => array::<f32>(row, index)?,
        "FLOAT8[]" => array::<f64>(row, index)?,
        "NUMERIC[]" => array::<Decimal>(row, index)?,
        "UUID[]" => array::<Uuid>(row, index)?,
        "DATE[]" => array::<NaiveDate>(row, index)?,
        name => match get::<_, String>(row, index) {
            Ok(text) => Value::String(text),
            // Enum values travel as their label bytes
            Err(_) if matches!(type_info.kind(), PgTypeKind::Enum(_)) => {
                let bytes = raw
                    .as_bytes()
                    .map_err(|e| ExecutionError::Scan(format!("column {}: {}", index, e)))?;
                Value::String(text_from_bytes(bytes.to_vec()))
            }
            Err(_) => {
                return Err(ExecutionError::Scan(format!(
                    "column {}: unsupported type {}",
                    index, name
                )))
            }
        },
    };
    Ok(value)
}

fn decode_mysql_cell(row: &MySqlRow, index: usize, type_name: &str) -> ExecutionResult<Value> {
    let raw = row.try_get_raw(index).map_err(|e| scan_error(index, e))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "BOOLEAN" => Value::Bool(get(row, index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(get::<_, i64>(row, index)?)
        }
        t if t.ends_with("UNSIGNED") => Value::from(get::<_, u64>(row, index)?),
        "FLOAT" => float(f64::from(get::<_, f32>(row, index)?)),
        "DOUBLE" => float(get::<_, f64>(row, index)?),
        "DECIMAL" => Value::String(get::<_, Decimal>(row, index)?.to_string()),
        "JSON" => get::<_, Value>(row, index)?,
        "TIMESTAMP" => Value::String(get::<_, DateTime<Utc>>(row, index)?.to_rfc3339()),
        "DATETIME" => Value::String(get::<_, NaiveDateTime>(row, index)?.to_string()),
        "DATE" => Value::String(get::<_, NaiveDate>(row, index)?.to_string()),
        "TIME" => Value::String(get::<_, NaiveTime>(row, index)?.to_string()),
        "YEAR" => Value::from(get::<_, u16>(row, index)?),
        _ => match get::<_, String>(row, index) {
            Ok(text) => Value::String(text),
            // BLOB/BINARY and text columns with a binary collation
            Err(_) => Value::String(text_from_bytes(get(row, index)?)),
        },
    };
    Ok(value)
}

fn get<'r, R, T>(row: &'r R, index: usize) -> ExecutionResult<T>
where
    R: Row,
    usize: ColumnIndex<R>,
    T: Decode<'r, R::Database> + Type<R::Database>,
{
    row.try_get(index).map_err(|e| scan_error(index, e))
}

fn scan_error(index: usize, err: sqlx::Error) -> ExecutionError {
    ExecutionError::Scan(format!("column {}: {}", index, err))
}

/// Non-finite floats have no JSON form and become null
fn float(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn array<T>(row: &PgRow, index: usize) -> ExecutionResult<Value>
where
    T: Display + PgHasArrayType + Type<Postgres> + for<'r> Decode<'r, Postgres>,
{
    let items: Vec<Option<T>> = get(row, index)?;
    Ok(Value::String(array_literal(
        items.into_iter().map(|item| item.map(|v| v.to_string())),
    )))
}

/// Postgres array literal such as `{a,"b c",NULL}`
pub fn array_literal<I>(items: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let parts: Vec<String> = items
        .into_iter()
        .map(|item| match item {
            None => "NULL".to_string(),
            Some(text) if needs_quotes(&text) => {
                format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Some(text) => text,
        })
        .collect();
    format!("{{{}}}", parts.join(","))
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.eq_ignore_ascii_case("NULL")
        || text
            .chars()
            .any(|c| matches!(c, '{' | '}' | ',' | '"' | '\\') || c.is_whitespace())
}

/// Interval in Postgres' default output style, e.g. `1 year 2 mons 3 days 04:05:06`
pub fn format_interval(interval: &PgInterval) -> String {
    let mut parts = Vec::new();
    push_unit(&mut parts, interval.months / 12, "year");
    push_unit(&mut parts, interval.months % 12, "mon");
    push_unit(&mut parts, interval.days, "day");
    if interval.microseconds != 0 || parts.is_empty() {
        parts.push(format_clock(interval.microseconds));
    }
    parts.join(" ")
}

fn push_unit(parts: &mut Vec<String>, n: i32, unit: &str) {
    if n != 0 {
        let plural = if n == 1 { "" } else { "s" };
        parts.push(format!("{} {}{}", n, unit, plural));
    }
}

fn format_clock(microseconds: i64) -> String {
    let sign = if microseconds < 0 { "-" } else { "" };
    let total = microseconds.unsigned_abs();
    let seconds = total / 1_000_000;
    let fraction = total % 1_000_000;

    let mut out = format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    );
    if fraction > 0 {
        let digits = format!("{:06}", fraction);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

/// Binary `inet`/`cidr`: family, prefix bits, cidr flag, length, address.
/// Host addresses print without their prefix, like Postgres does for `inet`.
fn format_inet(bytes: &[u8], cidr: bool) -> Option<String> {
    if bytes.len() < 4 {
        return None;
    }
    let (header, address) = bytes.split_at(4);
    let bits = header[1];
    let ip = match (header[0], address.len()) {
        (2, 4) => IpAddr::V4(Ipv4Addr::new(address[0], address[1], address[2], address[3])),
        (3, 16) => {
            let octets: [u8; 16] = address.try_into().ok()?;
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return None,
    };
    let full = if ip.is_ipv4() { 32 } else { 128 };

    if !cidr && bits == full {
        Some(ip.to_string())
    } else {
        Some(format!("{}/{}", ip, bits))
    }
}

/// Text representation of a byte cell
pub fn text_from_bytes(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
