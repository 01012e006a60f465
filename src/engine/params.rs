//! # Postgres Parameter Typing
//!
//! Postgres resolves operators strictly by type, so a filter value is
//! converted to the type the server inferred for its placeholder before it
//! is bound. Values arrive as JSON and the usual mismatches are strings that
//! stand for uuids, timestamps or integers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;
use uuid::Uuid;

use super::errors::{ExecutionError, ExecutionResult};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// A value ready to bind in the wire format of one placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum PgParam {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Numeric(Decimal),
    Uuid(Uuid),
    Timestamptz(DateTime<Utc>),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Json(Value),
    Bytea(Vec<u8>),
    Text(String),
}

impl PgParam {
    /// Convert `value` for a placeholder the server typed as `type_name`
    /// (sqlx type names such as `INT4` or `TIMESTAMPTZ`).
    ///
    /// `position` is the 1-based placeholder number used in the error.
    /// Types without a dedicated conversion bind as text, which is also the
    /// wire format of enums and other label types.
    pub fn for_type(value: &Value, type_name: &str, position: usize) -> ExecutionResult<Self> {
        if value.is_null() {
            return Ok(PgParam::Null);
        }

        let param = match type_name {
            "BOOL" => to_bool(value).map(PgParam::Bool),
            "INT2" => to_i64(value)
                .and_then(|n| i16::try_from(n).ok())
                .map(PgParam::Int2),
            "INT4" => to_i64(value)
                .and_then(|n| i32::try_from(n).ok())
                .map(PgParam::Int4),
            "INT8" => to_i64(value).map(PgParam::Int8),
            "FLOAT4" => to_f64(value).map(|f| PgParam::Float4(f as f32)),
            "FLOAT8" => to_f64(value).map(PgParam::Float8),
            "NUMERIC" => to_decimal(value).map(PgParam::Numeric),
            "UUID" => value
                .as_str()
                .and_then(|s| Uuid::parse_str(s.trim()).ok())
                .map(PgParam::Uuid),
            "TIMESTAMPTZ" => value.as_str().and_then(parse_timestamptz).map(PgParam::Timestamptz),
            "TIMESTAMP" => value.as_str().and_then(parse_timestamp).map(PgParam::Timestamp),
            "DATE" => value.as_str().and_then(parse_date).map(PgParam::Date),
            "TIME" => value.as_str().and_then(parse_time).map(PgParam::Time),
            "JSON" | "JSONB" => Some(PgParam::Json(value.clone())),
            "BYTEA" => Some(PgParam::Bytea(text_of(value).into_bytes())),
            array if array.ends_with("[]") => None,
            _ => Some(PgParam::Text(text_of(value))),
        };

        param.ok_or_else(|| {
            ExecutionError::Query(format!(
                "parameter ${}: cannot use {} as {}",
                position, value, type_name
            ))
        })
    }

    /// Bind by JSON type when the server reported no type for the position
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => PgParam::Null,
            Value::Bool(b) => PgParam::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PgParam::Int8(i),
                None => PgParam::Float8(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => PgParam::Text(s.clone()),
            other => PgParam::Text(other.to_string()),
        }
    }

    pub fn bind<'q>(
        self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            PgParam::Null => query.bind(None::<String>),
            PgParam::Bool(b) => query.bind(b),
            PgParam::Int2(n) => query.bind(n),
            PgParam::Int4(n) => query.bind(n),
            PgParam::Int8(n) => query.bind(n),
            PgParam::Float4(f) => query.bind(f),
            PgParam::Float8(f) => query.bind(f),
            PgParam::Numeric(d) => query.bind(d),
            PgParam::Uuid(u) => query.bind(u),
            PgParam::Timestamptz(t) => query.bind(t),
            PgParam::Timestamp(t) => query.bind(t),
            PgParam::Date(d) => query.bind(d),
            PgParam::Time(t) => query.bind(t),
            PgParam::Json(v) => query.bind(sqlx::types::Json(v)),
            PgParam::Bytea(bytes) => query.bind(bytes),
            PgParam::Text(s) => query.bind(s),
        }
    }
}

/// Convert every value against the placeholder types of a prepared statement.
///
/// Positions beyond `types` fall back to [`PgParam::from_json`].
pub fn convert_all(values: &[Value], types: &[String]) -> ExecutionResult<Vec<PgParam>> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| match types.get(i) {
            Some(type_name) => PgParam::for_type(value, type_name, i + 1),
            None => Ok(PgParam::from_json(value)),
        })
        .collect()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Postgres accepts these spellings for boolean input
fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

/// Offset-less input is taken as UTC
fn parse_timestamptz(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_timestamp(s).map(|naive| naive.and_utc()))
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|t| t.naive_utc()))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|t| t.date()))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
}
