//! # Query Runner
//!
//! Opens one dedicated connection per call (no pool), runs the compiled
//! statement with positional values and materializes every row.
//!
//! The connection is closed after success and after a query or scan failure;
//! if the calling future is dropped, dropping the connection releases it.
//!
//! Postgres statements are prepared first so each value can be converted to
//! its placeholder's type (see [`super::params`]). MySQL coerces on its own
//! and takes values by JSON type.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::query::Query;
use sqlx::{Connection, Either, Executor, Statement, TypeInfo};

use crate::model::Connector;
use crate::observability::Logger;

use super::connection::{describe, ConnectionTarget};
use super::decode::{decode_mysql_row, decode_pg_row, ResultRow};
use super::errors::{ExecutionError, ExecutionResult};
use super::params::convert_all;
use super::statement::CompiledStatement;

/// Executes compiled statements against a connector's backend
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Run `statement` and return every row.
    ///
    /// Errors: `Connection` when the backend cannot be reached or the dialect
    /// is unknown, `Query` when execution fails, `Scan` when a cell cannot be
    /// decoded.
    async fn run(
        &self,
        connector: &Connector,
        statement: &CompiledStatement,
    ) -> ExecutionResult<Vec<ResultRow>>;

    /// Open and close a connection without running anything
    async fn ping(&self, connector: &Connector) -> ExecutionResult<()>;
}

/// Production runner backed by `sqlx` single connections
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxRunner;

impl SqlxRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryRunner for SqlxRunner {
    async fn run(
        &self,
        connector: &Connector,
        statement: &CompiledStatement,
    ) -> ExecutionResult<Vec<ResultRow>> {
        match ConnectionTarget::resolve(connector)? {
            ConnectionTarget::Postgres(options) => {
                run_postgres(&options, connector, statement).await
            }
            ConnectionTarget::MySql(options) => run_mysql(&options, connector, statement).await,
        }
    }

    async fn ping(&self, connector: &Connector) -> ExecutionResult<()> {
        match ConnectionTarget::resolve(connector)? {
            ConnectionTarget::Postgres(options) => {
                let mut conn = PgConnection::connect_with(&options)
                    .await
                    .map_err(connection_error)?;
                let result = conn.ping().await.map_err(connection_error);
                close(conn, connector).await;
                result
            }
            ConnectionTarget::MySql(options) => {
                let mut conn = MySqlConnection::connect_with(&options)
                    .await
                    .map_err(connection_error)?;
                let result = conn.ping().await.map_err(connection_error);
                close(conn, connector).await;
                result
            }
        }
    }
}

async fn run_postgres(
    options: &PgConnectOptions,
    connector: &Connector,
    statement: &CompiledStatement,
) -> ExecutionResult<Vec<ResultRow>> {
    let mut conn = PgConnection::connect_with(options)
        .await
        .map_err(connection_error)?;

    let sql = statement.sql.as_str();
    let result: ExecutionResult<Vec<ResultRow>> = async {
        // Preparing caches the statement on this connection, so the query
        // below reuses it with the placeholder types read here.
        let prepared = (&mut conn).prepare(sql).await.map_err(query_error)?;
        let types: Vec<String> = match prepared.parameters() {
            Some(Either::Left(types)) => types.iter().map(|t| t.name().to_string()).collect(),
            _ => Vec::new(),
        };

        let query = convert_all(&statement.values, &types)?
            .into_iter()
            .fold(sqlx::query(sql), |query, param| param.bind(query));
        let rows = query.fetch_all(&mut conn).await.map_err(query_error)?;
        rows.iter().map(decode_pg_row).collect()
    }
    .await;

    close(conn, connector).await;
    result
}

async fn run_mysql(
    options: &MySqlConnectOptions,
    connector: &Connector,
    statement: &CompiledStatement,
) -> ExecutionResult<Vec<ResultRow>> {
    let mut conn = MySqlConnection::connect_with(options)
        .await
        .map_err(connection_error)?;

    let sql = mysql_placeholders(&statement.sql);
    let result: ExecutionResult<Vec<ResultRow>> = async {
        let query = statement
            .values
            .iter()
            .fold(sqlx::query(&sql), bind_json);
        let rows = query.fetch_all(&mut conn).await.map_err(query_error)?;
        rows.iter().map(decode_mysql_row).collect()
    }
    .await;

    close(conn, connector).await;
    result
}

async fn close<C: Connection>(conn: C, connector: &Connector) {
    if let Err(e) = conn.close().await {
        let target = describe(connector);
        let reason = e.to_string();
        Logger::warn(
            "CONNECTION_CLOSE_FAILED",
            &[("target", target.as_str()), ("reason", reason.as_str())],
        );
    }
}

/// Bind one JSON value by its JSON type.
///
/// Arrays and objects bind as their JSON text.
fn bind_json<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

/// Rewrite `$n` placeholders to MySQL's positional `?`.
///
/// Placeholders are numbered in bind order, so dropping the number keeps the
/// value mapping. Quoted literals and identifiers are left untouched.
pub fn mysql_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    out.push(c);
                }
                '$' if chars.peek().is_some_and(|d| d.is_ascii_digit()) => {
                    while chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                        chars.next();
                    }
                    out.push('?');
                }
                _ => out.push(c),
            },
        }
    }
    out
}

fn connection_error(err: sqlx::Error) -> ExecutionError {
    ExecutionError::Connection(err.to_string())
}

fn query_error(err: sqlx::Error) -> ExecutionError {
    ExecutionError::Query(err.to_string())
}
