//! # Connection Resolver
//!
//! Maps a connector's dialect and credentials to a backend connection.
//!
//! Dialects:
//! - `postgres` / `postgresql`: `host=H port=P user=U password=W dbname=D sslmode=disable`
//! - `mysql` / `mariadb`: `U:W@tcp(H:P)/D`
//!
//! Any other dialect resolves to an empty descriptor, which is a connection
//! failure.

use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::model::{Connector, DatabaseConfig};

use super::errors::{ExecutionError, ExecutionResult};

/// Supported SQL dialect families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
}

impl Dialect {
    /// Resolve a connector type name
    pub fn from_type(connector_type: &str) -> Option<Self> {
        match connector_type {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
        }
    }
}

/// Backend-native connection descriptor for `connector`; empty when the
/// dialect is unknown.
pub fn connection_string(connector: &Connector) -> String {
    let c = &connector.config;
    match Dialect::from_type(&connector.connector_type) {
        Some(Dialect::Postgres) => format!(
            "host={} port={} user={} password={} dbname={} sslmode=disable",
            c.host, c.port, c.user, c.password, c.dbname
        ),
        Some(Dialect::MySql) => format!(
            "{}:{}@tcp({}:{})/{}",
            c.user, c.password, c.host, c.port, c.dbname
        ),
        None => String::new(),
    }
}

/// Loggable description of where a connector points. Never includes the password.
pub fn describe(connector: &Connector) -> String {
    let c = &connector.config;
    format!(
        "{}://{}@{}:{}/{}",
        connector.connector_type, c.user, c.host, c.port, c.dbname
    )
}

/// Typed connect options for one connector
#[derive(Debug, Clone)]
pub enum ConnectionTarget {
    Postgres(PgConnectOptions),
    MySql(MySqlConnectOptions),
}

impl ConnectionTarget {
    /// Resolve the connector into connect options.
    ///
    /// Fails with a connection error exactly when [`connection_string`] is empty.
    pub fn resolve(connector: &Connector) -> ExecutionResult<Self> {
        let c = &connector.config;
        match Dialect::from_type(&connector.connector_type) {
            Some(Dialect::Postgres) => Ok(ConnectionTarget::Postgres(postgres_options(c))),
            Some(Dialect::MySql) => Ok(ConnectionTarget::MySql(mysql_options(c))),
            None => Err(ExecutionError::Connection(format!(
                "unsupported connector type: {:?}",
                connector.connector_type
            ))),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            ConnectionTarget::Postgres(_) => Dialect::Postgres,
            ConnectionTarget::MySql(_) => Dialect::MySql,
        }
    }
}

fn postgres_options(c: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&c.host)
        .port(c.port)
        .username(&c.user)
        .password(&c.password)
        .database(&c.dbname)
        .ssl_mode(PgSslMode::Disable)
}

fn mysql_options(c: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&c.host)
        .port(c.port)
        .username(&c.user)
        .password(&c.password)
        .database(&c.dbname)
        .ssl_mode(MySqlSslMode::Disabled)
}
