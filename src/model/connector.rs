//! # Connectors
//!
//! A registered data source: dialect plus credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend credentials
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

// Keeps passwords out of debug output and therefore out of logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .finish()
    }
}

/// A stored data-source connector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Dialect identifier, e.g. `postgres` or `mysql`
    #[serde(rename = "type")]
    pub connector_type: String,

    #[serde(default)]
    pub config: DatabaseConfig,
}

impl Connector {
    pub fn new(id: impl Into<String>, connector_type: impl Into<String>, config: DatabaseConfig) -> Self {
        Self {
            id: id.into(),
            connector_type: connector_type.into(),
            config,
            ..Default::default()
        }
    }
}
