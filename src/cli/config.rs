//! Configuration file structure
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "http": { "host": "0.0.0.0", "port": 8080, "cors_origins": [] },
//!   "require_auth": false
//! }
//! ```
//!
//! Every field is optional. A missing file means all defaults. The `PORT`
//! environment variable overrides `http.port`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;

use super::errors::{CliError, CliResult};

pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Root of record storage (default `./data`)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Contract records (default `<data_dir>/contracts`)
    #[serde(default)]
    pub contracts_dir: Option<PathBuf>,

    /// Connector records (default `<data_dir>/connectors`)
    #[serde(default)]
    pub connectors_dir: Option<PathBuf>,

    #[serde(default)]
    pub http: HttpServerConfig,

    /// Require a non-empty `Authorization` header on `/api` routes
    #[serde(default)]
    pub require_auth: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            contracts_dir: None,
            connectors_dir: None,
            http: HttpServerConfig::default(),
            require_auth: false,
        }
    }
}

impl AxisConfig {
    /// Load configuration from file, then apply the environment
    pub fn load(path: &Path) -> CliResult<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_port_override(std::env::var(PORT_ENV).ok().as_deref())?;
        Ok(config)
    }

    fn load_file(path: &Path) -> CliResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(CliError::config_error(format!("Failed to read config: {}", e)))
            }
        };

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// Replace the port with `value` when it is set and non-empty
    pub fn apply_port_override(&mut self, value: Option<&str>) -> CliResult<()> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };
        self.http.port = raw.parse().map_err(|_| {
            CliError::config_error(format!("Invalid {} value: {:?}", PORT_ENV, raw))
        })?;
        Ok(())
    }

    pub fn contracts_path(&self) -> PathBuf {
        self.contracts_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("contracts"))
    }

    pub fn connectors_path(&self) -> PathBuf {
        self.connectors_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("connectors"))
    }
}
