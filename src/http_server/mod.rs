//! # HTTP Server Module
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/contracts` - Contract CRUD and `/api/contracts/:id/execute`
//! - `/api/connectors` - Connector CRUD and `/api/connectors/:id/test`

pub mod config;
pub mod connector_routes;
pub mod contract_routes;
pub mod errors;
pub mod health_routes;
pub mod middleware;
pub mod server;
pub mod state;

use serde::Serialize;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use server::{build_router, HttpServer};
pub use state::ApiState;

/// Plain `{"message": ...}` body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
