//! # HTTP Server
//!
//! Combines the health, contract and connector routers behind CORS and the
//! request logger. Contract and connector routes live under `/api`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::observability::Logger;

use super::config::HttpServerConfig;
use super::connector_routes::connector_routes;
use super::contract_routes::contract_routes;
use super::middleware::{log_requests, require_authorization};
use super::health_routes::health_routes;
use super::state::ApiState;

/// HTTP server for the contract API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server; `require_auth` guards `/api` with the header check
    pub fn new(config: HttpServerConfig, state: ApiState, require_auth: bool) -> Self {
        let router = build_router(&config, Arc::new(state), require_auth);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process exits
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {:?}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?.to_string();
        Logger::info("SERVER_START", &[("addr", bound.as_str())]);

        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

/// Build the combined router
pub fn build_router(config: &HttpServerConfig, state: Arc<ApiState>, require_auth: bool) -> Router {
    let mut api = Router::new()
        .merge(contract_routes(state.clone()))
        .merge(connector_routes(state));
    if require_auth {
        api = api.layer(middleware::from_fn(require_authorization));
    }

    Router::new()
        .merge(health_routes())
        .nest("/api", api)
        .layer(middleware::from_fn(log_requests))
        .layer(cors_layer(config))
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
