//! Connector HTTP Routes
//!
//! CRUD over stored connectors plus a live connection test.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::model::Connector;

use super::contract_routes::parse_body;
use super::errors::{ApiError, ApiResult};
use super::state::ApiState;
use super::MessageResponse;

#[derive(Debug, Serialize)]
pub struct ConnectionTestResponse {
    pub status: String,
}

/// Create connector routes
pub fn connector_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(
            "/connectors",
            get(list_connectors_handler).post(create_connector_handler),
        )
        .route(
            "/connectors/:id",
            get(get_connector_handler)
                .put(update_connector_handler)
                .delete(delete_connector_handler),
        )
        .route("/connectors/:id/test", get(test_connector_handler))
        .with_state(state)
}

async fn create_connector_handler(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Connector>)> {
    let mut connector: Connector = parse_body(&body)?;
    connector.id = Uuid::new_v4().to_string();

    state
        .connectors
        .save(&connector)
        .map_err(|e| ApiError::storage("save connector", e))?;

    Ok((StatusCode::CREATED, Json(connector)))
}

async fn list_connectors_handler(
    State(state): State<Arc<ApiState>>,
) -> ApiResult<Json<Vec<Connector>>> {
    let connectors = state
        .connectors
        .list()
        .map_err(|e| ApiError::storage("list connectors", e))?;
    Ok(Json(connectors))
}

async fn get_connector_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Connector>> {
    let connector = state
        .connectors
        .load(&id)
        .map_err(|e| ApiError::storage("load connector", e))?;
    Ok(Json(connector))
}

async fn update_connector_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Connector>> {
    state
        .connectors
        .load(&id)
        .map_err(|e| ApiError::storage("load connector", e))?;

    let mut connector: Connector = parse_body(&body)?;
    connector.id = id;

    state
        .connectors
        .save(&connector)
        .map_err(|e| ApiError::storage("update connector", e))?;

    Ok(Json(connector))
}

async fn delete_connector_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .connectors
        .delete(&id)
        .map_err(|e| ApiError::storage("delete connector", e))?;
    Ok(Json(MessageResponse::new("Connector deleted successfully")))
}

async fn test_connector_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConnectionTestResponse>> {
    state.executor.test_connector(&id).await?;
    Ok(Json(ConnectionTestResponse {
        status: "connection successful".to_string(),
    }))
}
