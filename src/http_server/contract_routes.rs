//! Contract HTTP Routes
//!
//! CRUD over stored contracts plus execution.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::engine::ExecutionResponse;
use crate::model::{Contract, ExecuteContractRequest};
use crate::observability::Logger;

use super::errors::{ApiError, ApiResult};
use super::state::ApiState;
use super::MessageResponse;

/// Create contract routes
pub fn contract_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/contracts", get(list_contracts_handler).post(create_contract_handler))
        .route(
            "/contracts/:id",
            get(get_contract_handler)
                .put(update_contract_handler)
                .delete(delete_contract_handler),
        )
        .route(
            "/contracts/:id/execute",
            get(execute_contract_handler).post(execute_contract_handler),
        )
        .with_state(state)
}

/// Parse a JSON body, reporting the parser message on failure
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

async fn create_contract_handler(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Contract>)> {
    let mut contract: Contract = parse_body(&body)?;
    contract.id = Uuid::new_v4().to_string();

    state
        .contracts
        .save(&contract)
        .map_err(|e| ApiError::storage("save contract", e))?;

    Ok((StatusCode::CREATED, Json(contract)))
}

async fn list_contracts_handler(
    State(state): State<Arc<ApiState>>,
) -> ApiResult<Json<Vec<Contract>>> {
    let contracts = state
        .contracts
        .list()
        .map_err(|e| ApiError::storage("list contracts", e))?;
    Ok(Json(contracts))
}

async fn get_contract_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Contract>> {
    let contract = state
        .contracts
        .load(&id)
        .map_err(|e| ApiError::storage("load contract", e))?;
    Ok(Json(contract))
}

async fn update_contract_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Contract>> {
    state
        .contracts
        .load(&id)
        .map_err(|e| ApiError::storage("load contract", e))?;

    let mut contract: Contract = parse_body(&body)?;
    contract.id = id;

    state
        .contracts
        .save(&contract)
        .map_err(|e| ApiError::storage("update contract", e))?;

    Ok(Json(contract))
}

async fn delete_contract_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .contracts
        .delete(&id)
        .map_err(|e| ApiError::storage("delete contract", e))?;
    Ok(Json(MessageResponse::new("Contract deleted successfully")))
}

async fn execute_contract_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<ExecutionResponse>> {
    let overrides = ExecuteContractRequest::from_body(&body).map_err(|e| {
        let reason = e.to_string();
        Logger::warn(
            "CONTRACT_EXECUTE_REJECTED",
            &[("contract_id", id.as_str()), ("reason", reason.as_str())],
        );
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    let response = state
        .executor
        .execute(&id, &overrides)
        .await?;
    Ok(Json(response))
}
