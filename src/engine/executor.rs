//! # Contract Executor
//!
//! Execute(contract id, overrides):
//! 1. Load the contract and apply request overrides to an in-memory copy
//! 2. Load the contract's connector
//! 3. Compile WHERE / ORDER BY / LIMIT-OFFSET onto the base SQL
//! 4. Run the statement and materialize every row
//! 5. Project each row through the response templates (parsed only when
//!    there is at least one row)
//! 6. Anonymize the projected fields
//!
//! Any failure is terminal: no partial result set is ever returned.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Connector, ExecuteContractRequest, ResponseTemplate};
use crate::observability::{Logger, ObservationScope};
use crate::store::{ConnectorStore, ContractStore};

use super::anonymize::anonymize_row;
use super::connection::describe;
use super::decode::ResultRow;
use super::errors::{ExecutionError, ExecutionResult};
use super::runner::QueryRunner;
use super::statement::CompiledStatement;
use super::template::{ProjectedRow, Projector};

pub const STATUS_SUCCESS: &str = "success";

/// Successful execution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub contract_id: String,
    pub status: String,
    pub results: Vec<ProjectedRow>,
    pub timestamp: DateTime<Utc>,
}

/// Runs contracts against their connectors
#[derive(Clone)]
pub struct ContractExecutor {
    contracts: Arc<dyn ContractStore>,
    connectors: Arc<dyn ConnectorStore>,
    runner: Arc<dyn QueryRunner>,
}

impl ContractExecutor {
    pub fn new(
        contracts: Arc<dyn ContractStore>,
        connectors: Arc<dyn ConnectorStore>,
        runner: Arc<dyn QueryRunner>,
    ) -> Self {
        Self {
            contracts,
            connectors,
            runner,
        }
    }

    /// Execute one contract with optional request overrides
    pub async fn execute(
        &self,
        contract_id: &str,
        overrides: &ExecuteContractRequest,
    ) -> ExecutionResult<ExecutionResponse> {
        let scope = ObservationScope::with_fields("CONTRACT_EXECUTE", &[("contract_id", contract_id)]);

        match self.execute_inner(contract_id, overrides).await {
            Ok(response) => {
                let rows = response.results.len().to_string();
                scope.complete(&[("rows", rows.as_str())]);
                Ok(response)
            }
            Err(err) => {
                let reason = format!("{}: {}", err, err.detail());
                scope.fail(err.code(), &reason);
                Err(err)
            }
        }
    }

    async fn execute_inner(
        &self,
        contract_id: &str,
        overrides: &ExecuteContractRequest,
    ) -> ExecutionResult<ExecutionResponse> {
        let contract = self
            .contracts
            .load(contract_id)
            .map_err(ExecutionError::from_contract_lookup)?;

        let query = contract.query.with_overrides(overrides);
        if let Some(pagination) = &query.pagination {
            pagination.validate().map_err(ExecutionError::Validation)?;
        }

        let connector = self
            .connectors
            .load(&query.connector_id)
            .map_err(ExecutionError::from_connector_lookup)?;

        let statement = CompiledStatement::compile(&query);
        Logger::trace(
            "CONTRACT_STATEMENT",
            &[
                ("contract_id", contract_id),
                ("sql", statement.sql.as_str()),
                ("target", describe(&connector).as_str()),
            ],
        );

        let rows = self.runner.run(&connector, &statement).await?;

        // Templates are only parsed once there is a row to render
        let results = if rows.is_empty() {
            Vec::new()
        } else {
            render_rows(&contract.response_template, &rows)?
        };

        Ok(ExecutionResponse {
            contract_id: contract.id,
            status: STATUS_SUCCESS.to_string(),
            results,
            timestamp: Utc::now(),
        })
    }

    /// Open and close a connection to a stored connector
    pub async fn test_connector(&self, connector_id: &str) -> ExecutionResult<Connector> {
        let connector = self
            .connectors
            .load(connector_id)
            .map_err(ExecutionError::from_connector_lookup)?;

        let target = describe(&connector);
        let result = self.runner.ping(&connector).await;
        let outcome = match &result {
            Ok(()) => "success".to_string(),
            Err(err) => format!("{}: {}", err, err.detail()),
        };
        Logger::info(
            "CONNECTOR_TEST",
            &[
                ("connector_id", connector_id),
                ("target", target.as_str()),
                ("outcome", outcome.as_str()),
            ],
        );

        result.map(|()| connector)
    }
}

fn render_rows(template: &ResponseTemplate, rows: &[ResultRow]) -> ExecutionResult<Vec<ProjectedRow>> {
    let projector = Projector::compile(&template.template)?;
    rows.iter()
        .map(|row| -> ExecutionResult<ProjectedRow> {
            let mut projected = projector.project(row)?;
            anonymize_row(&mut projected, &template.anonymization);
            Ok(projected)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::decode::ResultRow;
    use crate::model::{
        AnonymizationRule, Contract, DatabaseConfig, DatabaseQuery, FilterCondition,
        PaginationOptions, ResponseTemplate,
    };
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Returns canned rows and records every statement it was asked to run
    struct CannedRunner {
        rows: Vec<ResultRow>,
        seen: Mutex<Vec<CompiledStatement>>,
    }

    impl CannedRunner {
        fn new(rows: Vec<serde_json::Value>) -> Self {
            let rows = rows
                .into_iter()
                .filter_map(|v| v.as_object().cloned())
                .collect();
            Self {
                rows,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl QueryRunner for CannedRunner {
        async fn run(
            &self,
            _connector: &Connector,
            statement: &CompiledStatement,
        ) -> ExecutionResult<Vec<ResultRow>> {
            self.seen.lock().unwrap().push(statement.clone());
            Ok(self.rows.clone())
        }

        async fn ping(&self, _connector: &Connector) -> ExecutionResult<()> {
            Ok(())
        }
    }

    fn executor(contract: Contract, runner: Arc<CannedRunner>) -> ContractExecutor {
        let connector = Connector::new("pg", "postgres", DatabaseConfig::default());
        ContractExecutor::new(
            Arc::new(MemoryStore::with_records(vec![contract])),
            Arc::new(MemoryStore::with_records(vec![connector])),
            runner,
        )
    }

    fn users_contract() -> Contract {
        let mut query = DatabaseQuery::new("pg", "SELECT * FROM users");
        query.filters = Some(vec![FilterCondition::eq("status", json!("active"))]);

        let template = ResponseTemplate::from_fields([("name", "{{.name}}"), ("ssn", "{{.ssn}}")])
            .with_rule(AnonymizationRule::new("ssn", "mask").with_pattern("XXX-XX-****"));
        Contract::new("users", query, template)
    }

    #[tokio::test]
    async fn test_execute_projects_and_anonymizes() {
        let runner = Arc::new(CannedRunner::new(vec![
            json!({"name": "Ada", "ssn": "123456789"}),
            json!({"name": "Alan", "ssn": "987-65-4321"}),
        ]));
        let executor = executor(users_contract(), runner.clone());

        let response = executor
            .execute("users", &ExecuteContractRequest::default())
            .await
            .unwrap();

        assert_eq!(response.contract_id, "users");
        assert_eq!(response.status, "success");
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0]["name"], "Ada");
        assert_eq!(response.results[0]["ssn"], "123-45-****");
        assert_eq!(response.results[1]["ssn"], "987-65-****");

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen[0].sql, "SELECT * FROM users WHERE status = $1");
        assert_eq!(seen[0].values, vec![json!("active")]);
    }

    #[tokio::test]
    async fn test_overrides_apply_to_copy_only() {
        let runner = Arc::new(CannedRunner::new(vec![]));
        let executor = executor(users_contract(), runner.clone());

        let overrides = ExecuteContractRequest {
            filters: Some(vec![]),
            pagination: Some(PaginationOptions::new(2, 10)),
            sort: None,
        };
        executor.execute("users", &overrides).await.unwrap();
        executor
            .execute("users", &ExecuteContractRequest::default())
            .await
            .unwrap();

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen[0].sql, "SELECT * FROM users LIMIT 10 OFFSET 10");
        assert_eq!(seen[1].sql, "SELECT * FROM users WHERE status = $1");
    }

    #[tokio::test]
    async fn test_zero_page_size_is_validation_error() {
        let runner = Arc::new(CannedRunner::new(vec![]));
        let executor = executor(users_contract(), runner.clone());

        let overrides = ExecuteContractRequest {
            pagination: Some(PaginationOptions::new(1, 0)),
            ..Default::default()
        };
        let err = executor.execute("users", &overrides).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Validation(_)));
        assert!(runner.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_records() {
        let runner = Arc::new(CannedRunner::new(vec![]));
        let executor = executor(users_contract(), runner);

        let err = executor
            .execute("nope", &ExecuteContractRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err, ExecutionError::ContractNotFound("nope".into()));

        let err = executor.test_connector("nope").await.unwrap_err();
        assert_eq!(err, ExecutionError::ConnectorNotFound("nope".into()));
    }

    #[tokio::test]
    async fn test_missing_column_fails_execution() {
        let runner = Arc::new(CannedRunner::new(vec![
            json!({"name": "Ada", "ssn": "1"}),
            json!({"name": "Alan"}),
        ]));
        let executor = executor(users_contract(), runner);

        let err = executor
            .execute("users", &ExecuteContractRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::TemplateRender(_)));
    }

    #[tokio::test]
    async fn test_empty_result_skips_template_parsing() {
        let query = DatabaseQuery::new("pg", "SELECT id FROM users");
        let template = ResponseTemplate::from_fields([("id", "{{.id")]);
        let contract = Contract::new("broken", query, template);

        let empty = executor(contract.clone(), Arc::new(CannedRunner::new(vec![])));
        let response = empty
            .execute("broken", &ExecuteContractRequest::default())
            .await
            .unwrap();
        assert_eq!(response.status, "success");
        assert!(response.results.is_empty());

        let one_row = executor(contract, Arc::new(CannedRunner::new(vec![json!({"id": 1})])));
        let err = one_row
            .execute("broken", &ExecuteContractRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::TemplateParse(_)));
    }
}
