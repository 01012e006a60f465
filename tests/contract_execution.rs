//! Contract execution through the engine with a fake query runner
//!
//! Covers:
//! - Statement compilation with stored and overridden query fields
//! - Projection and anonymization of runner rows
//! - Error propagation (not found, connection, query, template)

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use axis::engine::{
    CompiledStatement, ContractExecutor, ExecutionError, ExecutionResult, QueryRunner, ResultRow,
};
use axis::model::{
    AnonymizationRule, Connector, Contract, DatabaseConfig, DatabaseQuery,
    ExecuteContractRequest, FilterCondition, PaginationOptions, ResponseTemplate, SortOption,
};
use axis::store::MemoryStore;

// =============================================================================
// Test Utilities
// =============================================================================

/// Answers `run` with a fixed outcome and records each statement
struct FakeRunner {
    outcome: ExecutionResult<Vec<ResultRow>>,
    statements: Mutex<Vec<CompiledStatement>>,
}

impl FakeRunner {
    fn rows(rows: Vec<Value>) -> Arc<Self> {
        let rows = rows
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                other => panic!("row must be an object: {}", other),
            })
            .collect();
        Self::with_outcome(Ok(rows))
    }

    fn failing(err: ExecutionError) -> Arc<Self> {
        Self::with_outcome(Err(err))
    }

    fn with_outcome(outcome: ExecutionResult<Vec<ResultRow>>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            statements: Mutex::new(Vec::new()),
        })
    }

    fn last_statement(&self) -> CompiledStatement {
        self.statements
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("runner was never called")
    }

    fn calls(&self) -> usize {
        self.statements.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryRunner for FakeRunner {
    async fn run(
        &self,
        _connector: &Connector,
        statement: &CompiledStatement,
    ) -> ExecutionResult<Vec<ResultRow>> {
        self.statements.lock().unwrap().push(statement.clone());
        self.outcome.clone()
    }

    async fn ping(&self, _connector: &Connector) -> ExecutionResult<()> {
        self.outcome.clone().map(|_| ())
    }
}

fn connector() -> Connector {
    Connector::new(
        "test-conn",
        "postgres",
        DatabaseConfig {
            host: "localhost".to_string(),
            port: 5432,
            user: "test".to_string(),
            password: "test".to_string(),
            dbname: "testdb".to_string(),
        },
    )
}

fn executor(contracts: Vec<Contract>, runner: Arc<FakeRunner>) -> ContractExecutor {
    ContractExecutor::new(
        Arc::new(MemoryStore::with_records(contracts)),
        Arc::new(MemoryStore::with_records(vec![connector()])),
        runner,
    )
}

fn users_contract() -> Contract {
    let template = ResponseTemplate::from_fields([
        ("user_id", "{{.id}}"),
        ("email", "{{.email}}"),
        ("ssn", "{{.ssn}}"),
    ])
    .with_rule(AnonymizationRule::new("email", "hash"))
    .with_rule(AnonymizationRule::new("ssn", "mask").with_pattern("XXX-XX-****"));

    Contract::new(
        "test-contract",
        DatabaseQuery::new("test-conn", "SELECT id, email, ssn FROM users"),
        template,
    )
}

fn is_lower_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

// =============================================================================
// Successful Execution
// =============================================================================

#[tokio::test]
async fn test_execute_with_anonymization() {
    let runner = FakeRunner::rows(vec![json!({
        "id": "1",
        "email": "test@example.com",
        "ssn": "123-45-6789"
    })]);
    let executor = executor(vec![users_contract()], runner.clone());

    let request = ExecuteContractRequest::from_body(
        br#"{"filters": [], "pagination": {"page": 1, "page_size": 10}}"#,
    )
    .unwrap();
    let response = executor.execute("test-contract", &request).await.unwrap();

    assert_eq!(response.contract_id, "test-contract");
    assert_eq!(response.status, "success");
    assert_eq!(response.results.len(), 1);

    let row = &response.results[0];
    assert_eq!(row["user_id"], "1");
    assert!(is_lower_hex_digest(&row["email"]));
    assert_eq!(
        row["email"],
        "973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b"
    );
    assert_eq!(row["ssn"], "123-45-****");

    let statement = runner.last_statement();
    assert_eq!(statement.sql, "SELECT id, email, ssn FROM users LIMIT 10 OFFSET 0");
    assert!(statement.values.is_empty());
}

#[tokio::test]
async fn test_stored_filters_sort_and_pagination() {
    let mut contract = users_contract();
    contract.query.filters = Some(vec![
        FilterCondition::eq("status", json!("active")),
        FilterCondition::in_list("region", vec![json!("eu"), json!("us")]),
    ]);
    contract.query.sort = Some(vec![
        SortOption::new("name", "asc"),
        SortOption::new("created_at", "desc"),
    ]);
    contract.query.pagination = Some(PaginationOptions::new(3, 25));

    let runner = FakeRunner::rows(vec![]);
    let executor = executor(vec![contract], runner.clone());
    let response = executor
        .execute("test-contract", &ExecuteContractRequest::default())
        .await
        .unwrap();
    assert!(response.results.is_empty());

    let statement = runner.last_statement();
    assert_eq!(
        statement.sql,
        "SELECT id, email, ssn FROM users WHERE status = $1 AND region IN ($2,$3) \
         ORDER BY name asc, created_at desc LIMIT 25 OFFSET 50"
    );
    assert_eq!(statement.values, vec![json!("active"), json!("eu"), json!("us")]);
}

#[tokio::test]
async fn test_scalar_in_filter_keeps_value_without_clause() {
    let mut contract = users_contract();
    contract.query.filters = Some(vec![FilterCondition::new(
        "status",
        axis::model::FilterOperator::In,
        json!("not-an-array"),
    )]);

    let runner = FakeRunner::rows(vec![]);
    executor(vec![contract], runner.clone())
        .execute("test-contract", &ExecuteContractRequest::default())
        .await
        .unwrap();

    let statement = runner.last_statement();
    assert_eq!(statement.sql, "SELECT id, email, ssn FROM users WHERE ");
    assert_eq!(statement.values, vec![json!("not-an-array")]);
}

#[tokio::test]
async fn test_non_string_cells_render_as_text() {
    let contract = Contract::new(
        "typed",
        DatabaseQuery::new("test-conn", "SELECT * FROM metrics"),
        ResponseTemplate::from_fields([
            ("summary", "{{.count}} items, active={{.active}}, note={{.note}}"),
        ]),
    );
    let runner = FakeRunner::rows(vec![json!({"count": 12, "active": false, "note": null})]);

    let response = executor(vec![contract], runner)
        .execute("typed", &ExecuteContractRequest::default())
        .await
        .unwrap();
    assert_eq!(response.results[0]["summary"], "12 items, active=false, note=");
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_contract_not_found() {
    let runner = FakeRunner::rows(vec![]);
    let err = executor(vec![], runner.clone())
        .execute("non-existent", &ExecuteContractRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Contract not found");
    assert_eq!(err.status_code(), 404);
    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_connector_not_found() {
    let mut contract = users_contract();
    contract.query.connector_id = "gone".to_string();

    let runner = FakeRunner::rows(vec![]);
    let err = executor(vec![contract], runner.clone())
        .execute("test-contract", &ExecuteContractRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Connector not found");
    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_connection_failure_stops_before_projection() {
    // The template references a column no row has; a projection attempt would
    // surface as a template error instead.
    let mut contract = users_contract();
    contract
        .response_template
        .template
        .insert("broken".to_string(), json!("{{.does_not_exist}}"));

    let runner = FakeRunner::failing(ExecutionError::Connection("connection refused".into()));
    let err = executor(vec![contract], runner)
        .execute("test-contract", &ExecuteContractRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::Connection(_)));
    assert_eq!(err.to_string(), "Database connection failed");
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_query_failure() {
    let runner = FakeRunner::failing(ExecutionError::Query("syntax error".into()));
    let err = executor(vec![users_contract()], runner)
        .execute("test-contract", &ExecuteContractRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Query execution failed");
}

#[tokio::test]
async fn test_malformed_template_fails_whole_execution() {
    let contract = Contract::new(
        "bad-template",
        DatabaseQuery::new("test-conn", "SELECT id FROM users"),
        ResponseTemplate::from_fields([("id", "{{.id}}"), ("oops", "{{.id")]),
    );
    let runner = FakeRunner::rows(vec![json!({"id": 1})]);

    let err = executor(vec![contract], runner)
        .execute("bad-template", &ExecuteContractRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Template parsing failed");
}

#[tokio::test]
async fn test_connector_test_reports_runner_outcome() {
    let ok = executor(vec![], FakeRunner::rows(vec![]));
    assert_eq!(ok.test_connector("test-conn").await.unwrap().id, "test-conn");

    let down = executor(
        vec![],
        FakeRunner::failing(ExecutionError::Connection("timeout".into())),
    );
    let err = down.test_connector("test-conn").await.unwrap_err();
    assert!(matches!(err, ExecutionError::Connection(_)));
}
