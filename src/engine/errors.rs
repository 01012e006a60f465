//! # Execution Errors
//!
//! Error codes:
//! - AXIS_NOT_FOUND (404)
//! - AXIS_VALIDATION (400)
//! - AXIS_CONNECTION_FAILED (500)
//! - AXIS_QUERY_FAILED (500)
//! - AXIS_TEMPLATE_FAILED (500)
//! - AXIS_INTERNAL (500)
//!
//! Every error is terminal for the execution that raised it. The `Display`
//! text is what callers see; the carried detail is for logs only.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for contract execution
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Caller-visible failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Connection,
    Query,
    Template,
    Internal,
}

impl ErrorKind {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "AXIS_NOT_FOUND",
            ErrorKind::Validation => "AXIS_VALIDATION",
            ErrorKind::Connection => "AXIS_CONNECTION_FAILED",
            ErrorKind::Query => "AXIS_QUERY_FAILED",
            ErrorKind::Template => "AXIS_TEMPLATE_FAILED",
            ErrorKind::Internal => "AXIS_INTERNAL",
        }
    }

    /// HTTP status code for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::Connection
            | ErrorKind::Query
            | ErrorKind::Template
            | ErrorKind::Internal => 500,
        }
    }
}

/// Contract execution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Contract not found")]
    ContractNotFound(String),

    #[error("Connector not found")]
    ConnectorNotFound(String),

    /// Malformed request or override
    #[error("{0}")]
    Validation(String),

    /// Backend unreachable or dialect unresolved
    #[error("Database connection failed")]
    Connection(String),

    /// Statement execution failed
    #[error("Query execution failed")]
    Query(String),

    /// A result cell could not be decoded
    #[error("Error scanning row")]
    Scan(String),

    /// Malformed template syntax
    #[error("Template parsing failed")]
    TemplateParse(String),

    /// Template referenced something the row does not have
    #[error("Template execution failed")]
    TemplateRender(String),

    /// Storage or serialization failure
    #[error("{0}")]
    Internal(String),
}

impl ExecutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::ContractNotFound(_) | ExecutionError::ConnectorNotFound(_) => {
                ErrorKind::NotFound
            }
            ExecutionError::Validation(_) => ErrorKind::Validation,
            ExecutionError::Connection(_) => ErrorKind::Connection,
            ExecutionError::Query(_) | ExecutionError::Scan(_) => ErrorKind::Query,
            ExecutionError::TemplateParse(_) | ExecutionError::TemplateRender(_) => {
                ErrorKind::Template
            }
            ExecutionError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Underlying cause, for logs
    pub fn detail(&self) -> &str {
        match self {
            ExecutionError::ContractNotFound(d)
            | ExecutionError::ConnectorNotFound(d)
            | ExecutionError::Validation(d)
            | ExecutionError::Connection(d)
            | ExecutionError::Query(d)
            | ExecutionError::Scan(d)
            | ExecutionError::TemplateParse(d)
            | ExecutionError::TemplateRender(d)
            | ExecutionError::Internal(d) => d,
        }
    }

    /// Map a contract lookup failure
    pub fn from_contract_lookup(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => ExecutionError::ContractNotFound(id),
            other => ExecutionError::Internal(format!("Failed to load contract: {}", other)),
        }
    }

    /// Map a connector lookup failure
    pub fn from_connector_lookup(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => ExecutionError::ConnectorNotFound(id),
            other => ExecutionError::Internal(format!("Failed to load connector: {}", other)),
        }
    }
}
