//! # Query Definitions
//!
//! The SQL half of a contract: base statement, default filters, sort and
//! pagination, plus the request-time override body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Equals
    #[serde(rename = "eq")]
    Eq,

    /// Not equals
    #[serde(rename = "neq")]
    Neq,

    /// Greater than
    #[serde(rename = "gt")]
    Gt,

    /// Less than
    #[serde(rename = "lt")]
    Lt,

    /// Pattern match (LIKE)
    #[serde(rename = "like")]
    Like,

    /// Value in list
    #[serde(rename = "in")]
    In,
}

impl FilterOperator {
    /// Get the operator string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::Like => "like",
            FilterOperator::In => "in",
        }
    }

    /// SQL symbol emitted between the field and its placeholder(s)
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Neq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::Like => "LIKE",
            FilterOperator::In => "IN",
        }
    }
}

/// One predicate term of the compiled WHERE clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Column name, inserted verbatim into the statement
    pub field: String,

    /// Comparison operator
    pub operator: FilterOperator,

    /// Scalar value, or an array for `in`
    pub value: Value,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Create an "in list" filter
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOperator::In, Value::Array(values))
    }
}

/// Page-based pagination. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationOptions {
    pub page: u64,

    #[serde(rename = "pageSize", alias = "page_size")]
    pub page_size: u64,
}

impl PaginationOptions {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Check the pagination invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.page_size == 0 {
            return Err("pageSize must be greater than 0".to_string());
        }
        if self.page == 0 {
            return Err("page is 1-based and must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// One ORDER BY term. The direction is passed through unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub field: String,
    pub direction: String,
}

impl SortOption {
    pub fn new(field: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: direction.into(),
        }
    }
}

/// Query half of a contract
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseQuery {
    pub connector_id: String,

    pub sql_query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<FilterCondition>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortOption>>,
}

impl DatabaseQuery {
    pub fn new(connector_id: impl Into<String>, sql_query: impl Into<String>) -> Self {
        Self {
            connector_id: connector_id.into(),
            sql_query: sql_query.into(),
            ..Default::default()
        }
    }

    /// Return a copy with every present override replacing the stored field.
    ///
    /// Fields are replaced wholesale: an empty `filters` list in the request
    /// clears the stored filters.
    pub fn with_overrides(&self, overrides: &ExecuteContractRequest) -> Self {
        let mut query = self.clone();
        if let Some(filters) = &overrides.filters {
            query.filters = Some(filters.clone());
        }
        if let Some(pagination) = overrides.pagination {
            query.pagination = Some(pagination);
        }
        if let Some(sort) = &overrides.sort {
            query.sort = Some(sort.clone());
        }
        query
    }
}

/// Optional body of an execute request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteContractRequest {
    #[serde(default)]
    pub filters: Option<Vec<FilterCondition>>,

    #[serde(default)]
    pub pagination: Option<PaginationOptions>,

    #[serde(default)]
    pub sort: Option<Vec<SortOption>>,
}

impl ExecuteContractRequest {
    /// Parse a raw request body. An empty body means "no overrides".
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}
