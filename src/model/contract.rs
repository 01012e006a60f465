//! # Contracts

use serde::{Deserialize, Serialize};

use super::query::DatabaseQuery;
use super::template::ResponseTemplate;

/// A stored query-plus-response-shape definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub query: DatabaseQuery,

    #[serde(default)]
    pub response_template: ResponseTemplate,
}

impl Contract {
    pub fn new(id: impl Into<String>, query: DatabaseQuery, response_template: ResponseTemplate) -> Self {
        Self {
            id: id.into(),
            query,
            response_template,
            ..Default::default()
        }
    }
}
