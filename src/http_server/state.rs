//! Shared handler state

use std::sync::Arc;

use crate::engine::{ContractExecutor, QueryRunner};
use crate::store::{ConnectorStore, ContractStore};

/// State shared by contract and connector handlers
#[derive(Clone)]
pub struct ApiState {
    pub contracts: Arc<dyn ContractStore>,
    pub connectors: Arc<dyn ConnectorStore>,
    pub executor: ContractExecutor,
}

impl ApiState {
    pub fn new(
        contracts: Arc<dyn ContractStore>,
        connectors: Arc<dyn ConnectorStore>,
        runner: Arc<dyn QueryRunner>,
    ) -> Self {
        let executor = ContractExecutor::new(contracts.clone(), connectors.clone(), runner);
        Self {
            contracts,
            connectors,
            executor,
        }
    }
}
