//! # In-Memory Store
//!
//! Map-backed store used by tests and one-shot tooling.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::model::{Connector, Contract};

use super::errors::{StoreError, StoreResult};
use super::{check_id, ConnectorStore, ContractStore, Record};

/// In-memory store for one record type, ordered by id
#[derive(Debug)]
pub struct MemoryStore<R> {
    records: RwLock<BTreeMap<String, R>>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a store pre-populated with `records`
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.id().to_string(), r))
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }

    fn load_record(&self, id: &str) -> StoreResult<R> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Io("Lock poisoned".to_string()))?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(R::KIND, id))
    }

    fn save_record(&self, record: &R) -> StoreResult<()> {
        check_id::<R>(record.id())?;
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Io("Lock poisoned".to_string()))?;
        records.insert(record.id().to_string(), record.clone());
        Ok(())
    }

    fn list_records(&self) -> StoreResult<Vec<R>> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Io("Lock poisoned".to_string()))?;
        Ok(records.values().cloned().collect())
    }

    fn delete_record(&self, id: &str) -> StoreResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Io("Lock poisoned".to_string()))?;
        records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(R::KIND, id))
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractStore for MemoryStore<Contract> {
    fn load(&self, id: &str) -> StoreResult<Contract> {
        self.load_record(id)
    }

    fn save(&self, contract: &Contract) -> StoreResult<()> {
        self.save_record(contract)
    }

    fn list(&self) -> StoreResult<Vec<Contract>> {
        self.list_records()
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        self.delete_record(id)
    }
}

impl ConnectorStore for MemoryStore<Connector> {
    fn load(&self, id: &str) -> StoreResult<Connector> {
        self.load_record(id)
    }

    fn save(&self, connector: &Connector) -> StoreResult<()> {
        self.save_record(connector)
    }

    fn list(&self) -> StoreResult<Vec<Connector>> {
        self.list_records()
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        self.delete_record(id)
    }
}
