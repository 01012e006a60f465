//! # Contract and Connector Storage
//!
//! The engine reads records through the [`ContractStore`] and
//! [`ConnectorStore`] traits, injected at construction. Production code uses
//! one JSON file per record; tests use the in-memory variant.

pub mod errors;
pub mod file;
pub mod memory;

pub use errors::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{Connector, Contract};

/// A record persisted under its own id
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Human-readable record kind used in error messages
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Record for Contract {
    const KIND: &'static str = "Contract";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Connector {
    const KIND: &'static str = "Connector";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Durable storage for contracts
pub trait ContractStore: Send + Sync {
    fn load(&self, id: &str) -> StoreResult<Contract>;

    /// Insert or replace by id
    fn save(&self, contract: &Contract) -> StoreResult<()>;

    fn list(&self) -> StoreResult<Vec<Contract>>;

    fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Durable storage for connectors
pub trait ConnectorStore: Send + Sync {
    fn load(&self, id: &str) -> StoreResult<Connector>;

    /// Insert or replace by id
    fn save(&self, connector: &Connector) -> StoreResult<()>;

    fn list(&self) -> StoreResult<Vec<Connector>>;

    fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Reject ids that cannot safely name a file
pub(crate) fn check_id<R: Record>(id: &str) -> StoreResult<()> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidId {
            kind: R::KIND,
            id: id.to_string(),
        });
    }
    Ok(())
}
