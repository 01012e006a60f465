//! # JSON File Store
//!
//! One record per file at `<dir>/<id>.json`. The directory is chosen by the
//! caller; nothing here reads process-wide state.

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::model::{Connector, Contract};

use super::errors::{StoreError, StoreResult};
use super::{check_id, ConnectorStore, ContractStore, Record};

/// File-backed store for one record type
#[derive(Debug)]
pub struct JsonFileStore<R> {
    dir: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> JsonFileStore<R> {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Io(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        Ok(Self {
            dir,
            _record: PhantomData,
        })
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn load_record(&self, id: &str) -> StoreResult<R> {
        check_id::<R>(id).map_err(|_| StoreError::not_found(R::KIND, id))?;

        let path = self.path_for(id);
        let content = fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::not_found(R::KIND, id),
            _ => StoreError::Io(format!("Failed to read {}: {}", path.display(), e)),
        })?;

        serde_json::from_slice(&content).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn save_record(&self, record: &R) -> StoreResult<()> {
        check_id::<R>(record.id())?;

        let content = serde_json::to_vec_pretty(record)
            .map_err(|e| StoreError::Serialization(format!("Failed to serialize {}: {}", R::KIND, e)))?;

        let path = self.path_for(record.id());
        fs::write(&path, content)
            .map_err(|e| StoreError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn list_records(&self) -> StoreResult<Vec<R>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            StoreError::Io(format!("Failed to read {}: {}", self.dir.display(), e))
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StoreError::Io(format!("Failed to read directory entry: {}", e))
            })?;

            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            // Unreadable or malformed records are skipped, not fatal
            if let Ok(record) = self.load_record(id) {
                records.push(record);
            }
        }

        records.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(records)
    }

    fn delete_record(&self, id: &str) -> StoreResult<()> {
        check_id::<R>(id).map_err(|_| StoreError::not_found(R::KIND, id))?;

        let path = self.path_for(id);
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::not_found(R::KIND, id),
            _ => StoreError::Io(format!("Failed to delete {}: {}", path.display(), e)),
        })
    }
}

impl ContractStore for JsonFileStore<Contract> {
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

impl ConnectorStore for JsonFileStore<Connector> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DatabaseConfig, DatabaseQuery, ResponseTemplate};
    use tempfile::TempDir;

    fn contract(id: &str) -> Contract {
        Contract::new(
            id,
            DatabaseQuery::new("conn-1", "SELECT 1"),
            ResponseTemplate::from_fields([("one", "{{.one}}")]),
        )
    }

    #[test]
    fn test_open_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("contracts");

        let store = JsonFileStore::<Contract>::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[test]
    fn test_save_writes_one_file_per_record() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::<Connector>::open(tmp.path()).unwrap();

        let connector = Connector::new("pg-main", "postgres", DatabaseConfig::default());
        store.save(&connector).unwrap();

        assert!(tmp.path().join("pg-main.json").is_file());
        assert_eq!(store.load("pg-main").unwrap(), connector);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::<Contract>::open(tmp.path()).unwrap();

        let err = store.load("missing").unwrap_err();
        assert_eq!(err, StoreError::not_found("Contract", "missing"));
    }

    #[test]
    fn test_load_malformed_is_serialization_error() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::<Contract>::open(tmp.path()).unwrap();
        fs::write(tmp.path().join("broken.json"), "{not json").unwrap();

        assert!(matches!(store.load("broken"), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_path_like_ids_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::<Contract>::open(tmp.path()).unwrap();

        assert!(store.load("../etc/passwd").unwrap_err().is_not_found());
        assert!(matches!(
            store.save(&contract("../escape")),
            Err(StoreError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_list_skips_foreign_and_broken_files() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::<Contract>::open(tmp.path()).unwrap();

        store.save(&contract("b")).unwrap();
        store.save(&contract("a")).unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignore me").unwrap();
        fs::write(tmp.path().join("broken.json"), "{").unwrap();

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_delete() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::<Contract>::open(tmp.path()).unwrap();
        store.save(&contract("gone")).unwrap();

        store.delete("gone").unwrap();
        assert!(store.load("gone").unwrap_err().is_not_found());
        assert!(store.delete("gone").unwrap_err().is_not_found());
    }
}
