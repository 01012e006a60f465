//! JSON I/O handling for CLI
//!
//! - Input: optional JSON request body read from a file
//! - Output: a single pretty-printed JSON document on stdout

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::model::ExecuteContractRequest;

use super::errors::{CliError, CliResult};

/// Read execute overrides from `path`; no path means no overrides
pub fn read_request(path: Option<&Path>) -> CliResult<ExecuteContractRequest> {
    let Some(path) = path else {
        return Ok(ExecuteContractRequest::default());
    };

    let body = fs::read(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    let request = ExecuteContractRequest::from_body(&body)?;
    Ok(request)
}

/// Write a value as JSON to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_request_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("body.json");
        fs::write(&path, r#"{"pagination": {"page": 3, "pageSize": 20}}"#).unwrap();

        let request = read_request(Some(&path)).unwrap();
        let pagination = request.pagination.unwrap();
        assert_eq!((pagination.page, pagination.page_size), (3, 20));
        assert!(request.filters.is_none());
    }

    #[test]
    fn test_read_request_without_file() {
        assert_eq!(read_request(None).unwrap(), ExecuteContractRequest::default());
    }

    #[test]
    fn test_read_request_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_request(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert_eq!(err.code(), &crate::cli::CliErrorCode::IoError);
    }
}
