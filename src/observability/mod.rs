//! Observability for axis
//!
//! - Structured logging (one JSON object per line)
//! - Scope-based lifecycle events for contract executions and connector tests
//!
//! # Usage
//!
//! ```ignore
//! use axis::observability::{Logger, ObservationScope};
//!
//! Logger::info("SERVER_START", &[("addr", "0.0.0.0:8080")]);
//!
//! let scope = ObservationScope::with_fields("CONTRACT_EXECUTE", &[("contract_id", id)]);
//! // ... do work ...
//! scope.complete(&[("rows", "42")]);
//! ```

mod logger;
mod scope;

pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};
