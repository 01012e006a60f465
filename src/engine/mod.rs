//! # Contract Execution Engine
//!
//! - Predicate, ordering and pagination compilation
//! - Connection resolution, parameter typing and query running
//! - Per-row template projection
//! - Field anonymization

pub mod anonymize;
pub mod connection;
pub mod decode;
pub mod errors;
pub mod executor;
pub mod ordering;
pub mod params;
pub mod predicate;
pub mod runner;
pub mod statement;
pub mod template;

pub use anonymize::anonymize;
pub use connection::{connection_string, ConnectionTarget, Dialect};
pub use decode::ResultRow;
pub use errors::{ErrorKind, ExecutionError, ExecutionResult};
pub use executor::{ContractExecutor, ExecutionResponse};
pub use ordering::{compile_order_by, compile_pagination};
pub use params::PgParam;
pub use predicate::{compile_where, WhereClause};
pub use runner::{QueryRunner, SqlxRunner};
pub use statement::CompiledStatement;
pub use template::{project, CompiledTemplate, ProjectedRow, Projector};
