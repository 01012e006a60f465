//! axis - contract execution service
//!
//! A contract binds a parameterized SQL query on a registered connector to a
//! response template and field anonymization rules. Executing a contract
//! compiles the query with request overrides, runs it, renders every row
//! through the templates and redacts the configured fields.

pub mod cli;
pub mod engine;
pub mod http_server;
pub mod model;
pub mod observability;
pub mod store;
