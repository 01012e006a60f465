//! # Contract and Connector Records
//!
//! Serializable records owned by the store and read by the engine.

pub mod connector;
pub mod contract;
pub mod query;
pub mod template;

pub use connector::{Connector, DatabaseConfig};
pub use contract::Contract;
pub use query::{
    DatabaseQuery, ExecuteContractRequest, FilterCondition, FilterOperator, PaginationOptions,
    SortOption,
};
pub use template::{AnonymizationMethod, AnonymizationRule, ResponseTemplate};
