//! # Predicate Compiler
//!
//! Turns filter conditions into a `$n`-parameterized WHERE clause plus the
//! ordered bind values.
//!
//! Field names and operator symbols are written into the SQL verbatim; only
//! values are parameterized.

use serde_json::Value;

use crate::model::{FilterCondition, FilterOperator};

/// Compiled WHERE clause and its positional values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    /// `" WHERE ..."`, or empty when there were no filters
    pub sql: String,

    /// Bind values in placeholder order
    pub values: Vec<Value>,
}

/// Compile `filters` into a WHERE clause.
///
/// `in` with an array of k values expands to k placeholders. `in` with a
/// non-array value contributes no condition text, yet its raw value is still
/// appended to `values` without consuming a placeholder number.
pub fn compile_where(filters: &[FilterCondition]) -> WhereClause {
    if filters.is_empty() {
        return WhereClause::default();
    }

    let mut conditions = Vec::with_capacity(filters.len());
    let mut values = Vec::with_capacity(filters.len());
    let mut param = 1usize;

    for filter in filters {
        match filter.operator {
            FilterOperator::In => match &filter.value {
                Value::Array(items) => {
                    let placeholders: Vec<String> = (0..items.len())
                        .map(|i| format!("${}", param + i))
                        .collect();
                    conditions.push(format!(
                        "{} IN ({})",
                        filter.field,
                        placeholders.join(",")
                    ));
                    values.extend(items.iter().cloned());
                    param += items.len();
                }
                scalar => values.push(scalar.clone()),
            },
            op => {
                conditions.push(format!("{} {} ${}", filter.field, op.sql_symbol(), param));
                values.push(filter.value.clone());
                param += 1;
            }
        }
    }

    WhereClause {
        sql: format!(" WHERE {}", conditions.join(" AND ")),
        values,
    }
}
