//! # Statement Assembly
//!
//! Final statement = base SQL + WHERE + ORDER BY + LIMIT/OFFSET, always in
//! that order.

use serde_json::Value;

use crate::model::DatabaseQuery;

use super::ordering::{compile_order_by, compile_pagination};
use super::predicate::compile_where;

/// A ready-to-run statement with positional bind values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    pub values: Vec<Value>,
}

impl CompiledStatement {
    /// Compile a (possibly overridden) query definition
    pub fn compile(query: &DatabaseQuery) -> Self {
        let filters = query.filters.as_deref().unwrap_or_default();
        let sort = query.sort.as_deref().unwrap_or_default();

        let where_clause = compile_where(filters);

        let mut sql = String::with_capacity(query.sql_query.len() + where_clause.sql.len() + 64);
        sql.push_str(&query.sql_query);
        sql.push_str(&where_clause.sql);
        sql.push_str(&compile_order_by(sort));
        sql.push_str(&compile_pagination(query.pagination.as_ref()));

        Self {
            sql,
            values: where_clause.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FilterCondition, PaginationOptions, SortOption};
    use serde_json::json;

    #[test]
    fn test_bare_query() {
        let stmt = CompiledStatement::compile(&DatabaseQuery::new("c", "SELECT * FROM users"));
        assert_eq!(stmt.sql, "SELECT * FROM users");
        assert!(stmt.values.is_empty());
    }

    #[test]
    fn test_pagination_without_sort() {
        let mut query = DatabaseQuery::new("c", "SELECT * FROM users");
        query.pagination = Some(PaginationOptions::new(2, 10));

        let stmt = CompiledStatement::compile(&query);
        assert_eq!(stmt.sql, "SELECT * FROM users LIMIT 10 OFFSET 10");
    }

    #[test]
    fn test_fragment_order() {
        let mut query = DatabaseQuery::new("c", "SELECT id, name FROM users");
        query.filters = Some(vec![FilterCondition::eq("status", json!("active"))]);
        query.sort = Some(vec![SortOption::new("name", "asc")]);
        query.pagination = Some(PaginationOptions::new(3, 5));

        let stmt = CompiledStatement::compile(&query);
        assert_eq!(
            stmt.sql,
            "SELECT id, name FROM users WHERE status = $1 ORDER BY name asc LIMIT 5 OFFSET 10"
        );
        assert_eq!(stmt.values, vec![json!("active")]);
    }
}
