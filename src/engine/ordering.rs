//! # Order and Pagination Compiler

use crate::model::{PaginationOptions, SortOption};

/// Compile sort options into `" ORDER BY f1 d1, f2 d2"`.
///
/// Neither field nor direction is validated.
pub fn compile_order_by(sort: &[SortOption]) -> String {
    if sort.is_empty() {
        return String::new();
    }

    let terms: Vec<String> = sort
        .iter()
        .map(|s| format!("{} {}", s.field, s.direction))
        .collect();

    format!(" ORDER BY {}", terms.join(", "))
}

/// Compile pagination into `" LIMIT n OFFSET m"`; absent pagination adds nothing.
pub fn compile_pagination(pagination: Option<&PaginationOptions>) -> String {
    match pagination {
        Some(p) => format!(" LIMIT {} OFFSET {}", p.page_size, p.offset()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_sort() {
        assert_eq!(compile_order_by(&[]), "");
    }

    #[test]
    fn test_single_sort() {
        assert_eq!(
            compile_order_by(&[SortOption::new("name", "asc")]),
            " ORDER BY name asc"
        );
    }

    #[test]
    fn test_multiple_sort_keeps_order() {
        let sort = [SortOption::new("age", "desc"), SortOption::new("name", "asc")];
        assert_eq!(compile_order_by(&sort), " ORDER BY age desc, name asc");
    }

    #[test]
    fn test_direction_passes_through() {
        let sort = [SortOption::new("created_at", "DESC NULLS LAST")];
        assert_eq!(compile_order_by(&sort), " ORDER BY created_at DESC NULLS LAST");
    }

    #[test]
    fn test_pagination() {
        assert_eq!(compile_pagination(None), "");
        assert_eq!(
            compile_pagination(Some(&PaginationOptions::new(1, 10))),
            " LIMIT 10 OFFSET 0"
        );
        assert_eq!(
            compile_pagination(Some(&PaginationOptions::new(2, 10))),
            " LIMIT 10 OFFSET 10"
        );
    }
}
