//! Small conversions shared by the Diesel repositories.

use std::str::FromStr;

use pagination::PageRequest;

use super::diesel_error_mapping::RepositoryFailure;

/// Offset and limit for a page request in Diesel's `i64` form.
pub(crate) fn page_window<E: RepositoryFailure>(page: PageRequest) -> Result<(i64, i64), E> {
    let offset = i64::try_from(page.offset())
        .map_err(|_| E::from_query(format!("page offset {} out of range", page.offset())))?;
    let limit = i64::try_from(page.limit())
        .map_err(|_| E::from_query(format!("page limit {} out of range", page.limit())))?;
    Ok((offset, limit))
}

/// Convert a stored count into the unsigned form used by ports.
pub(crate) fn count_to_u64<E: RepositoryFailure>(count: i64) -> Result<u64, E> {
    u64::try_from(count).map_err(|_| E::from_query(format!("negative row count {count}")))
}

/// `ILIKE` pattern matching `needle` anywhere, with wildcards escaped.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Parse a stored enum label, reporting corrupt rows as query failures.
pub(crate) fn parse_stored<T, E>(column: &str, value: &str) -> Result<T, E>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    E: RepositoryFailure,
{
    value
        .parse()
        .map_err(|err| E::from_query(format!("invalid {column} `{value}`: {err}")))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ModuleStatus;
    use crate::domain::ports::ModuleRepositoryError;

    #[rstest]
    #[case("council", "%council%")]
    #[case("50%_off", "%50\\%\\_off%")]
    fn search_terms_are_escaped(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(needle), expected);
    }

    #[rstest]
    fn page_window_converts_bounds() {
        let page = PageRequest::new(3, 12).expect("valid page");
        let window: Result<_, ModuleRepositoryError> = page_window(page);
        assert_eq!(window, Ok((24, 12)));
    }

    #[rstest]
    fn corrupt_labels_are_query_failures() {
        let parsed: Result<ModuleStatus, ModuleRepositoryError> = parse_stored("status", "lost");
        assert!(matches!(parsed, Err(ModuleRepositoryError::Query { .. })));
        assert!(count_to_u64::<ModuleRepositoryError>(-1).is_err());
    }
}
