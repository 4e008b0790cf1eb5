use super::error::SearchError;

/// Maximum raw filter length accepted, in bytes.
pub const MAX_FILTER_LEN: usize = 255;
/// Minimum normalized filter length, in bytes.
pub const MIN_FILTER_LEN: usize = 3;
/// Page size ceiling; out-of-range requests are clamped, never rejected.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Where in the result order a query resumes.
///
/// The boundary comparison on `from_time` is inclusive (`<=`), so a row
/// exactly at the boundary timestamp can appear on two consecutive pages.
/// That bounded duplication is an accepted tradeoff of the single-column
/// time cursor; callers deduplicate by `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// No cursor: newest matching records.
    Latest,
    /// Records with `first_seen <= from_time`.
    Before { from_time: i64 },
    /// Records with `first_seen <= from_time`, excluding `id >= last_id`
    /// (ties at the boundary already delivered on the prior page).
    BeforeExcluding { from_time: i64, last_id: u64 },
}

/// A validated, normalized search query ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Normalized filter wrapped in `%…%` for substring matching.
    /// Caller-supplied `%`/`_` wildcards pass through; parameter binding
    /// is the only sanitization required.
    pub pattern: String,
    pub cursor: Cursor,
    /// Effective page size, always in `1..=MAX_PAGE_SIZE`.
    pub limit: i64,
}

impl SearchQuery {
    /// Validate and normalize caller input into a query plan.
    ///
    /// Validation order: raw length cap first (a megabyte of whitespace is
    /// rejected, not trimmed), then trim + lowercase, then the minimum
    /// length check. Cursor parameters that are absent or non-positive are
    /// treated as unset.
    pub fn parse(
        filter: &str,
        from_time: Option<i64>,
        last_id: Option<u64>,
        limit: Option<i64>,
    ) -> Result<Self, SearchError> {
        if filter.len() > MAX_FILTER_LEN {
            return Err(SearchError::TooLong);
        }

        let normalized = filter.trim().to_lowercase();
        if normalized.len() < MIN_FILTER_LEN {
            return Err(SearchError::TooShort);
        }

        let limit = match limit {
            Some(n) if n > 0 && n <= MAX_PAGE_SIZE => n,
            _ => MAX_PAGE_SIZE,
        };

        let from_time = from_time.filter(|t| *t > 0);
        let last_id = last_id.filter(|id| *id > 0);

        let cursor = match (from_time, last_id) {
            (Some(from_time), Some(last_id)) => Cursor::BeforeExcluding { from_time, last_id },
            (Some(from_time), None) => Cursor::Before { from_time },
            // A bare last_id has no time boundary to tie-break; ignore it.
            (None, _) => Cursor::Latest,
        };

        Ok(Self {
            pattern: format!("%{normalized}%"),
            cursor,
            limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_filter(filter: &str) -> Result<SearchQuery, SearchError> {
        SearchQuery::parse(filter, None, None, None)
    }

    // ── Filter validation ────────────────────────────────────────────

    #[test]
    fn valid_filter_passes() {
        let q = parse_filter("example").unwrap();
        assert_eq!(q.pattern, "%example%");
    }

    #[test]
    fn minimum_length_boundary() {
        assert!(parse_filter("ab").is_err());
        assert!(parse_filter("abc").is_ok());
    }

    #[test]
    fn raw_length_cap_is_255() {
        let at_cap = "a".repeat(255);
        assert!(parse_filter(&at_cap).is_ok());

        let over_cap = "a".repeat(256);
        assert_eq!(parse_filter(&over_cap), Err(SearchError::TooLong));
    }

    #[test]
    fn length_cap_checked_before_trim() {
        // 256 spaces around a valid core: rejected as too long, not trimmed first.
        let padded = format!("{}abc{}", " ".repeat(128), " ".repeat(128));
        assert_eq!(parse_filter(&padded), Err(SearchError::TooLong));
    }

    #[test]
    fn whitespace_only_is_too_short() {
        assert_eq!(parse_filter("   "), Err(SearchError::TooShort));
    }

    #[test]
    fn filter_is_trimmed_and_case_folded() {
        let q = parse_filter("  ExAmple.COM  ").unwrap();
        assert_eq!(q.pattern, "%example.com%");
    }

    #[test]
    fn wildcards_pass_through() {
        let q = parse_filter("a_b%c").unwrap();
        assert_eq!(q.pattern, "%a_b%c%");
    }

    // ── Limit clamping ───────────────────────────────────────────────

    #[test]
    fn limit_in_range_used_as_is() {
        assert_eq!(SearchQuery::parse("abc", None, None, Some(1)).unwrap().limit, 1);
        assert_eq!(
            SearchQuery::parse("abc", None, None, Some(1000)).unwrap().limit,
            1000
        );
    }

    #[test]
    fn limit_out_of_range_clamps_to_1000() {
        for bad in [None, Some(0), Some(-5), Some(1001), Some(i64::MAX)] {
            assert_eq!(SearchQuery::parse("abc", None, None, bad).unwrap().limit, 1000);
        }
    }

    // ── Cursor combinations ──────────────────────────────────────────

    #[test]
    fn no_cursor_is_latest() {
        let q = SearchQuery::parse("abc", None, None, None).unwrap();
        assert_eq!(q.cursor, Cursor::Latest);
    }

    #[test]
    fn from_time_only() {
        let q = SearchQuery::parse("abc", Some(500), None, None).unwrap();
        assert_eq!(q.cursor, Cursor::Before { from_time: 500 });
    }

    #[test]
    fn from_time_and_last_id() {
        let q = SearchQuery::parse("abc", Some(500), Some(42), None).unwrap();
        assert_eq!(
            q.cursor,
            Cursor::BeforeExcluding {
                from_time: 500,
                last_id: 42
            }
        );
    }

    #[test]
    fn zero_and_negative_cursor_params_are_unset() {
        let q = SearchQuery::parse("abc", Some(0), Some(0), None).unwrap();
        assert_eq!(q.cursor, Cursor::Latest);

        let q = SearchQuery::parse("abc", Some(-1), Some(42), None).unwrap();
        assert_eq!(q.cursor, Cursor::Latest);

        let q = SearchQuery::parse("abc", Some(500), Some(0), None).unwrap();
        assert_eq!(q.cursor, Cursor::Before { from_time: 500 });
    }

    #[test]
    fn last_id_without_from_time_is_ignored() {
        let q = SearchQuery::parse("abc", None, Some(42), None).unwrap();
        assert_eq!(q.cursor, Cursor::Latest);
    }
}
