//! Page/limit parsing and page arithmetic for list requests.

use std::collections::HashMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Read `page` and `limit` from query params. Absent, non-numeric, or zero values fall back to
    /// the defaults; `limit` is capped at `max_limit`.
    pub fn from_query(params: &HashMap<String, String>, max_limit: u32) -> Self {
        let parse = |key: &str, default: u32| {
            params
                .get(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(default)
        };
        Pagination {
            page: parse("page", DEFAULT_PAGE),
            limit: parse("limit", DEFAULT_LIMIT).min(max_limit.max(1)),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// Ceiling division of `total` by the page size.
    pub fn total_pages(&self, total: i64) -> i64 {
        let limit = i64::from(self.limit);
        (total + limit - 1) / limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_when_absent() {
        assert_eq!(Pagination::from_query(&query(&[]), 100), Pagination::default());
    }

    #[test]
    fn defaults_when_not_numeric() {
        let p = Pagination::from_query(&query(&[("page", "two"), ("limit", "-5")]), 100);
        assert_eq!(p, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn zero_falls_back() {
        let p = Pagination::from_query(&query(&[("page", "0"), ("limit", "0")]), 100);
        assert_eq!(p, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn limit_is_capped() {
        let p = Pagination::from_query(&query(&[("limit", "5000")]), 100);
        assert_eq!(p.limit, 100);
    }

    #[test]
    fn offset_and_pages() {
        let p = Pagination { page: 2, limit: 1 };
        assert_eq!(p.offset(), 1);
        assert_eq!(p.total_pages(2), 2);

        let p = Pagination { page: 3, limit: 10 };
        assert_eq!(p.offset(), 20);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
    }
}
