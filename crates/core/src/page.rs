//! Page request normalization.
//!
//! List endpoints accept `page` and `limit` as loosely-typed query strings.
//! Anything that is not a positive integer falls back to the default, and
//! `limit` is capped so a client cannot ask for the whole table at once.

use serde::{Deserialize, Serialize};

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request, clamping to sane bounds.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Build a page request from raw query-string values.
    #[must_use]
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>, default: u32| {
            raw.and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        Self::new(parse(page, 1), parse(limit, DEFAULT_PAGE_SIZE))
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Number of pages needed for `total` rows at this page size.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

/// `ceil(total / page_size)`, zero when `page_size` is zero.
#[must_use]
pub const fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_or_garbage() {
        assert_eq!(PageRequest::from_raw(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::from_raw(Some("abc"), Some("-5")),
            PageRequest::default()
        );
        assert_eq!(
            PageRequest::from_raw(Some("0"), Some("0")),
            PageRequest::default()
        );
    }

    #[test]
    fn test_limit_is_capped() {
        let req = PageRequest::from_raw(Some("1"), Some("5000"));
        assert_eq!(req.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_and_total_pages() {
        let req = PageRequest::from_raw(Some("2"), Some("10"));
        assert_eq!(req.offset(), 10);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(20), 2);
        assert_eq!(req.total_pages(21), 3);
    }

    #[test]
    fn test_free_total_pages() {
        assert_eq!(total_pages(11, 5), 3);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(3, 0), 0);
    }
}
