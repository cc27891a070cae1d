//! Pagination discovery results.

use serde::{Deserialize, Serialize};

/// Result totals read from a seed's first listing page.
///
/// When the banner cannot be found the seed has no known bound and is
/// paged in exhaustion mode instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCounts {
    /// Total matching results reported by the site
    pub results: u64,

    /// Total pages at the requested page size
    pub pages: u32,
}

impl PageCounts {
    /// All page numbers to fetch, 1-indexed.
    pub fn page_numbers(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.pages
    }
}
