//! Pagination discovery.
//!
//! Determines how far a seed's listing extends. When the first page
//! carries a result-count banner the page count is known up front and
//! all pages can be fetched concurrently; otherwise the caller walks
//! pages sequentially until one contributes nothing new.

use crate::models::{PageCounts, SortColumn, SurveyQuery};
use crate::parser;
use crate::services::PageFetcher;

/// Fetch the first page of a seed's listing and read its totals.
///
/// Any failure here (transport or a missing banner) is not a hard
/// error: the seed simply has no known bound and falls back to
/// exhaustion-mode paging.
pub async fn discover(
    fetcher: &PageFetcher,
    seed: &str,
    page_size: u32,
    sort: Option<SortColumn>,
) -> Option<PageCounts> {
    let query = SurveyQuery::for_page(seed, page_size, 1, sort);
    let html = match fetcher.fetch(&query).await {
        Ok(html) => html,
        Err(e) => {
            log::warn!("Seed {seed:?}: discovery fetch failed: {e}");
            return None;
        }
    };

    match parser::parse_counts(&html) {
        Some(counts) => {
            log::debug!(
                "Seed {seed:?}: {} results over {} pages",
                counts.results,
                counts.pages
            );
            Some(counts)
        }
        None => {
            log::debug!("Seed {seed:?}: no result-count banner found");
            None
        }
    }
}
