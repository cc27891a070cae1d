//! Scrape orchestration.
//!
//! One independent workflow per seed, all seeds running concurrently.
//! With a known page count every page becomes its own task, launched
//! together and joined as they complete; without one, pages are walked
//! sequentially until a page contributes nothing new. No failure
//! propagates past its seed: the worst outcome is a seed reporting
//! fewer records than the remote dataset, with log entries naming every
//! skipped row and record.

use std::sync::Arc;

use futures::future;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, PageCounts, SortColumn, SurveyQuery};
use crate::parser;
use crate::services::{PageFetcher, pagination};
use crate::storage::{BatchOutcome, PostStore};

/// What one seed's workflow produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    /// The seed text
    pub seed: String,
    /// Pages attempted (fetched or failed)
    pub pages: usize,
    /// Pages that failed to fetch or parse
    pub page_failures: usize,
    /// Posts parsed out of fetched pages
    pub parsed: usize,
    /// Posts newly inserted
    pub inserted: usize,
    /// Posts already present
    pub duplicates: usize,
    /// Posts dropped by the per-record fallback
    pub dropped: usize,
}

impl SeedOutcome {
    fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            ..Self::default()
        }
    }

    fn absorb(&mut self, result: PageResult) {
        self.parsed += result.parsed;
        self.inserted += result.batch.inserted;
        self.duplicates += result.batch.duplicates;
        self.dropped += result.batch.dropped;
    }
}

/// What one page task produced.
#[derive(Debug, Clone, Copy)]
struct PageResult {
    parsed: usize,
    batch: BatchOutcome,
}

/// Aggregated outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub seeds: Vec<SeedOutcome>,
}

impl RunSummary {
    pub fn total_inserted(&self) -> usize {
        self.seeds.iter().map(|s| s.inserted).sum()
    }

    pub fn total_duplicates(&self) -> usize {
        self.seeds.iter().map(|s| s.duplicates).sum()
    }

    pub fn total_dropped(&self) -> usize {
        self.seeds.iter().map(|s| s.dropped).sum()
    }
}

/// Run the scraper for every seed.
pub async fn run_scrape(
    config: &Config,
    seeds: &[String],
    sort: Option<SortColumn>,
) -> Result<RunSummary> {
    config.validate()?;

    let fetcher = Arc::new(PageFetcher::new(&config.crawler, &config.survey.endpoint)?);

    // Create the schema before concurrent tasks race to open connections.
    PostStore::open(&config.storage.db_path)?;

    let jobs = seeds
        .iter()
        .map(|seed| scrape_seed(Arc::clone(&fetcher), config, seed, sort));
    let outcomes = future::join_all(jobs).await;

    let summary = RunSummary { seeds: outcomes };
    for outcome in &summary.seeds {
        log::info!(
            "Seed {:?}: {} pages ({} failed), {} posts parsed, {} inserted, {} duplicates, {} dropped",
            outcome.seed,
            outcome.pages,
            outcome.page_failures,
            outcome.parsed,
            outcome.inserted,
            outcome.duplicates,
            outcome.dropped
        );
    }
    Ok(summary)
}

/// One seed's workflow: discover the bound, then fetch pages.
async fn scrape_seed(
    fetcher: Arc<PageFetcher>,
    config: &Config,
    seed: &str,
    sort: Option<SortColumn>,
) -> SeedOutcome {
    match pagination::discover(&fetcher, seed, config.survey.page_size, sort).await {
        Some(counts) => {
            log::info!(
                "Seed {seed:?}: {} results over {} pages",
                counts.results,
                counts.pages
            );
            scrape_counted(&fetcher, config, seed, counts, sort).await
        }
        None => {
            log::info!("Seed {seed:?}: page count unknown, walking pages until exhausted");
            scrape_exhaustive(&fetcher, config, seed, sort).await
        }
    }
}

/// Count-known mode: one task per page, joined as they complete.
async fn scrape_counted(
    fetcher: &PageFetcher,
    config: &Config,
    seed: &str,
    counts: PageCounts,
    sort: Option<SortColumn>,
) -> SeedOutcome {
    let mut outcome = SeedOutcome::new(seed);
    let concurrency = config.crawler.max_concurrent.max(1);

    let mut pages = stream::iter(counts.page_numbers())
        .map(|page| async move { (page, scrape_page(fetcher, config, seed, page, sort).await) })
        .buffer_unordered(concurrency);

    while let Some((page, result)) = pages.next().await {
        outcome.pages += 1;
        match result {
            Ok(page_result) => outcome.absorb(page_result),
            Err(e) => {
                // Page-local: sibling tasks keep running.
                outcome.page_failures += 1;
                log::warn!("Seed {seed:?}: page {page} failed: {e}");
            }
        }
    }

    outcome
}

/// Exhaustion mode: strictly sequential pages, since each termination
/// decision depends on the previous page's result.
async fn scrape_exhaustive(
    fetcher: &PageFetcher,
    config: &Config,
    seed: &str,
    sort: Option<SortColumn>,
) -> SeedOutcome {
    let mut outcome = SeedOutcome::new(seed);
    let mut page: u32 = 1;

    loop {
        match scrape_page(fetcher, config, seed, page, sort).await {
            Ok(page_result) => {
                outcome.pages += 1;
                let exhausted = page_result.batch.no_new_records();
                outcome.absorb(page_result);
                if exhausted {
                    log::debug!("Seed {seed:?}: page {page} yielded nothing new, stopping");
                    break;
                }
                page += 1;
            }
            Err(e) => {
                outcome.pages += 1;
                outcome.page_failures += 1;
                log::warn!("Seed {seed:?}: stopping at page {page}: {e}");
                break;
            }
        }
    }

    outcome
}

/// Fetch one page, parse it and persist its batch.
async fn scrape_page(
    fetcher: &PageFetcher,
    config: &Config,
    seed: &str,
    page: u32,
    sort: Option<SortColumn>,
) -> Result<PageResult> {
    let query = SurveyQuery::for_page(seed, config.survey.page_size, page, sort);
    let html = fetcher.fetch(&query).await?;
    let posts = parser::parse_page(&html)?;

    // Each page task gets its own connection and transactional scope.
    let mut store = PostStore::open(&config.storage.db_path)?;
    let batch = store.persist_batch(&posts)?;
    Ok(PageResult {
        parsed: posts.len(),
        batch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_absorbs_page_results() {
        let mut outcome = SeedOutcome::new("cmu");
        outcome.absorb(PageResult {
            parsed: 10,
            batch: BatchOutcome {
                inserted: 7,
                duplicates: 2,
                dropped: 1,
            },
        });
        outcome.absorb(PageResult {
            parsed: 3,
            batch: BatchOutcome {
                inserted: 0,
                duplicates: 3,
                dropped: 0,
            },
        });

        assert_eq!(outcome.parsed, 13);
        assert_eq!(outcome.inserted, 7);
        assert_eq!(outcome.duplicates, 5);
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_summary_totals() {
        let summary = RunSummary {
            seeds: vec![
                SeedOutcome {
                    seed: "cmu".to_string(),
                    inserted: 5,
                    duplicates: 1,
                    ..SeedOutcome::default()
                },
                SeedOutcome {
                    seed: "mit".to_string(),
                    inserted: 2,
                    dropped: 1,
                    ..SeedOutcome::default()
                },
            ],
        };

        assert_eq!(summary.total_inserted(), 7);
        assert_eq!(summary.total_duplicates(), 1);
        assert_eq!(summary.total_dropped(), 1);
    }
}
