//! Pipeline entry points for scraper operations.
//!
//! - `run_scrape`: Fetch, parse and persist listings for each seed
//! - `run_export`: Dump the stored posts as a JSON snapshot

pub mod export;
pub mod scrape;

pub use export::run_export;
pub use scrape::{RunSummary, SeedOutcome, run_scrape};
