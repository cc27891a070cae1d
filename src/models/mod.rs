//! Data structures shared across the scraper.

pub mod config;
pub mod pagination;
pub mod post;
pub mod query;

pub use config::{Config, CrawlerConfig, StorageConfig, SurveyConfig};
pub use pagination::PageCounts;
pub use post::Post;
pub use query::{SortColumn, SurveyQuery};
