//! Survey page fetching.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::Result;
use crate::models::{CrawlerConfig, SurveyQuery};

/// Resolves one query into a raw listing document.
///
/// The HTTP client is shared across all page tasks; transport failures
/// stay page-local and are classified by the caller.
pub struct PageFetcher {
    client: Client,
    endpoint: Url,
}

impl PageFetcher {
    /// Create a fetcher for the given endpoint.
    pub fn new(config: &CrawlerConfig, endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
        })
    }

    /// Build the request URL for one query.
    pub fn page_url(&self, query: &SurveyQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        url
    }

    /// Fetch one listing page and return the document text.
    pub async fn fetch(&self, query: &SurveyQuery) -> Result<String> {
        let url = self.page_url(query);
        log::debug!("GET {url}");

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortColumn;

    fn fetcher() -> PageFetcher {
        PageFetcher::new(
            &CrawlerConfig::default(),
            "https://example.com/survey/index.php",
        )
        .unwrap()
    }

    #[test]
    fn test_page_url_carries_all_params() {
        let query = SurveyQuery::for_page("cmu", 250, 2, Some(SortColumn::Institution));
        let url = fetcher().page_url(&query);
        assert_eq!(
            url.as_str(),
            "https://example.com/survey/index.php?q=cmu&o=i&p=2&pp=250"
        );
    }

    #[test]
    fn test_page_url_omits_unset_params() {
        let query = SurveyQuery {
            text: Some("mit media lab".to_string()),
            ..SurveyQuery::default()
        };
        let url = fetcher().page_url(&query);
        assert_eq!(
            url.as_str(),
            "https://example.com/survey/index.php?q=mit+media+lab"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        assert!(PageFetcher::new(&CrawlerConfig::default(), "not a url").is_err());
    }
}
