//! Scrape orchestration
//!
//! A scrape request moves through these states:
//!
//! ```text
//! Validating -> CacheHit                                  -> Returned
//!            -> Fetching -> Extracting -> Cached          -> Returned
//!            (any step)  -> Failed
//! ```
//!
//! Validation always precedes cache and network access. A failed request
//! leaves nothing in the cache.

use crate::cache::{CacheStats, ResultCache};
use crate::config::Config;
use crate::scrape::extractor::extract_page;
use crate::scrape::fetcher::{Fetcher, PageSource};
use crate::scrape::response::{ClearAck, ScrapeResponse};
use crate::url::validate_url;
use crate::{ExtractionError, ScrapeError};
use std::sync::Arc;

/// Number of leading body bytes inspected for binary content
const SNIFF_BYTES: usize = 1024;

/// The validate → cache → fetch → extract → store pipeline
///
/// The pipeline holds no per-request state; share it behind an `Arc` to
/// serve requests concurrently. Concurrent misses for the same URL may each
/// fetch, and the last one stored wins.
pub struct ScrapePipeline<S = Fetcher> {
    source: S,
    cache: Arc<ResultCache>,
}

impl ScrapePipeline<Fetcher> {
    /// Creates a pipeline with a `reqwest` fetcher and a fresh cache
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let fetcher = Fetcher::new(&config.fetch)?;
        let cache = Arc::new(ResultCache::new(config.cache.ttl()));
        Ok(Self::new(fetcher, cache))
    }
}

impl<S: PageSource> ScrapePipeline<S> {
    /// Creates a pipeline over any page source and cache
    pub fn new(source: S, cache: Arc<ResultCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Empties the cache and resets its counters
    pub fn clear_cache(&self) -> ClearAck {
        self.cache.clear();
        tracing::info!("Cache cleared");
        ClearAck::default()
    }

    /// Scrapes a candidate URL
    ///
    /// # Steps
    ///
    /// 1. Validate the candidate; refuse it before touching cache or network
    /// 2. Serve a live cache entry for the normalized URL, if any
    /// 3. Fetch the page exactly once
    /// 4. Refuse binary bodies, extract facts and stats, cache, return
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeResponse)` - The fact sheet, tagged with `from_cache`
    /// * `Err(ScrapeError)` - The classified validation, fetch or extraction failure
    pub async fn scrape(&self, candidate: &str) -> Result<ScrapeResponse, ScrapeError> {
        let url = validate_url(candidate).map_err(|reason| {
            tracing::warn!("Rejected URL: {}", reason);
            ScrapeError::from(reason)
        })?;
        let key = url.as_str();

        if let Some(page) = self.cache.get(key) {
            tracing::info!("Cache hit for {}", key);
            return Ok(ScrapeResponse::cached(page));
        }

        tracing::info!("Scraping {}", key);
        let fetched = self.source.fetch(&url).await.map_err(|e| {
            tracing::warn!("Fetch failed for {}: {}", key, e);
            ScrapeError::from(e)
        })?;

        if looks_binary(&fetched.body) {
            tracing::warn!(
                "Refusing binary content from {} ({})",
                key,
                fetched.content_type.as_deref().unwrap_or("no content type")
            );
            return Err(ExtractionError::BinaryContent.into());
        }

        let page = extract_page(&fetched.body, &url);
        let page = self.cache.put(key, page);

        tracing::info!(
            "Scraped {}: {} headings, {} paragraphs, {} links, {} images",
            key,
            page.stats().total_headings,
            page.stats().total_paragraphs,
            page.stats().total_links,
            page.stats().total_images
        );

        Ok(ScrapeResponse::fresh(page))
    }
}

/// HTML never contains NUL bytes; binary formats almost always do early on
fn looks_binary(body: &[u8]) -> bool {
    body.iter().take(SNIFF_BYTES).any(|&b| b == 0)
}
