//! Payload shapes for the routing layer
//!
//! The HTTP routing layer lives outside this crate; these types are what it
//! serializes for the scrape, cache-stats and cache-clear endpoints.

use crate::cache::CacheStats;
use crate::page::PageData;
use crate::{FetchError, ScrapeError, ValidationError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// A successful scrape, tagged with where it came from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    #[serde(flatten)]
    pub page: Arc<PageData>,

    /// True when served from the cache without fetching
    pub from_cache: bool,

    /// When the cached copy was scraped; only set on cache hits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
}

impl ScrapeResponse {
    pub fn fresh(page: Arc<PageData>) -> Self {
        Self {
            page,
            from_cache: false,
            cached_at: None,
        }
    }

    pub fn cached(page: Arc<PageData>) -> Self {
        let cached_at = Some(page.scraped_at());
        Self {
            page,
            from_cache: true,
            cached_at,
        }
    }
}

/// Error payload: a short label and a human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl ErrorBody {
    fn new(error: &str, details: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            details: details.into(),
        }
    }
}

impl ScrapeError {
    /// HTTP status the routing layer should answer with
    ///
    /// | Error | Status |
    /// |-------|--------|
    /// | any validation failure | 400 |
    /// | `HttpClientError(403)` | 403 |
    /// | `HttpClientError(404)` | 404 |
    /// | `Timeout` | 408 |
    /// | anything else | 500 |
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Fetch(FetchError::HttpClientError(403)) => 403,
            Self::Fetch(FetchError::HttpClientError(404)) => 404,
            Self::Fetch(FetchError::Timeout) => 408,
            _ => 500,
        }
    }

    /// Error payload the routing layer should answer with
    pub fn error_body(&self) -> ErrorBody {
        match self {
            Self::Validation(ValidationError::Empty) => {
                ErrorBody::new("Missing URL", "Please provide a URL to scrape")
            }
            Self::Validation(reason) => ErrorBody::new("Invalid URL", reason.to_string()),
            Self::Fetch(FetchError::Timeout) => {
                ErrorBody::new("Timeout", "The page took too long to respond")
            }
            Self::Fetch(FetchError::HttpClientError(404)) => {
                ErrorBody::new("Page not found", "The requested page does not exist")
            }
            Self::Fetch(FetchError::HttpClientError(403)) => {
                ErrorBody::new("Access denied", "The site blocks access to scrapers")
            }
            _ => ErrorBody::new(
                "Scraping failed",
                "Unable to scrape this URL. Check that it is accessible.",
            ),
        }
    }
}

/// Cache statistics payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatsBody {
    pub keys: usize,
    pub hits: u64,
    pub misses: u64,
    pub ksize: usize,
    pub vsize: usize,
}

impl From<CacheStats> for CacheStatsBody {
    fn from(stats: CacheStats) -> Self {
        Self {
            keys: stats.entry_count,
            hits: stats.hits,
            misses: stats.misses,
            ksize: stats.entry_count,
            vsize: stats.approximate_value_bytes,
        }
    }
}

/// Acknowledgement returned after the cache is cleared
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearAck {
    pub message: String,
}

impl Default for ClearAck {
    fn default() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}
