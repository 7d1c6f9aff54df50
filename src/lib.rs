//! Pagesift: a guarded single-page fact extractor
//!
//! This crate fetches an operator-supplied URL behind an SSRF admission gate,
//! extracts a structured fact sheet (title, metadata, headings, paragraphs,
//! links, images, statistics) from its HTML, and memoizes results in a
//! TTL-bounded cache.

pub mod cache;
pub mod config;
pub mod page;
pub mod scrape;
pub mod url;

use thiserror::Error;

/// Main error type for a scrape request
///
/// Each variant carries an error classified once at its origin; the pipeline
/// passes them through unmodified.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Invalid URL: {0}")]
    Validation(#[from] ValidationError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Reasons a candidate URL is refused admission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL is empty")]
    Empty,

    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    #[error("Only HTTP and HTTPS schemes are allowed, got: {0}")]
    DisallowedScheme(String),

    #[error("Local addresses are not allowed: {0}")]
    ForbiddenHost(String),

    #[error("Private IP addresses are not allowed: {0}")]
    PrivateAddress(String),

    #[error(".local domains are not allowed: {0}")]
    ForbiddenTld(String),

    #[error("URL too long ({length} characters, max {max})")]
    TooLong { length: usize, max: usize },
}

/// Classified failures of a single fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Domain name could not be resolved")]
    DnsFailure,

    #[error("Connection refused by the server")]
    ConnectionRefused,

    #[error("HTTP client error {0}")]
    HttpClientError(u16),

    #[error("HTTP server error {0}")]
    HttpServerError(u16),

    #[error("Response body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Too many redirects (max {max})")]
    TooManyRedirects { max: usize },

    #[error("Redirect to a forbidden target: {0}")]
    ForbiddenRedirect(ValidationError),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Content that cannot be handed to the extractor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Response body is not an HTML document")]
    BinaryContent,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL admission
pub type ValidationResult = std::result::Result<::url::Url, ValidationError>;

// Re-export commonly used types
pub use cache::{spawn_sweeper, CacheStats, ResultCache};
pub use config::Config;
pub use page::{compute_stats, PageData, PageStats};
pub use scrape::{extract_page, FetchedPage, Fetcher, PageSource, ScrapePipeline, ScrapeResponse};
pub use crate::url::validate_url;
