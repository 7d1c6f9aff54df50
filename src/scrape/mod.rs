//! Scrape module for fetching and extracting pages
//!
//! This module contains the core scraping logic, including:
//! - Bounded HTTP fetching with failure classification
//! - HTML fact extraction
//! - Orchestration of validation, caching, fetching and extraction
//! - Payloads for the routing layer

mod extractor;
mod fetcher;
mod pipeline;
mod response;

pub use extractor::{
    collapse_whitespace, extract_page, extract_page_at, MIN_PARAGRAPH_CHARS, NO_LINK_TEXT, UNTITLED,
};
pub use fetcher::{build_http_client, classify_status, FetchedPage, Fetcher, PageSource};
pub use pipeline::ScrapePipeline;
pub use response::{CacheStatsBody, ClearAck, ErrorBody, ScrapeResponse};
