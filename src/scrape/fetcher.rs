//! HTTP fetcher implementation
//!
//! This module performs the single bounded GET behind every scrape:
//! - Building an HTTP client with browser-like default headers
//! - A whole-request timeout
//! - A redirect policy that caps hop count and re-checks each target
//! - A response body size cap, enforced while streaming
//! - Classification of every failure into a [`FetchError`]
//!
//! No retries are performed here.

use crate::config::FetchConfig;
use crate::url::validate_url;
use crate::{FetchError, ValidationError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::error::Error as StdError;
use thiserror::Error;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// A successfully retrieved response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code of the final response
    pub status_code: u16,

    /// Raw response body
    pub body: Vec<u8>,

    /// Final URL after redirects
    pub final_url: String,

    /// Content-Type header value, if any
    pub content_type: Option<String>,
}

/// A source of raw pages for the scrape pipeline
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Retrieves an already-admitted URL
    ///
    /// Implementations issue at most one request sequence per call and never
    /// retry.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Why the redirect policy refused to follow a hop
#[derive(Debug, Error)]
enum RedirectRejected {
    #[error("redirect limit reached")]
    TooMany,

    #[error("redirect target refused: {0}")]
    Forbidden(ValidationError),
}

/// Builds the redirect policy for a fetch configuration
///
/// The limit counts hops: with `max_redirects = 5` the fifth redirect is
/// followed and the sixth is refused.
fn redirect_policy(max_redirects: usize, guard_redirects: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error(RedirectRejected::TooMany);
        }

        if guard_redirects {
            if let Err(reason) = validate_url(attempt.url().as_str()) {
                return attempt.error(RedirectRejected::Forbidden(reason));
            }
        }

        attempt.follow()
    })
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    if let Ok(language) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout())
        .redirect(redirect_policy(config.max_redirects, config.guard_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// The production page source, backed by `reqwest`
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_body_bytes: usize,
    max_redirects: usize,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            max_body_bytes: config.max_body_bytes,
            max_redirects: config.max_redirects,
        })
    }

    /// Fetches a URL and classifies the outcome
    ///
    /// # Response Handling
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | status < 400 | `Ok(FetchedPage)` |
    /// | HTTP 403, 404, other 4xx | `HttpClientError(status)` |
    /// | HTTP 5xx | `HttpServerError(status)` |
    /// | Body over the cap | `TooLarge` |
    /// | Deadline exceeded | `Timeout` |
    /// | Redirect chain over the limit | `TooManyRedirects` |
    /// | Redirect to a refused target | `ForbiddenRedirect` |
    /// | Name resolution failure | `DnsFailure` |
    /// | Connection refused | `ConnectionRefused` |
    /// | Anything else | `Transport` |
    pub async fn fetch_url(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        tracing::debug!("{} responded {} (final URL {})", url, status, final_url);

        if let Some(error) = classify_status(status) {
            return Err(error);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = self.read_body(response).await?;

        Ok(FetchedPage {
            status_code: status.as_u16(),
            body,
            final_url,
            content_type,
        })
    }

    /// Reads the body, refusing anything over the size cap
    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>, FetchError> {
        let limit = self.max_body_bytes;
        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > limit as u64 {
            return Err(FetchError::TooLarge { limit });
        }

        let mut body = Vec::with_capacity(expected_size as usize);
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(&e))? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn classify(&self, error: &reqwest::Error) -> FetchError {
        classify_error(error, self.max_redirects)
    }
}

#[async_trait]
impl PageSource for Fetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.fetch_url(url).await
    }
}

/// Maps an unsuccessful status code to its error, if it is one
pub fn classify_status(status: StatusCode) -> Option<FetchError> {
    if status.is_server_error() {
        Some(FetchError::HttpServerError(status.as_u16()))
    } else if status.is_client_error() {
        Some(FetchError::HttpClientError(status.as_u16()))
    } else {
        None
    }
}

/// Classifies a transport-level `reqwest` error
fn classify_error(error: &reqwest::Error, max_redirects: usize) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout;
    }

    if error.is_redirect() {
        return match find_source::<RedirectRejected>(error) {
            Some(RedirectRejected::Forbidden(reason)) => {
                FetchError::ForbiddenRedirect(reason.clone())
            }
            _ => FetchError::TooManyRedirects { max: max_redirects },
        };
    }

    if has_io_kind(error, std::io::ErrorKind::ConnectionRefused) {
        return FetchError::ConnectionRefused;
    }

    if has_io_kind(error, std::io::ErrorKind::TimedOut) {
        return FetchError::Timeout;
    }

    if error.is_connect() && is_dns_failure(error) {
        return FetchError::DnsFailure;
    }

    FetchError::Transport(error.to_string())
}

/// Walks an error's source chain looking for a specific type
fn find_source<'a, T: StdError + 'static>(error: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<T>() {
            return Some(found);
        }
        current = err.source();
    }
    None
}

/// Returns true if any I/O error in the source chain has the given kind
fn has_io_kind(error: &(dyn StdError + 'static), kind: std::io::ErrorKind) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if err
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == kind)
        {
            return true;
        }
        current = err.source();
    }
    false
}

/// Name resolution errors are only identifiable by message
fn is_dns_failure(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        let message = err.to_string().to_lowercase();
        if message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
            || message.contains("no such host")
        {
            return true;
        }
        current = err.source();
    }
    false
}
