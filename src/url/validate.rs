use crate::{ValidationError, ValidationResult};
use serde::Serialize;
use std::net::Ipv4Addr;
use url::{Host, Url};

/// Longest candidate URL accepted, in characters
pub const MAX_URL_LENGTH: usize = 2048;

/// Hostnames that always point back at the host itself
const FORBIDDEN_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "::1", "[::1]"];

/// Validates a candidate URL before any network access is permitted
///
/// # Admission Rules (checked in order)
///
/// 1. Empty input → `Empty`
/// 2. Not parseable as an absolute URL → `MalformedUrl`
/// 3. Scheme other than http/https → `DisallowedScheme`
/// 4. Host is `localhost`, `127.0.0.1`, `0.0.0.0`, `::1` or any other loopback
///    literal → `ForbiddenHost`
/// 5. Host is a literal IPv4 inside 10/8, 172.16/12, 192.168/16 or
///    169.254/16 → `PrivateAddress`
/// 6. Host ends in `.local` → `ForbiddenTld`
/// 7. Raw input longer than 2048 characters → `TooLong`
///
/// Hostnames are never resolved here, so a public name that resolves to a
/// private address passes admission.
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL; `as_str()` is its canonical form
/// * `Err(ValidationError)` - Why the candidate was refused
///
/// # Examples
///
/// ```
/// use pagesift::url::validate_url;
/// use pagesift::ValidationError;
///
/// let url = validate_url("HTTPS://Example.COM").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
///
/// let err = validate_url("http://192.168.1.5/page").unwrap_err();
/// assert!(matches!(err, ValidationError::PrivateAddress(_)));
/// ```
pub fn validate_url(candidate: &str) -> ValidationResult {
    if candidate.is_empty() {
        return Err(ValidationError::Empty);
    }

    let url = Url::parse(candidate).map_err(|e| ValidationError::MalformedUrl(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::DisallowedScheme(url.scheme().to_string()));
    }

    let host = url
        .host()
        .ok_or_else(|| ValidationError::MalformedUrl("URL has no host".to_string()))?;
    let hostname = url.host_str().unwrap_or_default().to_lowercase();

    if FORBIDDEN_HOSTS.contains(&hostname.as_str()) || is_loopback_host(&host) {
        return Err(ValidationError::ForbiddenHost(hostname));
    }

    if let Host::Ipv4(addr) = host {
        if is_private_ipv4(addr) {
            return Err(ValidationError::PrivateAddress(hostname));
        }
    }

    if hostname.ends_with(".local") {
        return Err(ValidationError::ForbiddenTld(hostname));
    }

    let length = candidate.chars().count();
    if length > MAX_URL_LENGTH {
        return Err(ValidationError::TooLong {
            length,
            max: MAX_URL_LENGTH,
        });
    }

    Ok(url)
}

/// Returns true for 10/8, 172.16/12, 192.168/16 and 169.254/16
pub fn is_private_ipv4(addr: Ipv4Addr) -> bool {
    addr.is_private() || addr.is_link_local()
}

fn is_loopback_host(host: &Host<&str>) -> bool {
    match host {
        Host::Ipv4(addr) => addr.is_loopback() || addr.is_unspecified(),
        Host::Ipv6(addr) => addr.is_loopback() || addr.is_unspecified(),
        Host::Domain(_) => false,
    }
}

/// Flat record form of a validation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub normalized_url: Option<String>,
    pub error_reason: Option<String>,
}

impl From<&ValidationResult> for ValidationReport {
    fn from(result: &ValidationResult) -> Self {
        match result {
            Ok(url) => Self {
                is_valid: true,
                normalized_url: Some(url.to_string()),
                error_reason: None,
            },
            Err(e) => Self {
                is_valid: false,
                normalized_url: None,
                error_reason: Some(e.to_string()),
            },
        }
    }
}
