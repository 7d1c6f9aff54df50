//! URL handling module for Pagesift
//!
//! This module provides the SSRF admission gate applied to every candidate URL
//! and the reference resolution used when extracting links and images.

mod resolve;
mod validate;

// Re-export main functions
pub use resolve::{resolve_link, resolve_reference};
pub use validate::{is_private_ipv4, validate_url, ValidationReport, MAX_URL_LENGTH};
