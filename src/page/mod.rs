//! Page fact sheet definitions
//!
//! This module defines the structured record produced for every scraped page
//! and the statistics derived from it.

mod stats;
mod types;

pub use stats::{compute_stats, count_words};
pub use types::{Heading, HeadingLevel, Image, Link, PageData, PageFacts, PageMeta, PageStats};
