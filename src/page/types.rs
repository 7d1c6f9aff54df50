use crate::page::stats::compute_stats;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Heading levels, in the order headings are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// All levels from h1 to h6
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    /// Returns the HTML tag name for this level
    pub fn tag(&self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Meta tags read from the document head; absent tags are empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Absolute http/https URL
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Absolute source URL
    pub src: String,
    pub alt: String,
    pub title: String,
}

/// Aggregate counts derived from a page's collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    pub total_headings: usize,
    pub total_paragraphs: usize,
    pub total_links: usize,
    pub total_images: usize,
    pub word_count: usize,
}

/// The fact sheet extracted from one page
///
/// A `PageData` can only be built through [`PageData::new`], which derives
/// `stats` from the collections it is given. There are no setters, so the
/// counts always match the collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    url: String,
    scraped_at: DateTime<Utc>,
    title: String,
    meta: PageMeta,
    headings: Vec<Heading>,
    paragraphs: Vec<String>,
    links: Vec<Link>,
    images: Vec<Image>,
    stats: PageStats,
}

/// The collections found in a document, before stats are derived
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    pub title: String,
    pub meta: PageMeta,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
}

impl PageData {
    /// Finalizes extracted facts into an immutable fact sheet
    ///
    /// # Arguments
    ///
    /// * `url` - The normalized request URL (the cache key)
    /// * `scraped_at` - When the page was fetched
    /// * `facts` - The extracted collections
    pub fn new(url: impl Into<String>, scraped_at: DateTime<Utc>, facts: PageFacts) -> Self {
        let mut page = Self {
            url: url.into(),
            scraped_at,
            title: facts.title,
            meta: facts.meta,
            headings: facts.headings,
            paragraphs: facts.paragraphs,
            links: facts.links,
            images: facts.images,
            stats: PageStats::default(),
        };
        page.stats = compute_stats(&page);
        page
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn stats(&self) -> &PageStats {
        &self.stats
    }

    /// Approximate size of this page once serialized to JSON
    pub fn approximate_size(&self) -> usize {
        serde_json::to_vec(self).map(|bytes| bytes.len()).unwrap_or(0)
    }
}
