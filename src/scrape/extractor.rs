//! HTML fact extraction
//!
//! This module turns a raw HTML document into a [`PageData`] fact sheet:
//! - Title (with `<h1>` and literal fallbacks)
//! - Description, keywords, author and Open Graph meta tags
//! - Headings h1 to h6
//! - Paragraphs long enough to carry content
//! - Links and images, resolved to absolute URLs and de-duplicated

use crate::page::{Heading, HeadingLevel, Image, Link, PageData, PageFacts, PageMeta};
use crate::url::{resolve_link, resolve_reference};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Title used when neither `<title>` nor `<h1>` has text
pub const UNTITLED: &str = "untitled";

/// Anchor text used when a link has no text of its own
pub const NO_LINK_TEXT: &str = "no text";

/// Paragraphs must be strictly longer than this many characters
pub const MIN_PARAGRAPH_CHARS: usize = 20;

/// Extracts a fact sheet from raw HTML, stamped with the current time
///
/// # Extraction Rules
///
/// | Field | Rule |
/// |-------|------|
/// | title | trimmed `<head>` `<title>`, else first `<h1>`, else "untitled" |
/// | meta | `name=` description/keywords/author, `property=` og:title/og:description/og:image |
/// | headings | h1 first, then h2 ... h6; document order within a level; empty skipped |
/// | paragraphs | whitespace collapsed; kept when longer than 20 characters |
/// | links | absolute http/https only; first occurrence of a URL wins |
/// | images | absolute src only; first occurrence of a src wins |
///
/// Malformed markup never fails; missing elements yield empty fields.
///
/// # Arguments
///
/// * `raw_html` - The response body
/// * `request_url` - The normalized request URL, used as base for relative references
///
/// # Example
///
/// ```
/// use pagesift::scrape::extract_page;
/// use url::Url;
///
/// let html = br#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let page = extract_page(html, &base_url);
/// assert_eq!(page.title(), "Test");
/// assert_eq!(page.links()[0].url, "https://example.com/page");
/// ```
pub fn extract_page(raw_html: &[u8], request_url: &Url) -> PageData {
    extract_page_at(raw_html, request_url, Utc::now())
}

/// Extracts a fact sheet with an explicit `scraped_at` timestamp
pub fn extract_page_at(raw_html: &[u8], request_url: &Url, scraped_at: DateTime<Utc>) -> PageData {
    let html = String::from_utf8_lossy(raw_html);
    let document = Html::parse_document(&html);

    let facts = PageFacts {
        title: extract_title(&document),
        meta: extract_meta(&document),
        headings: extract_headings(&document),
        paragraphs: extract_paragraphs(&document),
        links: extract_links(&document, request_url),
        images: extract_images(&document, request_url),
    };

    PageData::new(request_url.as_str(), scraped_at, facts)
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .next()
        .map(trimmed_text)
        .filter(|s| !s.is_empty())
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    first_text(document, "head > title")
        .or_else(|| first_text(document, "h1"))
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn meta_content(document: &Html, css: &str) -> String {
    selector(css)
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("content"))
                .map(str::to_string)
        })
        .unwrap_or_default()
}

/// Extracts the fixed set of meta tags
fn extract_meta(document: &Html) -> PageMeta {
    PageMeta {
        description: meta_content(document, r#"meta[name="description"]"#),
        keywords: meta_content(document, r#"meta[name="keywords"]"#),
        author: meta_content(document, r#"meta[name="author"]"#),
        og_title: meta_content(document, r#"meta[property="og:title"]"#),
        og_description: meta_content(document, r#"meta[property="og:description"]"#),
        og_image: meta_content(document, r#"meta[property="og:image"]"#),
    }
}

/// Extracts headings grouped by level, h1 first
fn extract_headings(document: &Html) -> Vec<Heading> {
    let mut headings = Vec::new();

    for level in HeadingLevel::ALL {
        let Some(selector) = selector(level.tag()) else {
            continue;
        };

        for element in document.select(&selector) {
            let text = trimmed_text(element);
            if !text.is_empty() {
                headings.push(Heading { level, text });
            }
        }
    }

    headings
}

/// Collapses every whitespace run to one space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts paragraphs with normalized whitespace
fn extract_paragraphs(document: &Html) -> Vec<String> {
    let Some(selector) = selector("p") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect()
}

/// Extracts unique absolute links, keeping the first anchor text per URL
fn extract_links(document: &Html, base_url: &Url) -> Vec<Link> {
    let Some(selector) = selector("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        else {
            continue;
        };

        if !seen.insert(url.clone()) {
            continue;
        }

        let text = trimmed_text(element);
        links.push(Link {
            url,
            text: if text.is_empty() {
                NO_LINK_TEXT.to_string()
            } else {
                text
            },
        });
    }

    links
}

/// Extracts unique images with their alt and title attributes
fn extract_images(document: &Html, base_url: &Url) -> Vec<Image> {
    let Some(selector) = selector("img[src]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for element in document.select(&selector) {
        let attrs = element.value();
        let Some(src) = attrs
            .attr("src")
            .and_then(|src| resolve_reference(src, base_url))
            .map(|url| url.to_string())
        else {
            continue;
        };

        if !seen.insert(src.clone()) {
            continue;
        }

        images.push(Image {
            src,
            alt: attrs.attr("alt").unwrap_or_default().to_string(),
            title: attrs.attr("title").unwrap_or_default().to_string(),
        });
    }

    images
}
