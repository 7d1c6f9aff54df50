//! Aggregate statistics derived from a page fact sheet

use crate::page::{PageData, PageStats};

/// Computes aggregate counts for a page
///
/// The `total_*` fields are the lengths of the matching collections.
/// `word_count` is the sum, over all paragraphs, of whitespace-delimited
/// tokens.
pub fn compute_stats(page: &PageData) -> PageStats {
    PageStats {
        total_headings: page.headings().len(),
        total_paragraphs: page.paragraphs().len(),
        total_links: page.links().len(),
        total_images: page.images().len(),
        word_count: count_words(page.paragraphs()),
    }
}

/// Counts whitespace-delimited tokens across paragraphs
pub fn count_words(paragraphs: &[String]) -> usize {
    paragraphs
        .iter()
        .map(|paragraph| paragraph.split_whitespace().count())
        .sum()
}
