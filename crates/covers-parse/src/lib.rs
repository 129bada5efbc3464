//! HTML extraction for cover listing pages.
//!
//! Extraction never fails: missing markup degrades to `None` fields, and a page without
//! track items yields no relations.

mod pagination;
mod relations;

use covers_core::{CoverRelation, PaginationInfo};
use scraper::{ElementRef, Html};

pub use relations::ARTIST_LINK_RULE;

/// Counters describing what the extractor saw, used to explain empty results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub track_items: usize,
    pub entries: usize,
    /// Entries dropped because the track or cover name was missing.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub relations: Vec<CoverRelation>,
    pub pagination: PaginationInfo,
    pub stats: ExtractionStats,
}

/// Parses the document once and extracts relations, pagination and statistics.
pub fn extract_page(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    let (relations, stats) = relations::collect(&document);
    ExtractedPage {
        relations,
        pagination: pagination::collect(&document),
        stats,
    }
}

pub fn extract_relations(html: &str) -> Vec<CoverRelation> {
    relations::collect(&Html::parse_document(html)).0
}

pub fn extract_pagination(html: &str) -> PaginationInfo {
    pagination::collect(&Html::parse_document(html))
}

/// Concatenated text of an element with whitespace runs collapsed; `None` when blank.
fn element_text(element: ElementRef<'_>) -> Option<String> {
    let raw = element.text().collect::<String>();
    non_blank(&raw)
}

fn non_blank(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

fn attribute(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(
            non_blank("  Smells Like\n\t Teen   Spirit "),
            Some("Smells Like Teen Spirit".to_string())
        );
        assert_eq!(non_blank(" \n "), None);
    }

    #[test]
    fn empty_document_extracts_nothing() {
        let page = extract_page("");
        assert!(page.relations.is_empty());
        assert_eq!(page.pagination, PaginationInfo::default());
        assert_eq!(page.stats, ExtractionStats::default());
    }
}
