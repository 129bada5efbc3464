use covers_core::PaginationInfo;
use scraper::{Html, Selector};

use crate::element_text;

struct PaginationSelectors {
    control: Selector,
    current: Selector,
    page_link: Selector,
}

impl PaginationSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            control: Selector::parse(".pagination").ok()?,
            current: Selector::parse(".curr").ok()?,
            page_link: Selector::parse(".page a").ok()?,
        })
    }
}

pub(crate) fn collect(document: &Html) -> PaginationInfo {
    let Some(selectors) = PaginationSelectors::new() else {
        return PaginationInfo::default();
    };
    let Some(control) = document.select(&selectors.control).next() else {
        return PaginationInfo::default();
    };

    let current = control
        .select(&selectors.current)
        .next()
        .and_then(element_text)
        .and_then(|text| page_number(&text))
        .unwrap_or(1);

    let highest = control
        .select(&selectors.page_link)
        .filter_map(element_text)
        .filter_map(|text| page_number(&text))
        .max()
        .unwrap_or(current);

    PaginationInfo::new(current, highest)
}

/// Leading run of ASCII digits as a page number; zero or no digits is unparseable.
fn page_number(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<u32>().ok().filter(|page| *page > 0)
}
