use covers_core::{CoverInfo, CoverRelation, TrackInfo};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{ExtractionStats, attribute, element_text, non_blank};

/// How the covering artist is picked out of a connection entry.
///
/// The listing markup carries no dedicated artist selector, so the artist is taken from the
/// first anchor that is not the `a.connectionName` link. This depends on the site keeping the
/// artist as the entry's secondary anchor; a layout change will silently attribute the wrong link.
pub const ARTIST_LINK_RULE: &str = "first <a> in the entry without class connectionName";

const CONNECTION_NAME_CLASS: &str = "connectionName";

struct RelationSelectors {
    track_item: Selector,
    track_name: Selector,
    track_year: Selector,
    track_url: Selector,
    track_image: Selector,
    connection: Selector,
    entry: Selector,
    connection_name: Selector,
    link: Selector,
    cover_year: Regex,
}

impl RelationSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            track_item: Selector::parse("section.trackItem").ok()?,
            track_name: Selector::parse(r#"h3.trackName span[itemprop="name"]"#).ok()?,
            track_year: Selector::parse("h3.trackName .trackYear").ok()?,
            track_url: Selector::parse(r#"h3.trackName a[itemprop="url"]"#).ok()?,
            track_image: Selector::parse(".trackCover img").ok()?,
            connection: Selector::parse(".track-connection").ok()?,
            entry: Selector::parse("li").ok()?,
            connection_name: Selector::parse("a.connectionName").ok()?,
            link: Selector::parse("a").ok()?,
            cover_year: Regex::new(r"\((\d{4})\)").ok()?,
        })
    }
}

pub(crate) fn collect(document: &Html) -> (Vec<CoverRelation>, ExtractionStats) {
    let mut stats = ExtractionStats::default();
    let mut relations = Vec::new();
    let Some(selectors) = RelationSelectors::new() else {
        return (relations, stats);
    };

    for item in document.select(&selectors.track_item) {
        stats.track_items += 1;
        let track = read_track(item, &selectors);

        for connection in item.select(&selectors.connection) {
            for entry in connection.select(&selectors.entry) {
                stats.entries += 1;
                match (&track, read_cover(entry, &selectors)) {
                    (Some(track), Some(cover)) => relations.push(CoverRelation {
                        track: track.clone(),
                        cover,
                    }),
                    _ => stats.skipped += 1,
                }
            }
        }
    }

    (relations, stats)
}

fn read_track(item: ElementRef<'_>, selectors: &RelationSelectors) -> Option<TrackInfo> {
    let name = first(item, &selectors.track_name).and_then(element_text)?;
    let year = first(item, &selectors.track_year)
        .and_then(element_text)
        .and_then(|text| non_blank(&text.replace(['(', ')'], "")));
    let url = first(item, &selectors.track_url).and_then(|a| attribute(a, "href"));
    let image_url = first(item, &selectors.track_image).and_then(|img| attribute(img, "src"));

    Some(TrackInfo {
        name,
        year,
        url,
        image_url,
    })
}

fn read_cover(entry: ElementRef<'_>, selectors: &RelationSelectors) -> Option<CoverInfo> {
    let name_link = first(entry, &selectors.connection_name)?;
    let name = element_text(name_link)?;
    let artist_link = artist_link(entry, selectors);

    let text = entry.text().collect::<String>();
    let year = selectors
        .cover_year
        .captures(&text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string());

    Some(CoverInfo {
        name,
        artist: artist_link.and_then(element_text).unwrap_or_default(),
        artist_url: artist_link.and_then(|a| attribute(a, "href")),
        year,
        url: attribute(name_link, "href"),
    })
}

/// See [`ARTIST_LINK_RULE`].
fn artist_link<'a>(entry: ElementRef<'a>, selectors: &RelationSelectors) -> Option<ElementRef<'a>> {
    entry
        .select(&selectors.link)
        .find(|link| !link.value().classes().any(|class| class == CONNECTION_NAME_CLASS))
}

fn first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}
