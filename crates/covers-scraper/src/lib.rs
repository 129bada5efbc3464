use covers_config::Settings;
use covers_core::{CoversError, CoversResult, RelationKind, ScrapeResult};
use covers_parse::{ExtractedPage, extract_page};
use covers_solver::ResilientFetcher;
use tracing::{info, warn};

pub const DEFAULT_PAGE: &str = "1";

/// Turns `(artist, kind, page)` into a [`ScrapeResult`] by fetching and parsing one listing page.
#[derive(Clone)]
pub struct CoverScraper {
    fetcher: ResilientFetcher,
    origin: String,
}

impl CoverScraper {
    pub fn new(fetcher: ResilientFetcher) -> Self {
        let origin = fetcher.base_origin().as_str().trim_end_matches('/').to_string();
        Self { fetcher, origin }
    }

    pub fn from_settings(settings: &Settings) -> CoversResult<Self> {
        Ok(Self::new(ResilientFetcher::from_settings(settings)?))
    }

    pub async fn covers_by(&self, artist_name: &str, page: Option<&str>) -> CoversResult<ScrapeResult> {
        self.scrape(artist_name, RelationKind::CoversBy, page).await
    }

    pub async fn covered_by_others(
        &self,
        artist_name: &str,
        page: Option<&str>,
    ) -> CoversResult<ScrapeResult> {
        self.scrape(artist_name, RelationKind::CoveredByOthers, page)
            .await
    }

    pub async fn scrape(
        &self,
        artist_name: &str,
        kind: RelationKind,
        page: Option<&str>,
    ) -> CoversResult<ScrapeResult> {
        let artist = artist_name.trim();
        if artist.is_empty() {
            return Err(CoversError::InvalidInput(
                "No artist name was provided.".to_string(),
            ));
        }
        let page = parse_page(page.unwrap_or(DEFAULT_PAGE))?;

        let url = build_target_url(&self.origin, artist, kind, page);
        let html = self.fetcher.fetch(&url).await?;

        let ExtractedPage {
            relations,
            pagination,
            stats,
        } = extract_page(&html);

        if relations.is_empty() {
            if stats.track_items == 0 {
                warn!(artist, kind = kind.as_str(), page, "listing page has no track items");
            } else {
                warn!(
                    artist,
                    kind = kind.as_str(),
                    page,
                    track_items = stats.track_items,
                    entries = stats.entries,
                    skipped = stats.skipped,
                    "track items found but no usable connection entries"
                );
            }
            return Err(CoversError::NotFound(kind.not_found_message(artist)));
        }

        info!(
            artist,
            kind = kind.as_str(),
            relations = relations.len(),
            current_page = pagination.current_page,
            total_pages = pagination.total_pages,
            "scraped cover listing"
        );

        Ok(ScrapeResult {
            subject_artist: artist.to_string(),
            relation_kind: kind,
            pagination,
            relations,
        })
    }
}

/// `<origin>/<percent-encoded artist>/<covers|covered>/?sp=<page>`
///
/// Everything outside `A-Za-z0-9-_.~` in the artist name is escaped, including `'`, `(` and `)`.
/// `page` is already validated: [`CoverScraper::scrape`] only accepts a positive integer, so
/// inputs like `"2abc"` are rejected with `InvalidInput` instead of being passed through.
pub fn build_target_url(origin: &str, artist_name: &str, kind: RelationKind, page: u32) -> String {
    format!(
        "{}/{}/{}/?sp={page}",
        origin.trim_end_matches('/'),
        urlencoding::encode(artist_name),
        kind.path_segment()
    )
}

fn parse_page(raw: &str) -> CoversResult<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|page| *page > 0)
        .ok_or_else(|| {
            CoversError::InvalidInput(format!("page must be a positive integer, got '{raw}'"))
        })
}
