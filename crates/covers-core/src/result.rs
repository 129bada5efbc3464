use serde::{Deserialize, Serialize};

/// The track a listing is anchored on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub name: String,
    pub year: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

/// The related track on the other side of a cover link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverInfo {
    pub name: String,
    pub artist: String,
    pub artist_url: Option<String>,
    pub year: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverRelation {
    pub track: TrackInfo,
    pub cover: CoverInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u32,
}

impl PaginationInfo {
    /// Clamps both values to at least 1 and keeps `total_pages >= current_page`.
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        let current_page = current_page.max(1);
        Self {
            current_page,
            total_pages: total_pages.max(current_page),
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

impl Default for PaginationInfo {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Songs the artist covered.
    #[serde(rename = "covers_by")]
    CoversBy,
    /// Songs by other artists covering the artist.
    #[serde(rename = "covered_by_others")]
    CoveredByOthers,
}

impl RelationKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::CoversBy => "covers",
            Self::CoveredByOthers => "covered",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CoversBy => "covers_by",
            Self::CoveredByOthers => "covered_by_others",
        }
    }

    pub fn not_found_message(self, artist: &str) -> String {
        match self {
            Self::CoversBy => format!("No covers by {artist} found."),
            Self::CoveredByOthers => format!("No covers of {artist} found."),
        }
    }
}

/// Serializes directly as the response envelope handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    #[serde(rename = "artist")]
    pub subject_artist: String,
    #[serde(rename = "type")]
    pub relation_kind: RelationKind,
    pub pagination: PaginationInfo,
    #[serde(rename = "data")]
    pub relations: Vec<CoverRelation>,
}
