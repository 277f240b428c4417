use serde::{Deserialize, Serialize};

/// Response body of the statistics service.
///
/// `results` stays raw JSON here: the envelope decides success or failure,
/// and a badly typed statistic inside a successful answer is a rendering
/// concern, not a transport failure. See [`crate::render::decode_results`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatisticsPayload {
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Results {
    #[serde(default)]
    pub total_plays: Option<u64>,
    #[serde(default)]
    pub total_time_hours: Option<f64>,
    #[serde(default)]
    pub total_time_minutes: Option<f64>,
    #[serde(default)]
    pub total_files: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful_reads: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_with_errors: Option<u64>,
    #[serde(default)]
    pub top_songs: Vec<SongEntry>,
    #[serde(default)]
    pub top_artists: Vec<ArtistEntry>,
    #[serde(default)]
    pub top_albums: Vec<AlbumEntry>,
}

impl Results {
    /// Listening time in hours, derived from minutes when the service only
    /// reports minutes.
    pub fn hours(&self) -> Option<f64> {
        self.total_time_hours
            .or_else(|| self.total_time_minutes.map(|m| round_tenths(m / 60.0)))
    }

    /// Listening time in minutes, derived from hours when needed.
    pub fn minutes(&self) -> Option<f64> {
        self.total_time_minutes
            .or_else(|| self.total_time_hours.map(|h| round_tenths(h * 60.0)))
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SongEntry {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub plays: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_played: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArtistEntry {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub plays: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlbumEntry {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub plays: Option<u64>,
}

/// Which section of the report a fragment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Summary,
    TopSongs,
    TopArtists,
    TopAlbums,
}

/// One line of a page: a labelled statistic on the summary page, or a ranked
/// row on the list pages.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentItem {
    Stat { label: String, value: String },
    Row { rank: String, text: String },
}

impl FragmentItem {
    /// Single-line text form, e.g. `1) A — "T" · Album: Alb · Plays: 99`.
    pub fn display_line(&self) -> String {
        match self {
            FragmentItem::Stat { label, value } => format!("{}: {}", label, value),
            FragmentItem::Row { rank, text } => format!("{}) {}", rank, text),
        }
    }
}

/// One renderable page's worth of report data. All text has already been
/// sanitized for terminal display.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFragment {
    pub kind: PageKind,
    pub heading: String,
    pub subtitle: Option<String>,
    pub items: Vec<FragmentItem>,
}

impl PageFragment {
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.items.iter().map(FragmentItem::display_line)
    }
}
