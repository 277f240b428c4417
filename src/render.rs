//! Statistics payload → ordered report pages.
//!
//! Rendering is a pure transform: the same filename, results and config
//! always produce equal fragments. Ranks and ordering come from the service
//! and are reproduced as-is.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::config::{ReportConfig, TimeUnit};
use crate::error::RenderError;
use crate::models::{
    AlbumEntry, ArtistEntry, FragmentItem, PageFragment, PageKind, Results, SongEntry,
};
use crate::sanitize::clean_text;

/// Shown for absent optional text such as a song without album tag.
pub const UNKNOWN_TEXT: &str = "Unknown";
/// Shown for absent required values when rendering leniently.
pub const MISSING_VALUE: &str = "—";

pub const SUMMARY_HEADING: &str = "Your Listening Statistics";
pub const SONGS_HEADING: &str = "Top 15 Songs";
pub const ARTISTS_HEADING: &str = "Top 10 Artists";
pub const ALBUMS_HEADING: &str = "Top 10 Albums";

/// Decode the `results` object of a successful payload.
///
/// A statistic of the wrong type (a quoted number, a negative play count)
/// makes the payload malformed. Strict decoding rejects it; lenient decoding
/// keeps every field that does decode and leaves the rest for placeholders.
pub fn decode_results(value: &Value, config: &ReportConfig) -> Result<Results, RenderError> {
    match Results::deserialize(value) {
        Ok(results) => Ok(results),
        Err(err) if config.strict => Err(RenderError::Malformed(err.to_string())),
        Err(err) => {
            warn!("rendering placeholders for malformed results: {}", err);
            Ok(lenient_results(value))
        }
    }
}

fn field<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    value.get(key).and_then(|v| T::deserialize(v).ok())
}

fn entries<T>(value: &Value, key: &str, entry: fn(&Value) -> T) -> Vec<T> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(entry).collect())
        .unwrap_or_default()
}

fn lenient_results(value: &Value) -> Results {
    Results {
        total_plays: field(value, "total_plays"),
        total_time_hours: field(value, "total_time_hours"),
        total_time_minutes: field(value, "total_time_minutes"),
        total_files: field(value, "total_files"),
        successful_reads: field(value, "successful_reads"),
        files_with_errors: field(value, "files_with_errors"),
        top_songs: entries(value, "top_songs", |v| SongEntry {
            rank: field(v, "rank"),
            artist: field(v, "artist"),
            title: field(v, "title"),
            album: field(v, "album"),
            plays: field(v, "plays"),
            first_played: field(v, "first_played"),
            last_played: field(v, "last_played"),
        }),
        top_artists: entries(value, "top_artists", |v| ArtistEntry {
            rank: field(v, "rank"),
            artist: field(v, "artist"),
            plays: field(v, "plays"),
        }),
        top_albums: entries(value, "top_albums", |v| AlbumEntry {
            rank: field(v, "rank"),
            album: field(v, "album"),
            artist: field(v, "artist"),
            plays: field(v, "plays"),
        }),
    }
}

/// Render the four report pages: summary, top songs, top artists, top albums.
pub fn render(
    filename: &str,
    results: &Results,
    config: &ReportConfig,
) -> Result<Vec<PageFragment>, RenderError> {
    let renderer = Renderer { config };
    Ok(vec![
        renderer.summary(filename, results)?,
        renderer.songs(&results.top_songs)?,
        renderer.artists(&results.top_artists)?,
        renderer.albums(&results.top_albums)?,
    ])
}

struct Renderer<'a> {
    config: &'a ReportConfig,
}

impl Renderer<'_> {
    fn summary(&self, filename: &str, results: &Results) -> Result<PageFragment, RenderError> {
        let location = || "summary".to_string();

        let time = match self.config.time_unit {
            TimeUnit::Hours => results.hours().map(|h| format!("{} hours", h)),
            TimeUnit::Minutes => results.minutes().map(|m| format!("{} minutes", m)),
        };

        let mut items = vec![
            stat(
                "Total Plays",
                self.required(results.total_plays, location, "total_plays")?,
            ),
            stat(
                "Time Listened",
                self.required(time, location, "total_time")?,
            ),
            stat(
                "FLAC Files",
                self.required(results.total_files, location, "total_files")?,
            ),
        ];
        if let Some(readable) = results.successful_reads {
            items.push(stat("Readable Files", readable.to_string()));
        }
        if let Some(failed) = results.files_with_errors {
            items.push(stat("Files With Errors", failed.to_string()));
        }

        Ok(PageFragment {
            kind: PageKind::Summary,
            heading: SUMMARY_HEADING.to_string(),
            subtitle: Some(format!("File: {}", text(Some(filename)))),
            items,
        })
    }

    fn songs(&self, songs: &[SongEntry]) -> Result<PageFragment, RenderError> {
        let items = songs
            .iter()
            .enumerate()
            .map(|(i, song)| -> Result<FragmentItem, RenderError> {
                let location = || format!("top songs row {}", i + 1);
                Ok(FragmentItem::Row {
                    rank: self.required(song.rank, location, "rank")?,
                    text: format!(
                        "{} — \"{}\" · Album: {} · Plays: {}",
                        text(song.artist.as_deref()),
                        text(song.title.as_deref()),
                        text(song.album.as_deref()),
                        self.required(song.plays, location, "plays")?,
                    ),
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;
        Ok(list_page(PageKind::TopSongs, SONGS_HEADING, items))
    }

    fn artists(&self, artists: &[ArtistEntry]) -> Result<PageFragment, RenderError> {
        let items = artists
            .iter()
            .enumerate()
            .map(|(i, artist)| -> Result<FragmentItem, RenderError> {
                let location = || format!("top artists row {}", i + 1);
                Ok(FragmentItem::Row {
                    rank: self.required(artist.rank, location, "rank")?,
                    text: format!(
                        "{} · Plays: {}",
                        text(artist.artist.as_deref()),
                        self.required(artist.plays, location, "plays")?,
                    ),
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;
        Ok(list_page(PageKind::TopArtists, ARTISTS_HEADING, items))
    }

    fn albums(&self, albums: &[AlbumEntry]) -> Result<PageFragment, RenderError> {
        let items = albums
            .iter()
            .enumerate()
            .map(|(i, album)| -> Result<FragmentItem, RenderError> {
                let location = || format!("top albums row {}", i + 1);
                Ok(FragmentItem::Row {
                    rank: self.required(album.rank, location, "rank")?,
                    text: format!(
                        "\"{}\" by {} · Plays: {}",
                        text(album.album.as_deref()),
                        text(album.artist.as_deref()),
                        self.required(album.plays, location, "plays")?,
                    ),
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;
        Ok(list_page(PageKind::TopAlbums, ALBUMS_HEADING, items))
    }

    /// A value the payload must carry. Strict rendering rejects its absence;
    /// lenient rendering logs it and shows a placeholder.
    fn required<T: Display>(
        &self,
        value: Option<T>,
        location: impl FnOnce() -> String,
        field: &'static str,
    ) -> Result<String, RenderError> {
        match value {
            Some(value) => Ok(value.to_string()),
            None => {
                let err = RenderError::MissingField {
                    location: location(),
                    field,
                };
                if self.config.strict {
                    return Err(err);
                }
                warn!("rendering placeholder: {}", err);
                Ok(MISSING_VALUE.to_string())
            }
        }
    }
}

fn stat(label: &str, value: String) -> FragmentItem {
    FragmentItem::Stat {
        label: label.to_string(),
        value,
    }
}

fn list_page(kind: PageKind, heading: &str, items: Vec<FragmentItem>) -> PageFragment {
    PageFragment {
        kind,
        heading: heading.to_string(),
        subtitle: None,
        items,
    }
}

/// Sanitized optional display text; blank values count as absent.
fn text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => clean_text(value),
        _ => UNKNOWN_TEXT.to_string(),
    }
}
