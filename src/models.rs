use serde::{Deserialize, Serialize};

/// Whether a tracked job resolves to a movie or a series episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

/// Milestone flags and progress for one acquisition job, as reported by the
/// server. `error_time` is epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatus {
    pub cached: bool,
    pub added: bool,
    pub mounted: bool,
    pub symlinked: bool,
    pub imported: bool,
    pub status: String,
    #[serde(default)]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_info: Option<ParsedInfo>,
}

/// Upstream parse results attached to a status push. Only the handful of
/// fields the client actually reads are modeled; the rest of the payload is
/// dropped on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_movie_info: Option<ParsedMovieInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_episode_info: Option<ParsedEpisodeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie: Option<CatalogRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<CatalogRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMovieInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEpisodeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_numbers: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
}

/// Reference to a catalog entry (movie or series) with its artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
    #[serde(default)]
    pub images: Vec<CatalogImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogImage {
    pub cover_type: String,
    pub remote_url: String,
}

/// Attribute tags derived from the release name by the classification rules.
/// Each list keeps duplicates: several rules may legitimately contribute the
/// same signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    #[serde(default)]
    pub dynamic_range: Vec<String>,
    #[serde(default)]
    pub audio_format: Vec<String>,
    #[serde(default)]
    pub combined_format: Vec<String>,
    #[serde(default)]
    pub resolution: Vec<String>,
    #[serde(default)]
    pub edition: Vec<String>,
}

/// Raw release name plus the attributes classified from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resolution: Vec<String>,
    #[serde(default)]
    pub media_info: MediaInfo,
}

/// One tracked acquisition/import job. `id` is unique across the collection;
/// `progress` mirrors `status.progress` for display convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub status: ItemStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debrid_provider: Option<String>,
    #[serde(default)]
    pub file_info: FileInfo,
}

impl ProcessingItem {
    /// Catalog id for enrichment lookups, wherever the upstream parser put it.
    pub fn tmdb_id(&self) -> Option<u64> {
        let parsed = self.status.parsed_info.as_ref()?;
        parsed
            .parsed_movie_info
            .as_ref()
            .and_then(|m| m.tmdb_id)
            .or_else(|| parsed.parsed_episode_info.as_ref().and_then(|e| e.tmdb_id))
            .or_else(|| parsed.movie.as_ref().and_then(|m| m.tmdb_id))
            .or_else(|| parsed.series.as_ref().and_then(|s| s.tmdb_id))
    }

    /// Human title derived from the upstream parse, falling back to the raw
    /// job title: "Title (Year)" for movies, "Title S01E02" for episodes.
    pub fn display_title(&self) -> String {
        if let Some(parsed) = &self.status.parsed_info {
            match self.media_type {
                MediaType::Movie => {
                    if let Some(info) = &parsed.parsed_movie_info {
                        if let Some(title) = &info.movie_title {
                            return match info.year {
                                Some(year) => format!("{} ({})", title, year),
                                None => title.clone(),
                            };
                        }
                    }
                }
                MediaType::Series => {
                    if let Some(info) = &parsed.parsed_episode_info {
                        if let Some(title) = &info.series_title {
                            if let (Some(season), Some(episodes)) =
                                (info.season_number, info.episode_numbers.as_ref())
                            {
                                if let Some(first) = episodes.first() {
                                    return format!("{} S{:02}E{:02}", title, season, first);
                                }
                            }
                            return title.clone();
                        }
                    }
                }
            }
        }
        self.title.clone()
    }
}

/// Severity of a server-pushed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

/// Notification payload as it arrives on the wire. The server does not
/// assign timestamps; those are attached at receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// A surfaced notification, timestamped at the moment it was admitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Receipt time, epoch milliseconds. Doubles as the dismissal key.
    pub timestamp: i64,
}
