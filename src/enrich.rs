use crate::config::Config;
use crate::models::{FileInfo, MediaType};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

/// Media attributes reported by the *arr services, fetched from the
/// server's `/arrinfo` endpoint. Only the fields the dashboard reads.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ArrInfo {
    pub movie: Option<ArrEntry>,
    pub series: Option<ArrEntry>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArrEntry {
    pub media_info: Option<ArrMediaInfo>,
    pub quality: Option<ArrQualityWrapper>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArrMediaInfo {
    pub audio_codec: Option<String>,
    pub video_codec: Option<String>,
    pub video_dynamic_range: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ArrQualityWrapper {
    pub quality: Option<ArrQuality>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ArrQuality {
    pub name: Option<String>,
    pub source: Option<String>,
    pub resolution: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TmdbImagesResponse {
    logo_path: Option<String>,
}

/// Resolutions accepted from arr data; anything else keeps the classified
/// fallback.
const VALID_RESOLUTIONS: &[&str] = &["2160p", "1080p", "720p", "480p"];

/// Merge arr-reported attributes into classified file info, keeping the
/// classified values as fallback wherever the arr data is silent.
pub fn apply_arr_info(file_info: &mut FileInfo, entry: &ArrEntry) {
    if let Some(media_info) = &entry.media_info {
        if let Some(range) = &media_info.video_dynamic_range {
            if !range.is_empty() {
                file_info.media_info.dynamic_range = vec![range.clone()];
            }
        }
        if let Some(codec) = &media_info.audio_codec {
            if !codec.is_empty() {
                file_info.media_info.audio_format = vec![codec.clone()];
            }
        }
    }

    if let Some(resolution) = entry
        .quality
        .as_ref()
        .and_then(|w| w.quality.as_ref())
        .and_then(|q| q.resolution)
    {
        let formatted = format!("{}p", resolution);
        if VALID_RESOLUTIONS.contains(&formatted.as_str()) {
            file_info.resolution = vec![formatted];
        }
    }
}

/// Bounded item-id → logo-URL cache, least-recently-used eviction.
/// Replaces the unbounded process-wide map the dashboard grew over time.
pub struct LogoCache {
    capacity: usize,
    seq: u64,
    entries: HashMap<String, (String, u64)>,
}

impl LogoCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seq: 0,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, item_id: &str) -> Option<String> {
        self.seq += 1;
        let seq = self.seq;
        self.entries.get_mut(item_id).map(|entry| {
            entry.1 = seq;
            entry.0.clone()
        })
    }

    pub fn insert(&mut self, item_id: String, url: String) {
        self.seq += 1;
        self.entries.insert(item_id, (url, self.seq));

        if self.entries.len() > self.capacity {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, (_, seq))| *seq)
                .map(|(id, _)| id.clone())
            {
                self.entries.remove(&oldest);
            }
        }
    }

    /// Forget an item's logo, e.g. once the item leaves the collection.
    pub fn evict(&mut self, item_id: &str) {
        self.entries.remove(item_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const LOGO_CACHE_CAPACITY: usize = 256;
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w200";

/// Client for the enrichment collaborators: arr attribute lookup and TMDB
/// artwork. Failures here are expected and degrade to classified data; they
/// never block reconciliation.
pub struct EnrichClient {
    client: Client,
    config: Config,
    logo_cache: LogoCache,
}

impl EnrichClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config,
            logo_cache: LogoCache::new(LOGO_CACHE_CAPACITY),
        }
    }

    /// Fetch arr attributes for the in-flight item, if the server has any.
    pub async fn fetch_arr_info(&self) -> Result<ArrInfo, EnrichError> {
        let response = self.client.get(self.config.api_url("/arrinfo")).send().await?;
        if !response.status().is_success() {
            return Err(EnrichError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Resolve the title logo for an item, going to TMDB only on cache miss.
    pub async fn fetch_logo(
        &mut self,
        item_id: &str,
        media_type: MediaType,
        tmdb_id: u64,
    ) -> Result<Option<String>, EnrichError> {
        if let Some(cached) = self.logo_cache.get(item_id) {
            debug!("Logo cache hit for item {}", item_id);
            return Ok(Some(cached));
        }

        let kind = match media_type {
            MediaType::Movie => "movie",
            MediaType::Series => "tv",
        };
        let url = self
            .config
            .api_url(&format!("/api/tmdb/{}/{}/images", kind, tmdb_id));

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(EnrichError::Status(response.status()));
        }

        let images: TmdbImagesResponse = response.json().await?;
        match images.logo_path {
            Some(path) => {
                let logo_url = format!("{}{}", TMDB_IMAGE_BASE, path);
                self.logo_cache.insert(item_id.to_string(), logo_url.clone());
                Ok(Some(logo_url))
            }
            None => Ok(None),
        }
    }

    /// Drop cached artwork for a removed item.
    pub fn evict_logo(&mut self, item_id: &str) {
        self.logo_cache.evict(item_id);
    }

    /// Best-effort enrichment of classified file info: on any failure the
    /// existing data stays in place.
    pub async fn enrich_file_info(&self, file_info: &mut FileInfo, media_type: MediaType) {
        match self.fetch_arr_info().await {
            Ok(arr_info) => {
                let entry = match media_type {
                    MediaType::Movie => arr_info.movie,
                    MediaType::Series => arr_info.series,
                };
                if let Some(entry) = entry {
                    apply_arr_info(file_info, &entry);
                }
            }
            Err(err) => {
                warn!("Arr info lookup failed, keeping classified data: {}", err);
            }
        }
    }
}
