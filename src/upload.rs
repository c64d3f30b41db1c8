use crate::config::Config;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Upload rejected with status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Not a valid magnet link")]
    InvalidMagnet,
}

/// A magnet URI is accepted when it carries the magnet scheme and a BitTorrent
/// info-hash topic. Everything stricter is the server's call.
pub fn is_valid_magnet(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.starts_with("magnet:?")
        && (trimmed.contains("xt=urn:btih:") || trimmed.contains("xt=urn:btmh:"))
}

/// Submits new acquisitions to the server, either as an uploaded .torrent
/// file or as a magnet link.
pub struct UploadClient {
    client: Client,
    config: Config,
}

impl UploadClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Upload a .torrent file body. The filename travels with the part so the
    /// server can name the job after it.
    pub async fn upload_torrent(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), UploadError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/x-bittorrent")?;
        let form = Form::new().part("torrentFile", part);

        let response = self
            .client
            .post(self.config.api_url("/api/torrent/upload"))
            .multipart(form)
            .send()
            .await?;

        self.check_response(response).await?;
        info!("Uploaded torrent file '{}'", file_name);
        Ok(())
    }

    /// Submit a magnet link. Obviously malformed input is rejected before any
    /// network traffic.
    pub async fn submit_magnet(&self, magnet_url: &str) -> Result<(), UploadError> {
        if !is_valid_magnet(magnet_url) {
            return Err(UploadError::InvalidMagnet);
        }

        let response = self
            .client
            .post(self.config.api_url("/api/torrent/magnet"))
            .json(&serde_json::json!({ "magnetUrl": magnet_url.trim() }))
            .send()
            .await?;

        self.check_response(response).await?;
        info!("Submitted magnet link");
        Ok(())
    }

    async fn check_response(&self, response: reqwest::Response) -> Result<(), UploadError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(UploadError::Rejected { status, body })
    }
}
