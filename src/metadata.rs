use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the provider API.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Menu choice: `1` is a movie, `2` a TV show.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "1" => Some(MediaKind::Movie),
            "2" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

/// Canonical title, release year and id returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    pub title: String,
    /// Four-digit year, or empty when the provider had no usable date.
    pub year: String,
    pub id: u64,
}

/// Raw provider body. Movies fill `title`/`release_date`, shows fill
/// `name`/`first_air_date`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub first_air_date: String,
    pub id: u64,
}

impl TmdbDetails {
    pub fn into_descriptor(self, kind: MediaKind) -> MediaDescriptor {
        let (title, date) = match kind {
            MediaKind::Movie => (self.title, self.release_date),
            MediaKind::Tv => (self.name, self.first_air_date),
        };
        MediaDescriptor {
            title,
            year: year_from_date(&date),
            id: self.id,
        }
    }
}

/// Year of a `YYYY-MM-DD` date; empty on an empty or malformed date.
pub fn year_from_date(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.year().to_string())
        .unwrap_or_default()
}

/// Looks up a title by numeric id.
#[allow(async_fn_in_trait)]
pub trait MetadataProvider {
    async fn lookup(&self, kind: MediaKind, id: u64, api_key: &str) -> Result<MediaDescriptor, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub language: String,
    pub timeout: Duration,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.tmdb.org/3".to_string(),
            language: "zh-CN".to_string(),
            timeout: Duration::from_secs(10),
            max_attempts: 2,
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl TmdbClient {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(ProviderError::Request)?;
        Ok(Self { client, settings })
    }

    pub fn details_url(&self, kind: MediaKind, id: u64) -> String {
        format!(
            "{}/{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            kind.as_str(),
            id
        )
    }

    async fn fetch_once(&self, url: &str, api_key: &str) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self
            .client
            .get(url)
            .query(&[("api_key", api_key), ("language", self.settings.language.as_str())])
            .header("accept", "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

impl MetadataProvider for TmdbClient {
    async fn lookup(&self, kind: MediaKind, id: u64, api_key: &str) -> Result<MediaDescriptor, ProviderError> {
        let url = self.details_url(kind, id);
        let attempts = self.settings.max_attempts.max(1);

        let mut attempt = 1;
        let (status, body) = loop {
            info!(%url, attempt, "requesting metadata");
            match self.fetch_once(&url, api_key).await {
                Ok((status, _)) if status.is_server_error() && attempt < attempts => {
                    warn!(%status, attempt, "provider returned server error, retrying");
                }
                Ok(result) => break result,
                Err(err) if is_transient(&err) && attempt < attempts => {
                    warn!(error = %err, attempt, "provider request failed, retrying");
                }
                Err(err) => return Err(ProviderError::Request(err)),
            }
            attempt += 1;
            tokio::time::sleep(self.settings.retry_delay).await;
        };

        if status != StatusCode::OK {
            return Err(ProviderError::Status { status: status.as_u16(), body });
        }

        let details: TmdbDetails =
            serde_json::from_str(&body).map_err(|source| ProviderError::Decode { source, body })?;
        Ok(details.into_descriptor(kind))
    }
}
