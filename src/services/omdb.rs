//! OMDb API client.

use crate::models::media::{MediaDetails, MediaKind};
use crate::Result;
use serde::Deserialize;

const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// Placeholder OMDb uses for missing fields.
const NOT_AVAILABLE: &str = "N/A";

/// OMDb client configuration.
#[derive(Debug, Clone)]
pub struct OmdbConfig {
    pub api_key: String,
    pub base_url: String,
}

impl OmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OMDB_BASE_URL.to_string(),
        }
    }
}

/// Title lookup response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TitleResponse {
    /// "True" or "False".
    pub response: String,
    pub title: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub rated: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub error: Option<String>,
}

impl TitleResponse {
    fn found(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    fn into_media_details(self) -> MediaDetails {
        // Series report a range such as "2005–2013".
        let year = self
            .year
            .as_deref()
            .and_then(|y| y.split(['–', '-']).next())
            .map(str::trim)
            .filter(|y| !y.is_empty() && *y != NOT_AVAILABLE)
            .map(str::to_string);

        let genres = self
            .genre
            .as_deref()
            .filter(|g| *g != NOT_AVAILABLE)
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let kind = match self.kind.as_deref() {
            Some("series") => MediaKind::Tv,
            _ => MediaKind::Movie,
        };

        MediaDetails {
            title: self.title.unwrap_or_else(|| "Unknown".to_string()),
            year,
            genres,
            kind,
            content_rating: self.rated.filter(|r| !r.is_empty() && r != NOT_AVAILABLE),
        }
    }
}

/// OMDb API client.
#[derive(Debug, Clone)]
pub struct OmdbClient {
    config: OmdbConfig,
    client: reqwest::Client,
}

impl OmdbClient {
    pub fn new(config: OmdbConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    fn build_url(&self, title: &str, year: Option<&str>, kind: Option<&str>) -> String {
        let mut url = format!(
            "{}?t={}&apikey={}",
            self.config.base_url,
            urlencoding::encode(title),
            self.config.api_key
        );
        if let Some(year) = year {
            url.push_str(&format!("&y={}", year));
        }
        if let Some(kind) = kind {
            url.push_str(&format!("&type={}", kind));
        }
        url
    }

    async fn fetch(&self, url: &str) -> Result<Option<TitleResponse>> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            tracing::warn!("OMDb returned {}", resp.status());
            return Ok(None);
        }
        let body: TitleResponse = resp.json().await?;
        if body.found() {
            Ok(Some(body))
        } else {
            tracing::debug!("OMDb: {}", body.error.as_deref().unwrap_or("not found"));
            Ok(None)
        }
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = self.build_url("The Matrix", None, None);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Look up a title, retrying without the type filter when nothing is found.
    pub async fn lookup(&self, title: &str, year: Option<&str>, is_series: bool) -> Result<Option<MediaDetails>> {
        let kind = if is_series { "series" } else { "movie" };

        if let Some(found) = self.fetch(&self.build_url(title, year, Some(kind))).await? {
            return Ok(Some(found.into_media_details()));
        }

        tracing::debug!("No OMDb {} match for '{}', retrying without type", kind, title);
        Ok(self
            .fetch(&self.build_url(title, year, None))
            .await?
            .map(TitleResponse::into_media_details))
    }
}
