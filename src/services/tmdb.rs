//! TMDB API client.

use crate::models::media::{MediaDetails, MediaKind};
use crate::Result;
use serde::Deserialize;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Country whose certification is used as the content rating.
const RATING_COUNTRY: &str = "US";

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API key or Bearer token (JWT)
    pub api_key: String,
    pub language: String,
    /// Whether to use Bearer token authentication (API v4 style)
    pub use_bearer: bool,
    pub base_url: String,
}

impl TmdbConfig {
    /// Create config from an API key.
    /// Supports both API key (v3) and Bearer token (v4) formats.
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");

        Self {
            api_key,
            language: "en-US".to_string(),
            use_bearer,
            base_url: TMDB_BASE_URL.to_string(),
        }
    }
}

/// TMDB API client.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
}

/// Search result page.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub results: Vec<SearchItem>,
}

/// Movie or TV search item.
#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
}

/// Movie or TV details with appended ratings.
#[derive(Debug, Deserialize)]
pub struct Details {
    pub id: u64,
    /// Movie title.
    pub title: Option<String>,
    /// TV show name.
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub release_dates: Option<ReleaseDates>,
    pub content_ratings: Option<ContentRatings>,
}

/// Genre.
#[derive(Debug, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Release dates container.
#[derive(Debug, Deserialize)]
pub struct ReleaseDates {
    pub results: Vec<ReleaseDateCountry>,
}

/// Release date by country.
#[derive(Debug, Deserialize)]
pub struct ReleaseDateCountry {
    pub iso_3166_1: String,
    pub release_dates: Vec<ReleaseDate>,
}

/// Individual release date.
#[derive(Debug, Deserialize)]
pub struct ReleaseDate {
    pub certification: Option<String>,
    #[serde(rename = "type")]
    pub release_type: Option<u8>,
}

/// TV content ratings container.
#[derive(Debug, Deserialize)]
pub struct ContentRatings {
    pub results: Vec<ContentRating>,
}

/// TV content rating by country.
#[derive(Debug, Deserialize)]
pub struct ContentRating {
    pub iso_3166_1: String,
    pub rating: Option<String>,
}

/// Search endpoint kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
    Movie,
    Tv,
}

impl SearchKind {
    fn path(&self) -> &'static str {
        match self {
            SearchKind::Movie => "movie",
            SearchKind::Tv => "tv",
        }
    }

    fn year_param(&self) -> &'static str {
        match self {
            SearchKind::Movie => "year",
            SearchKind::Tv => "first_air_date_year",
        }
    }

    fn other(&self) -> SearchKind {
        match self {
            SearchKind::Movie => SearchKind::Tv,
            SearchKind::Tv => SearchKind::Movie,
        }
    }
}

impl Details {
    /// Convert into media details for a search kind.
    fn into_media_details(self, kind: SearchKind) -> MediaDetails {
        let (title, date, media_kind) = match kind {
            SearchKind::Movie => (self.title.or(self.name), self.release_date, MediaKind::Movie),
            SearchKind::Tv => (self.name.or(self.title), self.first_air_date, MediaKind::Tv),
        };

        let year = date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
            .map(str::to_string);

        let content_rating = match kind {
            SearchKind::Movie => self.release_dates.and_then(|rd| {
                rd.results
                    .into_iter()
                    .find(|c| c.iso_3166_1 == RATING_COUNTRY)
                    .and_then(|c| {
                        c.release_dates
                            .into_iter()
                            .filter_map(|r| r.certification)
                            .find(|cert| !cert.is_empty())
                    })
            }),
            SearchKind::Tv => self.content_ratings.and_then(|cr| {
                cr.results
                    .into_iter()
                    .find(|c| c.iso_3166_1 == RATING_COUNTRY)
                    .and_then(|c| c.rating)
                    .filter(|r| !r.is_empty())
            }),
        };

        MediaDetails {
            title: title.unwrap_or_else(|| "Unknown".to_string()),
            year,
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            kind: media_kind,
            content_rating,
        }
    }
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.config.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.config.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        if self.config.use_bearer {
            format!(
                "{}/{}?language={}{}",
                self.config.base_url, path, self.config.language, extra_params
            )
        } else {
            format!(
                "{}/{}?api_key={}&language={}{}",
                self.config.base_url,
                path,
                self.config.api_key,
                self.config.language,
                extra_params
            )
        }
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = if self.config.use_bearer {
            format!("{}/authentication", self.config.base_url)
        } else {
            format!(
                "{}/authentication?api_key={}",
                self.config.base_url, self.config.api_key
            )
        };

        match self.build_request(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn search_kind(&self, kind: SearchKind, query: &str, year: Option<&str>) -> Result<Vec<SearchItem>> {
        let year_param = year
            .map(|y| format!("&{}={}", kind.year_param(), y))
            .unwrap_or_default();
        let url = self.build_url(
            &format!("search/{}", kind.path()),
            &format!("&query={}{}", urlencoding::encode(query), year_param),
        );

        let resp = self.build_request(&url).send().await?;
        if !resp.status().is_success() {
            tracing::debug!("TMDB search/{} returned {}", kind.path(), resp.status());
            return Ok(Vec::new());
        }
        let result: SearchResult = resp.json().await?;
        Ok(result.results)
    }

    async fn details(&self, kind: SearchKind, id: u64) -> Result<Option<Details>> {
        let url = self.build_url(
            &format!("{}/{}", kind.path(), id),
            "&append_to_response=release_dates,content_ratings",
        );

        let resp = self.build_request(&url).send().await?;
        if !resp.status().is_success() {
            tracing::warn!("TMDB {}/{} returned {}", kind.path(), id, resp.status());
            return Ok(None);
        }
        Ok(Some(resp.json().await?))
    }

    /// Look up a title, retrying as the other kind when nothing is found.
    pub async fn lookup(&self, title: &str, year: Option<&str>, is_series: bool) -> Result<Option<MediaDetails>> {
        let mut kind = if is_series { SearchKind::Tv } else { SearchKind::Movie };

        let mut results = self.search_kind(kind, title, year).await?;
        if results.is_empty() {
            kind = kind.other();
            tracing::debug!("No TMDB results for '{}', retrying as {}", title, kind.path());
            results = self.search_kind(kind, title, year).await?;
        }

        let Some(first) = results.first() else {
            return Ok(None);
        };
        tracing::debug!(
            "TMDB match for '{}': {} (id {})",
            title,
            first.title.as_deref().or(first.name.as_deref()).unwrap_or("?"),
            first.id
        );

        Ok(self
            .details(kind, first.id)
            .await?
            .map(|d| d.into_media_details(kind)))
    }
}
