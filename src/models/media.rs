//! Media-related data models.

use serde::{Deserialize, Serialize};

/// Media kind enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Tv => write!(f, "tv"),
            MediaKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Parsed identity of a media file.
///
/// Produced by the filename parser. Season and episode are either both set
/// or both absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Cleaned, title-cased title.
    pub title: String,
    /// Four digit release year.
    pub year: Option<String>,
    /// Season number (series only).
    pub season: Option<u32>,
    /// Episode number (series only).
    pub episode: Option<u32>,
}

impl MediaInfo {
    /// Title-only record.
    pub fn titled<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Movie record.
    pub fn movie<S: Into<String>, Y: Into<String>>(title: S, year: Y) -> Self {
        Self {
            title: title.into(),
            year: Some(year.into()),
            ..Default::default()
        }
    }

    /// Series episode record.
    pub fn episode<S: Into<String>>(title: S, season: u32, episode: u32) -> Self {
        Self {
            title: title.into(),
            season: Some(season),
            episode: Some(episode),
            ..Default::default()
        }
    }

    /// Whether season and episode markers were found.
    pub fn is_series(&self) -> bool {
        self.season.is_some() && self.episode.is_some()
    }

    /// Kind implied by the parsed fields.
    pub fn kind(&self) -> MediaKind {
        if self.is_series() {
            MediaKind::Tv
        } else if self.year.is_some() {
            MediaKind::Movie
        } else {
            MediaKind::Unknown
        }
    }
}

/// Coarse audience classification used as the top sort folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudienceCategory {
    Kids,
    Family,
    Adult,
}

impl AudienceCategory {
    /// Folder name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceCategory::Kids => "Kids",
            AudienceCategory::Family => "Family",
            AudienceCategory::Adult => "Adult",
        }
    }
}

impl std::fmt::Display for AudienceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const KIDS_RATINGS: &[&str] = &["F"];
const FAMILY_RATINGS: &[&str] = &["G", "TV-Y", "TV-Y7", "TV-G", "PG", "TV-PG"];
const ADULT_RATINGS: &[&str] = &["PG-13", "R", "NC-17", "TV-MA", "TV-14"];

const KIDS_GENRES: &[&str] = &["Animation", "Family", "Children"];
const ADULT_GENRES: &[&str] = &["Horror", "Thriller", "Crime", "War"];

/// Resolved metadata for a media file.
///
/// This is also the on-disk shape of a metadata cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDetails {
    /// Canonical title from the provider.
    pub title: String,
    /// Release (or first air) year.
    #[serde(default)]
    pub year: Option<String>,
    /// Genres in provider order; the first one is the primary genre.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Movie, TV or unknown.
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    /// Content rating (e.g. "PG-13", "TV-MA").
    #[serde(default)]
    pub content_rating: Option<String>,
}

impl MediaDetails {
    /// Primary genre, if any.
    pub fn primary_genre(&self) -> Option<&str> {
        self.genres.first().map(String::as_str)
    }

    /// Determine the audience category.
    ///
    /// The content rating wins over genres; unknown content is treated as Adult.
    pub fn audience_category(&self) -> AudienceCategory {
        if let Some(ref rating) = self.content_rating {
            let rating = rating.trim();
            if KIDS_RATINGS.contains(&rating) {
                return AudienceCategory::Kids;
            }
            if FAMILY_RATINGS.contains(&rating) {
                return AudienceCategory::Family;
            }
            if ADULT_RATINGS.contains(&rating) {
                return AudienceCategory::Adult;
            }
        }

        for genre in &self.genres {
            if KIDS_GENRES.contains(&genre.as_str()) {
                return AudienceCategory::Kids;
            }
            if ADULT_GENRES.contains(&genre.as_str()) {
                return AudienceCategory::Adult;
            }
        }

        AudienceCategory::Adult
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(rating: Option<&str>, genres: &[&str]) -> MediaDetails {
        MediaDetails {
            title: "Test".to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            content_rating: rating.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_media_info_kind() {
        assert_eq!(MediaInfo::episode("Show", 1, 2).kind(), MediaKind::Tv);
        assert_eq!(MediaInfo::movie("Film", "1999").kind(), MediaKind::Movie);
        assert_eq!(MediaInfo::titled("Clip").kind(), MediaKind::Unknown);
    }

    #[test]
    fn test_rating_takes_precedence_over_genres() {
        assert_eq!(
            details(Some("PG"), &["Horror"]).audience_category(),
            AudienceCategory::Family
        );
        assert_eq!(
            details(Some("R"), &["Animation"]).audience_category(),
            AudienceCategory::Adult
        );
        assert_eq!(details(Some("F"), &[]).audience_category(), AudienceCategory::Kids);
    }

    #[test]
    fn test_genre_fallback_uses_first_informative_genre() {
        assert_eq!(
            details(None, &["Comedy", "Animation", "Horror"]).audience_category(),
            AudienceCategory::Kids
        );
        assert_eq!(
            details(Some("Not Rated"), &["Crime", "Family"]).audience_category(),
            AudienceCategory::Adult
        );
    }

    #[test]
    fn test_uninformative_details_default_to_adult() {
        assert_eq!(details(None, &[]).audience_category(), AudienceCategory::Adult);
        assert_eq!(
            details(Some("N/A"), &["Comedy"]).audience_category(),
            AudienceCategory::Adult
        );
    }

    #[test]
    fn test_cache_entry_shape() {
        let json = r#"{"title":"Up","year":"2009","genres":["Animation"],"type":"movie","content_rating":"PG"}"#;
        let parsed: MediaDetails = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, MediaKind::Movie);
        assert_eq!(parsed.primary_genre(), Some("Animation"));

        let sparse: MediaDetails = serde_json::from_str(r#"{"title":"X","type":"series"}"#).unwrap();
        assert_eq!(sparse.kind, MediaKind::Unknown);
        assert!(sparse.genres.is_empty());
    }
}
