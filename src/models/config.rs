//! Configuration model.

use super::plan::OperationKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TMDB configuration.
    pub tmdb: ProviderConfig,
    /// OMDb configuration.
    pub omdb: ProviderConfig,
}

/// Metadata provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key.
    pub api_key: Option<String>,
    /// Daily call limit override.
    pub daily_limit: Option<u32>,
}

impl Config {
    /// Apply `TMDB_API_KEY` / `OMDB_API_KEY` from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OMDB_API_KEY") {
            self.omdb.api_key = Some(key);
        }
        self
    }
}

/// Metadata provider identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Tmdb,
    #[default]
    Omdb,
}

impl ProviderKind {
    /// Key used in the usage file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Tmdb => "tmdb",
            ProviderKind::Omdb => "omdb",
        }
    }

    /// The other provider.
    pub fn alternate(&self) -> ProviderKind {
        match self {
            ProviderKind::Tmdb => ProviderKind::Omdb,
            ProviderKind::Omdb => ProviderKind::Tmdb,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "tmdb" => Ok(ProviderKind::Tmdb),
            "omdb" => Ok(ProviderKind::Omdb),
            other => Err(crate::Error::UnknownProvider(other.to_string())),
        }
    }
}

/// Secondary sort key below the audience/type folders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Genre,
    Type,
    Year,
}

impl std::str::FromStr for SortKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "genre" => Ok(SortKey::Genre),
            "type" => Ok(SortKey::Type),
            "year" => Ok(SortKey::Year),
            other => Err(crate::Error::InvalidSetting(
                "sort_by".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// File mover settings.
///
/// Handed to the queue coordinator as a whole on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverSettings {
    /// Destination folder for queued files.
    pub destination_folder: Option<PathBuf>,
    /// Copy or move.
    pub operation: OperationKind,
    /// Rewrite file names with the filename parser.
    pub rename_enabled: bool,
    /// Copy directories recursively.
    pub recursive: bool,
    /// Verify checksums of cross-device moves.
    pub verify_checksum: bool,
}

impl Default for MoverSettings {
    fn default() -> Self {
        Self {
            destination_folder: None,
            operation: OperationKind::Copy,
            rename_enabled: false,
            recursive: true,
            verify_checksum: true,
        }
    }
}

/// Media sorter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterSettings {
    /// Root of the sorted library.
    pub base_folder: Option<PathBuf>,
    /// Provider tried first.
    pub primary_provider: ProviderKind,
    /// Secondary sort key.
    pub sort_by: SortKey,
    pub tv_folder: String,
    pub movie_folder: String,
    pub unknown_folder: String,
    pub create_audience_folders: bool,
    pub create_type_folders: bool,
    pub create_genre_folders: bool,
    /// Only log the plan.
    pub simulate: bool,
    /// Concurrent metadata lookups.
    pub max_concurrent_lookups: usize,
}

impl Default for SorterSettings {
    fn default() -> Self {
        Self {
            base_folder: None,
            primary_provider: ProviderKind::Omdb,
            sort_by: SortKey::Genre,
            tv_folder: "TV Shows".to_string(),
            movie_folder: "Movies".to_string(),
            unknown_folder: "Unknown".to_string(),
            create_audience_folders: true,
            create_type_folders: true,
            create_genre_folders: true,
            simulate: true,
            max_concurrent_lookups: 5,
        }
    }
}

/// Filename editor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Keep the original extension when renaming.
    pub preserve_extension: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            preserve_extension: true,
        }
    }
}

/// Get the default configuration directory path.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("media_shelf")
}

/// Load configuration from `config.toml` in `config_dir`.
///
/// A missing or unreadable file yields the default configuration.
pub fn load_config(config_dir: &Path) -> Config {
    let config_path = config_dir.join("config.toml");

    let config = if config_path.exists() {
        match std::fs::read_to_string(&config_path)
            .map_err(crate::Error::from)
            .and_then(|content| toml::from_str::<Config>(&content).map_err(crate::Error::from))
        {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config {:?}: {}", config_path, e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    config.with_env_overrides()
}
