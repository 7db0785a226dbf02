//! Error types for media shelf.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media shelf.
#[derive(Error, Debug)]
pub enum Error {
    // Preflight errors
    #[error("{0} API key not configured. Set {1} or add it to config.toml")]
    ApiKeyMissing(String, String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // Queue errors
    #[error("No files in queue to process")]
    EmptyQueue,

    #[error("No destination folder selected")]
    NoDestination,

    #[error("A queue run is already in progress")]
    RunInProgress,

    // Metadata provider errors
    #[error("Daily API limits reached for all providers")]
    ApiLimitReached,

    #[error("Unknown metadata provider: {0}")]
    UnknownProvider(String),

    #[error("Metadata lookup failed: {0}")]
    Provider(String),

    // Plan/Execute errors
    #[error("Invalid plan file: {0}")]
    InvalidPlanFile(String),

    #[error("Execute operation failed: {0}")]
    ExecuteError(String),

    // Settings errors
    #[error("Invalid setting {0}: {1}")]
    InvalidSetting(String, String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
