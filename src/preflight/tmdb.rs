//! TMDB API preflight check.

use super::CheckResult;
use crate::models::config::ProviderConfig;
use crate::services::tmdb::{TmdbClient, TmdbConfig};

/// Check the TMDB key, if one is configured.
pub async fn check(config: &ProviderConfig) -> Option<CheckResult> {
    let key = config.api_key.as_ref()?;
    let client = TmdbClient::new(TmdbConfig::new(key.clone()));

    Some(match client.verify_api_key().await {
        Ok(true) => CheckResult::ok("TMDB API", "connected"),
        Ok(false) => CheckResult::fail(
            "TMDB API",
            "invalid API key",
            "Check your TMDB_API_KEY environment variable",
        ),
        Err(_) => CheckResult::fail(
            "TMDB API",
            "connection failed",
            "Check your network connection",
        ),
    })
}
