//! OMDb API preflight check.

use super::CheckResult;
use crate::models::config::ProviderConfig;
use crate::services::omdb::{OmdbClient, OmdbConfig};

/// Check the OMDb key, if one is configured.
pub async fn check(config: &ProviderConfig) -> Option<CheckResult> {
    let key = config.api_key.as_ref()?;
    let client = OmdbClient::new(OmdbConfig::new(key.clone()));

    Some(match client.verify_api_key().await {
        Ok(true) => CheckResult::ok("OMDb API", "connected"),
        Ok(false) => CheckResult::fail(
            "OMDb API",
            "invalid API key",
            "Check your OMDB_API_KEY environment variable",
        ),
        Err(_) => CheckResult::fail(
            "OMDb API",
            "connection failed",
            "Check your network connection",
        ),
    })
}
