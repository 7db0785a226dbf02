//! Metadata resolver.
//!
//! Chooses a provider for every lookup, fails over to the alternate one
//! when the preferred provider has used up its daily budget, and records
//! each attempt on the shared usage tracker.

use crate::core::usage::ApiUsageTracker;
use crate::models::config::{Config, ProviderKind};
use crate::models::media::MediaDetails;
use crate::services::omdb::{OmdbClient, OmdbConfig};
use crate::services::tmdb::{TmdbClient, TmdbConfig};
use crate::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A source of media metadata.
pub trait MetadataProvider: Send + Sync {
    /// Which provider this is; also the usage tracker key.
    fn kind(&self) -> ProviderKind;

    /// Look up a title. `Ok(None)` means the provider had no match.
    fn search(
        &self,
        title: &str,
        year: Option<&str>,
        is_series: bool,
    ) -> impl Future<Output = Result<Option<MediaDetails>>> + Send;
}

/// The HTTP-backed providers.
#[derive(Debug, Clone)]
pub enum HttpProvider {
    Tmdb(TmdbClient),
    Omdb(OmdbClient),
}

impl MetadataProvider for HttpProvider {
    fn kind(&self) -> ProviderKind {
        match self {
            HttpProvider::Tmdb(_) => ProviderKind::Tmdb,
            HttpProvider::Omdb(_) => ProviderKind::Omdb,
        }
    }

    async fn search(&self, title: &str, year: Option<&str>, is_series: bool) -> Result<Option<MediaDetails>> {
        match self {
            HttpProvider::Tmdb(client) => client.lookup(title, year, is_series).await,
            HttpProvider::Omdb(client) => client.lookup(title, year, is_series).await,
        }
    }
}

/// Provider selection with daily-budget failover.
pub struct MetadataResolver<P> {
    providers: HashMap<ProviderKind, P>,
    primary: ProviderKind,
    usage: Arc<Mutex<ApiUsageTracker>>,
}

impl<P: MetadataProvider> MetadataResolver<P> {
    /// Create a resolver over `providers`, preferring `primary`.
    pub fn new(providers: Vec<P>, primary: ProviderKind, usage: Arc<Mutex<ApiUsageTracker>>) -> Self {
        let providers = providers.into_iter().map(|p| (p.kind(), p)).collect();
        Self {
            providers,
            primary,
            usage,
        }
    }

    pub fn primary(&self) -> ProviderKind {
        self.primary
    }

    /// Shared usage tracker.
    pub fn usage(&self) -> Arc<Mutex<ApiUsageTracker>> {
        self.usage.clone()
    }

    /// Pick the provider for the next call and reserve it against the
    /// provider's daily budget while the tracker is locked.
    async fn select_provider(&self) -> Result<ProviderKind> {
        let mut usage = self.usage.lock().await;

        let preferred = if self.providers.contains_key(&self.primary) {
            self.primary
        } else {
            self.primary.alternate()
        };
        if !self.providers.contains_key(&preferred) {
            return Err(crate::Error::UnknownProvider(self.primary.to_string()));
        }

        if usage.try_reserve(preferred.as_str()) {
            return Ok(preferred);
        }

        let alternate = preferred.alternate();
        if self.providers.contains_key(&alternate) && usage.try_reserve(alternate.as_str()) {
            tracing::warn!(
                "{} daily limit reached, switching to {}",
                preferred.as_str().to_uppercase(),
                alternate.as_str().to_uppercase()
            );
            return Ok(alternate);
        }

        tracing::error!("Daily API limits reached for all providers");
        Err(crate::Error::ApiLimitReached)
    }

    /// Resolve metadata for a parsed title.
    ///
    /// Exactly one call is counted per attempt, reserved before the request
    /// so concurrent lookups cannot overshoot the budget. It is recorded as
    /// successful when details came back, failed otherwise.
    pub async fn resolve(&self, title: &str, year: Option<&str>, is_series: bool) -> Result<Option<MediaDetails>> {
        let kind = self.select_provider().await?;
        let provider = self
            .providers
            .get(&kind)
            .ok_or_else(|| crate::Error::UnknownProvider(kind.to_string()))?;

        tracing::debug!("Looking up '{}' ({:?}) via {}", title, year, kind);
        let result = provider.search(title, year, is_series).await;

        let success = matches!(result, Ok(Some(_)));
        self.usage.lock().await.record_outcome(kind.as_str(), success);

        match result {
            Ok(found) => Ok(found),
            Err(e) => {
                tracing::error!("Error fetching {} info for {}: {}", kind, title, e);
                Err(crate::Error::Provider(e.to_string()))
            }
        }
    }
}

/// Build HTTP providers for every configured API key.
pub fn providers_from_config(config: &Config) -> Vec<HttpProvider> {
    let mut providers = Vec::new();
    if let Some(ref key) = config.tmdb.api_key {
        providers.push(HttpProvider::Tmdb(TmdbClient::new(TmdbConfig::new(key.clone()))));
    }
    if let Some(ref key) = config.omdb.api_key {
        providers.push(HttpProvider::Omdb(OmdbClient::new(OmdbConfig::new(key.clone()))));
    }
    providers
}

/// Apply configured daily limits to the tracker.
pub fn apply_configured_limits(config: &Config, usage: &mut ApiUsageTracker) {
    for (kind, provider) in [(ProviderKind::Tmdb, &config.tmdb), (ProviderKind::Omdb, &config.omdb)] {
        if let Some(limit) = provider.daily_limit {
            usage.set_limit(kind.as_str(), limit);
        }
    }
}
