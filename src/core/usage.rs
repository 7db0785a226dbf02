//! API usage tracker.
//!
//! Keeps a per-provider daily call budget in `api_usage.json`. Day
//! rollover is detected lazily: every read or write first checks whether
//! the stored `last_reset` date is older than today, and if so archives
//! the previous day's count into the history.

use crate::models::usage::{ApiUsageCounter, DailyUsage, HISTORY_DAYS};
use crate::Result;
use chrono::{Duration, Local, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Providers tracked out of the box.
pub const DEFAULT_PROVIDERS: &[&str] = &["omdb", "tmdb"];

/// Usage file name inside the config directory.
pub const USAGE_FILE: &str = "api_usage.json";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current date.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Clock reading the local calendar date.
pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().date_naive())
}

/// Tracks API calls per provider against a daily limit.
pub struct ApiUsageTracker {
    path: Option<PathBuf>,
    counters: BTreeMap<String, ApiUsageCounter>,
    clock: Clock,
}

impl fmt::Debug for ApiUsageTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiUsageTracker")
            .field("path", &self.path)
            .field("counters", &self.counters)
            .finish()
    }
}

impl ApiUsageTracker {
    /// In-memory tracker with the default providers.
    pub fn in_memory(clock: Clock) -> Self {
        let today = (clock)().format(DATE_FORMAT).to_string();
        Self {
            path: None,
            counters: default_counters(&today),
            clock,
        }
    }

    /// Load usage from `path` using the system clock.
    pub fn load(path: &Path) -> Self {
        Self::load_with_clock(path, system_clock())
    }

    /// Load usage from `path`.
    ///
    /// A missing or corrupt file yields default counters for every
    /// default provider; the error is logged, not returned.
    pub fn load_with_clock(path: &Path, clock: Clock) -> Self {
        let today = (clock)().format(DATE_FORMAT).to_string();

        let mut counters = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(crate::Error::from)
                .and_then(|content| {
                    serde_json::from_str::<BTreeMap<String, ApiUsageCounter>>(&content)
                        .map_err(crate::Error::from)
                }) {
                Ok(counters) => counters,
                Err(e) => {
                    tracing::warn!("Failed to load API usage from {:?}: {}", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        for provider in DEFAULT_PROVIDERS {
            counters
                .entry(provider.to_string())
                .or_insert_with(|| ApiUsageCounter::new(&today));
        }

        Self {
            path: Some(path.to_path_buf()),
            counters,
            clock,
        }
    }

    /// Write all counters to the usage file.
    pub fn save(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.counters)?;
        std::fs::write(path, json)?;
        tracing::debug!("API usage saved to {:?}", path);
        Ok(())
    }

    fn save_logged(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("Failed to save API usage: {}", e);
        }
    }

    fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Archive yesterday's count for every provider whose day has ended.
    fn check_day_reset(&mut self) {
        let today = self.today();
        let today_str = today.format(DATE_FORMAT).to_string();
        let mut changed = false;

        for (provider, counter) in self.counters.iter_mut() {
            let last = NaiveDate::parse_from_str(&counter.last_reset, DATE_FORMAT).ok();
            if last.is_some_and(|d| d >= today) {
                continue;
            }

            tracing::info!(
                "New day for {}: archiving {} calls from {}",
                provider,
                counter.calls_today,
                counter.last_reset
            );
            if last.is_some() {
                counter
                    .daily_history
                    .insert(counter.last_reset.clone(), counter.calls_today);
            }
            while counter.daily_history.len() > HISTORY_DAYS {
                counter.daily_history.pop_first();
            }
            counter.calls_today = 0;
            counter.last_reset = today_str.clone();
            changed = true;
        }

        if changed {
            self.save_logged();
        }
    }

    fn counter_mut(&mut self, provider: &str) -> &mut ApiUsageCounter {
        let today = self.today().format(DATE_FORMAT).to_string();
        self.counters
            .entry(provider.to_string())
            .or_insert_with(|| ApiUsageCounter::new(&today))
    }

    /// Record one call attempt and persist.
    pub fn record_call(&mut self, provider: &str, success: bool) {
        self.check_day_reset();
        self.count_attempt(provider);
        self.record_outcome(provider, success);
    }

    /// Reserve one call against today's budget and persist.
    ///
    /// Returns `false`, counting nothing, when the limit is already
    /// reached. A reserved call is completed with [`Self::record_outcome`].
    pub fn try_reserve(&mut self, provider: &str) -> bool {
        self.check_day_reset();
        let counter = self.counter_mut(provider);
        if counter.calls_today >= counter.daily_limit {
            return false;
        }
        self.count_attempt(provider);
        self.save_logged();
        true
    }

    /// Record how a reserved call ended and persist.
    pub fn record_outcome(&mut self, provider: &str, success: bool) {
        let counter = self.counter_mut(provider);
        if success {
            counter.successful_calls += 1;
        } else {
            counter.failed_calls += 1;
        }
        tracing::debug!(
            "Recorded {} call for {} ({}/{} today)",
            if success { "successful" } else { "failed" },
            provider,
            counter.calls_today,
            counter.daily_limit
        );

        self.save_logged();
    }

    fn count_attempt(&mut self, provider: &str) {
        let counter = self.counter_mut(provider);
        counter.calls_today += 1;
        counter.total_calls += 1;
    }

    /// Set the daily limit for a provider and persist.
    pub fn set_limit(&mut self, provider: &str, limit: u32) {
        self.check_day_reset();
        self.counter_mut(provider).daily_limit = limit;
        tracing::info!("Daily limit for {} set to {}", provider, limit);
        self.save_logged();
    }

    /// Current counters for a provider.
    pub fn stats(&mut self, provider: &str) -> Option<ApiUsageCounter> {
        self.check_day_reset();
        self.counters.get(provider).cloned()
    }

    /// Current counters for every provider.
    pub fn all_stats(&mut self) -> BTreeMap<String, ApiUsageCounter> {
        self.check_day_reset();
        self.counters.clone()
    }

    /// Share of today's budget already used, in percent.
    pub fn usage_percentage(&mut self, provider: &str) -> f64 {
        self.check_day_reset();
        match self.counters.get(provider) {
            Some(c) if c.daily_limit > 0 => {
                f64::from(c.calls_today) / f64::from(c.daily_limit) * 100.0
            }
            Some(_) => 100.0,
            None => 0.0,
        }
    }

    /// Whether today's calls reached the daily limit.
    pub fn is_limit_reached(&mut self, provider: &str) -> bool {
        self.check_day_reset();
        self.counters
            .get(provider)
            .is_some_and(|c| c.calls_today >= c.daily_limit)
    }

    /// Calls per day for the last `days` days, oldest first.
    ///
    /// Today comes from `calls_today`; earlier days from the archive, with
    /// missing days filled in as zero.
    pub fn history(&mut self, provider: &str, days: u32) -> Vec<DailyUsage> {
        self.check_day_reset();
        let Some(counter) = self.counters.get(provider) else {
            return Vec::new();
        };

        let today = self.today();
        (0..days)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(i64::from(offset));
                let key = date.format(DATE_FORMAT).to_string();
                let calls = if offset == 0 {
                    counter.calls_today
                } else {
                    counter.daily_history.get(&key).copied().unwrap_or(0)
                };
                DailyUsage { date: key, calls }
            })
            .collect()
    }
}

fn default_counters(today: &str) -> BTreeMap<String, ApiUsageCounter> {
    DEFAULT_PROVIDERS
        .iter()
        .map(|p| (p.to_string(), ApiUsageCounter::new(today)))
        .collect()
}
