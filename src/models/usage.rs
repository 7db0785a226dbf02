//! API usage data model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default daily call budget for a provider.
pub const DEFAULT_DAILY_LIMIT: u32 = 1000;

/// Maximum number of archived days kept per provider.
pub const HISTORY_DAYS: usize = 30;

/// Usage counters for a single provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUsageCounter {
    /// Calls allowed per calendar day.
    pub daily_limit: u32,
    /// Calls recorded since `last_reset`.
    pub calls_today: u32,
    /// Day the counter was last reset (YYYY-MM-DD).
    pub last_reset: String,
    /// Lifetime call count.
    pub total_calls: u64,
    /// Lifetime successful calls.
    pub successful_calls: u64,
    /// Lifetime failed calls.
    pub failed_calls: u64,
    /// Archived daily counts, keyed by date.
    #[serde(default)]
    pub daily_history: BTreeMap<String, u32>,
}

impl ApiUsageCounter {
    /// Fresh counter reset on `today`.
    pub fn new(today: &str) -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            calls_today: 0,
            last_reset: today.to_string(),
            total_calls: 0,
            successful_calls: 0,
            failed_calls: 0,
            daily_history: BTreeMap::new(),
        }
    }
}

/// A single day of usage for charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: String,
    pub calls: u32,
}
