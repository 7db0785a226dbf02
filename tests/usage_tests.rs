//! Integration tests for API usage tracking and provider failover.
//!
//! Tests cover:
//! - Daily limit and failover between providers
//! - Day rollover with an injected clock
//! - History retention
//! - Persistence of the usage file

use chrono::{Duration, NaiveDate};
use media_shelf::core::usage::{ApiUsageTracker, Clock};
use media_shelf::models::config::ProviderKind;
use media_shelf::models::media::MediaDetails;
use media_shelf::models::usage::HISTORY_DAYS;
use media_shelf::services::resolver::{MetadataProvider, MetadataResolver};
use media_shelf::Result;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct NamedProvider(ProviderKind);

impl MetadataProvider for NamedProvider {
    fn kind(&self) -> ProviderKind {
        self.0
    }

    async fn search(&self, title: &str, _year: Option<&str>, _is_series: bool) -> Result<Option<MediaDetails>> {
        Ok(Some(MediaDetails {
            title: format!("{} via {}", title, self.0),
            ..Default::default()
        }))
    }
}

struct SlowProvider(ProviderKind);

impl MetadataProvider for SlowProvider {
    fn kind(&self) -> ProviderKind {
        self.0
    }

    async fn search(&self, title: &str, _year: Option<&str>, _is_series: bool) -> Result<Option<MediaDetails>> {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        Ok(Some(MediaDetails {
            title: title.to_string(),
            ..Default::default()
        }))
    }
}

fn clock_at(date: NaiveDate) -> (Clock, Arc<Mutex<NaiveDate>>) {
    let current = Arc::new(Mutex::new(date));
    let handle = current.clone();
    let clock: Clock = Arc::new(move || *handle.lock().unwrap());
    (clock, current)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ========== FAILOVER TESTS ==========

#[tokio::test]
async fn test_limit_triggers_failover() {
    let (clock, _) = clock_at(day(2024, 6, 1));
    let usage = Arc::new(tokio::sync::Mutex::new(ApiUsageTracker::in_memory(clock)));
    let resolver = MetadataResolver::new(
        vec![NamedProvider(ProviderKind::Omdb), NamedProvider(ProviderKind::Tmdb)],
        ProviderKind::Omdb,
        usage.clone(),
    );

    for _ in 0..1000 {
        let found = resolver.resolve("Up", None, false).await.unwrap().unwrap();
        assert_eq!(found.title, "Up via omdb");
    }
    assert!(usage.lock().await.is_limit_reached("omdb"));

    let found = resolver.resolve("Up", None, false).await.unwrap().unwrap();
    assert_eq!(found.title, "Up via tmdb");

    let mut tracker = usage.lock().await;
    assert_eq!(tracker.stats("omdb").unwrap().calls_today, 1000);
    assert_eq!(tracker.stats("omdb").unwrap().successful_calls, 1000);
    assert_eq!(tracker.stats("tmdb").unwrap().calls_today, 1);
}

#[tokio::test]
async fn test_all_providers_exhausted() {
    let (clock, _) = clock_at(day(2024, 6, 1));
    let mut tracker = ApiUsageTracker::in_memory(clock);
    tracker.set_limit("omdb", 1);
    tracker.set_limit("tmdb", 1);
    let usage = Arc::new(tokio::sync::Mutex::new(tracker));
    let resolver = MetadataResolver::new(
        vec![NamedProvider(ProviderKind::Omdb), NamedProvider(ProviderKind::Tmdb)],
        ProviderKind::Tmdb,
        usage,
    );

    assert!(resolver.resolve("A", None, false).await.is_ok());
    assert!(resolver.resolve("B", None, false).await.is_ok());
    assert!(matches!(
        resolver.resolve("C", None, false).await,
        Err(media_shelf::Error::ApiLimitReached)
    ));
}

#[tokio::test]
async fn test_concurrent_lookups_stay_within_limit() {
    let (clock, _) = clock_at(day(2024, 6, 1));
    let mut tracker = ApiUsageTracker::in_memory(clock);
    tracker.set_limit("omdb", 2);
    tracker.set_limit("tmdb", 1);
    let usage = Arc::new(tokio::sync::Mutex::new(tracker));
    let resolver = MetadataResolver::new(
        vec![SlowProvider(ProviderKind::Omdb), SlowProvider(ProviderKind::Tmdb)],
        ProviderKind::Omdb,
        usage.clone(),
    );

    let results =
        futures::future::join_all((0..5).map(|_| resolver.resolve("Up", None, false))).await;

    let found = results.iter().filter(|r| matches!(r, Ok(Some(_)))).count();
    let exhausted = results
        .iter()
        .filter(|r| matches!(r, Err(media_shelf::Error::ApiLimitReached)))
        .count();
    assert_eq!(found, 3);
    assert_eq!(exhausted, 2);

    let mut tracker = usage.lock().await;
    let omdb = tracker.stats("omdb").unwrap();
    assert_eq!(omdb.calls_today, 2);
    assert_eq!(omdb.successful_calls, 2);
    assert_eq!(tracker.stats("tmdb").unwrap().calls_today, 1);
}

// ========== ROLLOVER TESTS ==========

#[test]
fn test_day_rollover_archives_calls() {
    let (clock, now) = clock_at(day(2024, 6, 1));
    let mut tracker = ApiUsageTracker::in_memory(clock);
    tracker.set_limit("tmdb", 3);
    for _ in 0..3 {
        tracker.record_call("tmdb", true);
    }
    assert!(tracker.is_limit_reached("tmdb"));

    *now.lock().unwrap() = day(2024, 6, 2);

    assert!(!tracker.is_limit_reached("tmdb"));
    let stats = tracker.stats("tmdb").unwrap();
    assert_eq!(stats.calls_today, 0);
    assert_eq!(stats.total_calls, 3);
    assert_eq!(stats.last_reset, "2024-06-02");
    assert_eq!(stats.daily_history.get("2024-06-01"), Some(&3));
}

#[test]
fn test_history_is_bounded() {
    let start = day(2024, 1, 1);
    let (clock, now) = clock_at(start);
    let mut tracker = ApiUsageTracker::in_memory(clock);

    for offset in 0..45 {
        *now.lock().unwrap() = start + Duration::days(offset);
        tracker.record_call("omdb", offset % 2 == 0);
    }

    let stats = tracker.stats("omdb").unwrap();
    assert_eq!(stats.daily_history.len(), HISTORY_DAYS);
    assert!(!stats.daily_history.contains_key("2024-01-01"));
    assert_eq!(stats.daily_history.keys().next().map(String::as_str), Some("2024-01-15"));
    assert_eq!(stats.total_calls, 45);

    let history = tracker.history("omdb", 7);
    assert_eq!(history.len(), 7);
    assert_eq!(history.last().unwrap().date, "2024-02-14");
    assert!(history.iter().all(|d| d.calls == 1));
}

// ========== PERSISTENCE TESTS ==========

#[test]
fn test_usage_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("api_usage.json");
    let (clock, _) = clock_at(day(2024, 6, 1));

    let mut tracker = ApiUsageTracker::load_with_clock(&path, clock.clone());
    tracker.set_limit("omdb", 250);
    tracker.record_call("omdb", false);

    let mut reloaded = ApiUsageTracker::load_with_clock(&path, clock);
    let stats = reloaded.stats("omdb").unwrap();
    assert_eq!(stats.daily_limit, 250);
    assert_eq!(stats.failed_calls, 1);
    assert!((reloaded.usage_percentage("omdb") - 0.4).abs() < 1e-9);
}
