//! Integration tests for file I/O operations.
//!
//! Tests cover:
//! - Sort plan save/load
//! - Metadata cache file format
//! - Module settings persistence

use media_shelf::core::cache::MetadataCache;
use media_shelf::core::modules::{ModuleRegistry, FILE_MOVER, MODULE_CONFIG_FILE};
use media_shelf::core::sorter::{load_plan, save_plan, PLAN_VERSION};
use media_shelf::models::config::MoverSettings;
use media_shelf::models::media::{AudienceCategory, MediaDetails, MediaKind};
use media_shelf::models::plan::{OperationKind, SortItem, SortPlan, UnknownItem};
use std::path::PathBuf;
use tempfile::TempDir;

fn up() -> MediaDetails {
    MediaDetails {
        title: "Up".to_string(),
        year: Some("2009".to_string()),
        genres: vec!["Animation".to_string()],
        kind: MediaKind::Movie,
        content_rating: Some("PG".to_string()),
    }
}

// ========== PLAN I/O TESTS ==========

#[test]
fn test_save_and_load_plan() {
    let plan = SortPlan {
        version: PLAN_VERSION.to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        base_folder: PathBuf::from("/library"),
        operation: OperationKind::Move,
        simulate: true,
        items: vec![SortItem {
            id: "item-1".to_string(),
            source: PathBuf::from("/in/Up.2009.mkv"),
            destination: PathBuf::from("/library/Family/Movies/Animation/Up (2009).mkv"),
            details: up(),
            audience: AudienceCategory::Family,
        }],
        unknown: vec![UnknownItem {
            source: PathBuf::from("/in/clip.mkv"),
            reason: "no media info".to_string(),
        }],
    };

    let temp_dir = TempDir::new().unwrap();
    let plan_path = temp_dir.path().join("test_plan.json");

    // Save
    save_plan(&plan, &plan_path).unwrap();
    assert!(plan_path.exists());

    // Load
    let loaded = load_plan(&plan_path).unwrap();
    assert_eq!(loaded.version, plan.version);
    assert_eq!(loaded.operation, OperationKind::Move);
    assert_eq!(loaded.items[0].details, up());
    assert_eq!(loaded.unknown[0].reason, "no media info");
}

#[test]
fn test_load_nonexistent_plan() {
    let result = load_plan(&PathBuf::from("/nonexistent/plan.json"));
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_plan() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("plan.json");
    std::fs::write(&path, "{\"version\": 1}").unwrap();

    let result = load_plan(&path);
    assert!(matches!(result, Err(media_shelf::Error::InvalidPlanFile(_))));
}

#[test]
fn test_load_plan_rejects_other_version() {
    let plan = SortPlan {
        version: "0.9".to_string(),
        ..Default::default()
    };
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("old_plan.json");
    save_plan(&plan, &path).unwrap();

    let result = load_plan(&path);
    assert!(matches!(result, Err(media_shelf::Error::InvalidPlanFile(ref m)) if m.contains("0.9")));
}

// ========== CACHE I/O TESTS ==========

#[test]
fn test_cache_file_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("media_cache.json");

    let mut cache = MetadataCache::load(&path);
    cache.insert("Up.2009.1080p", up());
    cache.save().unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["Up.2009.1080p"]["type"], "movie");
    assert_eq!(raw["Up.2009.1080p"]["content_rating"], "PG");

    let mut reloaded = MetadataCache::load(&path);
    assert_eq!(reloaded.get("Up.2009.1080p"), Some(&up()));

    reloaded.clear().unwrap();
    assert!(MetadataCache::load(&path).is_empty());
}

#[test]
fn test_corrupt_cache_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("media_cache.json");
    std::fs::write(&path, "[1, 2").unwrap();

    assert!(MetadataCache::load(&path).is_empty());
}

// ========== SETTINGS I/O TESTS ==========

#[test]
fn test_module_settings_file_shape() {
    let temp_dir = TempDir::new().unwrap();
    let mut registry = ModuleRegistry::with_defaults(temp_dir.path());
    registry.set_setting(FILE_MOVER, "operation", "move").unwrap();

    let raw: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp_dir.path().join(MODULE_CONFIG_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(raw[FILE_MOVER]["enabled"], true);
    assert_eq!(raw[FILE_MOVER]["settings"]["operation"], "move");

    let reloaded = ModuleRegistry::load(&temp_dir.path().join(MODULE_CONFIG_FILE));
    let settings: MoverSettings = reloaded.settings_for(FILE_MOVER);
    assert_eq!(settings.operation, OperationKind::Move);
}

#[test]
fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("deeply").join("nested").join("dir");

    let mut registry = ModuleRegistry::with_defaults(&nested);
    registry.save().unwrap();

    assert!(nested.join(MODULE_CONFIG_FILE).exists());
}
