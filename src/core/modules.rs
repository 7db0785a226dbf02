//! Pluggable file-processing modules.
//!
//! Every tool (mover, filename editor, sorter) implements [`Module`]. The
//! [`ModuleRegistry`] keeps them in registration order, persists their
//! enabled flag and settings to `module_config.json`, and hands a file to
//! every enabled module that supports its extension.

use crate::core::cache::MetadataCache;
use crate::core::queue::{EnqueueOutcome, QueueCoordinator};
use crate::core::renamer::FilenameEditor;
use crate::core::sorter::MetadataSorter;
use crate::models::config::{EditorSettings, MoverSettings, SorterSettings};
use crate::utils::fs::{file_name_string, get_extension};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file name inside the config directory.
pub const MODULE_CONFIG_FILE: &str = "module_config.json";

/// Extension wildcard matching every file.
pub const ANY_EXTENSION: &str = "*";

pub const FILE_MOVER: &str = "file_mover";
pub const FILENAME_EDITOR: &str = "filename_editor";
pub const MEDIA_SORTER: &str = "media_sorter";

const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "mov", "wmv", "m4v"];

/// A file-processing tool.
pub trait Module: Send {
    /// Stable name, also the key in the settings file.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Lowercase extensions without the dot, or `*` for any file.
    fn supported_extensions(&self) -> Vec<String>;

    /// Handle one file. Returns whether the module accepted it.
    fn process_file(&mut self, path: &Path) -> Result<bool>;

    /// Current settings as JSON.
    fn settings(&self) -> Value;

    /// Replace settings from JSON. Missing fields take their defaults.
    fn load_settings(&mut self, settings: Value) -> Result<()>;

    /// Messages produced since the last call.
    fn drain_events(&mut self) -> Vec<String> {
        Vec::new()
    }

    /// Whether this module handles `path`.
    fn supports(&self, path: &Path) -> bool {
        let extensions = self.supported_extensions();
        if extensions.iter().any(|e| e == ANY_EXTENSION) {
            return true;
        }
        match get_extension(path) {
            Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }
}

fn to_value<T: Serialize>(settings: &T) -> Value {
    serde_json::to_value(settings).unwrap_or(Value::Null)
}

fn from_value<T: DeserializeOwned>(module: &str, settings: Value) -> Result<T> {
    serde_json::from_value(settings)
        .map_err(|e| crate::Error::InvalidSetting(module.to_string(), e.to_string()))
}

/// Queues files for copying or moving.
pub struct FileMoverModule {
    enabled: bool,
    coordinator: QueueCoordinator,
    events: Vec<String>,
}

impl FileMoverModule {
    pub fn new(settings: MoverSettings) -> Self {
        Self {
            enabled: true,
            coordinator: QueueCoordinator::new(settings),
            events: Vec::new(),
        }
    }

    pub fn coordinator(&self) -> &QueueCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut QueueCoordinator {
        &mut self.coordinator
    }
}

impl Default for FileMoverModule {
    fn default() -> Self {
        Self::new(MoverSettings::default())
    }
}

impl Module for FileMoverModule {
    fn name(&self) -> &str {
        FILE_MOVER
    }

    fn description(&self) -> &str {
        "Copy or move files with optional renaming"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn supported_extensions(&self) -> Vec<String> {
        vec![ANY_EXTENSION.to_string()]
    }

    fn process_file(&mut self, path: &Path) -> Result<bool> {
        let name = file_name_string(path);
        match self.coordinator.enqueue(path)? {
            EnqueueOutcome::Added => {
                self.events.push(format!("Added {} to queue", name));
                Ok(true)
            }
            EnqueueOutcome::AlreadyQueued => {
                self.events.push(format!("{} is already queued", name));
                Ok(false)
            }
        }
    }

    fn settings(&self) -> Value {
        to_value(self.coordinator.settings())
    }

    fn load_settings(&mut self, settings: Value) -> Result<()> {
        let settings: MoverSettings = from_value(FILE_MOVER, settings)?;
        self.coordinator.apply_settings(settings);
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }
}

/// Renames video files in place.
pub struct FilenameEditorModule {
    enabled: bool,
    editor: FilenameEditor,
    events: Vec<String>,
}

impl FilenameEditorModule {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            enabled: true,
            editor: FilenameEditor::new(settings),
            events: Vec::new(),
        }
    }

    pub fn editor(&self) -> &FilenameEditor {
        &self.editor
    }
}

impl Default for FilenameEditorModule {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl Module for FilenameEditorModule {
    fn name(&self) -> &str {
        FILENAME_EDITOR
    }

    fn description(&self) -> &str {
        "Rename media files to a clean title format"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn supported_extensions(&self) -> Vec<String> {
        VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    fn process_file(&mut self, path: &Path) -> Result<bool> {
        let outcome = self.editor.apply(&[path.to_path_buf()]);
        self.events.extend(outcome.summary.messages);
        Ok(outcome.summary.failed == 0)
    }

    fn settings(&self) -> Value {
        to_value(self.editor.settings())
    }

    fn load_settings(&mut self, settings: Value) -> Result<()> {
        self.editor.set_settings(from_value(FILENAME_EDITOR, settings)?);
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }
}

/// Collects video files for metadata sorting.
///
/// Lookups are asynchronous, so files are only gathered here; the caller
/// takes them with [`MediaSorterModule::take_pending`] and runs the sorter.
pub struct MediaSorterModule {
    enabled: bool,
    sorter: MetadataSorter,
    pending: Vec<PathBuf>,
    events: Vec<String>,
}

impl MediaSorterModule {
    pub fn new(settings: SorterSettings, cache: MetadataCache) -> Self {
        Self {
            enabled: true,
            sorter: MetadataSorter::new(settings, cache),
            pending: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn sorter(&self) -> &MetadataSorter {
        &self.sorter
    }

    pub fn sorter_mut(&mut self) -> &mut MetadataSorter {
        &mut self.sorter
    }

    /// Files collected so far.
    pub fn pending(&self) -> &[PathBuf] {
        &self.pending
    }

    pub fn take_pending(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.pending)
    }
}

impl Default for MediaSorterModule {
    fn default() -> Self {
        Self::new(SorterSettings::default(), MetadataCache::in_memory())
    }
}

impl Module for MediaSorterModule {
    fn name(&self) -> &str {
        MEDIA_SORTER
    }

    fn description(&self) -> &str {
        "Sort media into audience, type and genre folders"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn supported_extensions(&self) -> Vec<String> {
        VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    fn process_file(&mut self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Err(crate::Error::PathNotFound(path.display().to_string()));
        }
        if self.pending.iter().any(|p| p == path) {
            return Ok(false);
        }
        self.pending.push(path.to_path_buf());
        self.events.push(format!("Queued {} for analysis", file_name_string(path)));
        Ok(true)
    }

    fn settings(&self) -> Value {
        to_value(self.sorter.settings())
    }

    fn load_settings(&mut self, settings: Value) -> Result<()> {
        self.sorter.set_settings(from_value(MEDIA_SORTER, settings)?);
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }
}

/// Persisted state of one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub settings: Value,
}

fn enabled_by_default() -> bool {
    true
}

/// Result of handing one file to the registry.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Modules that accepted the file.
    pub accepted: Vec<String>,
    /// Modules that failed, with the error.
    pub failed: Vec<(String, String)>,
}

/// Registered modules and their persisted settings.
pub struct ModuleRegistry {
    path: Option<PathBuf>,
    stored: BTreeMap<String, ModuleEntry>,
    modules: Vec<Box<dyn Module>>,
}

impl ModuleRegistry {
    /// A registry that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            stored: BTreeMap::new(),
            modules: Vec::new(),
        }
    }

    /// Load persisted module state from `path`.
    ///
    /// A missing or corrupt file yields an empty configuration.
    pub fn load(path: &Path) -> Self {
        let stored = if path.exists() {
            match fs::read_to_string(path)
                .map_err(crate::Error::from)
                .and_then(|content| serde_json::from_str(&content).map_err(crate::Error::from))
            {
                Ok(stored) => {
                    tracing::info!("Loaded module configuration");
                    stored
                }
                Err(e) => {
                    tracing::error!("Error loading module configuration: {}", e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Self {
            path: Some(path.to_path_buf()),
            stored,
            modules: Vec::new(),
        }
    }

    /// Registry with the built-in modules, configured from `config_dir`.
    pub fn with_defaults(config_dir: &Path) -> Self {
        let mut registry = Self::load(&config_dir.join(MODULE_CONFIG_FILE));
        let cache = MetadataCache::load(&config_dir.join(crate::core::cache::CACHE_FILE));
        registry.register(Box::new(FileMoverModule::default()));
        registry.register(Box::new(FilenameEditorModule::new(EditorSettings::default())));
        registry.register(Box::new(MediaSorterModule::new(SorterSettings::default(), cache)));
        registry
    }

    /// Register a module, applying any stored state for its name.
    ///
    /// A module with the same name replaces the earlier one.
    pub fn register(&mut self, mut module: Box<dyn Module>) {
        let name = module.name().to_string();

        if let Some(entry) = self.stored.get(&name) {
            module.set_enabled(entry.enabled);
            if !entry.settings.is_null() {
                if let Err(e) = module.load_settings(entry.settings.clone()) {
                    tracing::warn!("Ignoring stored settings for {}: {}", name, e);
                }
            }
        }

        self.modules.retain(|m| m.name() != name);
        self.modules.push(module);
        tracing::debug!("Registered module: {}", name);

        if let Err(e) = self.save() {
            tracing::error!("Error saving module configuration: {}", e);
        }
    }

    /// Write the state of every module.
    ///
    /// Entries of modules that are not registered are kept as they were.
    pub fn save(&mut self) -> Result<()> {
        for module in &self.modules {
            self.stored.insert(
                module.name().to_string(),
                ModuleEntry {
                    enabled: module.is_enabled(),
                    settings: module.settings(),
                },
            );
        }

        let Some(ref path) = self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.stored)?)?;
        tracing::debug!("Saved module configuration to {:?}", path);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Module> {
        self.modules.iter().find(|m| m.name() == name).map(|m| m.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Module + 'static)> {
        self.modules.iter_mut().find(|m| m.name() == name).map(|m| m.as_mut())
    }

    /// All modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &dyn Module> {
        self.modules.iter().map(|m| m.as_ref())
    }

    /// Enabled modules in registration order.
    pub fn enabled_modules(&self) -> Vec<&dyn Module> {
        self.modules().filter(|m| m.is_enabled()).collect()
    }

    /// Typed settings for `name`, from the registered module or the stored entry.
    pub fn settings_for<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let value = match self.get(name) {
            Some(module) => module.settings(),
            None => self
                .stored
                .get(name)
                .map(|entry| entry.settings.clone())
                .unwrap_or(Value::Null),
        };
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Set one setting of a module and persist.
    ///
    /// `enabled` toggles the module itself. Other keys are merged into the
    /// module's settings object. `value` is parsed as JSON, falling back to
    /// a plain string.
    pub fn set_setting(&mut self, name: &str, key: &str, value: &str) -> Result<()> {
        let parsed: Value =
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

        let module = self
            .get_mut(name)
            .ok_or_else(|| crate::Error::InvalidSetting(name.to_string(), "unknown module".to_string()))?;

        if key == "enabled" {
            let enabled = parsed.as_bool().ok_or_else(|| {
                crate::Error::InvalidSetting(key.to_string(), value.to_string())
            })?;
            module.set_enabled(enabled);
        } else {
            let mut settings = module.settings();
            let Some(object) = settings.as_object_mut() else {
                return Err(crate::Error::InvalidSetting(name.to_string(), "settings are not an object".to_string()));
            };
            if !object.contains_key(key) {
                return Err(crate::Error::InvalidSetting(key.to_string(), value.to_string()));
            }
            object.insert(key.to_string(), parsed);
            module.load_settings(settings)?;
        }

        tracing::info!("Updated {}.{} = {}", name, key, value);
        self.save()
    }

    /// Hand `path` to every enabled module that supports it.
    pub fn dispatch(&mut self, path: &Path) -> DispatchReport {
        let mut report = DispatchReport::default();

        for module in self.modules.iter_mut().filter(|m| m.is_enabled()) {
            if !module.supports(path) {
                continue;
            }
            match module.process_file(path) {
                Ok(true) => report.accepted.push(module.name().to_string()),
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("{} failed on {:?}: {}", module.name(), path, e);
                    report.failed.push((module.name().to_string(), e.to_string()));
                }
            }
        }

        report
    }

    /// Collected messages of every module, prefixed with its name.
    pub fn drain_events(&mut self) -> Vec<String> {
        self.modules
            .iter_mut()
            .flat_map(|m| {
                let name = m.name().to_string();
                m.drain_events()
                    .into_iter()
                    .map(move |event| format!("[{}] {}", name, event))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::OperationKind;
    use tempfile::TempDir;

    #[test]
    fn test_extension_matching() {
        let mover = FileMoverModule::default();
        let editor = FilenameEditorModule::default();
        assert!(mover.supports(Path::new("notes.txt")));
        assert!(editor.supports(Path::new("Movie.MKV")));
        assert!(!editor.supports(Path::new("notes.txt")));
        assert!(!editor.supports(Path::new("README")));
    }

    #[test]
    fn test_register_applies_stored_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MODULE_CONFIG_FILE);
        fs::write(
            &path,
            r#"{"file_mover": {"enabled": false, "settings": {"operation": "move", "rename_enabled": true}}}"#,
        )
        .unwrap();

        let mut registry = ModuleRegistry::load(&path);
        registry.register(Box::new(FileMoverModule::default()));

        let mover = registry.get(FILE_MOVER).unwrap();
        assert!(!mover.is_enabled());
        let settings: MoverSettings = registry.settings_for(FILE_MOVER);
        assert_eq!(settings.operation, OperationKind::Move);
        assert!(settings.rename_enabled);
        assert!(registry.enabled_modules().is_empty());
    }

    #[test]
    fn test_set_setting_persists() {
        let dir = TempDir::new().unwrap();
        let mut registry = ModuleRegistry::with_defaults(dir.path());

        registry.set_setting(MEDIA_SORTER, "sort_by", "year").unwrap();
        registry.set_setting(FILENAME_EDITOR, "enabled", "false").unwrap();
        assert!(registry.set_setting(MEDIA_SORTER, "no_such_key", "1").is_err());
        assert!(registry.set_setting(MEDIA_SORTER, "max_concurrent_lookups", "many").is_err());

        let reloaded = ModuleRegistry::with_defaults(dir.path());
        let settings: SorterSettings = reloaded.settings_for(MEDIA_SORTER);
        assert_eq!(settings.sort_by, crate::models::config::SortKey::Year);
        assert!(!reloaded.get(FILENAME_EDITOR).unwrap().is_enabled());
    }

    #[test]
    fn test_dispatch_by_extension() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("Up.2009.1080p.mkv");
        let text = dir.path().join("notes.txt");
        fs::write(&video, b"v").unwrap();
        fs::write(&text, b"t").unwrap();

        let mut registry = ModuleRegistry::in_memory();
        registry.register(Box::new(FileMoverModule::default()));
        registry.register(Box::new(MediaSorterModule::default()));

        let report = registry.dispatch(&video);
        assert_eq!(report.accepted, vec![FILE_MOVER, MEDIA_SORTER]);

        let report = registry.dispatch(&text);
        assert_eq!(report.accepted, vec![FILE_MOVER]);

        let events = registry.drain_events();
        assert_eq!(events.len(), 3);
        assert!(registry.drain_events().is_empty());
    }

    #[test]
    fn test_corrupt_config_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MODULE_CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();

        let mut registry = ModuleRegistry::load(&path);
        registry.register(Box::new(FilenameEditorModule::default()));
        assert!(registry.get(FILENAME_EDITOR).unwrap().is_enabled());
    }
}
