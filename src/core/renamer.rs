//! In-place batch renaming with canonical names.

use crate::core::parser;
use crate::models::config::EditorSettings;
use crate::models::plan::BatchSummary;
use crate::utils::fs::{file_name_string, file_stem_string, resolve_collision};
use std::path::{Path, PathBuf};

/// A proposed rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePreview {
    pub source: PathBuf,
    pub old_name: String,
    pub new_name: String,
}

impl RenamePreview {
    pub fn is_unchanged(&self) -> bool {
        self.old_name == self.new_name
    }
}

/// Result of applying renames.
#[derive(Debug, Clone, Default)]
pub struct RenameOutcome {
    pub summary: BatchSummary,
    /// Paths after the batch, in input order. Failed files keep their old path.
    pub paths: Vec<PathBuf>,
}

/// Renames files in place to their canonical names.
#[derive(Debug, Clone, Default)]
pub struct FilenameEditor {
    settings: EditorSettings,
}

impl FilenameEditor {
    pub fn new(settings: EditorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.settings = settings;
    }

    /// Canonical file name for `path` under the current settings.
    pub fn new_name(&self, path: &Path) -> String {
        if self.settings.preserve_extension {
            parser::rename_with_extension(path)
        } else {
            parser::canonical_stem(&file_stem_string(path))
        }
    }

    /// Old and new names for each file, without touching the filesystem.
    pub fn preview(&self, files: &[PathBuf]) -> Vec<RenamePreview> {
        files
            .iter()
            .map(|file| RenamePreview {
                source: file.clone(),
                old_name: file_name_string(file),
                new_name: self.new_name(file),
            })
            .collect()
    }

    /// Rename every file next to where it is.
    pub fn apply(&self, files: &[PathBuf]) -> RenameOutcome {
        let mut outcome = RenameOutcome::default();

        for file in files {
            let old_name = file_name_string(file);
            if !file.exists() {
                let message = format!("File no longer exists: {}", old_name);
                tracing::error!("{}", message);
                outcome.summary.failed += 1;
                outcome.summary.messages.push(message);
                outcome.paths.push(file.clone());
                continue;
            }

            let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
            let candidate = parent.join(self.new_name(file));
            if candidate == *file {
                outcome.summary.unchanged += 1;
                outcome.summary.messages.push(format!("{} (unchanged)", old_name));
                outcome.paths.push(file.clone());
                continue;
            }

            let target = resolve_collision(candidate, file, false, |p| p.exists());
            match std::fs::rename(file, &target) {
                Ok(()) => {
                    let new_name = file_name_string(&target);
                    tracing::info!("Renamed: {} -> {}", old_name, new_name);
                    outcome.summary.succeeded += 1;
                    outcome.summary.messages.push(format!("{} -> {}", old_name, new_name));
                    outcome.paths.push(target);
                }
                Err(e) => {
                    let message = format!("Error renaming {}: {}", old_name, e);
                    tracing::error!("{}", message);
                    outcome.summary.failed += 1;
                    outcome.summary.messages.push(message);
                    outcome.paths.push(file.clone());
                }
            }
        }

        tracing::info!(
            "Rename finished: {} renamed, {} unchanged, {} failed",
            outcome.summary.succeeded,
            outcome.summary.unchanged,
            outcome.summary.failed
        );
        outcome
    }
}
