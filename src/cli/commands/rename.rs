//! Rename command implementation.

use crate::core::modules::{ModuleRegistry, FILENAME_EDITOR, MODULE_CONFIG_FILE};
use crate::core::renamer::FilenameEditor;
use crate::models::config::EditorSettings;
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Rename files in place, or only show the new names.
pub fn rename(files: &[PathBuf], dry_run: bool, no_extension: bool, config_dir: &Path) -> Result<()> {
    let registry = ModuleRegistry::load(&config_dir.join(MODULE_CONFIG_FILE));
    let mut settings: EditorSettings = registry.settings_for(FILENAME_EDITOR);
    if no_extension {
        settings.preserve_extension = false;
    }
    let editor = FilenameEditor::new(settings);

    if dry_run {
        println!("{}", "[DRY RUN] No files will be renamed".bold().yellow());
        println!();
        for preview in editor.preview(files) {
            if preview.is_unchanged() {
                println!("  {} {}", preview.old_name, "(unchanged)".dimmed());
            } else {
                println!("  {} -> {}", preview.old_name, preview.new_name.green());
            }
        }
        return Ok(());
    }

    let outcome = editor.apply(files);
    for message in &outcome.summary.messages {
        println!("  {}", message);
    }

    println!();
    println!("{}", "[RENAME] Summary".bold().green());
    println!("  {} {}", "Renamed:".bold(), outcome.summary.succeeded);
    println!("  {} {}", "Unchanged:".bold(), outcome.summary.unchanged);
    if outcome.summary.failed > 0 {
        println!("  {} {}", "Failed:".bold().red(), outcome.summary.failed);
    }

    Ok(())
}
