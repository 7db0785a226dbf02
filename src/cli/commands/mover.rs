//! Move command implementation.
//!
//! Queues files, runs the queue on the background worker and renders its
//! progress events. Ctrl-C requests cancellation between files.

use crate::core::modules::{FileMoverModule, Module, ModuleRegistry, FILE_MOVER, MODULE_CONFIG_FILE};
use crate::core::queue::{ProgressEvent, QueueRun};
use crate::models::config::MoverSettings;
use crate::models::plan::{BatchSummary, OperationKind};
use crate::utils::fs::ensure_directory;
use crate::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Copy or move files into `dest`.
pub async fn move_files(
    files: &[PathBuf],
    dest: &Path,
    move_files: bool,
    rename: bool,
    config_dir: &Path,
) -> Result<()> {
    if dest.exists() {
        ensure_directory(dest)?;
    }

    let registry = ModuleRegistry::load(&config_dir.join(MODULE_CONFIG_FILE));
    let mut settings: MoverSettings = registry.settings_for(FILE_MOVER);
    settings.destination_folder = Some(dest.to_path_buf());
    if move_files {
        settings.operation = OperationKind::Move;
    }
    if rename {
        settings.rename_enabled = true;
    }

    println!(
        "{}",
        format!("[{}] Processing {} items...", settings.operation.to_string().to_uppercase(), files.len())
            .bold()
            .cyan()
    );
    println!("  {} {}", "Destination:".bold(), dest.display());
    println!("  {} {}", "Rename:".bold(), settings.rename_enabled);
    println!();

    let mut module = FileMoverModule::new(settings);
    for file in files {
        if let Err(e) = module.process_file(file) {
            println!("{} {}", "[SKIP]".yellow(), e);
        }
    }
    for event in module.drain_events() {
        tracing::debug!("{}", event);
    }

    let coordinator = module.coordinator_mut();
    let total = coordinator.len();
    let run = coordinator.execute_queue()?;
    let summary = drive_run(run, total).await?;
    coordinator.finish_run(&summary);

    print_summary(&summary);
    Ok(())
}

/// Render a queue run until its worker finishes.
pub async fn drive_run(mut run: QueueRun, total: usize) -> Result<BatchSummary> {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let cancel = run.cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Cancellation requested");
            cancel.cancel();
        }
    });

    while let Some(event) = run.events.recv().await {
        match event {
            ProgressEvent::Progress { completed, .. } => pb.set_position(completed as u64),
            ProgressEvent::Message(message) => {
                if is_failure(&message) {
                    pb.println(format!("{} {}", "[FAIL]".red(), message));
                } else {
                    pb.set_message(message);
                }
            }
            ProgressEvent::Stalled(message) => {
                pb.println(format!("{} {}", "[WARN]".yellow(), message));
            }
            ProgressEvent::Cancelled { remaining } => {
                pb.println(format!("{} {} operations not started", "[CANCELLED]".yellow(), remaining));
            }
            ProgressEvent::Finished(_) => {}
        }
    }
    ctrl_c.abort();

    let summary = run
        .handle
        .await
        .map_err(|e| crate::Error::ExecuteError(e.to_string()))?;

    if summary.cancelled {
        pb.abandon_with_message("Cancelled");
    } else {
        pb.finish_with_message("Done!");
    }
    Ok(summary)
}

fn is_failure(message: &str) -> bool {
    message.starts_with("Source file not found") || message.starts_with("Error processing")
}

/// Print the totals of a finished run.
pub fn print_summary(summary: &BatchSummary) {
    println!();
    println!("{}", "[DONE] Summary".bold().green());
    println!("  {} {}", "Succeeded:".bold(), summary.succeeded);
    println!("  {} {}", "Unchanged:".bold(), summary.unchanged);
    if summary.failed > 0 {
        println!("  {} {}", "Failed:".bold().red(), summary.failed);
    } else {
        println!("  {} {}", "Failed:".bold(), summary.failed);
    }
    if summary.cancelled {
        println!("  {}", "Run was cancelled".yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        assert!(is_failure("Source file not found: /in/a.mkv"));
        assert!(is_failure("Error processing a.mkv: permission denied"));
        assert!(!is_failure("Successfully copied a.mkv"));
        assert!(!is_failure("a.mkv (unchanged)"));
    }
}
