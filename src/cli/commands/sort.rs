//! Sort command implementation.
//!
//! Analyzes files, builds a sort plan, saves it, then simulates it or runs
//! it through the file queue. A saved plan can be run later with
//! `media-shelf execute`.

use super::analyze::{build_resolver, load_sorter, print_report};
use super::mover::{drive_run, print_summary};
use crate::core::modules::{ModuleRegistry, FILE_MOVER, MODULE_CONFIG_FILE};
use crate::core::queue::QueueCoordinator;
use crate::core::sorter::{self, MetadataSorter, SortExecution};
use crate::models::config::{Config, MoverSettings};
use crate::models::plan::SortPlan;
use crate::utils::fs::ensure_directory;
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Sort `files` into the library under `base`.
pub async fn sort(
    files: &[PathBuf],
    base: Option<&Path>,
    execute: bool,
    output: Option<&Path>,
    config: &Config,
    config_dir: &Path,
) -> Result<()> {
    let mut sorter = load_sorter(config_dir);
    let mut settings = sorter.settings().clone();
    if let Some(base) = base {
        if base.exists() {
            ensure_directory(base)?;
        }
        settings.base_folder = Some(base.to_path_buf());
    }
    settings.simulate = !execute;
    sorter.set_settings(settings);

    let registry = ModuleRegistry::load(&config_dir.join(MODULE_CONFIG_FILE));
    let mover_settings: MoverSettings = registry.settings_for(FILE_MOVER);

    println!("{}", "[SORT] Sorting media...".bold().cyan());
    if let Some(ref base) = sorter.settings().base_folder {
        println!("  {} {}", "Library:".bold(), base.display());
    }
    println!("  {} {}", "Operation:".bold(), mover_settings.operation);
    println!("  {} {}", "Mode:".bold(), if execute { "execute" } else { "simulate" });
    println!();

    let resolver = build_resolver(config, sorter.settings(), config_dir)?;
    let report = sorter.analyze(files, &resolver).await;
    print_report(&report);

    let plan = sorter.build_plan(files, mover_settings.rename_enabled, mover_settings.operation)?;

    println!();
    println!("{}", "[PLAN] Sort Plan Summary".bold().green());
    println!("  {} {}", "Files to sort:".bold(), plan.items.len());
    println!("  {} {}", "Unknown:".bold(), plan.unknown.len());
    for unknown in &plan.unknown {
        println!("    {} {} ({})", "-".yellow(), unknown.source.display(), unknown.reason);
    }

    let plan_path = match output {
        Some(o) => o.to_path_buf(),
        None => sorter::default_plan_path(config_dir),
    };
    sorter::save_plan(&plan, &plan_path)?;
    println!("{} {}", "[OK] Plan saved to:".bold().green(), plan_path.display());
    println!();

    if plan.items.is_empty() {
        println!("Nothing to sort.");
        return Ok(());
    }

    run_plan(&sorter, &plan, mover_settings, &plan_path).await
}

/// Simulate or execute a plan and print the outcome.
pub async fn run_plan(
    sorter: &MetadataSorter,
    plan: &SortPlan,
    mover_settings: MoverSettings,
    plan_path: &Path,
) -> Result<()> {
    let mut coordinator = QueueCoordinator::new(mover_settings);
    match sorter.execute_plan(plan, &mut coordinator)? {
        SortExecution::Simulated(log) => {
            for line in log {
                println!("  {}", line);
            }
            println!();
            println!("{}", "[Next Steps]".bold().yellow());
            println!(
                "  To perform these operations: {}",
                format!("media-shelf execute {}", plan_path.display()).cyan()
            );
        }
        SortExecution::Started(run) => {
            let summary = drive_run(run, plan.items.len()).await?;
            print_summary(&summary);
        }
    }

    Ok(())
}
