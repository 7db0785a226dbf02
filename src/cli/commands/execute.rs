//! Execute command implementation.
//!
//! Reads a sort plan saved by `sort` and runs its operations through the
//! file queue.

use super::analyze::load_sorter;
use super::sort::run_plan;
use crate::core::modules::{ModuleRegistry, FILE_MOVER, MODULE_CONFIG_FILE};
use crate::core::sorter;
use crate::models::config::MoverSettings;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Execute a saved plan file.
pub async fn execute(plan_file: &Path, config_dir: &Path) -> Result<()> {
    println!("{}", "[EXEC] Executing plan...".bold().cyan());
    println!();

    if !plan_file.exists() {
        return Err(crate::Error::PathNotFound(plan_file.display().to_string()));
    }

    println!("[INFO] Loading plan: {}", plan_file.display());
    let mut plan = sorter::load_plan(plan_file)?;

    println!("  {} {}", "Created:".bold(), plan.created_at);
    println!("  {} {}", "Library:".bold(), plan.base_folder.display());
    println!("  {} {}", "Operation:".bold(), plan.operation);
    println!("  {} {}", "Items:".bold(), plan.items.len());
    println!("  {} {}", "Unknown:".bold(), plan.unknown.len());
    println!();

    if plan.items.is_empty() {
        println!("Nothing to sort.");
        return Ok(());
    }

    println!("{}", format!("[WARNING] This will {} files!", plan.operation).bold().yellow());
    println!();

    // A saved plan is always run for real; the plan's own operation wins
    // over the current mover setting.
    plan.simulate = false;
    let registry = ModuleRegistry::load(&config_dir.join(MODULE_CONFIG_FILE));
    let mut mover_settings: MoverSettings = registry.settings_for(FILE_MOVER);
    mover_settings.operation = plan.operation;

    run_plan(&load_sorter(config_dir), &plan, mover_settings, plan_file).await
}
