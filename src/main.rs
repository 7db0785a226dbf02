//! Media Shelf CLI
//!
//! A command-line tool for renaming, moving and sorting movie and TV files.

use clap::Parser;
use media_shelf::cli::{
    args::{CacheAction, Cli, Commands, SettingsAction},
    commands::{analyze, cache, execute, mover, parse, rename, settings, sort, usage},
};
use media_shelf::core::sorter::TitleCorrection;
use media_shelf::models::config::{default_config_dir, load_config, Config};
use media_shelf::preflight;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config_dir = cli.config_dir.clone().unwrap_or_else(default_config_dir);
    let config = load_config(&config_dir);

    // Run the appropriate command
    match cli.command {
        Commands::Parse { names } => {
            parse::parse(&names);
        }

        Commands::Rename { files, dry_run, no_extension } => {
            rename::rename(&files, dry_run, no_extension, &config_dir)?;
        }

        Commands::Move { files, dest, move_files, rename } => {
            mover::move_files(&files, &dest, move_files, rename, &config_dir).await?;
        }

        Commands::Analyze { files, title, year, tv } => {
            if !cli.skip_preflight {
                run_preflight_checks(&config, &config_dir).await?;
            }
            let correction = title.map(|title| TitleCorrection {
                title,
                year,
                is_series: tv,
            });
            analyze::analyze(&files, correction.as_ref(), &config, &config_dir).await?;
        }

        Commands::Sort { files, base, execute, output } => {
            if !cli.skip_preflight {
                run_preflight_checks(&config, &config_dir).await?;
            }
            sort::sort(
                &files,
                base.as_deref(),
                execute,
                output.as_deref(),
                &config,
                &config_dir,
            )
            .await?;
        }

        Commands::Execute { plan_file } => {
            execute::execute(&plan_file, &config_dir).await?;
        }

        Commands::Usage { provider, days, set_limit } => {
            usage::usage(provider.as_deref(), days, set_limit, &config, &config_dir)?;
        }

        Commands::Cache { action } => match action {
            CacheAction::Show => cache::show(&config_dir)?,
            CacheAction::Clear => cache::clear(&config_dir)?,
        },

        Commands::Settings { action } => match action {
            SettingsAction::Show => settings::show(&config_dir)?,
            SettingsAction::Set { key, value } => settings::set(&key, &value, &config_dir)?,
        },
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("media_shelf=debug")
    } else {
        EnvFilter::new("media_shelf=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(config: &Config, config_dir: &Path) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(config, config_dir).await?;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
