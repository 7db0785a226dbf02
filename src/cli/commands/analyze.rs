//! Analyze command implementation.

use crate::core::cache::{MetadataCache, CACHE_FILE};
use crate::core::modules::{ModuleRegistry, MEDIA_SORTER, MODULE_CONFIG_FILE};
use crate::core::sorter::{AnalysisReport, AnalysisStatus, MetadataSorter, TitleCorrection};
use crate::core::usage::{ApiUsageTracker, USAGE_FILE};
use crate::models::config::{Config, SorterSettings};
use crate::services::resolver::{self, HttpProvider, MetadataResolver};
use crate::utils::fs::file_name_string;
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Build a resolver over every configured provider.
pub fn build_resolver(
    config: &Config,
    settings: &SorterSettings,
    config_dir: &Path,
) -> Result<MetadataResolver<HttpProvider>> {
    let providers = resolver::providers_from_config(config);
    if providers.is_empty() {
        return Err(crate::Error::ApiKeyMissing(
            "TMDB/OMDb".to_string(),
            "TMDB_API_KEY or OMDB_API_KEY".to_string(),
        ));
    }

    let mut usage = ApiUsageTracker::load(&config_dir.join(USAGE_FILE));
    resolver::apply_configured_limits(config, &mut usage);

    Ok(MetadataResolver::new(
        providers,
        settings.primary_provider,
        Arc::new(Mutex::new(usage)),
    ))
}

/// Sorter configured from the saved module settings and the cache file.
pub fn load_sorter(config_dir: &Path) -> MetadataSorter {
    let registry = ModuleRegistry::load(&config_dir.join(MODULE_CONFIG_FILE));
    let settings: SorterSettings = registry.settings_for(MEDIA_SORTER);
    MetadataSorter::new(settings, MetadataCache::load(&config_dir.join(CACHE_FILE)))
}

/// Resolve and cache metadata for `files`.
///
/// With a correction, the given title is looked up instead of the parsed
/// one and cached under every file's stem.
pub async fn analyze(
    files: &[PathBuf],
    correction: Option<&TitleCorrection>,
    config: &Config,
    config_dir: &Path,
) -> Result<()> {
    println!("{}", "[ANALYZE] Looking up media information...".bold().cyan());
    println!();

    let mut sorter = load_sorter(config_dir);
    let resolver = build_resolver(config, sorter.settings(), config_dir)?;

    let report = match correction {
        Some(correction) => {
            println!("  {} {}", "Title:".bold(), correction.title);
            if let Some(ref year) = correction.year {
                println!("  {} {}", "Year:".bold(), year);
            }
            println!();
            sorter.analyze_with_correction(files, correction, &resolver).await
        }
        None => sorter.analyze(files, &resolver).await,
    };
    print_report(&report);

    if report.failed() > 0 && correction.is_none() {
        println!();
        println!("{}", "[Next Steps]".bold().yellow());
        println!(
            "  To enter a title by hand: {}",
            "media-shelf analyze FILE --title TITLE [--year YEAR] [--tv]".cyan()
        );
    }
    Ok(())
}

/// Print one line per file and the totals.
pub fn print_report(report: &AnalysisReport) {
    for result in &report.results {
        let name = file_name_string(&result.file);
        match result.status {
            AnalysisStatus::Resolved { ref details, cached } => {
                let year = details.year.as_deref().unwrap_or("?");
                let genre = details.primary_genre().unwrap_or("-");
                println!(
                    "  {} {} -> {} ({}) [{}, {}, {}]{}",
                    "[OK]".green(),
                    name,
                    details.title,
                    year,
                    details.kind,
                    genre,
                    details.audience_category().as_str(),
                    if cached { " (cached)".dimmed().to_string() } else { String::new() }
                );
            }
            AnalysisStatus::Failed(ref reason) => {
                println!("  {} {}: {}", "[FAIL]".red(), name, reason);
            }
            AnalysisStatus::Skipped => {
                println!("  {} {}: no title found", "[SKIP]".yellow(), name);
            }
        }
    }

    println!();
    println!("{}", "[ANALYZE] Summary".bold().green());
    println!("  {} {}", "Resolved:".bold(), report.resolved());
    println!("  {} {}", "Failed:".bold(), report.failed());
    println!("  {} {}", "Skipped:".bold(), report.skipped());
}
