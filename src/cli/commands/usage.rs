//! Usage command implementation.

use crate::core::usage::{ApiUsageTracker, USAGE_FILE};
use crate::models::config::{Config, ProviderKind};
use crate::services::resolver;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Width of the longest history bar.
const BAR_WIDTH: u32 = 40;

/// Show API usage, optionally setting a provider's daily limit first.
pub fn usage(
    provider: Option<&str>,
    days: u32,
    set_limit: Option<u32>,
    config: &Config,
    config_dir: &Path,
) -> Result<()> {
    let mut tracker = ApiUsageTracker::load(&config_dir.join(USAGE_FILE));
    resolver::apply_configured_limits(config, &mut tracker);

    let selected = provider.map(str::parse::<ProviderKind>).transpose()?;

    if let (Some(kind), Some(limit)) = (selected, set_limit) {
        tracker.set_limit(kind.as_str(), limit);
        println!(
            "{} Daily limit for {} set to {}",
            "[OK]".green(),
            kind.as_str().to_uppercase(),
            limit
        );
        println!();
    }

    let kinds = match selected {
        Some(kind) => vec![kind],
        None => vec![ProviderKind::Tmdb, ProviderKind::Omdb],
    };

    for kind in kinds {
        print_provider(&mut tracker, kind, days);
    }
    Ok(())
}

fn print_provider(tracker: &mut ApiUsageTracker, kind: ProviderKind, days: u32) {
    let name = kind.as_str();
    let Some(stats) = tracker.stats(name) else {
        println!("{} no usage recorded", kind.as_str().to_uppercase().bold());
        return;
    };

    let percentage = tracker.usage_percentage(name);
    let today = format!("{}/{} ({:.1}%)", stats.calls_today, stats.daily_limit, percentage);
    let today = if tracker.is_limit_reached(name) {
        today.red()
    } else if percentage >= 80.0 {
        today.yellow()
    } else {
        today.green()
    };

    println!("{}", name.to_uppercase().bold().cyan());
    println!("  {} {}", "Today:".bold(), today);
    println!("  {} {}", "Total calls:".bold(), stats.total_calls);
    println!("  {} {}", "Successful:".bold(), stats.successful_calls);
    println!("  {} {}", "Failed:".bold(), stats.failed_calls);

    let history = tracker.history(name, days);
    let peak = history.iter().map(|d| d.calls).max().unwrap_or(0);
    if peak > 0 {
        println!("  {}", "History:".bold());
        for day in &history {
            let width = (day.calls * BAR_WIDTH).div_ceil(peak);
            println!("    {} {:>5} {}", day.date, day.calls, "#".repeat(width as usize).blue());
        }
    }
    println!();
}
