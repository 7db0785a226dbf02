//! Preflight checks module.

mod config_dir;
mod omdb;
mod tmdb;

use crate::models::config::Config;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Run all preflight checks.
///
/// At least one metadata provider must be configured; every configured
/// key is verified against its API.
pub async fn run_preflight_checks(config: &Config, config_dir: &Path) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();

    results.push(config_dir::check(config_dir));

    let providers: Vec<CheckResult> = [tmdb::check(&config.tmdb).await, omdb::check(&config.omdb).await]
        .into_iter()
        .flatten()
        .collect();

    if providers.is_empty() {
        results.push(CheckResult::fail(
            "API keys",
            "no metadata provider configured",
            "Set TMDB_API_KEY or OMDB_API_KEY, or add a key to config.toml",
        ));
    }
    results.extend(providers);

    Ok(results)
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}




#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_keys_fail() {
        let dir = tempfile::TempDir::new().unwrap();
        let results = run_preflight_checks(&Config::default(), dir.path()).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(!all_passed(&results));
    }
}
