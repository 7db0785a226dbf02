//! Cache command implementation.

use crate::core::cache::{MetadataCache, CACHE_FILE};
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// List cached metadata.
pub fn show(config_dir: &Path) -> Result<()> {
    let cache = MetadataCache::load(&config_dir.join(CACHE_FILE));
    if cache.is_empty() {
        println!("Cache is empty.");
        return Ok(());
    }

    println!("{} {} entries", "[CACHE]".bold().cyan(), cache.len());
    for (stem, details) in cache.iter() {
        println!(
            "  {} -> {} ({}) [{}]",
            stem,
            details.title.bold(),
            details.year.as_deref().unwrap_or("?"),
            details.audience_category().as_str()
        );
    }
    Ok(())
}

/// Remove every cached entry.
pub fn clear(config_dir: &Path) -> Result<()> {
    let mut cache = MetadataCache::load(&config_dir.join(CACHE_FILE));
    let removed = cache.len();
    cache.clear()?;
    println!("{} Removed {} cached entries", "[OK]".green(), removed);
    Ok(())
}
