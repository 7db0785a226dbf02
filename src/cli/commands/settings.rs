//! Settings command implementation.

use crate::core::modules::ModuleRegistry;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Print every module with its state and settings.
pub fn show(config_dir: &Path) -> Result<()> {
    let registry = ModuleRegistry::with_defaults(config_dir);

    for module in registry.modules() {
        let state = if module.is_enabled() {
            "enabled".green()
        } else {
            "disabled".red()
        };
        println!("{} ({})", module.name().bold().cyan(), state);
        println!("  {}", module.description().dimmed());
        println!("  {} {}", "Extensions:".bold(), module.supported_extensions().join(", "));
        if let Some(settings) = module.settings().as_object() {
            for (key, value) in settings {
                println!("  {} = {}", key, value);
            }
        }
        println!();
    }
    Ok(())
}

/// Set `MODULE.KEY` to `value` and persist.
pub fn set(key: &str, value: &str, config_dir: &Path) -> Result<()> {
    let (module, setting) = key
        .split_once('.')
        .ok_or_else(|| crate::Error::InvalidSetting(key.to_string(), "expected MODULE.KEY".to_string()))?;

    let mut registry = ModuleRegistry::with_defaults(config_dir);
    registry.set_setting(module, setting, value)?;
    println!("{} {} = {}", "[OK]".green(), key, value);
    Ok(())
}
