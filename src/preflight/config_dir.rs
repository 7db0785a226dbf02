//! Config directory preflight check.

use super::CheckResult;
use std::fs;
use std::path::Path;

const WRITE_TEST_FILE: &str = ".write_test";

/// Check that the config directory exists (or can be created) and is writable.
pub fn check(config_dir: &Path) -> CheckResult {
    if let Err(e) = fs::create_dir_all(config_dir) {
        return CheckResult::fail(
            "Config directory",
            &format!("cannot create {}: {}", config_dir.display(), e),
            "Pass a writable directory with --config-dir",
        );
    }

    let marker = config_dir.join(WRITE_TEST_FILE);
    match fs::write(&marker, b"ok") {
        Ok(()) => {
            let _ = fs::remove_file(&marker);
            CheckResult::ok("Config directory", &config_dir.display().to_string())
        }
        Err(e) => CheckResult::fail(
            "Config directory",
            &format!("{} is not writable: {}", config_dir.display(), e),
            "Pass a writable directory with --config-dir",
        ),
    }
}
