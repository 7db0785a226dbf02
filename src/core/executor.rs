//! File operation executor.
//!
//! Performs the copy/move primitives the queue worker relies on:
//! - copy: Copy a single file
//! - move: Rename, falling back to copy + delete across filesystems
//! - copy_tree / move_tree: Same for whole directories

use crate::utils::hash;
use crate::Result;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// File-operation capability used by the queue worker.
pub trait FileExecutor: Send + Sync {
    /// Copy a single file.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
    /// Move a single file.
    fn move_file(&self, from: &Path, to: &Path) -> Result<()>;
    /// Copy a directory recursively.
    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()>;
    /// Move a directory.
    fn move_tree(&self, from: &Path, to: &Path) -> Result<()>;
}

/// Executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Whether to verify checksums after cross-filesystem moves.
    pub verify_checksum: bool,
    /// Whether directories are copied with their subdirectories.
    pub recursive: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            verify_checksum: true,
            recursive: true,
        }
    }
}

/// Executor backed by `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct FsExecutor {
    config: ExecutorConfig,
}

impl FsExecutor {
    /// Create a new executor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new executor with custom configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    fn ensure_parent(to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Copy a file and compare checksums of both sides.
    fn copy_verified(&self, from: &Path, to: &Path) -> Result<()> {
        let checksum = if self.config.verify_checksum {
            Some(hash::sha256_file(from)?)
        } else {
            None
        };

        fs::copy(from, to)?;

        if let Some(ref original) = checksum {
            let copied = hash::sha256_file(to)?;
            if original != &copied {
                let _ = fs::remove_file(to);
                return Err(crate::Error::ExecuteError(format!(
                    "Checksum mismatch after copying: {:?}",
                    to
                )));
            }
        }
        Ok(())
    }

    /// Try an atomic rename. `Ok(false)` means the move crosses devices.
    fn try_rename(from: &Path, to: &Path) -> Result<bool> {
        match fs::rename(from, to) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
                tracing::debug!("Cross-filesystem move detected, using copy+delete");
                Ok(false)
            }
            Err(e) => Err(crate::Error::ExecuteError(format!(
                "Failed to move {:?}: {}",
                from, e
            ))),
        }
    }
}

impl FileExecutor for FsExecutor {
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        Self::ensure_parent(to)?;
        fs::copy(from, to)?;
        tracing::debug!("Copied: {:?} -> {:?}", from, to);
        Ok(())
    }

    fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        Self::ensure_parent(to)?;

        if Self::try_rename(from, to)? {
            tracing::debug!("Moved (rename): {:?} -> {:?}", from, to);
            return Ok(());
        }

        self.copy_verified(from, to)?;
        fs::remove_file(from)?;
        tracing::debug!("Moved (copy+delete): {:?} -> {:?}", from, to);
        Ok(())
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()> {
        let max_depth = if self.config.recursive { usize::MAX } else { 1 };

        for entry in WalkDir::new(from).max_depth(max_depth) {
            let entry = entry.map_err(|e| crate::Error::ExecuteError(e.to_string()))?;
            let relative = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| crate::Error::ExecuteError(e.to_string()))?;
            let target = to.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                Self::ensure_parent(&target)?;
                fs::copy(entry.path(), &target)?;
            }
        }

        tracing::debug!("Copied folder: {:?} -> {:?}", from, to);
        Ok(())
    }

    fn move_tree(&self, from: &Path, to: &Path) -> Result<()> {
        Self::ensure_parent(to)?;

        if Self::try_rename(from, to)? {
            tracing::debug!("Moved folder (rename): {:?} -> {:?}", from, to);
            return Ok(());
        }

        // Moves always take the whole tree; the source is removed only after every file copied.
        for entry in WalkDir::new(from) {
            let entry = entry.map_err(|e| crate::Error::ExecuteError(e.to_string()))?;
            let relative = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| crate::Error::ExecuteError(e.to_string()))?;
            let target = to.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                Self::ensure_parent(&target)?;
                self.copy_verified(entry.path(), &target)?;
            }
        }

        fs::remove_dir_all(from)?;
        tracing::debug!("Moved folder (copy+delete): {:?} -> {:?}", from, to);
        Ok(())
    }
}
