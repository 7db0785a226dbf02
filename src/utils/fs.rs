//! File system utilities.

use crate::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Trailing ` (N)` collision counter in a stem. Four digits are a year, not a counter.
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)\s\((\d{1,3})\)$").unwrap());

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Get file extension in lowercase.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// File stem as an owned string (empty when the path has none).
pub fn file_stem_string(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name as an owned string, falling back to the whole path.
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Check if a file is a video file based on extension.
pub fn is_video_file(path: &Path) -> bool {
    const VIDEO_EXTENSIONS: &[&str] = &[
        "mkv", "mp4", "avi", "mov", "wmv", "m4v", "ts", "m2ts", "flv", "webm", "mpg", "mpeg",
    ];

    get_extension(path)
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Absolute form of a path without requiring it to exist.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    match path.canonicalize() {
        Ok(p) => Ok(p),
        Err(_) if path.is_absolute() => Ok(path.to_path_buf()),
        Err(_) => Ok(std::env::current_dir()?.join(path)),
    }
}

/// Split a file name into stem and extension (with leading dot).
///
/// Directories are never split: `Season.1` is a name, not `Season` + `.1`.
fn split_name(name: &str, is_directory: bool) -> (String, String) {
    if is_directory {
        return (name.to_string(), String::new());
    }
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => (
            stem.to_string_lossy().into_owned(),
            format!(".{}", ext.to_string_lossy()),
        ),
        _ => (name.to_string(), String::new()),
    }
}

/// Find a destination that is not taken, appending ` (N)` before the extension.
///
/// `is_taken` decides whether a candidate conflicts (filesystem state,
/// other planned destinations, or both). A candidate equal to `source` is
/// never a conflict. An existing trailing ` (N)` in the stem is bumped
/// instead of stacking a second counter.
pub fn resolve_collision<F>(candidate: PathBuf, source: &Path, is_directory: bool, is_taken: F) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    if candidate == source || !is_taken(&candidate) {
        return candidate;
    }

    let parent = candidate.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = file_name_string(&candidate);
    let (stem, ext) = split_name(&name, is_directory);

    let (base, mut counter) = match NUMBERED_RE.captures(&stem) {
        Some(caps) => {
            let n = caps[2].parse::<u64>().unwrap_or(0);
            (caps[1].to_string(), n + 1)
        }
        None => (stem, 1),
    };

    loop {
        let next = parent.join(format!("{} ({}){}", base, counter, ext));
        if next == source || !is_taken(&next) {
            tracing::debug!("Resolved name collision: {:?} -> {:?}", candidate, next);
            return next;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(&PathBuf::from("movie.mkv")));
        assert!(is_video_file(&PathBuf::from("movie.MP4")));
        assert!(!is_video_file(&PathBuf::from("movie.txt")));
        assert!(!is_video_file(&PathBuf::from("movie.nfo")));
    }

    #[test]
    fn test_resolve_collision_appends_counter() {
        let taken: HashSet<PathBuf> = [PathBuf::from("/d/Name.ext"), PathBuf::from("/d/Name (1).ext")]
            .into_iter()
            .collect();
        let resolved = resolve_collision(PathBuf::from("/d/Name.ext"), Path::new("/s/a.ext"), false, |p| {
            taken.contains(p)
        });
        assert_eq!(resolved, PathBuf::from("/d/Name (2).ext"));
    }

    #[test]
    fn test_resolve_collision_bumps_existing_counter() {
        let taken: HashSet<PathBuf> = [PathBuf::from("/d/Name (3).ext")].into_iter().collect();
        let resolved = resolve_collision(PathBuf::from("/d/Name (3).ext"), Path::new("/s/x"), false, |p| {
            taken.contains(p)
        });
        assert_eq!(resolved, PathBuf::from("/d/Name (4).ext"));
    }

    #[test]
    fn test_resolve_collision_keeps_year_in_parentheses() {
        let resolved = resolve_collision(PathBuf::from("/d/Up (2009).mkv"), Path::new("/s/x"), false, |p| {
            p == Path::new("/d/Up (2009).mkv")
        });
        assert_eq!(resolved, PathBuf::from("/d/Up (2009) (1).mkv"));
    }

    #[test]
    fn test_resolve_collision_source_is_not_a_conflict() {
        let resolved = resolve_collision(PathBuf::from("/d/Name.ext"), Path::new("/d/Name.ext"), false, |_| true);
        assert_eq!(resolved, PathBuf::from("/d/Name.ext"));
    }

    #[test]
    fn test_resolve_collision_directory_keeps_dots() {
        let resolved = resolve_collision(PathBuf::from("/d/Season.1"), Path::new("/s/Season.1"), true, |p| {
            p == Path::new("/d/Season.1")
        });
        assert_eq!(resolved, PathBuf::from("/d/Season.1 (1)"));
    }
}
