//! Media sorter.
//!
//! Sorting runs in three steps:
//! 1. `analyze`: resolve metadata for every distinct stem (cache first,
//!    then the resolver, a bounded number of lookups at a time)
//! 2. `build_plan`: compute an audience/type/genre destination per file
//! 3. `execute_plan`: simulate, or hand the moves to the queue worker

use crate::core::cache::MetadataCache;
use crate::core::parser;
use crate::core::queue::{QueueCoordinator, QueueRun};
use crate::models::config::{SortKey, SorterSettings};
use crate::models::media::{MediaDetails, MediaInfo, MediaKind};
use crate::models::plan::{
    FileOperation, OperationKind, OperationStatus, SortItem, SortPlan, UnknownItem,
};
use crate::services::resolver::{MetadataProvider, MetadataResolver};
use crate::utils::fs::{file_name_string, file_stem_string};
use crate::Result;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Current plan file version.
pub const PLAN_VERSION: &str = "1.0";

/// Outcome of analyzing one file.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisStatus {
    /// Metadata found (from cache or a provider).
    Resolved { details: MediaDetails, cached: bool },
    /// Lookup returned nothing or failed.
    Failed(String),
    /// Nothing searchable in the file name.
    Skipped,
}

/// Analysis result for a single file.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub file: PathBuf,
    pub status: AnalysisStatus,
}

/// Analysis results in input order.
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub results: Vec<AnalysisResult>,
}

impl AnalysisReport {
    pub fn resolved(&self) -> usize {
        self.count(|s| matches!(s, AnalysisStatus::Resolved { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, AnalysisStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, AnalysisStatus::Skipped))
    }

    fn count(&self, pred: impl Fn(&AnalysisStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }
}

/// Title, year and kind entered by hand for a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCorrection {
    pub title: String,
    pub year: Option<String>,
    pub is_series: bool,
}

/// What `execute_plan` did.
pub enum SortExecution {
    /// Simulation log, one line per item.
    Simulated(Vec<String>),
    /// Operations were handed to the queue worker.
    Started(QueueRun),
}

/// Sorts media files into an audience/type/genre folder tree.
pub struct MetadataSorter {
    settings: SorterSettings,
    cache: MetadataCache,
}

impl MetadataSorter {
    pub fn new(settings: SorterSettings, cache: MetadataCache) -> Self {
        Self { settings, cache }
    }

    pub fn settings(&self) -> &SorterSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SorterSettings) {
        self.settings = settings;
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut MetadataCache {
        &mut self.cache
    }

    /// Resolve metadata for `files`.
    ///
    /// Files sharing a stem share one lookup. The cache file is rewritten
    /// after every successful lookup.
    pub async fn analyze<P: MetadataProvider>(
        &mut self,
        files: &[PathBuf],
        resolver: &MetadataResolver<P>,
    ) -> AnalysisReport {
        let mut pending: Vec<(String, MediaInfo)> = Vec::new();
        let mut seen = HashSet::new();

        for file in files {
            let stem = file_stem_string(file);
            if self.cache.contains(&stem) || !seen.insert(stem.clone()) {
                continue;
            }
            if parser::clean_title(&stem).is_empty() {
                continue;
            }
            pending.push((stem.clone(), parser::parse_filename(&stem)));
        }

        tracing::info!(
            "Analyzing {} files ({} lookups needed)",
            files.len(),
            pending.len()
        );

        let concurrency = self.settings.max_concurrent_lookups.max(1);
        let mut lookups = stream::iter(pending)
            .map(|(stem, info)| async move {
                let result = resolver
                    .resolve(&info.title, info.year.as_deref(), info.is_series())
                    .await;
                (stem, result)
            })
            .buffer_unordered(concurrency);

        // Each result is cached and saved as soon as it arrives.
        let mut failures: HashMap<String, String> = HashMap::new();
        while let Some((stem, result)) = lookups.next().await {
            match result {
                Ok(Some(details)) => {
                    self.cache.insert(stem, details);
                    if let Err(e) = self.cache.save() {
                        tracing::error!("Failed to save metadata cache: {}", e);
                    }
                }
                Ok(None) => {
                    tracing::warn!("No API data found for {}", stem);
                    failures.insert(stem, "no metadata found".to_string());
                }
                Err(e) => {
                    tracing::warn!("Lookup failed for {}: {}", stem, e);
                    failures.insert(stem, e.to_string());
                }
            }
        }

        let results = files
            .iter()
            .map(|file| {
                let stem = file_stem_string(file);
                let status = if let Some(details) = self.cache.get(&stem) {
                    AnalysisStatus::Resolved {
                        details: details.clone(),
                        cached: !seen.contains(&stem),
                    }
                } else if let Some(reason) = failures.get(&stem) {
                    AnalysisStatus::Failed(reason.clone())
                } else {
                    tracing::warn!("Could not parse title from {}", file_name_string(file));
                    AnalysisStatus::Skipped
                };
                AnalysisResult {
                    file: file.clone(),
                    status,
                }
            })
            .collect();

        AnalysisReport { results }
    }

    /// Resolve `files` with a title supplied by the user.
    ///
    /// Used for files whose parsed name found nothing. One lookup is made
    /// and the result is cached under each file's own stem.
    pub async fn analyze_with_correction<P: MetadataProvider>(
        &mut self,
        files: &[PathBuf],
        correction: &TitleCorrection,
        resolver: &MetadataResolver<P>,
    ) -> AnalysisReport {
        tracing::info!(
            "Looking up corrected title '{}' ({:?}) for {} files",
            correction.title,
            correction.year,
            files.len()
        );

        let status = match resolver
            .resolve(&correction.title, correction.year.as_deref(), correction.is_series)
            .await
        {
            Ok(Some(details)) => {
                for file in files {
                    self.cache.insert(file_stem_string(file), details.clone());
                }
                if let Err(e) = self.cache.save() {
                    tracing::error!("Failed to save metadata cache: {}", e);
                }
                AnalysisStatus::Resolved {
                    details,
                    cached: false,
                }
            }
            Ok(None) => {
                tracing::warn!("No API data found for {}", correction.title);
                AnalysisStatus::Failed("no metadata found".to_string())
            }
            Err(e) => {
                tracing::warn!("Lookup failed for {}: {}", correction.title, e);
                AnalysisStatus::Failed(e.to_string())
            }
        };

        let results = files
            .iter()
            .map(|file| AnalysisResult {
                file: file.clone(),
                status: status.clone(),
            })
            .collect();
        AnalysisReport { results }
    }

    /// Destination folder for resolved details.
    pub fn destination_folder(&self, base: &Path, details: &MediaDetails) -> PathBuf {
        let mut dest = base.to_path_buf();

        if self.settings.create_audience_folders {
            dest.push(details.audience_category().as_str());
        }

        if self.settings.create_type_folders {
            dest.push(match details.kind {
                MediaKind::Tv => &self.settings.tv_folder,
                MediaKind::Movie => &self.settings.movie_folder,
                MediaKind::Unknown => &self.settings.unknown_folder,
            });
        }

        match self.settings.sort_by {
            SortKey::Genre if self.settings.create_genre_folders => {
                if let Some(genre) = details.primary_genre() {
                    dest.push(genre);
                }
            }
            SortKey::Year => {
                if let Some(ref year) = details.year {
                    dest.push(year);
                }
            }
            _ => {}
        }

        dest
    }

    /// Build a sort plan from cached metadata.
    ///
    /// Files without cached details are listed under `unknown`.
    pub fn build_plan(
        &self,
        files: &[PathBuf],
        rename_enabled: bool,
        operation: OperationKind,
    ) -> Result<SortPlan> {
        let base = self
            .settings
            .base_folder
            .clone()
            .ok_or(crate::Error::NoDestination)?;

        let mut plan = SortPlan {
            version: PLAN_VERSION.to_string(),
            created_at: Utc::now().to_rfc3339(),
            base_folder: base.clone(),
            operation,
            simulate: self.settings.simulate,
            items: Vec::new(),
            unknown: Vec::new(),
        };

        for file in files {
            let stem = file_stem_string(file);
            let Some(details) = self.cache.get(&stem) else {
                tracing::debug!("No media info for: {}", file_name_string(file));
                plan.unknown.push(UnknownItem {
                    source: file.clone(),
                    reason: "no media info".to_string(),
                });
                continue;
            };

            let name = if rename_enabled {
                parser::rename_with_extension(file)
            } else {
                file_name_string(file)
            };
            let destination = self.destination_folder(&base, details).join(name);

            plan.items.push(SortItem {
                id: Uuid::new_v4().to_string(),
                source: file.clone(),
                destination,
                details: details.clone(),
                audience: details.audience_category(),
            });
        }

        tracing::info!(
            "Sort plan: {} files to sort, {} unknown",
            plan.items.len(),
            plan.unknown.len()
        );
        Ok(plan)
    }

    /// Simulate or execute a plan.
    pub fn execute_plan(
        &self,
        plan: &SortPlan,
        coordinator: &mut QueueCoordinator,
    ) -> Result<SortExecution> {
        if plan.simulate {
            let log = plan
                .items
                .iter()
                .map(|item| {
                    let line = format!(
                        "SIMULATION: Would {} '{}' to '{}'",
                        plan.operation,
                        file_name_string(&item.source),
                        item.destination.display()
                    );
                    tracing::info!("{}", line);
                    line
                })
                .collect();
            return Ok(SortExecution::Simulated(log));
        }

        let operations = plan
            .items
            .iter()
            .map(|item| FileOperation {
                source: item.source.clone(),
                destination: item.destination.clone(),
                is_directory: item.source.is_dir(),
                kind: plan.operation,
                rename_applied: file_name_string(&item.source) != file_name_string(&item.destination),
                status: OperationStatus::Ready,
            })
            .collect();

        Ok(SortExecution::Started(coordinator.execute_operations(operations)?))
    }
}

/// Save a plan to a JSON file.
pub fn save_plan(plan: &SortPlan, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;

    tracing::info!("Plan saved to {:?}", path);
    Ok(())
}

/// Load a plan from a JSON file.
///
/// Plans written by another plan format version are rejected.
pub fn load_plan(path: &Path) -> Result<SortPlan> {
    let content = fs::read_to_string(path)?;
    let plan: SortPlan = serde_json::from_str(&content)
        .map_err(|e| crate::Error::InvalidPlanFile(format!("{}: {}", path.display(), e)))?;

    if plan.version != PLAN_VERSION {
        return Err(crate::Error::InvalidPlanFile(format!(
            "{}: unsupported plan version {}",
            path.display(),
            plan.version
        )));
    }
    Ok(plan)
}

/// Default plan output path inside `dir`.
pub fn default_plan_path(dir: &Path) -> PathBuf {
    dir.join(format!(
        "sort_plan_{}_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S"),
        &Uuid::new_v4().to_string()[..8]
    ))
}
