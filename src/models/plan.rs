//! Queue and plan data models.

use super::media::{AudienceCategory, MediaDetails};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Operation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    #[default]
    Copy,
    Move,
}

impl OperationKind {
    /// Past tense used in result messages.
    pub fn past_tense(&self) -> &'static str {
        match self {
            OperationKind::Copy => "copied",
            OperationKind::Move => "moved",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Copy => write!(f, "copy"),
            OperationKind::Move => write!(f, "move"),
        }
    }
}

impl std::str::FromStr for OperationKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "copy" => Ok(OperationKind::Copy),
            "move" => Ok(OperationKind::Move),
            other => Err(crate::Error::InvalidSetting(
                "operation".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// Lifecycle of a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// Accepted into the queue, no destination yet.
    Queued,
    /// Destination computed.
    Ready,
    Executing,
    Done,
    Failed,
    Cancelled,
}

/// A planned or executed file transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOperation {
    /// Absolute source path.
    pub source: PathBuf,
    /// Computed destination path.
    pub destination: PathBuf,
    /// Whether the source is a directory.
    pub is_directory: bool,
    /// Copy or move.
    pub kind: OperationKind,
    /// Whether the destination name was produced by the filename parser.
    pub rename_applied: bool,
    /// Current status.
    pub status: OperationStatus,
}

impl FileOperation {
    /// Source file name for display.
    pub fn source_name(&self) -> String {
        display_name(&self.source)
    }

    /// Destination file name for display.
    pub fn destination_name(&self) -> String {
        display_name(&self.destination)
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Outcome counts of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Items processed successfully.
    pub succeeded: usize,
    /// Items left as they were.
    pub unchanged: usize,
    /// Items that failed.
    pub failed: usize,
    /// Whether the batch was cancelled before completion.
    pub cancelled: bool,
    /// Sources that were moved away (they leave the queue).
    #[serde(default)]
    pub moved_sources: Vec<PathBuf>,
    /// Human-readable per-item messages, in order.
    #[serde(default)]
    pub messages: Vec<String>,
}

impl BatchSummary {
    /// Total items accounted for.
    pub fn total(&self) -> usize {
        self.succeeded + self.unchanged + self.failed
    }
}

/// Sort plan generated before any filesystem change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortPlan {
    /// Plan version.
    pub version: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Base folder of the sorted library.
    pub base_folder: PathBuf,
    /// Copy or move.
    pub operation: OperationKind,
    /// Whether the plan only logs what it would do.
    pub simulate: bool,
    /// Files with a destination.
    pub items: Vec<SortItem>,
    /// Files without metadata.
    pub unknown: Vec<UnknownItem>,
}

/// A single item in the sort plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortItem {
    /// Unique item ID.
    pub id: String,
    /// Source file.
    pub source: PathBuf,
    /// Planned destination.
    pub destination: PathBuf,
    /// Metadata used to place the file.
    pub details: MediaDetails,
    /// Audience folder.
    pub audience: AudienceCategory,
}

/// File left out of the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnknownItem {
    /// Source file.
    pub source: PathBuf,
    /// Reason for exclusion.
    pub reason: String,
}
