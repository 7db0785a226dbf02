//! Copy/move queue coordination.
//!
//! The [`QueueCoordinator`] owns the list of queued files and the mover
//! settings. Every settings change rebuilds the destination of every queued
//! operation, so what runs is always consistent with the latest settings.
//! Execution happens on one blocking worker that owns a snapshot of the
//! operations and reports over a bounded channel.

use crate::core::executor::{ExecutorConfig, FileExecutor, FsExecutor};
use crate::core::monitor::{TaskMonitor, DEFAULT_CHECK_INTERVAL};
use crate::core::parser;
use crate::models::config::MoverSettings;
use crate::models::plan::{BatchSummary, FileOperation, OperationKind, OperationStatus};
use crate::utils::fs::{absolute, file_name_string, resolve_collision};
use crate::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Capacity of the progress channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default running time after which a run is reported as stalled.
pub const DEFAULT_STALL_THRESHOLD: Duration = Duration::from_secs(30 * 60);

/// Result of queueing a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Added,
    AlreadyQueued,
}

/// Event published by a running worker.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// An operation finished (successfully or not).
    Progress {
        completed: usize,
        total: usize,
        fraction: f64,
    },
    /// Human-readable per-item message.
    Message(String),
    /// The run has exceeded its expected duration.
    Stalled(String),
    /// The run stopped early; `remaining` operations were not started.
    Cancelled { remaining: usize },
    /// The run completed.
    Finished(BatchSummary),
}

/// Cooperative cancellation flag shared with a worker.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request cancellation. The operation in flight still completes.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handles of a running queue execution.
pub struct QueueRun {
    /// Progress events, in the order they happened.
    pub events: mpsc::Receiver<ProgressEvent>,
    /// Cancellation for this run.
    pub cancel: CancelHandle,
    /// Worker handle yielding the final summary.
    pub handle: JoinHandle<BatchSummary>,
}

/// Queue of pending copy/move operations.
pub struct QueueCoordinator {
    settings: MoverSettings,
    operations: Vec<FileOperation>,
    executor: Option<Arc<dyn FileExecutor>>,
    running: Arc<AtomicBool>,
    stall_threshold: Duration,
}

impl QueueCoordinator {
    /// Create a coordinator using the filesystem executor.
    pub fn new(settings: MoverSettings) -> Self {
        Self {
            settings,
            operations: Vec::new(),
            executor: None,
            running: Arc::new(AtomicBool::new(false)),
            stall_threshold: DEFAULT_STALL_THRESHOLD,
        }
    }

    /// Create a coordinator with a custom executor.
    pub fn with_executor(settings: MoverSettings, executor: Arc<dyn FileExecutor>) -> Self {
        Self {
            executor: Some(executor),
            ..Self::new(settings)
        }
    }

    /// Override the stall threshold of future runs. Short thresholds are
    /// also checked more often.
    pub fn set_stall_threshold(&mut self, threshold: Duration) {
        self.stall_threshold = threshold;
    }

    pub fn settings(&self) -> &MoverSettings {
        &self.settings
    }

    /// Whether a worker is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Add a file or directory to the queue.
    ///
    /// Paths are compared in canonical absolute form, so the same file
    /// queued twice through different spellings is kept once.
    pub fn enqueue(&mut self, path: &Path) -> Result<EnqueueOutcome> {
        if !path.exists() {
            tracing::warn!("File does not exist: {:?}", path);
            return Err(crate::Error::PathNotFound(path.display().to_string()));
        }

        let resolved = absolute(path)?;
        if self.operations.iter().any(|op| op.source == resolved) {
            tracing::debug!("File already in queue: {:?}", resolved);
            return Ok(EnqueueOutcome::AlreadyQueued);
        }

        tracing::debug!("Added file to queue: {:?}", resolved);
        self.operations.push(FileOperation {
            is_directory: resolved.is_dir(),
            source: resolved,
            destination: PathBuf::new(),
            kind: self.settings.operation,
            rename_applied: false,
            status: OperationStatus::Queued,
        });

        if self.settings.destination_folder.is_some() {
            self.recompute();
        }
        Ok(EnqueueOutcome::Added)
    }

    pub fn set_destination_folder(&mut self, folder: Option<PathBuf>) {
        self.settings.destination_folder = folder;
        self.recompute();
    }

    pub fn set_rename_enabled(&mut self, enabled: bool) {
        self.settings.rename_enabled = enabled;
        self.recompute();
    }

    pub fn set_operation_kind(&mut self, kind: OperationKind) {
        self.settings.operation = kind;
        self.recompute();
    }

    /// Replace all mover settings at once.
    pub fn apply_settings(&mut self, settings: MoverSettings) {
        self.settings = settings;
        self.recompute();
    }

    /// Remove a queued path. Returns whether it was queued.
    pub fn remove(&mut self, path: &Path) -> bool {
        let resolved = absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let before = self.operations.len();
        self.operations.retain(|op| op.source != resolved);
        let removed = self.operations.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.operations.clear();
        tracing::debug!("Queue cleared");
    }

    /// Queued source paths in enqueue order.
    pub fn queued_files(&self) -> Vec<PathBuf> {
        self.operations.iter().map(|op| op.source.clone()).collect()
    }

    /// Current operations in enqueue order.
    pub fn operations(&self) -> &[FileOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Destination for `source` under the current settings.
    ///
    /// Returns the path and whether the parser produced the name. Returns
    /// `None` when no destination folder is configured.
    pub fn compute_destination(
        &self,
        source: &Path,
        is_directory: bool,
        planned: &HashSet<PathBuf>,
    ) -> Option<(PathBuf, bool)> {
        let folder = self.settings.destination_folder.as_ref()?;

        let original = file_name_string(source);
        let (name, renamed) = if self.settings.rename_enabled && !is_directory {
            let name = parser::rename_with_extension(source);
            tracing::debug!("Generated new name: {} -> {}", original, name);
            (name, true)
        } else {
            (original, false)
        };

        let destination = resolve_collision(folder.join(name), source, is_directory, |p| {
            p.exists() || planned.contains(p)
        });
        Some((destination, renamed))
    }

    /// Rebuild every queued operation from the current settings.
    fn recompute(&mut self) {
        let Some(ref folder) = self.settings.destination_folder else {
            tracing::debug!("No destination folder set");
            for op in &mut self.operations {
                op.destination = PathBuf::new();
                op.status = OperationStatus::Queued;
            }
            return;
        };
        tracing::debug!(
            "Updating queue destination to {:?} (rename: {})",
            folder,
            self.settings.rename_enabled
        );

        let mut planned = HashSet::new();
        let mut operations = std::mem::take(&mut self.operations);

        for op in &mut operations {
            op.kind = self.settings.operation;
            if !op.source.exists() {
                tracing::warn!("File no longer exists: {:?}", op.source);
                op.status = OperationStatus::Queued;
                continue;
            }

            if let Some((destination, renamed)) =
                self.compute_destination(&op.source, op.is_directory, &planned)
            {
                planned.insert(destination.clone());
                op.destination = destination;
                op.rename_applied = renamed;
                op.status = OperationStatus::Ready;
            }
        }

        self.operations = operations;
        tracing::debug!("Queue updated with {} operations", planned.len());
    }

    fn file_executor(&self) -> Arc<dyn FileExecutor> {
        match self.executor {
            Some(ref executor) => executor.clone(),
            None => Arc::new(FsExecutor::with_config(ExecutorConfig {
                verify_checksum: self.settings.verify_checksum,
                recursive: self.settings.recursive,
            })),
        }
    }

    /// Start processing the queue on a background worker.
    ///
    /// Precondition failures are returned here; per-file failures are
    /// reported through the event channel.
    pub fn execute_queue(&mut self) -> Result<QueueRun> {
        if self.operations.is_empty() {
            return Err(crate::Error::EmptyQueue);
        }
        if self.settings.destination_folder.is_none() {
            return Err(crate::Error::NoDestination);
        }
        if self.is_running() {
            return Err(crate::Error::RunInProgress);
        }

        self.recompute();

        // Vanished sources stay in the snapshot; the worker reports them as failures.
        let snapshot: Vec<FileOperation> = self
            .operations
            .iter_mut()
            .map(|op| {
                op.status = OperationStatus::Executing;
                op.clone()
            })
            .collect();

        Ok(self.spawn_worker(snapshot))
    }

    /// Run externally planned operations through the same worker.
    ///
    /// Destinations are kept unless they collide with the filesystem or
    /// with an earlier operation in the batch.
    pub fn execute_operations(&mut self, operations: Vec<FileOperation>) -> Result<QueueRun> {
        if operations.is_empty() {
            return Err(crate::Error::EmptyQueue);
        }
        if self.is_running() {
            return Err(crate::Error::RunInProgress);
        }

        let mut planned = HashSet::new();
        let operations = operations
            .into_iter()
            .map(|mut op| {
                op.destination = resolve_collision(
                    op.destination.clone(),
                    &op.source,
                    op.is_directory,
                    |p| p.exists() || planned.contains(p),
                );
                planned.insert(op.destination.clone());
                op.status = OperationStatus::Executing;
                op
            })
            .collect();

        Ok(self.spawn_worker(operations))
    }

    fn spawn_worker(&self, operations: Vec<FileOperation>) -> QueueRun {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancelHandle::default();
        let executor = self.file_executor();

        self.running.store(true, Ordering::SeqCst);
        TaskMonitor::new("file queue", self.running.clone(), self.stall_threshold)
            .with_check_interval(DEFAULT_CHECK_INTERVAL.min(self.stall_threshold))
            .spawn(&tx);

        let running = self.running.clone();
        let worker_cancel = cancel.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let summary = process_operations(operations, executor.as_ref(), &tx, &worker_cancel);
            running.store(false, Ordering::SeqCst);
            summary
        });

        QueueRun {
            events: rx,
            cancel,
            handle,
        }
    }

    /// Reconcile the queue after a run.
    ///
    /// Moved sources leave the queue; everything else is planned again.
    pub fn finish_run(&mut self, summary: &BatchSummary) {
        let moved: HashSet<&PathBuf> = summary.moved_sources.iter().collect();
        self.operations.retain(|op| !moved.contains(&op.source));
        self.recompute();
        tracing::info!(
            "Run reconciled: {} moved out, {} still queued",
            moved.len(),
            self.operations.len()
        );
    }
}

fn emit(tx: &mpsc::Sender<ProgressEvent>, event: ProgressEvent) {
    if tx.blocking_send(event).is_err() {
        tracing::debug!("Progress receiver dropped");
    }
}

/// Execute operations in order, reporting every outcome.
fn process_operations(
    mut operations: Vec<FileOperation>,
    executor: &dyn FileExecutor,
    tx: &mpsc::Sender<ProgressEvent>,
    cancel: &CancelHandle,
) -> BatchSummary {
    let total = operations.len();
    let mut summary = BatchSummary::default();
    tracing::info!("Processing {} queued operations", total);

    for idx in 0..total {
        if cancel.is_cancelled() {
            let remaining = total - idx;
            for op in &mut operations[idx..] {
                op.status = OperationStatus::Cancelled;
            }
            tracing::info!("Run cancelled, {} operations not started", remaining);
            summary.cancelled = true;
            emit(tx, ProgressEvent::Cancelled { remaining });
            return summary;
        }

        let op = &mut operations[idx];
        let message = if op.source == op.destination && op.source.exists() {
            op.status = OperationStatus::Done;
            summary.unchanged += 1;
            format!("{} (unchanged)", op.source_name())
        } else {
            match process_one(op, executor) {
                Ok(message) => {
                    op.status = OperationStatus::Done;
                    summary.succeeded += 1;
                    if op.kind == OperationKind::Move {
                        summary.moved_sources.push(op.source.clone());
                    }
                    message
                }
                Err(message) => {
                    op.status = OperationStatus::Failed;
                    summary.failed += 1;
                    tracing::error!("{}", message);
                    message
                }
            }
        };

        summary.messages.push(message.clone());
        emit(tx, ProgressEvent::Message(message));

        let completed = idx + 1;
        emit(
            tx,
            ProgressEvent::Progress {
                completed,
                total,
                fraction: completed as f64 / total as f64,
            },
        );
    }

    tracing::info!(
        "Run finished: {} succeeded, {} unchanged, {} failed",
        summary.succeeded,
        summary.unchanged,
        summary.failed
    );
    emit(tx, ProgressEvent::Finished(summary.clone()));
    summary
}

fn process_one(
    op: &mut FileOperation,
    executor: &dyn FileExecutor,
) -> std::result::Result<String, String> {
    let source_name = op.source_name();
    if !op.source.exists() {
        return Err(format!("Source file not found: {}", op.source.display()));
    }

    op.status = OperationStatus::Executing;
    tracing::debug!("Processing operation: {:?} -> {:?}", op.source, op.destination);

    let result = match (op.is_directory, op.kind) {
        (false, OperationKind::Copy) => executor.copy(&op.source, &op.destination),
        (false, OperationKind::Move) => executor.move_file(&op.source, &op.destination),
        (true, OperationKind::Copy) => executor.copy_tree(&op.source, &op.destination),
        (true, OperationKind::Move) => executor.move_tree(&op.source, &op.destination),
    };
    if let Err(e) = result {
        return Err(format!("Error processing {}: {}", source_name, e));
    }

    let past = op.kind.past_tense();
    let destination_name = op.destination_name();
    Ok(if op.is_directory {
        format!("Successfully {} folder: {}", past, source_name)
    } else if op.rename_applied && destination_name != source_name {
        format!(
            "Successfully {} and renamed {} to {}",
            past, source_name, destination_name
        )
    } else {
        format!("Successfully {} {}", past, source_name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    fn settings(dest: &Path) -> MoverSettings {
        MoverSettings {
            destination_folder: Some(dest.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_enqueue_missing_path() {
        let mut queue = QueueCoordinator::new(MoverSettings::default());
        let result = queue.enqueue(Path::new("/definitely/not/here.mkv"));
        assert!(matches!(result, Err(crate::Error::PathNotFound(_))));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_enqueue_dedups() {
        let src = TempDir::new().unwrap();
        let file = touch(src.path(), "a.mkv");
        let mut queue = QueueCoordinator::new(MoverSettings::default());

        assert_eq!(queue.enqueue(&file).unwrap(), EnqueueOutcome::Added);
        let dotted = src.path().join(".").join("a.mkv");
        assert_eq!(queue.enqueue(&dotted).unwrap(), EnqueueOutcome::AlreadyQueued);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.operations()[0].status, OperationStatus::Queued);
    }

    #[test]
    fn test_same_name_sources_get_distinct_destinations() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let mut queue = QueueCoordinator::new(settings(dest.path()));

        queue.enqueue(&touch(a.path(), "clip.mp4")).unwrap();
        queue.enqueue(&touch(b.path(), "clip.mp4")).unwrap();

        let names: Vec<_> = queue.operations().iter().map(|op| op.destination_name()).collect();
        assert_eq!(names, vec!["clip.mp4", "clip (1).mp4"]);
    }

    #[test]
    fn test_remove_frees_destination() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let mut queue = QueueCoordinator::new(settings(dest.path()));

        let first = touch(a.path(), "clip.mp4");
        queue.enqueue(&first).unwrap();
        queue.enqueue(&touch(b.path(), "clip.mp4")).unwrap();

        assert!(queue.remove(&first));
        assert_eq!(queue.operations()[0].destination_name(), "clip.mp4");
        assert!(!queue.remove(&first));
        assert_eq!(queue.queued_files().len(), 1);

        queue.clear();
        assert!(queue.queued_files().is_empty());
    }

    #[test]
    fn test_execute_preconditions() {
        let mut queue = QueueCoordinator::new(MoverSettings::default());
        assert!(matches!(queue.execute_queue(), Err(crate::Error::EmptyQueue)));

        let src = TempDir::new().unwrap();
        queue.enqueue(&touch(src.path(), "a.mkv")).unwrap();
        assert!(matches!(queue.execute_queue(), Err(crate::Error::NoDestination)));
    }

    #[test]
    fn test_cancelled_before_start_processes_nothing() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let ops = vec![FileOperation {
            source: touch(src.path(), "a.mkv"),
            destination: dest.path().join("a.mkv"),
            is_directory: false,
            kind: OperationKind::Copy,
            rename_applied: false,
            status: OperationStatus::Executing,
        }];

        let (tx, mut rx) = mpsc::channel(8);
        let cancel = CancelHandle::default();
        cancel.cancel();
        let summary = process_operations(ops, &FsExecutor::new(), &tx, &cancel);

        assert!(summary.cancelled);
        assert_eq!(summary.total(), 0);
        assert!(matches!(rx.try_recv(), Ok(ProgressEvent::Cancelled { remaining: 1 })));
        assert!(!dest.path().join("a.mkv").exists());
    }

    struct SlowExecutor;

    impl FileExecutor for SlowExecutor {
        fn copy(&self, _from: &Path, _to: &Path) -> Result<()> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        }

        fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
            self.copy(from, to)
        }

        fn copy_tree(&self, from: &Path, to: &Path) -> Result<()> {
            self.copy(from, to)
        }

        fn move_tree(&self, from: &Path, to: &Path) -> Result<()> {
            self.copy(from, to)
        }
    }

    #[tokio::test]
    async fn test_slow_run_reports_stall() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let mut queue = QueueCoordinator::with_executor(settings(dest.path()), Arc::new(SlowExecutor));
        queue.set_stall_threshold(Duration::from_millis(20));
        queue.enqueue(&touch(src.path(), "a.mkv")).unwrap();

        let mut run = queue.execute_queue().unwrap();
        let mut stalled = 0;
        while let Some(event) = run.events.recv().await {
            if let ProgressEvent::Stalled(_) = event {
                stalled += 1;
            }
        }
        let summary = run.handle.await.unwrap();

        assert_eq!(stalled, 1);
        assert_eq!(summary.succeeded, 1);
        assert!(!queue.is_running());
    }
}
