// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem monitor feeding the event queue.
//!
//! `notify` delivers debounced path batches from its own thread; an async
//! task filters them, classifies each as created, modified, or deleted,
//! and enqueues the result. Debounced events carry no change kind, so the
//! classification comes from whether the path still exists and whether
//! this watcher has seen it before.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use mnemos_config::model::WatcherConfig;
use mnemos_core::MnemosError;
use mnemos_storage::{EventQueue, EventType};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Paths a classifier remembers before forgetting the oldest.
pub const MAX_TRACKED_PATHS: usize = 100_000;

/// Suffixes of SQLite files, never worth indexing.
const STORAGE_SUFFIXES: &[&str] = &[".db", ".db-journal", ".db-wal", ".db-shm"];

/// Decides which paths reach the queue.
#[derive(Debug, Clone, Default)]
pub struct WatchFilter {
    /// Lowercased substrings.
    excludes: Vec<String>,
    /// Database files owned by this process; their sidecars are ignored too.
    ignored: Vec<String>,
}

impl WatchFilter {
    pub fn new<S: AsRef<str>>(exclude_patterns: &[S], ignored_files: &[PathBuf]) -> Self {
        Self {
            excludes: exclude_patterns
                .iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            ignored: ignored_files
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }

    /// False for excluded paths, SQLite files, and this process's own
    /// database files. Pure: the filesystem is not consulted.
    pub fn should_record(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        if STORAGE_SUFFIXES.iter().any(|s| text.ends_with(s)) {
            return false;
        }
        let own_file = |db: &String| {
            text.strip_prefix(db.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
        };
        if self.ignored.iter().any(own_file) {
            return false;
        }
        let lower = text.to_lowercase();
        !self.excludes.iter().any(|ex| lower.contains(ex.as_str()))
    }
}

/// Remembers which paths have been reported, to tell creation from
/// modification.
///
/// Memory is bounded: past the capacity, the least recently first-seen
/// path is forgotten, and its next change is reported as created again.
#[derive(Debug)]
pub struct ChangeClassifier {
    /// Path to the generation it was last inserted under.
    seen: HashMap<PathBuf, u64>,
    /// Insertion order. Entries whose generation no longer matches `seen`
    /// are stale and skipped on eviction.
    order: VecDeque<(PathBuf, u64)>,
    generation: u64,
    capacity: usize,
}

impl Default for ChangeClassifier {
    fn default() -> Self {
        Self::with_capacity(MAX_TRACKED_PATHS)
    }
}

impl ChangeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashMap::new(),
            order: VecDeque::new(),
            generation: 0,
            capacity: capacity.max(1),
        }
    }

    /// Number of paths currently remembered.
    pub fn tracked(&self) -> usize {
        self.seen.len()
    }

    /// Classify a change to `path` given whether it exists now.
    pub fn classify(&mut self, path: &Path, exists: bool) -> EventType {
        if !exists {
            self.seen.remove(path);
            return EventType::Deleted;
        }
        if self.seen.contains_key(path) {
            return EventType::Modified;
        }

        self.generation += 1;
        self.seen.insert(path.to_path_buf(), self.generation);
        self.order.push_back((path.to_path_buf(), self.generation));
        self.evict();
        EventType::Created
    }

    fn evict(&mut self) {
        while self.seen.len() > self.capacity {
            let Some((oldest, generation)) = self.order.pop_front() else {
                break;
            };
            if self.seen.get(&oldest) == Some(&generation) {
                self.seen.remove(&oldest);
            }
        }
        // Deleted paths leave stale entries behind; compact when they dominate.
        if self.order.len() > self.capacity.saturating_mul(2) {
            let seen = &self.seen;
            self.order
                .retain(|(path, generation)| seen.get(path) == Some(generation));
        }
    }
}

/// Live recursive watches over a set of roots.
pub struct FsWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    roots: Vec<PathBuf>,
}

impl FsWatcher {
    /// Watch every existing root recursively. Missing roots are skipped
    /// with a warning; failing to watch an existing root is an error.
    ///
    /// Changed paths arrive on the returned receiver in debounced batches.
    pub fn start(
        roots: &[PathBuf],
        debounce: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Vec<PathBuf>>), MnemosError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
                    if !paths.is_empty() && tx.send(paths).is_err() {
                        debug!("watch receiver dropped");
                    }
                }
                Err(e) => warn!(error = %e, "file watcher error"),
            }
        })
        .map_err(|e| watcher_err("failed to create file watcher", e))?;

        let mut watched = Vec::new();
        for root in roots {
            if !root.exists() {
                warn!(root = %root.display(), "skipping non-existent watch root");
                continue;
            }
            debouncer
                .watcher()
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| watcher_err(&format!("failed to watch {}", root.display()), e))?;
            info!(root = %root.display(), "watching");
            watched.push(root.clone());
        }

        Ok((
            Self {
                _debouncer: debouncer,
                roots: watched,
            },
            rx,
        ))
    }

    /// Roots actually being watched.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

fn watcher_err(message: &str, err: notify::Error) -> MnemosError {
    MnemosError::Watcher {
        message: message.to_string(),
        source: Some(Box::new(err)),
    }
}

/// Filter, classify, and enqueue one batch. Returns how many events were
/// written.
pub async fn record_batch(
    paths: Vec<PathBuf>,
    filter: &WatchFilter,
    classifier: &mut ChangeClassifier,
    queue: &EventQueue,
) -> Result<usize, MnemosError> {
    let mut recorded = 0;
    for path in paths {
        if !filter.should_record(&path) {
            continue;
        }
        let exists = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => continue,
            Ok(_) => true,
            Err(_) => false,
        };
        let event_type = classifier.classify(&path, exists);
        let path_str = path.to_string_lossy();
        if queue.enqueue_now(event_type.clone(), &path_str).await?.is_some() {
            info!(event_type = %event_type.as_str().to_uppercase(), path = %path_str, "recorded");
            recorded += 1;
        }
    }
    Ok(recorded)
}

/// Watch the configured roots and enqueue changes until `cancel` fires.
pub async fn run_watcher(
    config: &WatcherConfig,
    filter: WatchFilter,
    queue: Arc<EventQueue>,
    cancel: CancellationToken,
) -> Result<(), MnemosError> {
    let roots: Vec<PathBuf> = config.resolved_paths().into_iter().map(PathBuf::from).collect();
    let (watcher, mut rx) = FsWatcher::start(&roots, Duration::from_millis(config.debounce_ms))?;
    if watcher.roots().is_empty() {
        warn!("no watch roots exist; nothing will be recorded");
    }

    let mut classifier = ChangeClassifier::new();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            batch = rx.recv() => {
                let Some(paths) = batch else { break };
                if let Err(e) = record_batch(paths, &filter, &mut classifier, &queue).await {
                    warn!(error = %e, "failed to record file changes");
                }
            }
        }
    }
    info!("file watcher stopped");
    Ok(())
}
