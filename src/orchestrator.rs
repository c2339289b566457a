//! Detection pipeline for coordinating a whole run
//!
//! This module provides:
//! - Workflow coordination: detect → read → normalize → merge
//! - One task per manifest, bounded by a semaphore
//! - A single reducer merging results in submission order
//! - Cancellation between files, discarding partial results
//! - Per-file error collection alongside the best-effort graph

use crate::config::DetectionConfig;
use crate::domain::Ecosystem;
use crate::error::{
    AppError, ConfigError, CycleDetectedError, DetectionError, FileReadError, ParseWarning,
};
use crate::graph::{DependencyGraph, FileContribution, GraphBuilder, NodeRef};
use crate::manifest::{detect_manifests, ManifestInfo, ManifestSource, ReaderSet};
use crate::normalize::Normalizer;
use crate::progress::Progress;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Cooperative cancellation flag shared by the reducer and its workers
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Creates a handle in the not-cancelled state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests cancellation; workers stop before their next file
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once cancellation is requested
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so waiting cannot fail while we hold it
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a completed run
#[derive(Debug, Default)]
pub struct DetectionOutcome {
    /// Merged component graph
    pub graph: DependencyGraph,
    /// Per-file diagnostics in submission order
    pub diagnostics: Vec<DetectionError>,
    /// Number of manifests submitted
    pub files: usize,
}

/// Per-run state owned by the reducer
#[derive(Debug, Default)]
pub struct RunContext {
    builder: GraphBuilder,
    diagnostics: Vec<DetectionError>,
}

/// What a worker produced for one manifest
#[derive(Debug)]
pub struct FileOutcome {
    /// Graph contribution of the file
    pub contribution: FileContribution,
    /// Declarations that were skipped
    pub warnings: Vec<ParseWarning>,
    /// Declarations of the manifest's own package that were dropped
    pub cycles: Vec<CycleDetectedError>,
}

/// A worker's result for one manifest
pub type WorkerResult = Result<FileOutcome, FileReadError>;

impl RunContext {
    /// Creates an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one file's result, recording its diagnostics
    pub fn apply(&mut self, result: WorkerResult) {
        match result {
            Ok(FileOutcome {
                contribution,
                warnings,
                cycles,
            }) => {
                let path = contribution.path.clone();
                for warning in warnings {
                    warn!(path = %path.display(), "{}", warning);
                    self.diagnostics.push(DetectionError::parse(&path, warning));
                }
                for cycle in cycles {
                    warn!(path = %path.display(), cycle = %cycle.cycle.join(" -> "), "dropping self-dependency");
                    self.diagnostics.push(cycle.into());
                }
                for cycle in self.builder.merge(contribution) {
                    self.diagnostics.push(cycle.into());
                }
            }
            Err(err) => {
                warn!(path = %err.path.display(), error = %err.source, "dropping unreadable manifest");
                self.diagnostics.push(err.into());
            }
        }
    }

    /// Finishes the run
    pub fn finish(self, files: usize) -> DetectionOutcome {
        DetectionOutcome {
            graph: self.builder.build(),
            diagnostics: self.diagnostics,
            files,
        }
    }
}

/// Reads one manifest into a graph contribution.
///
/// Pure apart from logging: the same content always yields the same result.
pub fn contribute(
    readers: &ReaderSet,
    normalizer: &Normalizer,
    config: &DetectionConfig,
    path: &Path,
    ecosystem: Ecosystem,
    content: &str,
) -> FileOutcome {
    let reader = readers.select(ecosystem, path);
    let mut contribution = FileContribution::new(path, reader.kind());
    let mut own = None;
    if let Some(identity) = reader.identity(content) {
        let component = normalizer.package(ecosystem, &identity, path);
        own = Some((
            component.ecosystem.name_key(&component.name),
            component.id.clone(),
            format!("{}@{}", component.name, component.version),
        ));
        contribution = contribution.with_identity(component);
    }
    let root = contribution.root.clone();

    let mut warnings = Vec::new();
    let mut cycles = Vec::new();
    for item in reader.declarations(content) {
        let declaration = match item {
            Ok(declaration) => declaration,
            Err(warning) => {
                warnings.push(warning);
                continue;
            }
        };
        if config.should_ignore(declaration.ecosystem, &declaration.name) {
            debug!(path = %path.display(), package = %declaration.name, "ignoring package");
            continue;
        }

        let parent = match &declaration.parent {
            Some(package) => {
                let parent = normalizer.package(declaration.ecosystem, package, path);
                let id = parent.id.clone();
                contribution.add_component(parent);
                NodeRef::Component(id)
            }
            None => root.clone(),
        };
        let child = normalizer.component(&declaration, path);
        // The manifest's own package at any version is a self-dependency
        if let Some((key, id, label)) = &own {
            if declaration.parent.is_none()
                && child.ecosystem == ecosystem
                && child.ecosystem.name_key(&child.name) == *key
            {
                let mut cycle = vec![label.clone()];
                if child.id != *id {
                    cycle.push(format!("{}@{}", child.name, child.version));
                }
                cycle.push(label.clone());
                cycles.push(CycleDetectedError::new(path, cycle));
                continue;
            }
        }
        let child_id = child.id.clone();
        contribution.add_component(child);
        contribution.add_edge(parent, child_id);
    }

    debug!(
        path = %path.display(),
        kind = %reader.kind(),
        components = contribution.components.len(),
        warnings = warnings.len(),
        "read manifest"
    );
    FileOutcome {
        contribution,
        warnings,
        cycles,
    }
}

/// A manifest queued for a worker
struct Job {
    seq: usize,
    path: PathBuf,
    ecosystem: Ecosystem,
    content: Option<String>,
}

/// Pipeline for detecting components across many manifests
pub struct Pipeline {
    config: Arc<DetectionConfig>,
    readers: Arc<ReaderSet>,
    normalizer: Arc<Normalizer>,
    cancel: CancelHandle,
    show_progress: bool,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: DetectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            readers: Arc::new(ReaderSet::new()),
            normalizer: Arc::new(Normalizer::new()),
            cancel: CancelHandle::new(),
            show_progress: false,
        })
    }

    /// Enables the progress display
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Returns a handle that cancels this pipeline's runs
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Returns the configuration in use
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Discovers manifests under `root` and scans them
    pub async fn detect(&self, root: &Path) -> Result<DetectionOutcome, AppError> {
        let mut progress = Progress::new(self.show_progress);
        progress.spinner("Detecting manifest files...");
        let manifests = detect_manifests(root, &self.config.ecosystems, &self.config.exclude_dirs);
        progress.finish_and_clear();

        info!(root = %root.display(), manifests = manifests.len(), "discovered manifests");
        self.scan(manifests).await
    }

    /// Runs the pipeline over discovered manifests; workers read the files
    pub async fn scan(&self, manifests: Vec<ManifestInfo>) -> Result<DetectionOutcome, AppError> {
        let jobs = manifests
            .into_iter()
            .enumerate()
            .map(|(seq, info)| Job {
                seq,
                path: info.path,
                ecosystem: info.ecosystem,
                content: None,
            })
            .collect();
        self.execute(jobs).await
    }

    /// Runs the pipeline over manifests whose content is already loaded
    pub async fn run(&self, sources: Vec<ManifestSource>) -> Result<DetectionOutcome, AppError> {
        let jobs = sources
            .into_iter()
            .enumerate()
            .map(|(seq, source)| Job {
                seq,
                path: source.path,
                ecosystem: source.ecosystem,
                content: Some(source.content),
            })
            .collect();
        self.execute(jobs).await
    }

    async fn execute(&self, jobs: Vec<Job>) -> Result<DetectionOutcome, AppError> {
        let total = jobs.len();
        let workers = self.config.workers();
        info!(files = total, workers, "starting detection run");

        let semaphore = Arc::new(Semaphore::new(workers));
        let (tx, mut rx) = mpsc::channel::<(usize, WorkerResult)>(workers.max(1));
        let mut tasks = JoinSet::new();

        for job in jobs {
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let cancel = self.cancel.clone();
            let readers = Arc::clone(&self.readers);
            let normalizer = Arc::clone(&self.normalizer);
            let config = Arc::clone(&self.config);

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                if cancel.is_cancelled() {
                    return;
                }

                let content = match job.content {
                    Some(content) => Ok(content),
                    None => tokio::fs::read_to_string(&job.path)
                        .await
                        .map_err(|e| FileReadError::new(&job.path, e)),
                };
                let result = content.map(|content| {
                    contribute(
                        &readers,
                        &normalizer,
                        &config,
                        &job.path,
                        job.ecosystem,
                        &content,
                    )
                });
                // The receiver only goes away when the run was cancelled
                let _ = tx.send((job.seq, result)).await;
            });
        }
        drop(tx);

        let mut progress = Progress::new(self.show_progress);
        progress.start(total as u64, "Reading manifests");

        let mut context = RunContext::new();
        let mut pending: BTreeMap<usize, WorkerResult> = BTreeMap::new();
        let mut next = 0;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    progress.finish_and_clear();
                    info!(merged = next, files = total, "detection run cancelled");
                    return Err(AppError::Cancelled);
                }
                message = rx.recv() => {
                    let Some((seq, result)) = message else { break };
                    pending.insert(seq, result);
                    // Merge in submission order so output does not depend on scheduling
                    while let Some(result) = pending.remove(&next) {
                        context.apply(result);
                        next += 1;
                        progress.inc();
                    }
                }
            }
        }
        progress.finish_and_clear();

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                return Err(AppError::Worker {
                    message: e.to_string(),
                });
            }
        }
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        if next != total {
            return Err(AppError::Worker {
                message: format!("{} of {} manifests produced no result", total - next, total),
            });
        }

        let outcome = context.finish(total);
        info!(
            components = outcome.graph.len(),
            edges = outcome.graph.edges().len(),
            diagnostics = outcome.diagnostics.len(),
            "detection run complete"
        );
        Ok(outcome)
    }
}
