//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ParseWarning: a single unreadable declaration (recoverable, skipped)
//! - FileReadError: a manifest that could not be read (recoverable, file dropped)
//! - CycleDetectedError: an edge that would close a cycle (recoverable, edge dropped)
//! - DetectionError: the per-file diagnostics above, tagged with their manifest
//! - ConfigError: invalid configuration (fatal, aborts the run)
//! - AppError: top-level failures of a run

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Report emission failed
    #[error("failed to emit report: {0}")]
    Emit(#[from] EmitError),

    /// The run was cancelled before all manifests were merged
    #[error("detection run cancelled")]
    Cancelled,

    /// A worker task failed to complete
    #[error("worker task failed: {message}")]
    Worker { message: String },
}

/// A declaration that could not be extracted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{message}", .line.map(|l| format!("line {l}: ")).unwrap_or_default())]
pub struct ParseWarning {
    /// 1-based source line, when known
    pub line: Option<usize>,
    /// What was wrong with the declaration
    pub message: String,
}

/// A manifest file that could not be read
#[derive(Error, Debug)]
#[error("failed to read manifest file {}: {source}", .path.display())]
pub struct FileReadError {
    /// Path of the manifest
    pub path: PathBuf,
    /// Underlying IO failure
    #[source]
    pub source: std::io::Error,
}

/// An edge that would have introduced a dependency cycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dependency cycle declared in {}: {}", .path.display(), .cycle.join(" -> "))]
pub struct CycleDetectedError {
    /// Manifest whose contribution contained the edge
    pub path: PathBuf,
    /// Node labels along the cycle, first and last equal
    pub cycle: Vec<String>,
}

/// Per-file diagnostics collected alongside the graph
#[derive(Error, Debug)]
pub enum DetectionError {
    /// A declaration was skipped
    #[error("{}: {warning}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        warning: ParseWarning,
    },

    /// A file was dropped
    #[error(transparent)]
    FileRead(#[from] FileReadError),

    /// An edge was dropped
    #[error(transparent)]
    Cycle(#[from] CycleDetectedError),
}

/// Errors related to configuration; these abort the whole run
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the expected schema
    #[error("invalid config file {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },

    /// Unknown ecosystem name
    #[error("invalid ecosystem '{value}': expected 'conan' or 'pip'")]
    InvalidEcosystem { value: String },

    /// Unknown output format
    #[error("invalid output format '{value}': expected 'json' or 'text'")]
    InvalidFormat { value: String },

    /// Invalid worker count
    #[error("invalid worker count {value}: must be at least 1")]
    InvalidWorkers { value: usize },
}

/// Errors raised while serializing a report
#[derive(Error, Debug)]
pub enum EmitError {
    /// JSON serialization failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing to the sink failed
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseWarning {
    /// Creates a new ParseWarning
    pub fn new(line: Option<usize>, message: impl Into<String>) -> Self {
        ParseWarning {
            line,
            message: message.into(),
        }
    }

    /// Creates a ParseWarning for a known line
    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self::new(Some(line), message)
    }
}

impl FileReadError {
    /// Creates a new FileReadError
    pub fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileReadError {
            path: path.into(),
            source,
        }
    }
}

impl CycleDetectedError {
    /// Creates a new CycleDetectedError
    pub fn new(path: impl Into<PathBuf>, cycle: Vec<String>) -> Self {
        CycleDetectedError {
            path: path.into(),
            cycle,
        }
    }
}

impl DetectionError {
    /// Wraps a ParseWarning with the manifest it came from
    pub fn parse(path: impl Into<PathBuf>, warning: ParseWarning) -> Self {
        DetectionError::Parse {
            path: path.into(),
            warning,
        }
    }

    /// Returns the manifest path the diagnostic belongs to
    pub fn path(&self) -> &std::path::Path {
        match self {
            DetectionError::Parse { path, .. } => path,
            DetectionError::FileRead(e) => &e.path,
            DetectionError::Cycle(e) => &e.path,
        }
    }

    /// Returns a short machine-readable kind label
    pub fn kind(&self) -> &'static str {
        match self {
            DetectionError::Parse { .. } => "parse_warning",
            DetectionError::FileRead(_) => "file_read_error",
            DetectionError::Cycle(_) => "cycle_detected",
        }
    }

    /// Returns the message without the path prefix
    pub fn detail(&self) -> String {
        match self {
            DetectionError::Parse { warning, .. } => warning.to_string(),
            DetectionError::FileRead(e) => e.source.to_string(),
            DetectionError::Cycle(e) => e.cycle.join(" -> "),
        }
    }
}

impl ConfigError {
    /// Creates a new Invalid error
    pub fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Read {
            path: path.into(),
            source,
        }
    }
}
