//! Manifest file detection
//!
//! Features:
//! - Recursive walk with deterministic (file name sorted) order
//! - Excluded directory names are pruned without descending into them
//! - Only manifests of the enabled ecosystems are reported

use crate::domain::Ecosystem;
use crate::manifest::ManifestKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Information about a detected manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestInfo {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Ecosystem of the manifest
    pub ecosystem: Ecosystem,
    /// Format of the manifest
    pub kind: ManifestKind,
}

impl ManifestInfo {
    /// Create a new ManifestInfo
    pub fn new(path: impl Into<PathBuf>, kind: ManifestKind) -> Self {
        Self {
            path: path.into(),
            ecosystem: kind.ecosystem(),
            kind,
        }
    }

    /// Classifies a path, returning `None` for unknown file names
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = ManifestKind::from_path(&path)?;
        Some(Self::new(path, kind))
    }
}

/// A manifest with its content already loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSource {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Ecosystem tag supplied by the caller
    pub ecosystem: Ecosystem,
    /// Raw file content
    pub content: String,
}

impl ManifestSource {
    /// Create a new ManifestSource
    pub fn new(path: impl Into<PathBuf>, ecosystem: Ecosystem, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ecosystem,
            content: content.into(),
        }
    }
}

fn is_excluded(entry: &DirEntry, exclude_dirs: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| exclude_dirs.iter().any(|excluded| excluded == name))
            .unwrap_or(false)
}

/// Detect all manifest files under the given directory
///
/// This function:
/// 1. Walks `dir` recursively, skipping directories named in `exclude_dirs`
/// 2. Classifies each file name into a manifest kind
/// 3. Keeps manifests whose ecosystem is listed in `ecosystems`
///
/// A path naming a single file is classified directly.
pub fn detect_manifests(
    dir: &Path,
    ecosystems: &[Ecosystem],
    exclude_dirs: &[String],
) -> Vec<ManifestInfo> {
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, exclude_dirs));

    let mut manifests = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(info) = ManifestInfo::from_path(entry.path()) {
            if ecosystems.contains(&info.ecosystem) {
                debug!(path = %info.path.display(), kind = %info.kind, "detected manifest");
                manifests.push(info);
            }
        }
    }

    manifests
}
