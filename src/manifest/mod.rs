//! Manifest file detection and reading
//!
//! This module provides functionality to:
//! - Detect manifest files under a directory tree
//! - Classify a manifest path into a [`ManifestKind`]
//! - Extract raw dependency declarations from each manifest format
//!
//! Readers never execute scripts; Python-syntax manifests are scanned as text.

mod conan_lock;
mod conanfile;
mod conanfile_txt;
mod detector;
mod requirements_txt;
mod script;
mod setup_py;

pub use conan_lock::ConanLockReader;
pub use conanfile::ConanfileReader;
pub use conanfile_txt::ConanfileTxtReader;
pub use detector::{detect_manifests, ManifestInfo, ManifestSource};
pub use requirements_txt::RequirementsTxtReader;
pub use setup_py::SetupPyReader;

use crate::domain::{Ecosystem, PackageRef, RawDeclaration};
use crate::error::ParseWarning;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Lazy, finite sequence of declarations or per-declaration warnings
pub type Declarations<'a> = Box<dyn Iterator<Item = Result<RawDeclaration, ParseWarning>> + 'a>;

/// Supported manifest formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    /// conanfile.py
    ConanRecipe,
    /// conanfile.txt
    ConanText,
    /// conan.lock
    ConanLock,
    /// setup.py
    SetupPy,
    /// requirements.txt and its variants
    Requirements,
}

impl ManifestKind {
    /// Classifies a manifest by file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        match name {
            "conanfile.py" => Some(ManifestKind::ConanRecipe),
            "conanfile.txt" => Some(ManifestKind::ConanText),
            "conan.lock" => Some(ManifestKind::ConanLock),
            "setup.py" => Some(ManifestKind::SetupPy),
            _ if is_requirements_file(name) => Some(ManifestKind::Requirements),
            _ => None,
        }
    }

    /// Returns the ecosystem the format belongs to
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            ManifestKind::ConanRecipe | ManifestKind::ConanText | ManifestKind::ConanLock => {
                Ecosystem::Conan
            }
            ManifestKind::SetupPy | ManifestKind::Requirements => Ecosystem::Pip,
        }
    }

    /// Returns the reader used when a path does not identify a format
    pub fn default_for(ecosystem: Ecosystem) -> Self {
        match ecosystem {
            Ecosystem::Conan => ManifestKind::ConanRecipe,
            Ecosystem::Pip => ManifestKind::SetupPy,
        }
    }

    /// Returns a short label for logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestKind::ConanRecipe => "conanfile.py",
            ManifestKind::ConanText => "conanfile.txt",
            ManifestKind::ConanLock => "conan.lock",
            ManifestKind::SetupPy => "setup.py",
            ManifestKind::Requirements => "requirements.txt",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `requirements.txt`, `requirements-dev.txt`, `requirements_test.txt`, `dev-requirements.txt`
fn is_requirements_file(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".txt") else {
        return false;
    };
    stem == "requirements"
        || stem.starts_with("requirements-")
        || stem.starts_with("requirements_")
        || stem.ends_with("-requirements")
        || stem.ends_with("_requirements")
}

/// Trait for reading one manifest format
pub trait ManifestReader: Send + Sync {
    /// Returns the format this reader handles
    fn kind(&self) -> ManifestKind;

    /// Returns the package the manifest itself describes, if it names one
    fn identity(&self, _content: &str) -> Option<PackageRef> {
        None
    }

    /// Extracts declarations lazily; a bad entry yields one warning and reading continues
    fn declarations<'a>(&'a self, content: &'a str) -> Declarations<'a>;
}

/// Reader selection strategy, fixed when the pipeline is constructed
pub struct ReaderSet {
    conan_recipe: ConanfileReader,
    conan_text: ConanfileTxtReader,
    conan_lock: ConanLockReader,
    setup_py: SetupPyReader,
    requirements: RequirementsTxtReader,
}

impl ReaderSet {
    /// Creates the set of all built-in readers
    pub fn new() -> Self {
        Self {
            conan_recipe: ConanfileReader,
            conan_text: ConanfileTxtReader,
            conan_lock: ConanLockReader,
            setup_py: SetupPyReader,
            requirements: RequirementsTxtReader,
        }
    }

    /// Returns the reader for a format
    pub fn reader(&self, kind: ManifestKind) -> &dyn ManifestReader {
        match kind {
            ManifestKind::ConanRecipe => &self.conan_recipe,
            ManifestKind::ConanText => &self.conan_text,
            ManifestKind::ConanLock => &self.conan_lock,
            ManifestKind::SetupPy => &self.setup_py,
            ManifestKind::Requirements => &self.requirements,
        }
    }

    /// Selects the reader for a path declared to belong to `ecosystem`.
    ///
    /// The file name decides when it matches a format of that ecosystem;
    /// otherwise the ecosystem's default reader is used.
    pub fn select(&self, ecosystem: Ecosystem, path: &Path) -> &dyn ManifestReader {
        let kind = ManifestKind::from_path(path)
            .filter(|kind| kind.ecosystem() == ecosystem)
            .unwrap_or_else(|| ManifestKind::default_for(ecosystem));
        self.reader(kind)
    }
}

impl Default for ReaderSet {
    fn default() -> Self {
        Self::new()
    }
}
