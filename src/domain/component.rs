//! Canonical component records

use super::{Ecosystem, Scope};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Hex characters kept from the SHA-256 digest
const ID_LEN: usize = 32;

/// Sentinel used when a declaration does not pin a single version
pub const UNRESOLVED: &str = "unresolved";

/// Stable identifier of a component: a hash of (ecosystem, name key, version)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Derives the id for an ecosystem, folded name key and version
    pub fn derive(ecosystem: Ecosystem, name_key: &str, version: &ComponentVersion) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ecosystem.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(name_key.as_bytes());
        hasher.update([0u8]);
        hasher.update(version.as_str().as_bytes());
        let mut hex = format!("{:x}", hasher.finalize());
        hex.truncate(ID_LEN);
        Self(hex)
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical version of a component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentVersion {
    /// A single concrete version
    Exact(String),
    /// No single version could be derived from the constraint
    Unresolved,
}

impl ComponentVersion {
    /// Returns the version string, or the `unresolved` sentinel
    pub fn as_str(&self) -> &str {
        match self {
            ComponentVersion::Exact(v) => v,
            ComponentVersion::Unresolved => UNRESOLVED,
        }
    }

    /// Returns true for an exact version
    pub fn is_exact(&self) -> bool {
        matches!(self, ComponentVersion::Exact(_))
    }
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A de-duplicated dependency record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Stable identifier
    pub id: ComponentId,
    /// Name as first seen
    pub name: String,
    /// Canonical version
    pub version: ComponentVersion,
    /// Ecosystem of the component
    pub ecosystem: Ecosystem,
    /// Every scope the component was declared with
    pub scopes: BTreeSet<Scope>,
    /// Raw version constraints seen across declarations
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub constraints: BTreeSet<String>,
    /// Manifests that declared the component
    pub locations: BTreeSet<PathBuf>,
}

impl Component {
    /// Creates a component with no scopes, constraints or locations
    pub fn new(name: impl Into<String>, version: ComponentVersion, ecosystem: Ecosystem) -> Self {
        let name = name.into();
        let id = ComponentId::derive(ecosystem, &ecosystem.name_key(&name), &version);
        Self {
            id,
            name,
            version,
            ecosystem,
            scopes: BTreeSet::new(),
            constraints: BTreeSet::new(),
            locations: BTreeSet::new(),
        }
    }

    /// Adds a scope (builder pattern)
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scopes.insert(scope);
        self
    }

    /// Adds a raw constraint (builder pattern); empty constraints are skipped
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        let constraint = constraint.into();
        if !constraint.is_empty() {
            self.constraints.insert(constraint);
        }
        self
    }

    /// Adds a declaring manifest (builder pattern)
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.locations.insert(path.into());
        self
    }

    /// Unions scopes, constraints and locations of another record with the same id.
    ///
    /// The name of `self` is kept, so the first-seen casing wins.
    pub fn absorb(&mut self, other: &Component) {
        debug_assert_eq!(self.id, other.id);
        self.scopes.extend(other.scopes.iter().copied());
        self.constraints.extend(other.constraints.iter().cloned());
        self.locations.extend(other.locations.iter().cloned());
    }

    /// Returns true if the component is only declared for build or test
    pub fn is_development(&self) -> bool {
        !self.scopes.is_empty() && self.scopes.iter().all(Scope::is_development)
    }

    /// Returns a readable coordinate like `conan:zlib@1.2.11`
    pub fn coordinate(&self) -> String {
        format!("{}:{}@{}", self.ecosystem.as_str(), self.name, self.version)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} [{}]", self.name, self.version, self.ecosystem)
    }
}
