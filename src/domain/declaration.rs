//! Raw dependency declarations produced by manifest readers

use super::{Ecosystem, Scope};
use serde::Serialize;
use std::fmt;

/// A package named by a manifest: its own identity, or a lockfile parent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageRef {
    /// Package name as written
    pub name: String,
    /// Version constraint as written (may be empty)
    pub version_constraint: String,
}

impl PackageRef {
    /// Creates a new package reference
    pub fn new(name: impl Into<String>, version_constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_constraint: version_constraint.into(),
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version_constraint.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.version_constraint)
        }
    }
}

/// A single dependency declaration extracted from a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawDeclaration {
    /// The ecosystem this declaration belongs to
    pub ecosystem: Ecosystem,
    /// Package name as written
    pub name: String,
    /// Version constraint as written (may be empty)
    pub version_constraint: String,
    /// Where the dependency applies
    pub scope: Scope,
    /// The declaring package when it is not the manifest itself (lockfile edges)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<PackageRef>,
    /// 1-based source line, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl RawDeclaration {
    /// Creates a new declaration made by the manifest itself
    pub fn new(
        ecosystem: Ecosystem,
        name: impl Into<String>,
        version_constraint: impl Into<String>,
        scope: Scope,
    ) -> Self {
        Self {
            ecosystem,
            name: name.into(),
            version_constraint: version_constraint.into(),
            scope,
            parent: None,
            line: None,
        }
    }

    /// Creates a new runtime declaration
    pub fn runtime(
        ecosystem: Ecosystem,
        name: impl Into<String>,
        version_constraint: impl Into<String>,
    ) -> Self {
        Self::new(ecosystem, name, version_constraint, Scope::Runtime)
    }

    /// Sets the declaring package (builder pattern)
    pub fn with_parent(mut self, parent: PackageRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the source line (builder pattern)
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for RawDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.version_constraint.is_empty() {
            write!(f, " {}", self.version_constraint)?;
        }
        write!(f, " ({}) [{}]", self.scope, self.ecosystem)
    }
}
