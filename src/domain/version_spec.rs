//! Version constraint types for supported package ecosystems
//!
//! Handles version constraints like:
//! - Conan: `1.2.11`, `[>=1.0 <2.0]`, `[~1.2]`
//! - pip: `==1.2.3`, `===1.0-custom`, `>=1.2`, `~=1.4`, `>=1.0,<2.0`, `1.*`

use serde::Serialize;
use std::fmt;

/// The kind of version constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSpecKind {
    /// Exact/pinned version (e.g., `1.2.3` for Conan, `==1.2.3` for pip)
    Exact,
    /// Caret range (e.g., `^1.2.3`)
    Caret,
    /// Tilde or compatible release (e.g., `~1.2.3`, `~=1.2.3`)
    Tilde,
    /// Greater than or equal (e.g., `>=1.2.3`)
    GreaterOrEqual,
    /// Greater than (e.g., `>1.2.3`)
    Greater,
    /// Less than or equal (e.g., `<=1.2.3`)
    LessOrEqual,
    /// Less than (e.g., `<1.2.3`)
    Less,
    /// Exclusion (e.g., `!=1.2.3`)
    NotEqual,
    /// Wildcard (e.g., `1.2.*`, `*`)
    Wildcard,
    /// Complex range (e.g., `>=1.0,<2.0` or Conan `[>=1.0 <2.0]`)
    Range,
    /// No constraint given
    Any,
}

impl VersionSpecKind {
    /// Returns true if this kind names a single concrete version
    pub fn is_pinned(&self) -> bool {
        matches!(self, VersionSpecKind::Exact)
    }
}

/// A version constraint with its original string representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSpec {
    /// The kind of version constraint
    pub kind: VersionSpecKind,
    /// The raw constraint string as it appears in the manifest
    pub raw: String,
    /// The extracted version number (without operator)
    pub version: String,
    /// Operator prefix (e.g., `==`, `>=`)
    pub prefix: Option<String>,
}

impl VersionSpec {
    /// Creates a new VersionSpec
    pub fn new(kind: VersionSpecKind, raw: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            version: version.into(),
            prefix: None,
        }
    }

    /// Creates an unconstrained VersionSpec
    pub fn any() -> Self {
        Self::new(VersionSpecKind::Any, "", "")
    }

    /// Sets the operator prefix (builder pattern)
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Returns true if this constraint pins a single version
    pub fn is_pinned(&self) -> bool {
        self.kind.is_pinned()
    }

    /// Returns the pinned version, if any
    pub fn exact_version(&self) -> Option<&str> {
        if self.is_pinned() && !self.version.is_empty() {
            Some(&self.version)
        } else {
            None
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_spec_kind_is_pinned() {
        assert!(VersionSpecKind::Exact.is_pinned());
        assert!(!VersionSpecKind::Caret.is_pinned());
        assert!(!VersionSpecKind::Tilde.is_pinned());
        assert!(!VersionSpecKind::GreaterOrEqual.is_pinned());
        assert!(!VersionSpecKind::NotEqual.is_pinned());
        assert!(!VersionSpecKind::Range.is_pinned());
        assert!(!VersionSpecKind::Any.is_pinned());
    }

    #[test]
    fn test_version_spec_any() {
        let spec = VersionSpec::any();
        assert_eq!(spec.kind, VersionSpecKind::Any);
        assert!(!spec.is_pinned());
        assert_eq!(spec.exact_version(), None);
    }

    #[test]
    fn test_exact_version() {
        let spec = VersionSpec::new(VersionSpecKind::Exact, "==1.2.3", "1.2.3").with_prefix("==");
        assert_eq!(spec.exact_version(), Some("1.2.3"));
        assert_eq!(spec.prefix, Some("==".to_string()));

        let range = VersionSpec::new(VersionSpecKind::GreaterOrEqual, ">=1.2.3", "1.2.3");
        assert_eq!(range.exact_version(), None);
    }

    #[test]
    fn test_display_trait() {
        let spec = VersionSpec::new(VersionSpecKind::Tilde, "~=1.4", "1.4");
        assert_eq!(format!("{}", spec), "~=1.4");
    }

    #[test]
    fn test_serde_version_spec_kind() {
        let kind = VersionSpecKind::GreaterOrEqual;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"greater_or_equal\"");
    }
}
