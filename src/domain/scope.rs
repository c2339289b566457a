//! Dependency scope definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// When a declared dependency applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Needed by the package at runtime
    Runtime,
    /// Needed only to build the package
    Build,
    /// Needed only to test the package
    Test,
}

impl Scope {
    /// Returns the lowercase label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Runtime => "runtime",
            Scope::Build => "build",
            Scope::Test => "test",
        }
    }

    /// Returns true for build and test scopes
    pub fn is_development(&self) -> bool {
        !matches!(self, Scope::Runtime)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
