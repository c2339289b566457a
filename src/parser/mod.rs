//! Version specification parsers for the supported ecosystems
//!
//! This module provides parsers for version specifications in:
//! - Conan (plain references and `[...]` ranges)
//! - pip (PEP 440 specifiers)

mod conan;
mod python;

pub use conan::ConanVersionParser;
pub use python::{split_requirement, PythonVersionParser};

use crate::domain::{Ecosystem, VersionSpec};

/// Trait for parsing version specifications
pub trait VersionParser: Send + Sync {
    /// Parse a version specification string
    fn parse(&self, version_str: &str) -> Option<VersionSpec>;

    /// Returns the ecosystem this parser handles
    fn ecosystem(&self) -> Ecosystem;
}
