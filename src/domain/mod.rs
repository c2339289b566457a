//! Core domain models for compdetect
//!
//! This module contains the fundamental types used throughout the pipeline:
//! - Ecosystem and scope tags
//! - Version constraint types
//! - Raw declarations produced by manifest readers
//! - Canonical components produced by the normalizer

mod component;
mod declaration;
mod ecosystem;
mod scope;
mod version_spec;

pub use component::{Component, ComponentId, ComponentVersion, UNRESOLVED};
pub use declaration::{PackageRef, RawDeclaration};
pub use ecosystem::Ecosystem;
pub use scope::Scope;
pub use version_spec::{VersionSpec, VersionSpecKind};
