//! compdetect - static dependency manifest detection library
//!
//! Reads Conan and pip manifests without executing them, normalizes every
//! declared dependency into a component with a stable id, and merges all
//! manifests of a run into one acyclic component graph:
//! - Conan (conanfile.py, conanfile.txt, conan.lock)
//! - pip (setup.py, requirements*.txt)

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod normalize;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;

pub use config::DetectionConfig;
pub use error::{AppError, DetectionError};
pub use graph::DependencyGraph;
pub use orchestrator::{CancelHandle, DetectionOutcome, Pipeline};
pub use output::DetectionReport;
