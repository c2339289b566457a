//! Report emission for detection results
//!
//! This module provides:
//! - A serializable [`DetectionReport`] built from a run's outcome
//! - JSON output for the downstream consumer
//! - Text output for human-readable display

mod json;
mod text;

pub use json::JsonEmitter;
pub use text::TextEmitter;

use crate::domain::{Component, Ecosystem};
use crate::error::{ConfigError, EmitError};
use crate::graph::{Edge, ManifestRoot};
use crate::orchestrator::DetectionOutcome;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::InvalidFormat {
                value: s.to_string(),
            }),
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Summary only
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Adds ids, constraints and locations
    Verbose,
}

/// Configuration for report emission
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Whether to use colors (text only)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create a new output configuration
    pub fn new(format: OutputFormat, verbosity: Verbosity) -> Self {
        Self {
            format,
            verbosity,
            color: true,
        }
    }

    /// Create configuration from CLI arguments
    pub fn from_cli(format: OutputFormat, verbose: bool, quiet: bool, color: bool) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Self {
            format,
            verbosity,
            color,
        }
    }
}

/// One per-file diagnostic in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDiagnostic {
    /// Manifest the diagnostic belongs to
    pub path: PathBuf,
    /// `parse_warning`, `file_read_error` or `cycle_detected`
    pub kind: &'static str,
    /// Detail without the path
    pub message: String,
}

/// Summary statistics of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Manifests submitted to the run
    pub manifests: usize,
    /// Distinct components
    pub components: usize,
    /// Distinct edges
    pub edges: usize,
    /// Components without an exact version
    pub unresolved: usize,
    /// Diagnostics collected
    pub diagnostics: usize,
    /// Component count per ecosystem
    pub by_ecosystem: BTreeMap<Ecosystem, usize>,
}

/// Serializable view of a run's outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    /// Components in first-insertion order
    pub components: Vec<Component>,
    /// "declared by" edges
    pub edges: Vec<Edge>,
    /// Root node of every merged manifest
    pub manifests: Vec<ManifestRoot>,
    /// Per-file diagnostics
    pub diagnostics: Vec<ReportDiagnostic>,
    /// Summary statistics
    pub summary: ReportSummary,
}

impl DetectionReport {
    /// Builds the report for an outcome
    pub fn from_outcome(outcome: &DetectionOutcome) -> Self {
        let graph = &outcome.graph;
        let components: Vec<Component> = graph.components().cloned().collect();

        let mut by_ecosystem = BTreeMap::new();
        for component in &components {
            *by_ecosystem.entry(component.ecosystem).or_insert(0) += 1;
        }

        let diagnostics: Vec<ReportDiagnostic> = outcome
            .diagnostics
            .iter()
            .map(|d| ReportDiagnostic {
                path: d.path().to_path_buf(),
                kind: d.kind(),
                message: d.detail(),
            })
            .collect();

        let summary = ReportSummary {
            manifests: outcome.files,
            components: components.len(),
            edges: graph.edges().len(),
            unresolved: components.iter().filter(|c| !c.version.is_exact()).count(),
            diagnostics: diagnostics.len(),
            by_ecosystem,
        };

        Self {
            edges: graph.edges().to_vec(),
            manifests: graph.roots().to_vec(),
            components,
            diagnostics,
            summary,
        }
    }

    /// Looks up a component by its id string
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id.as_str() == id)
    }
}

/// Trait for report emitters
pub trait ReportEmitter {
    /// Renders the report; pure and side-effect free
    fn render(&self, report: &DetectionReport) -> Result<String, EmitError>;

    /// Renders the report into a writer
    fn emit(&self, report: &DetectionReport, writer: &mut dyn Write) -> Result<(), EmitError> {
        writer.write_all(self.render(report)?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Create a report emitter based on configuration
pub fn create_emitter(config: OutputConfig) -> Box<dyn ReportEmitter> {
    match config.format {
        OutputFormat::Text => Box::new(TextEmitter::with_color(config.verbosity, config.color)),
        OutputFormat::Json => Box::new(JsonEmitter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { .. }));
    }

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert!(config.color);
    }

    #[test]
    fn test_output_config_from_cli() {
        let quiet = OutputConfig::from_cli(OutputFormat::Json, true, true, false);
        assert_eq!(quiet.format, OutputFormat::Json);
        assert_eq!(quiet.verbosity, Verbosity::Quiet);
        assert!(!quiet.color);

        let verbose = OutputConfig::from_cli(OutputFormat::Text, true, false, true);
        assert_eq!(verbose.verbosity, Verbosity::Verbose);
    }

    #[test]
    fn test_report_from_empty_outcome() {
        let report = DetectionReport::from_outcome(&DetectionOutcome::default());
        assert!(report.components.is_empty());
        assert_eq!(report.summary.manifests, 0);
        assert!(report.summary.by_ecosystem.is_empty());
    }
}
