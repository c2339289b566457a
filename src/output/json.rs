//! JSON report emitter for the downstream consumer
//!
//! The document carries every component, edge, manifest root and
//! diagnostic of a run, plus summary counts. Field names are camelCase.

use crate::error::EmitError;
use crate::output::{DetectionReport, ReportEmitter};

/// Pretty-printing JSON emitter for machine-readable output
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter;

impl JsonEmitter {
    /// Create a new JSON emitter
    pub fn new() -> Self {
        Self
    }
}

impl ReportEmitter for JsonEmitter {
    fn render(&self, report: &DetectionReport) -> Result<String, EmitError> {
        let mut json = serde_json::to_string_pretty(report)?;
        json.push('\n');
        Ok(json)
    }
}
