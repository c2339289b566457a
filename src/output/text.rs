//! Text report emitter for human-readable output
//!
//! Each manifest is printed with the tree of components reachable from its
//! root, followed by diagnostics and a summary line.

use crate::domain::{Component, ComponentId, Scope};
use crate::error::EmitError;
use crate::graph::{ManifestRoot, NodeRef};
use crate::output::{DetectionReport, ReportDiagnostic, ReportEmitter, Verbosity};
use colored::Colorize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Text emitter for human-readable output
#[derive(Debug, Clone, Copy)]
pub struct TextEmitter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextEmitter {
    /// Create a new text emitter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text emitter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn scope_label(&self, scope: Scope) -> String {
        if !self.color {
            return scope.as_str().to_string();
        }
        match scope {
            Scope::Runtime => scope.as_str().green().to_string(),
            Scope::Build => scope.as_str().yellow().to_string(),
            Scope::Test => scope.as_str().cyan().to_string(),
        }
    }

    fn format_component(&self, component: &Component) -> String {
        let scopes = component
            .scopes
            .iter()
            .map(|s| self.scope_label(*s))
            .collect::<Vec<_>>()
            .join(",");
        let version = component.version.as_str();

        let mut line = if self.color {
            let version = if component.version.is_exact() {
                version.normal()
            } else {
                version.dimmed()
            };
            format!("{} {}", component.name.bold(), version)
        } else {
            format!("{} {}", component.name, version)
        };
        if !scopes.is_empty() {
            let _ = write!(line, " [{}]", scopes);
        }

        if self.verbosity == Verbosity::Verbose {
            if !component.constraints.is_empty() {
                let constraints = component
                    .constraints
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" | ");
                let _ = write!(line, " ({})", constraints);
            }
            let id = format!(" {}", component.id);
            if self.color {
                line.push_str(&id.dimmed().to_string());
            } else {
                line.push_str(&id);
            }
        }
        line
    }

    fn format_header(&self, manifest: &ManifestRoot, report: &DetectionReport) -> String {
        let path = manifest.path.display().to_string();
        let mut header = if self.color {
            format!("{} {}", path.cyan().bold(), format!("[{}]", manifest.kind).dimmed())
        } else {
            format!("{} [{}]", path, manifest.kind)
        };
        if let Some(identity) = manifest
            .root
            .component_id()
            .and_then(|id| report.component(id.as_str()))
        {
            let _ = write!(header, " -> {} {}", identity.name, identity.version);
        }
        header
    }

    fn format_diagnostic(&self, diagnostic: &ReportDiagnostic) -> String {
        let marker = if self.color {
            "warning".yellow().bold().to_string()
        } else {
            "warning".to_string()
        };
        format!(
            "  {} {} ({}): {}",
            marker,
            diagnostic.path.display(),
            diagnostic.kind,
            diagnostic.message
        )
    }

    fn summary_line(&self, report: &DetectionReport) -> String {
        let summary = &report.summary;
        let mut line = format!(
            "{} {}, {} {} from {} {}",
            summary.components,
            plural(summary.components, "component", "components"),
            summary.edges,
            plural(summary.edges, "edge", "edges"),
            summary.manifests,
            plural(summary.manifests, "manifest", "manifests"),
        );
        if summary.unresolved > 0 {
            let _ = write!(line, ", {} unresolved", summary.unresolved);
        }
        if summary.diagnostics > 0 {
            let _ = write!(
                line,
                ", {} {}",
                summary.diagnostics,
                plural(summary.diagnostics, "diagnostic", "diagnostics")
            );
        }
        line
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Adjacency of the report's edges, in edge order
struct Tree<'r> {
    children: HashMap<&'r NodeRef, Vec<&'r ComponentId>>,
    components: HashMap<&'r ComponentId, &'r Component>,
}

impl<'r> Tree<'r> {
    fn new(report: &'r DetectionReport) -> Self {
        let mut children: HashMap<&NodeRef, Vec<&ComponentId>> = HashMap::new();
        for edge in &report.edges {
            children.entry(&edge.parent).or_default().push(&edge.child);
        }
        let components = report.components.iter().map(|c| (&c.id, c)).collect();
        Self {
            children,
            components,
        }
    }

    /// Writes the subtree below `node`; components already printed for the
    /// current manifest are marked with `(*)` and not expanded again
    fn write_subtree(
        &self,
        emitter: &TextEmitter,
        node: &NodeRef,
        depth: usize,
        seen: &mut HashSet<&'r ComponentId>,
        out: &mut String,
    ) {
        let Some(children) = self.children.get(node) else {
            return;
        };
        for &child in children {
            let Some(component) = self.components.get(child) else {
                continue;
            };
            let indent = "  ".repeat(depth);
            let line = emitter.format_component(component);
            if !seen.insert(child) {
                let _ = writeln!(out, "{}{} (*)", indent, line);
                continue;
            }
            let _ = writeln!(out, "{}{}", indent, line);
            let next = NodeRef::Component(child.clone());
            self.write_subtree(emitter, &next, depth + 1, seen, out);
        }
    }
}

impl ReportEmitter for TextEmitter {
    fn render(&self, report: &DetectionReport) -> Result<String, EmitError> {
        let mut out = String::new();

        if self.verbosity != Verbosity::Quiet {
            if report.manifests.is_empty() {
                out.push_str("No manifests found\n");
            }

            let tree = Tree::new(report);
            for manifest in &report.manifests {
                let _ = writeln!(out, "{}", self.format_header(manifest, report));
                let mut seen = HashSet::new();
                tree.write_subtree(self, &manifest.root, 1, &mut seen, &mut out);
                out.push('\n');
            }

            if !report.diagnostics.is_empty() {
                let title = if self.color {
                    "Diagnostics:".bold().to_string()
                } else {
                    "Diagnostics:".to_string()
                };
                let _ = writeln!(out, "{}", title);
                for diagnostic in &report.diagnostics {
                    let _ = writeln!(out, "{}", self.format_diagnostic(diagnostic));
                }
                out.push('\n');
            }
        }

        let _ = writeln!(out, "{}", self.summary_line(report));
        Ok(out)
    }
}
