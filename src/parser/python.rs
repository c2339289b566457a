//! pip (PEP 440 / PEP 508) version specification parser
//!
//! Handles version formats:
//! - Exact: `==1.2.3`, arbitrary equality `===1.0-custom`
//! - Caret: `^1.2.3` (Poetry)
//! - Tilde: `~1.2.3` or `~=1.2.3` (compatible release)
//! - Comparison: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`, `!=1.2.3`
//! - Wildcard: `*`, `==1.*`
//! - Range: `>=1.0,<2.0`
//!
//! Also splits a PEP 508 requirement (`name[extra]>=1.0; marker`) into
//! name and constraint.

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::VersionParser;
use regex::Regex;
use std::sync::LazyLock;

/// pip version specification parser
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonVersionParser;

/// Comparison operators; longer spellings come first so `===` wins over `==`
const OPERATORS: &[(&str, VersionSpecKind)] = &[
    ("===", VersionSpecKind::Exact),
    ("==", VersionSpecKind::Exact),
    ("~=", VersionSpecKind::Tilde),
    ("!=", VersionSpecKind::NotEqual),
    (">=", VersionSpecKind::GreaterOrEqual),
    ("<=", VersionSpecKind::LessOrEqual),
    (">", VersionSpecKind::Greater),
    ("<", VersionSpecKind::Less),
    ("^", VersionSpecKind::Caret),
    ("~", VersionSpecKind::Tilde),
];

// Release segment with optional pre/post/dev tags and a local label
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:\.\d+)*(?:[-_.]?[A-Za-z]+\d*)*(?:\+[A-Za-z0-9.]+)?$").unwrap()
});
static WILDCARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*$|^(?:==\s*)?\d+(?:\.\d+)*\.\*$").unwrap());

// PEP 508 requirement: name, optional extras, remainder
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[[^\]]*\])?\s*(.*)$").unwrap()
});

impl PythonVersionParser {
    /// Parses one comma-free clause such as `>=1.2` or `==1.*`
    fn clause(clause: &str) -> Option<VersionSpec> {
        if WILDCARD_RE.is_match(clause) {
            let version = clause.trim_start_matches("==").trim();
            return Some(VersionSpec::new(VersionSpecKind::Wildcard, clause, version));
        }

        let (op, kind, version) = OPERATORS.iter().find_map(|(op, kind)| {
            clause
                .strip_prefix(op)
                .map(|rest| (*op, *kind, rest.trim()))
        })?;
        let valid = match op {
            "===" => !version.is_empty() && !version.contains(char::is_whitespace),
            "!=" => VERSION_RE.is_match(version.strip_suffix(".*").unwrap_or(version)),
            _ => VERSION_RE.is_match(version),
        };
        valid.then(|| VersionSpec::new(kind, clause, version).with_prefix(op))
    }
}

impl VersionParser for PythonVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();
        if trimmed.is_empty() {
            return Some(VersionSpec::any());
        }
        if !trimmed.contains(',') {
            return Self::clause(trimmed);
        }

        // Every clause of a range must parse; the first one names the version
        let versions = trimmed
            .split(',')
            .map(|part| Self::clause(part.trim()).map(|spec| spec.version))
            .collect::<Option<Vec<_>>>()?;
        let first = versions.into_iter().next().unwrap_or_default();
        Some(VersionSpec::new(VersionSpecKind::Range, trimmed, first))
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pip
    }
}

/// Splits a PEP 508 requirement string into `(name, constraint)`.
///
/// Extras are dropped, environment markers after `;` are dropped, and
/// constraint parts mentioning `python_version` are removed. A bare
/// parenthesized constraint (`name (>=1.0)`) is unwrapped. Returns `None`
/// when no valid distribution name starts the string.
pub fn split_requirement(requirement: &str) -> Option<(String, String)> {
    let without_marker = requirement.split(';').next().unwrap_or("").trim();
    let caps = REQUIREMENT_RE.captures(without_marker)?;
    let name = caps.get(1)?.as_str().to_string();
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();
    let rest = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .unwrap_or(rest);

    let constraint = rest
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty() && !part.contains("python_version"))
        .collect::<Vec<_>>()
        .join(",");

    Some((name, constraint))
}
