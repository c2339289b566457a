//! Conan version specification parser
//!
//! Handles version formats:
//! - Exact: `1.2.11`, `3.0.0-rc1`, `1.0+build.5`, `cci.20230101`
//! - Range: `[>=1.0 <2.0]`, `[~1.2]`, `[^1.0, include_prerelease]`
//! - Any: empty string or `*`

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::VersionParser;
use regex::Regex;
use std::sync::LazyLock;

/// Conan version specification parser
#[derive(Debug, Default, Clone, Copy)]
pub struct ConanVersionParser;

static EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+\-]*$").unwrap());
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[(.*)\]$").unwrap());
static RANGE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.[0-9A-Za-z]+)*)").unwrap());

impl VersionParser for ConanVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();

        if trimmed.is_empty() || trimmed == "*" {
            return Some(VersionSpec::new(VersionSpecKind::Any, trimmed, ""));
        }

        // Version range in brackets
        if let Some(caps) = RANGE_RE.captures(trimmed) {
            let body = caps.get(1)?.as_str();
            let first_version = RANGE_VERSION_RE
                .captures(body)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .unwrap_or("");
            return Some(VersionSpec::new(
                VersionSpecKind::Range,
                trimmed,
                first_version,
            ));
        }

        // Anything else that looks like a version token is pinned
        if EXACT_RE.is_match(trimmed) {
            return Some(VersionSpec::new(VersionSpecKind::Exact, trimmed, trimmed));
        }

        None
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Conan
    }
}
