//! conanfile.txt reader
//!
//! Handles `[requires]`, `[tool_requires]`, `[build_requires]` and
//! `[test_requires]` sections. Other sections (`[generators]`, `[options]`,
//! `[layout]`, ...) are ignored.

use crate::domain::{Ecosystem, RawDeclaration, Scope};
use crate::error::ParseWarning;
use crate::manifest::conanfile::parse_reference;
use crate::manifest::{Declarations, ManifestKind, ManifestReader};

/// Reader for conanfile.txt recipes
pub struct ConanfileTxtReader;

fn section_scope(section: &str) -> Option<Scope> {
    match section {
        "requires" => Some(Scope::Runtime),
        "tool_requires" | "build_requires" => Some(Scope::Build),
        "test_requires" => Some(Scope::Test),
        _ => None,
    }
}

impl ManifestReader for ConanfileTxtReader {
    fn kind(&self) -> ManifestKind {
        ManifestKind::ConanText
    }

    fn declarations<'a>(&'a self, content: &'a str) -> Declarations<'a> {
        let mut scope: Option<Scope> = None;

        Box::new(content.lines().enumerate().filter_map(move |(idx, raw)| {
            let line = idx + 1;
            let trimmed = raw.split('#').next().unwrap_or("").trim();
            if trimmed.is_empty() {
                return None;
            }

            if let Some(section) = trimmed
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
            {
                scope = section_scope(section.trim());
                return None;
            }

            let scope = scope?;
            Some(
                parse_reference(trimmed)
                    .map(|(name, version)| {
                        RawDeclaration::new(Ecosystem::Conan, name, version, scope).at_line(line)
                    })
                    .map_err(|msg| ParseWarning::at(line, msg)),
            )
        }))
    }
}
