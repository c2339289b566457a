//! conanfile.py reader for Conan recipes
//!
//! Handles:
//! - `requires`, `tool_requires`, `build_requires`, `test_requires` and
//!   `python_requires` class attributes (string, tuple or list)
//! - `self.requires(...)` style calls, with `requires` inside
//!   `build_requirements()` counted as build scope
//! - `name` / `version` class attributes as the recipe identity

use crate::domain::{Ecosystem, PackageRef, RawDeclaration, Scope};
use crate::error::ParseWarning;
use crate::manifest::script::{
    call_arguments, keyword_argument, sequence_items, split_top_level, string_literal, Statement,
    Statements,
};
use crate::manifest::{Declarations, ManifestKind, ManifestReader};
use regex::Regex;
use std::sync::LazyLock;

/// Reader for conanfile.py recipes
pub struct ConanfileReader;

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(requires|tool_requires|build_requires|test_requires|python_requires)\s*=\s*(.+)$",
    )
    .unwrap()
});
static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w.])(?:self\.)?(requires|tool_requires|build_requires|test_requires)\s*\(")
        .unwrap()
});
static DEF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^def\s+(\w+)\s*\(").unwrap());
static IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(name|version)\s*=\s*(.+)$").unwrap());

/// Splits a Conan reference `name/version[@user/channel][#revision]`.
///
/// The version may be empty (`zlib/`), the name may not.
pub(crate) fn parse_reference(reference: &str) -> Result<(String, String), String> {
    let reference = reference.trim();
    let without_revision = reference.split('#').next().unwrap_or("");
    let without_channel = without_revision.split('@').next().unwrap_or("");

    let Some((name, version)) = without_channel.split_once('/') else {
        return Err(format!(
            "invalid Conan reference '{reference}': expected name/version"
        ));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid Conan reference '{reference}': empty name"));
    }
    if version.contains('/') {
        return Err(format!(
            "invalid Conan reference '{reference}': too many '/' separators"
        ));
    }
    Ok((name.to_string(), version.trim().to_string()))
}

fn scope_for(keyword: &str, in_build_requirements: bool) -> Scope {
    match keyword {
        "tool_requires" | "build_requires" | "python_requires" => Scope::Build,
        "test_requires" => Scope::Test,
        _ if in_build_requirements => Scope::Build,
        _ => Scope::Runtime,
    }
}

fn declaration(reference: &str, scope: Scope, line: usize) -> Result<RawDeclaration, ParseWarning> {
    let (name, version) = parse_reference(reference).map_err(|msg| ParseWarning::at(line, msg))?;
    Ok(RawDeclaration::new(Ecosystem::Conan, name, version, scope).at_line(line))
}

/// Tracks which method body the scanner is in
#[derive(Default)]
struct RecipeState {
    current_def: Option<(String, usize)>,
}

impl RecipeState {
    fn enter(&mut self, stmt: &Statement) {
        if let Some((_, indent)) = &self.current_def {
            if stmt.indent <= *indent {
                self.current_def = None;
            }
        }
        if let Some(caps) = DEF_RE.captures(&stmt.text) {
            self.current_def = Some((caps[1].to_string(), stmt.indent));
        }
    }

    fn in_method(&self) -> bool {
        self.current_def.is_some()
    }

    fn in_build_requirements(&self) -> bool {
        matches!(&self.current_def, Some((name, _)) if name == "build_requirements")
    }

    fn process(&mut self, stmt: Statement) -> Vec<Result<RawDeclaration, ParseWarning>> {
        self.enter(&stmt);
        if stmt.text.starts_with("def ") || stmt.text.starts_with("class ") {
            return Vec::new();
        }

        if let Some(caps) = ATTRIBUTE_RE.captures(&stmt.text) {
            let scope = scope_for(&caps[1], false);
            return attribute_declarations(&caps[1], &caps[2], scope, stmt.line);
        }

        let in_build = self.in_build_requirements();
        CALL_RE
            .captures_iter(&stmt.text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let keyword = caps.get(1)?.as_str();
                let open = whole.end() - 1;
                Some(call_declaration(
                    keyword,
                    &stmt.text,
                    open,
                    scope_for(keyword, in_build),
                    stmt.line,
                ))
            })
            .collect()
    }
}

fn attribute_declarations(
    keyword: &str,
    value: &str,
    scope: Scope,
    line: usize,
) -> Vec<Result<RawDeclaration, ParseWarning>> {
    if let Some(reference) = string_literal(value) {
        return vec![declaration(&reference, scope, line)];
    }

    let items = sequence_items(value).unwrap_or_else(|| split_top_level(value));
    if items.len() == 1 && string_literal(items[0]).is_none() {
        return vec![Err(ParseWarning::at(
            line,
            format!("{keyword} must be a string, tuple or list of strings, found `{value}`"),
        ))];
    }

    items
        .into_iter()
        .map(|item| match string_literal(item) {
            Some(reference) => declaration(&reference, scope, line),
            None => Err(ParseWarning::at(
                line,
                format!("expected a string literal in {keyword}, found `{item}`"),
            )),
        })
        .collect()
}

fn call_declaration(
    keyword: &str,
    text: &str,
    open: usize,
    scope: Scope,
    line: usize,
) -> Result<RawDeclaration, ParseWarning> {
    let args = call_arguments(text, open)
        .ok_or_else(|| ParseWarning::at(line, format!("unterminated {keyword}() call")))?;
    let parts = split_top_level(args);

    let first = parts
        .iter()
        .copied()
        .find(|arg| keyword_argument(arg).is_none())
        .or_else(|| {
            parts
                .iter()
                .filter_map(|arg| keyword_argument(arg))
                .find(|(key, _)| *key == "ref" || *key == "reference")
                .map(|(_, value)| value)
        })
        .ok_or_else(|| ParseWarning::at(line, format!("{keyword}() called without a reference")))?;

    let reference = string_literal(first).ok_or_else(|| {
        ParseWarning::at(
            line,
            format!("{keyword}() argument is not a string literal: `{first}`"),
        )
    })?;
    declaration(&reference, scope, line)
}

impl ManifestReader for ConanfileReader {
    fn kind(&self) -> ManifestKind {
        ManifestKind::ConanRecipe
    }

    fn identity(&self, content: &str) -> Option<PackageRef> {
        let mut state = RecipeState::default();
        let mut name = None;
        let mut version = None;

        for stmt in Statements::new(content) {
            state.enter(&stmt);
            if state.in_method() {
                continue;
            }
            if let Some(caps) = IDENTITY_RE.captures(&stmt.text) {
                let value = string_literal(&caps[2]);
                match &caps[1] {
                    "name" => name = name.or(value),
                    _ => version = version.or(value),
                }
            }
        }

        name.map(|n| PackageRef::new(n, version.unwrap_or_default()))
    }

    fn declarations<'a>(&'a self, content: &'a str) -> Declarations<'a> {
        let mut state = RecipeState::default();
        Box::new(Statements::new(content).flat_map(move |stmt| state.process(stmt)))
    }
}
