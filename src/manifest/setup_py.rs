//! setup.py reader for pip packages
//!
//! Handles keyword arguments of the `setup()` call:
//! - `install_requires` (runtime)
//! - `setup_requires` (build)
//! - `tests_require` (test)
//! - `name` / `version` as the package identity
//!
//! `classifiers` and other metadata are ignored. A keyword bound to a
//! module-level name (`install_requires=REQUIREMENTS`) is resolved when the
//! name was assigned a list literal earlier in the script.

use crate::domain::{Ecosystem, PackageRef, RawDeclaration, Scope};
use crate::error::ParseWarning;
use crate::manifest::script::{
    call_arguments, keyword_argument, sequence_items, split_top_level, string_literal, Statement,
    Statements,
};
use crate::manifest::{Declarations, ManifestKind, ManifestReader};
use crate::parser::split_requirement;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Reader for setup.py scripts
pub struct SetupPyReader;

static SETUP_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bsetup\s*\(").unwrap());
static ASSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*=\s*([^=].*)$").unwrap());
static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*$").unwrap());

type Item = Result<RawDeclaration, ParseWarning>;

fn keyword_scope(keyword: &str) -> Option<Scope> {
    match keyword {
        "install_requires" => Some(Scope::Runtime),
        "setup_requires" => Some(Scope::Build),
        "tests_require" => Some(Scope::Test),
        _ => None,
    }
}

/// Returns the argument text of the first `setup(...)` call in a statement
fn setup_arguments(stmt: &Statement) -> Option<&str> {
    if stmt.text.starts_with("def ") {
        return None;
    }
    let found = SETUP_CALL_RE.find(&stmt.text)?;
    call_arguments(&stmt.text, found.end() - 1)
}

fn requirement(item: &str, scope: Scope, line: usize, keyword: &str) -> Item {
    let Some(spec) = string_literal(item) else {
        return Err(ParseWarning::at(
            line,
            format!("expected a string literal in {keyword}, found `{item}`"),
        ));
    };
    let (name, constraint) = split_requirement(&spec)
        .ok_or_else(|| ParseWarning::at(line, format!("invalid requirement '{spec}'")))?;
    Ok(RawDeclaration::new(Ecosystem::Pip, name, constraint, scope).at_line(line))
}

/// Module-level list assignments seen so far, by name
#[derive(Default)]
struct ScriptState {
    lists: HashMap<String, String>,
}

impl ScriptState {
    fn process(&mut self, stmt: Statement) -> Vec<Item> {
        if let Some(args) = setup_arguments(&stmt) {
            return self.setup_declarations(args, stmt.line);
        }
        if stmt.indent == 0 {
            if let Some(caps) = ASSIGN_RE.captures(&stmt.text) {
                if sequence_items(&caps[2]).is_some() {
                    self.lists.insert(caps[1].to_string(), caps[2].to_string());
                }
            }
        }
        Vec::new()
    }

    fn resolve<'s>(&'s self, value: &'s str) -> Option<Vec<&'s str>> {
        if let Some(items) = sequence_items(value) {
            return Some(items);
        }
        if IDENT_RE.is_match(value) {
            return self.lists.get(value).and_then(|list| sequence_items(list));
        }
        None
    }

    fn setup_declarations(&self, args: &str, line: usize) -> Vec<Item> {
        let mut items = Vec::new();
        for arg in split_top_level(args) {
            let Some((keyword, value)) = keyword_argument(arg) else {
                continue;
            };
            let Some(scope) = keyword_scope(keyword) else {
                continue;
            };
            match self.resolve(value) {
                Some(elements) => items.extend(
                    elements
                        .into_iter()
                        .map(|element| requirement(element, scope, line, keyword)),
                ),
                None => items.push(Err(ParseWarning::at(
                    line,
                    format!("{keyword} must be a list of strings, found `{value}`"),
                ))),
            }
        }
        items
    }
}

impl ManifestReader for SetupPyReader {
    fn kind(&self) -> ManifestKind {
        ManifestKind::SetupPy
    }

    fn identity(&self, content: &str) -> Option<PackageRef> {
        let args = Statements::new(content)
            .find_map(|stmt| setup_arguments(&stmt).map(str::to_string))?;

        let mut name = None;
        let mut version = None;
        for (keyword, value) in split_top_level(&args)
            .into_iter()
            .filter_map(keyword_argument)
        {
            match keyword {
                "name" => name = string_literal(value),
                "version" => version = string_literal(value),
                _ => {}
            }
        }
        name.map(|n| PackageRef::new(n, version.map(|v| format!("=={v}")).unwrap_or_default()))
    }

    fn declarations<'a>(&'a self, content: &'a str) -> Declarations<'a> {
        let mut state = ScriptState::default();
        Box::new(Statements::new(content).flat_map(move |stmt| state.process(stmt)))
    }
}
