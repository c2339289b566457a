//! conan.lock reader
//!
//! Handles both lockfile layouts:
//! - 0.4 (Conan 1.x): `graph_lock.nodes` keyed by index, node `"0"` is the consumer
//! - 0.5 (Conan 2.x): flat `requires`, `build_requires`, `python_requires` arrays

use crate::domain::{Ecosystem, PackageRef, RawDeclaration, Scope};
use crate::error::ParseWarning;
use crate::manifest::conanfile::parse_reference;
use crate::manifest::{Declarations, ManifestKind, ManifestReader};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};

/// Reader for conan.lock lockfiles
pub struct ConanLockReader;

const ROOT_NODE: &str = "0";

type Item = Result<RawDeclaration, ParseWarning>;

fn parse_json(content: &str) -> Result<Value, ParseWarning> {
    serde_json::from_str(content)
        .map_err(|e| ParseWarning::new(Some(e.line()), format!("invalid lockfile JSON: {e}")))
}

fn node_ref(node: &Value) -> Option<&str> {
    node.get("ref")
        .or_else(|| node.get("pref"))
        .and_then(Value::as_str)
}

fn node_ids<'v>(node: &'v Value, key: &str) -> Vec<&'v str> {
    node.get(key)
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn reference_declaration(reference: &str, scope: Scope) -> Item {
    parse_reference(reference)
        .map(|(name, version)| RawDeclaration::new(Ecosystem::Conan, name, version, scope))
        .map_err(|msg| ParseWarning::new(None, msg))
}

/// Conan 2.x lockfile: every entry is a direct declaration of the consumer
fn flat_declarations(lock: &Map<String, Value>) -> Vec<Item> {
    [
        ("requires", Scope::Runtime),
        ("build_requires", Scope::Build),
        ("python_requires", Scope::Build),
    ]
    .into_iter()
    .flat_map(|(key, scope)| {
        lock.get(key)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(move |entry| match entry.as_str() {
                Some(reference) => reference_declaration(reference, scope),
                None => Err(ParseWarning::new(
                    None,
                    format!("expected a reference string in {key}, found {entry}"),
                )),
            })
    })
    .collect()
}

/// Conan 1.x lockfile: edges between graph nodes, scoped by how the node was reached
fn graph_declarations(nodes: &Map<String, Value>) -> Vec<Item> {
    // Numeric node order keeps output independent of JSON key sorting
    let ordered: BTreeMap<u64, (&str, &Value)> = nodes
        .iter()
        .filter_map(|(id, node)| id.parse().ok().map(|n| (n, (id.as_str(), node))))
        .collect();

    let mut scopes: BTreeMap<&str, Scope> = BTreeMap::new();
    let mut queue = VecDeque::from([(ROOT_NODE, Scope::Runtime)]);
    while let Some((id, scope)) = queue.pop_front() {
        match scopes.get(id) {
            Some(Scope::Runtime) => continue,
            Some(_) if scope != Scope::Runtime => continue,
            _ => {}
        }
        scopes.insert(id, scope);
        let Some(node) = nodes.get(id) else { continue };
        for child in node_ids(node, "requires") {
            queue.push_back((child, scope));
        }
        for child in node_ids(node, "build_requires") {
            queue.push_back((child, Scope::Build));
        }
    }

    let mut items = Vec::new();
    for (id, node) in ordered.values() {
        let parent = if *id == ROOT_NODE {
            None
        } else {
            match node_ref(node).map(parse_reference) {
                Some(Ok((name, version))) => Some(PackageRef::new(name, version)),
                Some(Err(msg)) => {
                    items.push(Err(ParseWarning::new(None, format!("node {id}: {msg}"))));
                    continue;
                }
                None => {
                    items.push(Err(ParseWarning::new(
                        None,
                        format!("node {id} has no reference"),
                    )));
                    continue;
                }
            }
        };
        let parent_scope = scopes.get(id).copied().unwrap_or(Scope::Build);

        let edges = node_ids(node, "requires")
            .into_iter()
            .map(|child| (child, parent_scope))
            .chain(
                node_ids(node, "build_requires")
                    .into_iter()
                    .map(|child| (child, Scope::Build)),
            );

        for (child, scope) in edges {
            let item = match nodes.get(child).and_then(node_ref) {
                Some(reference) => reference_declaration(reference, scope).map(|decl| match &parent {
                    Some(p) => decl.with_parent(p.clone()),
                    None => decl,
                }),
                None => Err(ParseWarning::new(
                    None,
                    format!("node {id} requires unknown node {child}"),
                )),
            };
            items.push(item);
        }
    }
    items
}

fn lock_declarations(content: &str) -> Vec<Item> {
    let lock = match parse_json(content) {
        Ok(Value::Object(lock)) => lock,
        Ok(_) => {
            return vec![Err(ParseWarning::new(
                None,
                "lockfile root is not a JSON object",
            ))]
        }
        Err(warning) => return vec![Err(warning)],
    };

    if let Some(nodes) = lock
        .get("graph_lock")
        .and_then(|g| g.get("nodes"))
        .and_then(Value::as_object)
    {
        return graph_declarations(nodes);
    }
    if ["requires", "build_requires", "python_requires"]
        .iter()
        .any(|key| lock.contains_key(*key))
    {
        return flat_declarations(&lock);
    }

    let version = lock.get("version").and_then(Value::as_str).unwrap_or("unknown");
    vec![Err(ParseWarning::new(
        None,
        format!("unsupported lockfile layout (version {version})"),
    ))]
}

impl ManifestReader for ConanLockReader {
    fn kind(&self) -> ManifestKind {
        ManifestKind::ConanLock
    }

    fn identity(&self, content: &str) -> Option<PackageRef> {
        let lock = parse_json(content).ok()?;
        let root = lock.get("graph_lock")?.get("nodes")?.get(ROOT_NODE)?;
        let (name, version) = parse_reference(node_ref(root)?).ok()?;
        Some(PackageRef::new(name, version))
    }

    fn declarations<'a>(&'a self, content: &'a str) -> Declarations<'a> {
        Box::new(lock_declarations(content).into_iter())
    }
}
