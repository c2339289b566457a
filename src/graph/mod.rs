//! De-duplicated component graph
//!
//! Nodes are components plus one synthetic root per manifest that does not
//! name itself. Edges point from the declaring node to the declared
//! component. The graph stays acyclic: [`GraphBuilder`] rejects any edge
//! that would close a cycle.

mod builder;
mod cycles;

pub use builder::GraphBuilder;

use crate::domain::{Component, ComponentId};
use crate::manifest::ManifestKind;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A node of the graph: a manifest's synthetic root or a component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRef {
    /// The manifest file itself, when it does not declare its own identity
    Root(PathBuf),
    /// A component
    Component(ComponentId),
}

impl NodeRef {
    /// Returns the component id, if this node is a component
    pub fn component_id(&self) -> Option<&ComponentId> {
        match self {
            NodeRef::Component(id) => Some(id),
            NodeRef::Root(_) => None,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Root(path) => write!(f, "root:{}", path.display()),
            NodeRef::Component(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for NodeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<ComponentId> for NodeRef {
    fn from(id: ComponentId) -> Self {
        NodeRef::Component(id)
    }
}

/// A "declared by" relationship
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Edge {
    /// Declaring node
    pub parent: NodeRef,
    /// Declared component
    pub child: ComponentId,
}

impl Edge {
    /// Creates a new edge
    pub fn new(parent: impl Into<NodeRef>, child: ComponentId) -> Self {
        Self {
            parent: parent.into(),
            child,
        }
    }
}

/// The root node recorded for one manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRoot {
    /// Manifest path
    pub path: PathBuf,
    /// Manifest format
    pub kind: ManifestKind,
    /// Root node of the manifest
    pub root: NodeRef,
}

/// Everything one manifest contributes to the graph
#[derive(Debug, Clone, PartialEq)]
pub struct FileContribution {
    /// Manifest path
    pub path: PathBuf,
    /// Manifest format
    pub kind: ManifestKind,
    /// Root node: the identity component, or the synthetic file root
    pub root: NodeRef,
    /// Components in declaration order (identity first, when present)
    pub components: Vec<Component>,
    /// Edges in declaration order
    pub edges: Vec<Edge>,
}

impl FileContribution {
    /// Creates an empty contribution rooted at the file itself
    pub fn new(path: impl Into<PathBuf>, kind: ManifestKind) -> Self {
        let path = path.into();
        Self {
            root: NodeRef::Root(path.clone()),
            path,
            kind,
            components: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Roots the contribution at the package the manifest describes
    pub fn with_identity(mut self, identity: Component) -> Self {
        self.root = NodeRef::Component(identity.id.clone());
        self.components.insert(0, identity);
        self
    }

    /// Adds a component
    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Adds an edge
    pub fn add_edge(&mut self, parent: NodeRef, child: ComponentId) {
        self.edges.push(Edge::new(parent, child));
    }
}

/// The merged, de-duplicated component graph of one run
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<NodeRef, ()>,
    indices: HashMap<NodeRef, NodeIndex>,
    components: HashMap<ComponentId, Component>,
    order: Vec<ComponentId>,
    edges: Vec<Edge>,
    roots: Vec<ManifestRoot>,
}

impl DependencyGraph {
    /// Components in first-insertion order
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.order.iter().filter_map(|id| self.components.get(id))
    }

    /// Looks up a component by id
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Edges in first-insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Components declared directly by `node`, in edge insertion order
    pub fn children(&self, node: &NodeRef) -> Vec<&Component> {
        self.edges
            .iter()
            .filter(|edge| &edge.parent == node)
            .filter_map(|edge| self.components.get(&edge.child))
            .collect()
    }

    /// One root per merged manifest, in merge order
    pub fn roots(&self) -> &[ManifestRoot] {
        &self.roots
    }

    /// Returns the root recorded for a manifest path
    pub fn root_of(&self, path: &Path) -> Option<&ManifestRoot> {
        self.roots.iter().find(|root| root.path == path)
    }

    /// Lists node cycles present in the graph, each as sorted node labels.
    ///
    /// A graph assembled by [`GraphBuilder`] never contains one.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut found: Vec<Vec<String>> = cycles::find_cycles(&self.graph)
            .into_iter()
            .map(|scc| {
                let mut labels: Vec<String> =
                    scc.into_iter().map(|idx| self.index_label(idx)).collect();
                labels.sort_unstable();
                labels
            })
            .collect();
        found.sort_unstable();
        found
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the graph holds no components
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Readable label of a node: `name@version` for components
    pub fn label(&self, node: &NodeRef) -> String {
        match node {
            NodeRef::Component(id) => self
                .components
                .get(id)
                .map(|c| format!("{}@{}", c.name, c.version))
                .unwrap_or_else(|| id.to_string()),
            NodeRef::Root(_) => node.to_string(),
        }
    }

    fn index_label(&self, idx: NodeIndex) -> String {
        self.graph
            .node_weight(idx)
            .map(|node| self.label(node))
            .unwrap_or_else(|| format!("#{}", idx.index()))
    }

    fn node_index(&mut self, node: &NodeRef) -> NodeIndex {
        if let Some(idx) = self.indices.get(node) {
            return *idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.indices.insert(node.clone(), idx);
        idx
    }
}
