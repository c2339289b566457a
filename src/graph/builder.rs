//! Merging per-file contributions into one graph

use super::cycles::would_create_cycle;
use super::{DependencyGraph, Edge, FileContribution, ManifestRoot, NodeRef};
use crate::domain::{Component, ComponentId};
use crate::error::CycleDetectedError;
use std::path::Path;
use tracing::{debug, warn};

/// Incrementally assembles a [`DependencyGraph`]
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DependencyGraph,
}

impl GraphBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a component, or unions it into the one already holding its id
    pub fn add_component(&mut self, component: Component) {
        let graph = &mut self.graph;
        match graph.components.get_mut(&component.id) {
            Some(existing) => existing.absorb(&component),
            None => {
                graph.node_index(&NodeRef::Component(component.id.clone()));
                graph.order.push(component.id.clone());
                graph.components.insert(component.id.clone(), component);
            }
        }
    }

    /// Inserts `parent -> child` unless it would close a cycle.
    ///
    /// Returns `Ok(false)` for an edge that is already present.
    pub fn add_edge(
        &mut self,
        path: &Path,
        parent: NodeRef,
        child: ComponentId,
    ) -> Result<bool, CycleDetectedError> {
        let graph = &mut self.graph;
        let from = graph.node_index(&parent);
        let to = graph.node_index(&NodeRef::Component(child.clone()));

        if let Some(cycle) = would_create_cycle(&graph.graph, from, to) {
            let labels = cycle
                .into_iter()
                .map(|idx| graph.index_label(idx))
                .collect();
            return Err(CycleDetectedError::new(path, labels));
        }
        if graph.graph.contains_edge(from, to) {
            return Ok(false);
        }

        graph.graph.add_edge(from, to, ());
        graph.edges.push(Edge { parent, child });
        Ok(true)
    }

    /// Merges everything one manifest contributed.
    ///
    /// Components are unioned by id. Edges that would close a cycle are
    /// dropped and returned; the rest of the contribution is kept.
    pub fn merge(&mut self, contribution: FileContribution) -> Vec<CycleDetectedError> {
        let FileContribution {
            path,
            kind,
            root,
            components,
            edges,
        } = contribution;

        debug!(
            path = %path.display(),
            components = components.len(),
            edges = edges.len(),
            "merging manifest"
        );

        if let NodeRef::Root(_) = &root {
            self.graph.node_index(&root);
        }
        if self.graph.root_of(&path).is_none() {
            self.graph.roots.push(ManifestRoot {
                path: path.clone(),
                kind,
                root,
            });
        }

        for component in components {
            self.add_component(component);
        }

        let mut rejected = Vec::new();
        for edge in edges {
            if let Err(err) = self.add_edge(&path, edge.parent, edge.child) {
                warn!(path = %path.display(), cycle = %err.cycle.join(" -> "), "dropping edge that closes a cycle");
                rejected.push(err);
            }
        }
        rejected
    }

    /// Returns the graph assembled so far
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Finishes the build
    pub fn build(self) -> DependencyGraph {
        self.graph
    }
}
