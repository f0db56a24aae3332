//! Resource graph with reference wiring and declaration ordering
//!
//! Every declaration becomes a node; every deferred reference it carries
//! becomes an edge from the referenced declaration to the referencing one, so
//! a topological walk yields declarations before anything that points at
//! them. References may only target constructs declared earlier, which keeps
//! the graph acyclic by construction.

use crate::infra::resources::{Resource, ResourceKind};
use crate::infra::token::{Attribute, Expr, LogicalId};
use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

/// Errors raised while wiring declarations together
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Construct '{construct_id}' is already declared")]
    DuplicateConstruct { construct_id: String },

    #[error("Construct '{construct_id}' references undeclared resource {target}")]
    UndeclaredReference {
        construct_id: String,
        target: LogicalId,
    },

    #[error("Construct id '{construct_id}' must be non-empty and must not contain '/'")]
    InvalidConstructId { construct_id: String },

    #[error("Reference cycle detected at {construct_id}")]
    Cycle { construct_id: String },

    #[error("Parameter path must name a single parameter, got '{path}'")]
    WildcardParameterPath { path: String },
}

/// How a declaration points at another one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// Bound to the resource's identity (its physical id)
    Identity,
    /// Reads an attribute only known after provisioning
    Attribute(Attribute),
}

impl Reference {
    pub fn from_attribute(attribute: Option<Attribute>) -> Self {
        attribute.map_or(Reference::Identity, Reference::Attribute)
    }
}

/// Handle to a declared resource, used to wire later declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub construct_id: String,
    pub logical_id: LogicalId,
    pub kind: ResourceKind,
}

impl ResourceRef {
    /// Deferred physical id
    pub fn reference(&self) -> Expr {
        Expr::Ref(self.logical_id.clone())
    }

    /// Deferred attribute
    pub fn attr(&self, attribute: Attribute) -> Expr {
        Expr::GetAtt(self.logical_id.clone(), attribute)
    }
}

/// A node in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub construct_id: String,
    pub logical_id: LogicalId,
    pub resource: Resource,
}

impl Declaration {
    pub fn kind(&self) -> ResourceKind {
        self.resource.kind()
    }
}

/// Declarative graph of every resource in a stack
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    /// Directed graph: nodes = declarations, edges = dependency -> dependent
    graph: DiGraph<Declaration, Reference>,
    /// Map from logical id to node index for fast lookup
    node_map: HashMap<LogicalId, NodeIndex>,
}

impl ResourceGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource, wiring an edge for every reference it carries
    pub fn declare(
        &mut self,
        construct_id: &str,
        resource: impl Into<Resource>,
    ) -> Result<ResourceRef, GraphError> {
        // Child resources live under `<construct>/<child>`
        if construct_id.is_empty() || construct_id.contains('/') {
            return Err(GraphError::InvalidConstructId {
                construct_id: construct_id.to_string(),
            });
        }

        let resource = resource.into();
        let logical_id = LogicalId::from_path(&[construct_id, "Resource"]);

        if self.node_map.contains_key(&logical_id) {
            return Err(GraphError::DuplicateConstruct {
                construct_id: construct_id.to_string(),
            });
        }

        let mut edges: Vec<(NodeIndex, Reference)> = Vec::new();
        for (target, attribute) in resource.references() {
            let target_idx = self.node_map.get(&target).ok_or_else(|| {
                GraphError::UndeclaredReference {
                    construct_id: construct_id.to_string(),
                    target: target.clone(),
                }
            })?;
            let edge = (*target_idx, Reference::from_attribute(attribute));
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }

        let kind = resource.kind();
        let idx = self.graph.add_node(Declaration {
            construct_id: construct_id.to_string(),
            logical_id: logical_id.clone(),
            resource,
        });
        self.node_map.insert(logical_id.clone(), idx);

        for (dependency, reference) in edges {
            self.graph.add_edge(dependency, idx, reference);
        }

        trace!(construct_id, %logical_id, ?kind, "Declared resource");

        Ok(ResourceRef {
            construct_id: construct_id.to_string(),
            logical_id,
            kind,
        })
    }

    /// Check if the graph contains cycles
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Construct ids of the first cycle found, if any
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        if !self.has_cycles() {
            return None;
        }

        tarjan_scc(&self.graph)
            .into_iter()
            .find(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|idx| self.graph.contains_edge(*idx, *idx))
            })
            .map(|component| {
                component
                    .into_iter()
                    .map(|idx| self.graph[idx].construct_id.clone())
                    .collect()
            })
    }

    /// Declarations ordered so every dependency precedes its dependents
    ///
    /// `declare` only accepts references to earlier declarations, so
    /// declaration order is already a topological order.
    pub fn topological_order(&self) -> Result<Vec<&Declaration>, GraphError> {
        if let Some(cycle) = self.detect_cycle() {
            return Err(GraphError::Cycle {
                construct_id: cycle.join(" -> "),
            });
        }

        Ok(self
            .graph
            .node_indices()
            .map(|idx| &self.graph[idx])
            .collect())
    }

    /// Direct dependencies of a declaration
    pub fn dependencies(&self, logical_id: &LogicalId) -> Option<Vec<(&Declaration, Reference)>> {
        let node_idx = self.node_map.get(logical_id)?;

        // Edges point from dependency to dependent, so look at incoming edges
        let mut deps: Vec<(&Declaration, Reference)> = self
            .graph
            .edges_directed(*node_idx, Direction::Incoming)
            .map(|edge| (&self.graph[edge.source()], *edge.weight()))
            .collect();
        deps.sort_by(|a, b| a.0.logical_id.cmp(&b.0.logical_id));

        Some(deps)
    }

    /// Declarations that reference this one
    pub fn dependents(&self, logical_id: &LogicalId) -> Option<Vec<&Declaration>> {
        let node_idx = self.node_map.get(logical_id)?;

        let mut dependents: Vec<&Declaration> = self
            .graph
            .neighbors_directed(*node_idx, Direction::Outgoing)
            .map(|idx| &self.graph[idx])
            .collect();
        dependents.sort_by(|a, b| a.logical_id.cmp(&b.logical_id));
        dependents.dedup_by(|a, b| a.logical_id == b.logical_id);

        Some(dependents)
    }

    /// Number of declarations of the given kind
    pub fn count_of(&self, kind: ResourceKind) -> usize {
        self.graph
            .node_weights()
            .filter(|decl| decl.kind() == kind)
            .count()
    }

    pub fn get(&self, logical_id: &LogicalId) -> Option<&Declaration> {
        let idx = self.node_map.get(logical_id)?;
        Some(&self.graph[*idx])
    }

    /// Look a declaration up by its construct id
    pub fn find(&self, construct_id: &str) -> Option<&Declaration> {
        self.get(&LogicalId::from_path(&[construct_id, "Resource"]))
    }

    /// Declarations in declaration order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.graph.node_weights()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    include!("graph.test.rs");
}
