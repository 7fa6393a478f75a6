use crate::error::GraphError;
use archmap_facts::{Fact, FactKind, RelationKind};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Graph projection of one fact name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct GraphNode {
    pub name: String,
    /// `None` while the name is only known as a relation target
    pub kind: Option<FactKind>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub line: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub repo: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(line: &u32) -> bool {
    *line == 0
}

impl GraphNode {
    pub(crate) fn unresolved(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: None,
            file: String::new(),
            line: 0,
            repo: String::new(),
        }
    }

    pub(crate) fn adopt(&mut self, fact: &Fact) {
        self.kind = Some(fact.kind);
        self.file.clone_from(&fact.file);
        self.line = fact.line;
        self.repo.clone_from(&fact.repo);
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.kind.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub relation: RelationKind,
}

/// An edge as reported to callers: always in its stored source → target direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct EdgeView {
    pub from: String,
    pub to: String,
    pub relation: RelationKind,
}

/// Which way a walk follows edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TraverseDirection {
    /// Source → target: what a node depends on
    #[default]
    Forward,
    /// Target → source: what depends on a node
    Reverse,
}

impl TraverseDirection {
    pub(crate) const fn petgraph(self) -> Direction {
        match self {
            TraverseDirection::Forward => Direction::Outgoing,
            TraverseDirection::Reverse => Direction::Incoming,
        }
    }
}

impl fmt::Display for TraverseDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraverseDirection::Forward => f.write_str("forward"),
            TraverseDirection::Reverse => f.write_str("reverse"),
        }
    }
}

impl FromStr for TraverseDirection {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(TraverseDirection::Forward),
            "reverse" => Ok(TraverseDirection::Reverse),
            other => Err(GraphError::InvalidDirection(other.to_string())),
        }
    }
}

/// Read-only architecture graph derived from a fact sequence.
///
/// Nodes live in a petgraph arena; `index` maps each distinct name to its slot.
#[derive(Debug, Default, Clone)]
pub struct ArchGraph {
    pub(crate) graph: DiGraph<GraphNode, GraphEdge>,
    pub(crate) index: HashMap<String, NodeIndex>,
}

impl ArchGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    #[must_use]
    pub fn node_by_name(&self, name: &str) -> Option<&GraphNode> {
        self.find_node(name).and_then(|idx| self.node(idx))
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.node_weights()
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView> + '_ {
        self.graph.edge_indices().filter_map(|e| self.edge_view(e))
    }

    pub(crate) fn edge_view(&self, edge: EdgeIndex) -> Option<EdgeView> {
        let (source, target) = self.graph.edge_endpoints(edge)?;
        Some(EdgeView {
            from: self.graph[source].name.clone(),
            to: self.graph[target].name.clone(),
            relation: self.graph[edge].relation,
        })
    }

    /// Adjacent edges in `direction`, in edge creation order, optionally
    /// restricted to `relations`. Yields `(edge, neighbour)`.
    pub(crate) fn adjacent(
        &self,
        node: NodeIndex,
        direction: Direction,
        relations: &[RelationKind],
    ) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut out: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| relations.is_empty() || relations.contains(&e.weight().relation))
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other)
            })
            .collect();
        out.sort_by_key(|(edge, _)| edge.index());
        out
    }
}
