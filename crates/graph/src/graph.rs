use crate::types::{ArchGraph, EdgeView};
use archmap_facts::{FactKind, RelationKind};
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Hotspot {
    pub name: String,
    pub kind: Option<FactKind>,
    pub fan_in: usize,
    pub fan_out: usize,
    pub score: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    /// Nodes only known as relation targets
    pub unresolved: usize,
    pub by_relation: BTreeMap<RelationKind, usize>,
}

impl ArchGraph {
    /// Direct outgoing edges of `name` (empty `relations` = any kind)
    #[must_use]
    pub fn outgoing(&self, name: &str, relations: &[RelationKind]) -> Vec<EdgeView> {
        self.edges_of(name, Direction::Outgoing, relations)
    }

    /// Direct incoming edges of `name` (empty `relations` = any kind)
    #[must_use]
    pub fn incoming(&self, name: &str, relations: &[RelationKind]) -> Vec<EdgeView> {
        self.edges_of(name, Direction::Incoming, relations)
    }

    fn edges_of(
        &self,
        name: &str,
        direction: Direction,
        relations: &[RelationKind],
    ) -> Vec<EdgeView> {
        let Some(idx) = self.find_node(name) else {
            return Vec::new();
        };
        self.adjacent(idx, direction, relations)
            .into_iter()
            .filter_map(|(edge, _)| self.edge_view(edge))
            .collect()
    }

    fn degree(&self, idx: NodeIndex, direction: Direction) -> usize {
        self.graph.edges_directed(idx, direction).count()
    }

    /// Total edges in + out; 0 for unknown names.
    #[must_use]
    pub fn coupling_score(&self, name: &str) -> usize {
        self.find_node(name).map_or(0, |idx| {
            self.degree(idx, Direction::Outgoing) + self.degree(idx, Direction::Incoming)
        })
    }

    /// Highest-coupling nodes first; ties broken by name.
    #[must_use]
    pub fn hotspots(&self, limit: usize) -> Vec<Hotspot> {
        let mut scores: Vec<Hotspot> = self
            .graph
            .node_indices()
            .map(|idx| {
                let fan_in = self.degree(idx, Direction::Incoming);
                let fan_out = self.degree(idx, Direction::Outgoing);
                Hotspot {
                    name: self.graph[idx].name.clone(),
                    kind: self.graph[idx].kind,
                    fan_in,
                    fan_out,
                    score: fan_in + fan_out,
                }
            })
            .filter(|h| h.score > 0)
            .collect();

        scores.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        scores.truncate(limit);
        scores
    }

    /// Nodes with outgoing edges but nothing pointing at them, sorted by name.
    #[must_use]
    pub fn entry_points(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.degree(idx, Direction::Incoming) == 0
                    && self.degree(idx, Direction::Outgoing) > 0
            })
            .map(|idx| self.graph[idx].name.clone())
            .collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut by_relation = BTreeMap::new();
        for edge in self.graph.edge_weights() {
            *by_relation.entry(edge.relation).or_insert(0) += 1;
        }
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            unresolved: self.nodes().filter(|n| !n.is_resolved()).count(),
            by_relation,
        }
    }
}
