use crate::types::{ArchGraph, GraphEdge, GraphNode};
use archmap_facts::{Fact, FactStore, RelationKind};
use petgraph::graph::NodeIndex;
use std::collections::HashSet;

/// Build a graph snapshot from a store's current sequence.
pub trait BuildGraph {
    fn build_graph(&self) -> ArchGraph;
}

impl BuildGraph for FactStore {
    fn build_graph(&self) -> ArchGraph {
        ArchGraph::build(self)
    }
}

impl ArchGraph {
    /// Snapshot the store and build from that snapshot; later mutations are not reflected.
    #[must_use]
    pub fn build(store: &FactStore) -> Self {
        Self::from_facts(&store.all())
    }

    /// One pass over `facts`: a node per distinct fact name or relation target,
    /// an edge per distinct `(source, relation, target)`.
    ///
    /// A node takes its attributes from the first fact carrying its name, even
    /// if the name was first seen as a relation target.
    #[must_use]
    pub fn from_facts(facts: &[Fact]) -> Self {
        let mut graph = Self::new();
        let mut edges: HashSet<(NodeIndex, RelationKind, NodeIndex)> = HashSet::new();

        for fact in facts {
            if fact.name.is_empty() {
                continue;
            }

            let source = graph.ensure_node(&fact.name);
            let node = &mut graph.graph[source];
            if !node.is_resolved() {
                node.adopt(fact);
            }

            for relation in &fact.relations {
                if relation.target.is_empty() {
                    continue;
                }
                let target = graph.ensure_node(&relation.target);
                if edges.insert((source, relation.kind, target)) {
                    graph.graph.add_edge(
                        source,
                        target,
                        GraphEdge {
                            relation: relation.kind,
                        },
                    );
                }
            }
        }

        log::info!(
            "Built architecture graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        graph
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode::unresolved(name));
        self.index.insert(name.to_string(), idx);
        idx
    }
}
