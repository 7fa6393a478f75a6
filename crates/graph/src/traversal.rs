//! Bounded, cycle-safe walks over an [`ArchGraph`].
//!
//! Every walk keeps a visited set keyed by node slot, so termination only
//! depends on the depth and node caps. Neighbours are expanded in edge
//! creation order, which makes results reproducible for a given snapshot.

use crate::types::{ArchGraph, EdgeView, TraverseDirection};
use archmap_facts::{FactKind, RelationKind};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::Direction;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const TRAVERSE_DEFAULT_DEPTH: usize = 5;
pub const TRAVERSE_MAX_DEPTH: usize = 20;
pub const TRAVERSE_DEFAULT_NODES: usize = 100;
pub const TRAVERSE_MAX_NODES: usize = 500;
pub const PATH_DEFAULT_DEPTH: usize = 10;
pub const PATH_MAX_DEPTH: usize = 20;
pub const IMPACT_DEFAULT_DEPTH: usize = 3;
pub const IMPACT_MAX_DEPTH: usize = 10;
pub const IMPACT_DEFAULT_NODES: usize = 200;
pub const IMPACT_MAX_NODES: usize = 500;

/// 0 selects `default`; anything else is capped at `max`.
#[must_use]
pub const fn clamp_budget(value: usize, default: usize, max: usize) -> usize {
    if value == 0 {
        default
    } else if value > max {
        max
    } else {
        value
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TraverseOptions {
    pub start: String,
    pub direction: TraverseDirection,
    /// Only follow these edge kinds (empty = all)
    pub relation_kinds: Vec<RelationKind>,
    /// Only report nodes of these kinds (empty = all); filtered nodes are still walked through
    pub node_kinds: Vec<FactKind>,
    pub max_depth: usize,
    pub max_nodes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PathOptions {
    pub from: String,
    pub to: String,
    pub relation_kinds: Vec<RelationKind>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ImpactOptions {
    pub target: String,
    pub max_depth: usize,
    pub max_nodes: usize,
    /// Also compute what `target` itself depends on
    pub include_forward: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct VisitedNode {
    pub name: String,
    pub kind: Option<FactKind>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file: String,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TraversalResult {
    pub start: String,
    pub direction: TraverseDirection,
    /// False when `start` is not a node
    pub found: bool,
    pub nodes: Vec<VisitedNode>,
    /// The edge that first reached each visited node, kept only when both
    /// endpoints are in `nodes`
    pub edges: Vec<EdgeView>,
    pub max_depth: usize,
    pub max_nodes: usize,
    /// The node budget ran out before the frontier was exhausted
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PathResult {
    pub from: String,
    pub to: String,
    pub found: bool,
    pub hops: usize,
    pub nodes: Vec<VisitedNode>,
    pub edges: Vec<EdgeView>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ImpactLayer {
    pub depth: usize,
    pub nodes: Vec<VisitedNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ImpactClosure {
    pub layers: Vec<ImpactLayer>,
    pub total: usize,
    pub truncated: bool,
}

impl ImpactClosure {
    /// All impacted names, nearest first.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.layers
            .iter()
            .flat_map(|layer| layer.nodes.iter().map(|n| n.name.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ImpactResult {
    pub target: String,
    pub found: bool,
    pub max_depth: usize,
    pub max_nodes: usize,
    /// Reverse closure: everything that breaks if `target` changes
    pub dependents: ImpactClosure,
    /// Forward closure: everything that can break `target`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<ImpactClosure>,
}

/// Visit order of one breadth-first walk, start first.
struct Walk {
    visits: Vec<(NodeIndex, usize, Option<EdgeIndex>)>,
    truncated: bool,
}

impl ArchGraph {
    /// Breadth-first walk from `start`, never expanding past `max_depth`
    /// and never visiting more than `max_nodes` nodes (start included).
    fn walk(
        &self,
        start: NodeIndex,
        direction: Direction,
        relations: &[RelationKind],
        max_depth: usize,
        max_nodes: usize,
    ) -> Walk {
        let mut visited = vec![false; self.graph.node_count()];
        let mut queue = VecDeque::new();
        let mut visits = vec![(start, 0, None)];
        let mut truncated = false;

        visited[start.index()] = true;
        queue.push_back((start, 0));

        'outer: while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for (edge, next) in self.adjacent(current, direction, relations) {
                if visited[next.index()] {
                    continue;
                }
                if visits.len() >= max_nodes {
                    truncated = true;
                    break 'outer;
                }
                visited[next.index()] = true;
                visits.push((next, depth + 1, Some(edge)));
                queue.push_back((next, depth + 1));
            }
        }

        Walk { visits, truncated }
    }

    fn visited_node(&self, idx: NodeIndex, depth: usize) -> VisitedNode {
        let node = &self.graph[idx];
        VisitedNode {
            name: node.name.clone(),
            kind: node.kind,
            file: node.file.clone(),
            depth,
        }
    }

    /// Bounded breadth-first traversal from `opts.start`.
    ///
    /// The start node is always reported at depth 0; `node_kinds` only filters
    /// the nodes discovered after it.
    #[must_use]
    pub fn traverse(&self, opts: &TraverseOptions) -> TraversalResult {
        let max_depth = clamp_budget(opts.max_depth, TRAVERSE_DEFAULT_DEPTH, TRAVERSE_MAX_DEPTH);
        let max_nodes = clamp_budget(opts.max_nodes, TRAVERSE_DEFAULT_NODES, TRAVERSE_MAX_NODES);
        let mut result = TraversalResult {
            start: opts.start.clone(),
            direction: opts.direction,
            found: false,
            nodes: Vec::new(),
            edges: Vec::new(),
            max_depth,
            max_nodes,
            truncated: false,
        };

        let Some(start) = self.find_node(&opts.start) else {
            return result;
        };
        result.found = true;

        let walk = self.walk(
            start,
            opts.direction.petgraph(),
            &opts.relation_kinds,
            max_depth,
            max_nodes,
        );
        result.truncated = walk.truncated;

        let mut reported = vec![false; self.graph.node_count()];
        for &(idx, depth, edge) in &walk.visits {
            let node = self.visited_node(idx, depth);
            if edge.is_none()
                || opts.node_kinds.is_empty()
                || node.kind.is_some_and(|k| opts.node_kinds.contains(&k))
            {
                reported[idx.index()] = true;
                result.nodes.push(node);
            }
        }
        for edge in walk.visits.iter().filter_map(|&(_, _, edge)| edge) {
            let Some((source, target)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            if reported[source.index()] && reported[target.index()] {
                result.edges.extend(self.edge_view(edge));
            }
        }

        result
    }

    /// Fewest-hop path over forward edges. A missing endpoint or no path within
    /// the depth bound is reported as `found: false`.
    #[must_use]
    pub fn find_path(&self, opts: &PathOptions) -> PathResult {
        let max_depth = clamp_budget(opts.max_depth, PATH_DEFAULT_DEPTH, PATH_MAX_DEPTH);
        let mut result = PathResult {
            from: opts.from.clone(),
            to: opts.to.clone(),
            found: false,
            hops: 0,
            nodes: Vec::new(),
            edges: Vec::new(),
            max_depth,
        };

        let (Some(from), Some(to)) = (self.find_node(&opts.from), self.find_node(&opts.to)) else {
            return result;
        };

        let mut parent: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; self.graph.node_count()];
        let mut visited = vec![false; self.graph.node_count()];
        let mut queue = VecDeque::from([(from, 0)]);
        visited[from.index()] = true;

        let mut reached = from == to;
        while let Some((current, depth)) = queue.pop_front() {
            if reached || depth >= max_depth {
                break;
            }
            for (edge, next) in self.adjacent(current, Direction::Outgoing, &opts.relation_kinds) {
                if visited[next.index()] {
                    continue;
                }
                visited[next.index()] = true;
                parent[next.index()] = Some((current, edge));
                if next == to {
                    reached = true;
                    break;
                }
                queue.push_back((next, depth + 1));
            }
        }

        if !reached {
            return result;
        }

        let mut chain = vec![to];
        let mut edges = Vec::new();
        let mut cursor = to;
        while let Some((prev, edge)) = parent[cursor.index()] {
            chain.push(prev);
            edges.push(edge);
            cursor = prev;
        }
        chain.reverse();
        edges.reverse();

        result.found = true;
        result.hops = edges.len();
        result.nodes = chain
            .into_iter()
            .enumerate()
            .map(|(depth, idx)| self.visited_node(idx, depth))
            .collect();
        result.edges = edges.into_iter().filter_map(|e| self.edge_view(e)).collect();
        result
    }

    /// Transitive blast radius of `opts.target`, grouped by hop distance.
    #[must_use]
    pub fn impact_set(&self, opts: &ImpactOptions) -> ImpactResult {
        let max_depth = clamp_budget(opts.max_depth, IMPACT_DEFAULT_DEPTH, IMPACT_MAX_DEPTH);
        let max_nodes = clamp_budget(opts.max_nodes, IMPACT_DEFAULT_NODES, IMPACT_MAX_NODES);
        let mut result = ImpactResult {
            target: opts.target.clone(),
            found: false,
            max_depth,
            max_nodes,
            dependents: ImpactClosure::default(),
            dependencies: None,
        };

        let Some(target) = self.find_node(&opts.target) else {
            return result;
        };
        result.found = true;
        result.dependents = self.closure(target, Direction::Incoming, max_depth, max_nodes);
        if opts.include_forward {
            result.dependencies =
                Some(self.closure(target, Direction::Outgoing, max_depth, max_nodes));
        }
        result
    }

    fn closure(
        &self,
        target: NodeIndex,
        direction: Direction,
        max_depth: usize,
        max_nodes: usize,
    ) -> ImpactClosure {
        // The walk budget counts the target itself.
        let walk = self.walk(target, direction, &[], max_depth, max_nodes + 1);

        let mut layers: Vec<ImpactLayer> = Vec::new();
        for (idx, depth, _) in walk.visits.into_iter().skip(1) {
            let node = self.visited_node(idx, depth);
            match layers.last_mut() {
                Some(layer) if layer.depth == depth => layer.nodes.push(node),
                _ => layers.push(ImpactLayer {
                    depth,
                    nodes: vec![node],
                }),
            }
        }

        ImpactClosure {
            total: layers.iter().map(|l| l.nodes.len()).sum(),
            layers,
            truncated: walk.truncated,
        }
    }
}
