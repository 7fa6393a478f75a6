//! # Archmap Graph
//!
//! Architecture graph derived from a [`archmap_facts::FactStore`].
//!
//! ## Architecture
//!
//! ```text
//! FactStore::all() snapshot
//!     │
//!     ├──> Graph Builder (one pass)
//!     │      ├─ Node per distinct fact name / relation target
//!     │      └─ Edge per distinct (source, relation, target)
//!     │
//!     ├──> Arch Graph (petgraph arena + name index)
//!     │
//!     └──> Bounded walks
//!            ├─ traverse   (forward / reverse BFS)
//!            ├─ find_path  (fewest hops, forward)
//!            └─ impact_set (reverse closure, optional forward)
//! ```
//!
//! The graph is never updated in place: rebuild it after the store changes.

mod builder;
mod error;
mod graph;
mod traversal;
mod types;

pub use builder::BuildGraph;
pub use error::{GraphError, Result};
pub use graph::{GraphStats, Hotspot};
pub use traversal::{
    clamp_budget, ImpactClosure, ImpactLayer, ImpactOptions, ImpactResult, PathOptions,
    PathResult, TraversalResult, TraverseOptions, VisitedNode, IMPACT_DEFAULT_DEPTH,
    IMPACT_DEFAULT_NODES, IMPACT_MAX_DEPTH, IMPACT_MAX_NODES, PATH_DEFAULT_DEPTH, PATH_MAX_DEPTH,
    TRAVERSE_DEFAULT_DEPTH, TRAVERSE_DEFAULT_NODES, TRAVERSE_MAX_DEPTH, TRAVERSE_MAX_NODES,
};
pub use types::{ArchGraph, EdgeView, GraphEdge, GraphNode, TraverseDirection};
