use crate::config::CliConfig;
use crate::{ImpactArgs, PathArgs, TraverseArgs};
use anyhow::Result;
use archmap_facts::FactStore;
use archmap_graph::{BuildGraph, ImpactOptions, PathOptions, TraverseOptions};
use serde_json::{json, Value};

pub fn traverse(store: &FactStore, args: &TraverseArgs, config: &CliConfig) -> Result<Value> {
    let opts = TraverseOptions {
        start: args.start.clone(),
        direction: args.direction,
        relation_kinds: args.rel.clone(),
        node_kinds: args.node_kind.clone(),
        max_depth: args.max_depth.unwrap_or(config.traverse.max_depth),
        max_nodes: args.max_nodes.unwrap_or(config.traverse.max_nodes),
    };
    Ok(serde_json::to_value(store.build_graph().traverse(&opts))?)
}

pub fn path(store: &FactStore, args: &PathArgs, config: &CliConfig) -> Result<Value> {
    let opts = PathOptions {
        from: args.from.clone(),
        to: args.to.clone(),
        relation_kinds: args.rel.clone(),
        max_depth: args.max_depth.unwrap_or(config.path.max_depth),
    };
    Ok(serde_json::to_value(store.build_graph().find_path(&opts))?)
}

pub fn impact(store: &FactStore, args: &ImpactArgs, config: &CliConfig) -> Result<Value> {
    let opts = ImpactOptions {
        target: args.target.clone(),
        max_depth: args.max_depth.unwrap_or(config.impact.max_depth),
        max_nodes: args.max_nodes.unwrap_or(config.impact.max_nodes),
        include_forward: args.forward,
    };
    Ok(serde_json::to_value(store.build_graph().impact_set(&opts))?)
}

pub fn hotspots(store: &FactStore, limit: usize) -> Result<Value> {
    let graph = store.build_graph();
    Ok(json!({ "hotspots": graph.hotspots(limit) }))
}
