mod facts;
mod graph;

use crate::config::CliConfig;
use crate::Command;
use anyhow::{Context, Result};
use archmap_facts::FactStore;
use serde_json::Value;

pub fn execute(command: Command, config: &CliConfig) -> Result<Value> {
    let load = || load_store(config);
    match command {
        Command::Stats => facts::stats(&load()?),
        Command::Query(args) => facts::query(&load()?, &args),
        Command::Lookup { name } => facts::lookup(&load()?, &name),
        Command::Refs { target, rel } => facts::refs(&load()?, &target, rel),
        Command::Merge(args) => facts::merge(&load()?, &args, config),
        Command::Traverse(args) => graph::traverse(&load()?, &args, config),
        Command::Path(args) => graph::path(&load()?, &args, config),
        Command::Impact(args) => graph::impact(&load()?, &args, config),
        Command::Hotspots { limit } => graph::hotspots(&load()?, limit),
    }
}

fn load_store(config: &CliConfig) -> Result<FactStore> {
    FactStore::load_jsonl(&config.facts)
        .with_context(|| format!("failed to load facts from {}", config.facts.display()))
}
