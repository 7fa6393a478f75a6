//! Archmap CLI
//!
//! Loads a `facts.jsonl` log, queries it and walks the derived architecture graph.
//! Every command prints one JSON document on stdout; logs go to stderr.

use anyhow::Result;
use archmap_facts::{FactKind, RelationKind};
use archmap_graph::TraverseDirection;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod command;
mod config;

use config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "archmap", version, about = "Query architecture facts and their dependency graph")]
struct Cli {
    /// Config file (default: ./archmap.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fact log to load (overrides the config)
    #[arg(long, global = true)]
    facts: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store and graph summary
    Stats,
    /// Filter facts
    Query(QueryArgs),
    /// Facts whose name is exactly NAME
    Lookup { name: String },
    /// Facts holding a relation that targets TARGET
    Refs {
        target: String,
        #[arg(long)]
        rel: Option<RelationKind>,
    },
    /// Breadth-first walk from a node
    Traverse(TraverseArgs),
    /// Fewest-hop forward path between two nodes
    Path(PathArgs),
    /// What depends on TARGET, transitively
    Impact(ImpactArgs),
    /// Most coupled nodes
    Hotspots {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Append a second repository's fact log, tagging both sides
    Merge(MergeArgs),
}

#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    #[arg(long)]
    pub kind: Vec<FactKind>,
    #[arg(long)]
    pub file: Vec<String>,
    #[arg(long)]
    pub file_prefix: Option<String>,
    /// Substring of the fact name
    #[arg(long)]
    pub name: Option<String>,
    /// Exact fact name (repeatable)
    #[arg(long = "exact")]
    pub names: Vec<String>,
    #[arg(long)]
    pub repo: Option<String>,
    #[arg(long)]
    pub rel: Option<RelationKind>,
    #[arg(long)]
    pub prop: Option<String>,
    #[arg(long, requires = "prop")]
    pub prop_value: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct TraverseArgs {
    pub start: String,
    #[arg(long, default_value = "forward")]
    pub direction: TraverseDirection,
    #[arg(long)]
    pub rel: Vec<RelationKind>,
    #[arg(long)]
    pub node_kind: Vec<FactKind>,
    #[arg(long)]
    pub max_depth: Option<usize>,
    #[arg(long)]
    pub max_nodes: Option<usize>,
}

#[derive(Args, Debug)]
pub struct PathArgs {
    pub from: String,
    pub to: String,
    #[arg(long)]
    pub rel: Vec<RelationKind>,
    #[arg(long)]
    pub max_depth: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ImpactArgs {
    pub target: String,
    #[arg(long)]
    pub max_depth: Option<usize>,
    #[arg(long)]
    pub max_nodes: Option<usize>,
    /// Also report what TARGET depends on
    #[arg(long)]
    pub forward: bool,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Fact log of the repository being appended
    pub other: PathBuf,
    /// Label (and file prefix) for the appended facts
    #[arg(long)]
    pub repo: String,
    /// Label (and file prefix) for base facts that have no repo yet
    #[arg(long)]
    pub base_repo: Option<String>,
    /// Output file (default: overwrite the base fact log)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(facts) = cli.facts {
        config.facts = facts;
    }

    let output = command::execute(cli.command, &config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
