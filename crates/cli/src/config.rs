use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "archmap.toml";
pub const DEFAULT_FACTS_PATH: &str = ".archmap/facts.jsonl";

/// Per-walk defaults; 0 defers to the graph engine's own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkDefaults {
    pub max_depth: usize,
    pub max_nodes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub facts: PathBuf,
    pub traverse: WalkDefaults,
    pub path: WalkDefaults,
    pub impact: WalkDefaults,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            facts: PathBuf::from(DEFAULT_FACTS_PATH),
            traverse: WalkDefaults {
                max_depth: archmap_graph::TRAVERSE_DEFAULT_DEPTH,
                max_nodes: archmap_graph::TRAVERSE_DEFAULT_NODES,
            },
            path: WalkDefaults {
                max_depth: archmap_graph::PATH_DEFAULT_DEPTH,
                max_nodes: 0,
            },
            impact: WalkDefaults {
                max_depth: archmap_graph::IMPACT_DEFAULT_DEPTH,
                max_nodes: archmap_graph::IMPACT_DEFAULT_NODES,
            },
        }
    }
}

impl CliConfig {
    /// An explicitly requested file must exist; the implicit `archmap.toml` may not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
