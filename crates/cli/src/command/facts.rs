use crate::config::CliConfig;
use crate::{MergeArgs, QueryArgs};
use anyhow::{Context, Result};
use archmap_facts::{FactStore, QueryOpts, RelationKind};
use archmap_graph::BuildGraph;
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufReader;

pub fn stats(store: &FactStore) -> Result<Value> {
    let graph = store.build_graph();
    Ok(json!({
        "facts": store.stats(),
        "graph": graph.stats(),
        "entry_points": graph.entry_points(),
    }))
}

pub fn query(store: &FactStore, args: &QueryArgs) -> Result<Value> {
    let opts = query_opts(args);
    let page = store.query_advanced(&opts);
    let has_more = page.has_more();
    let mut value = serde_json::to_value(page)?;
    value["has_more"] = json!(has_more);
    Ok(value)
}

/// A single `--kind`/`--file` lands in the exact field; repeats become the batch.
fn query_opts(args: &QueryArgs) -> QueryOpts {
    let (kind, kinds) = match args.kind.as_slice() {
        [one] => (Some(*one), Vec::new()),
        many => (None, many.to_vec()),
    };
    let (file, files) = match args.file.as_slice() {
        [one] => (Some(one.clone()), Vec::new()),
        many => (None, many.to_vec()),
    };

    QueryOpts {
        kind,
        kinds,
        file,
        files,
        file_prefix: args.file_prefix.clone(),
        name: args.name.clone(),
        names: args.names.clone(),
        repo: args.repo.clone(),
        rel_kind: args.rel,
        prop: args.prop.clone(),
        prop_value: args.prop_value.clone(),
        offset: args.offset,
        limit: args.limit,
    }
}

pub fn lookup(store: &FactStore, name: &str) -> Result<Value> {
    let facts = store.lookup_by_exact_name(name);
    Ok(json!({ "name": name, "count": facts.len(), "facts": facts }))
}

pub fn refs(store: &FactStore, target: &str, rel: Option<RelationKind>) -> Result<Value> {
    let facts = store.reverse_lookup(target, rel);
    Ok(json!({
        "target": target,
        "relation": rel,
        "count": facts.len(),
        "facts": facts,
    }))
}

/// Compose a second repository into the base log.
pub fn merge(store: &FactStore, args: &MergeArgs, config: &CliConfig) -> Result<Value> {
    let base_tagged = args
        .base_repo
        .as_deref()
        .map_or(0, |label| store.tag_untagged(label, &format!("{label}/")));

    let from = store.count();
    let reader = BufReader::new(
        File::open(&args.other)
            .with_context(|| format!("failed to open {}", args.other.display()))?,
    );
    let added = store
        .extend_from_jsonl(reader)
        .with_context(|| format!("failed to read {}", args.other.display()))?;
    store.tag_range(from, &args.repo, &format!("{}/", args.repo));

    let out = args.out.as_ref().unwrap_or(&config.facts);
    store
        .save_jsonl(out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    log::info!("Merged {added} facts from {} as '{}'", args.other.display(), args.repo);

    Ok(json!({
        "base_tagged": base_tagged,
        "added": added,
        "total": store.count(),
        "repos": store.repos(),
        "out": out,
    }))
}
