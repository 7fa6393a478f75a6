use crate::store::FactStore;
use crate::types::{Fact, FactKind, RelationKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_QUERY_LIMIT: usize = 100;
pub const MAX_QUERY_LIMIT: usize = 500;

/// Structured filter request.
///
/// Within the kind, file and name dimensions the alternatives are OR-ed;
/// every non-empty dimension is then AND-ed with the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct QueryOpts {
    pub kind: Option<FactKind>,
    pub kinds: Vec<FactKind>,
    /// Exact file
    pub file: Option<String>,
    pub files: Vec<String>,
    pub file_prefix: Option<String>,
    /// Case-sensitive substring of the fact name
    pub name: Option<String>,
    /// Exact names
    pub names: Vec<String>,
    pub repo: Option<String>,
    pub rel_kind: Option<RelationKind>,
    pub prop: Option<String>,
    /// Compared against the rendered prop value; only used when `prop` is set
    pub prop_value: Option<String>,
    pub offset: usize,
    /// 0 means [`DEFAULT_QUERY_LIMIT`]; larger values clamp to [`MAX_QUERY_LIMIT`]
    pub limit: usize,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct QueryPage {
    pub facts: Vec<Fact>,
    /// Matches before pagination
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl QueryPage {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.offset.saturating_add(self.facts.len()) < self.total
    }
}

#[must_use]
pub fn effective_limit(limit: usize) -> usize {
    match limit {
        0 => DEFAULT_QUERY_LIMIT,
        n => n.min(MAX_QUERY_LIMIT),
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// `QueryOpts` resolved into set lookups once per query.
struct Filter<'a> {
    kinds: HashSet<FactKind>,
    files: HashSet<&'a str>,
    file_prefix: Option<&'a str>,
    name_substring: Option<&'a str>,
    names: HashSet<&'a str>,
    repo: Option<&'a str>,
    rel_kind: Option<RelationKind>,
    prop: Option<&'a str>,
    prop_value: Option<&'a str>,
}

impl<'a> Filter<'a> {
    fn new(opts: &'a QueryOpts) -> Self {
        let mut kinds: HashSet<FactKind> = opts.kinds.iter().copied().collect();
        kinds.extend(opts.kind);

        let mut files: HashSet<&str> = opts
            .files
            .iter()
            .map(String::as_str)
            .filter(|f| !f.is_empty())
            .collect();
        files.extend(non_empty(opts.file.as_ref()));

        Self {
            kinds,
            files,
            file_prefix: non_empty(opts.file_prefix.as_ref()),
            name_substring: non_empty(opts.name.as_ref()),
            names: opts
                .names
                .iter()
                .map(String::as_str)
                .filter(|n| !n.is_empty())
                .collect(),
            repo: non_empty(opts.repo.as_ref()),
            rel_kind: opts.rel_kind,
            prop: non_empty(opts.prop.as_ref()),
            prop_value: non_empty(opts.prop_value.as_ref()),
        }
    }

    fn matches(&self, fact: &Fact) -> bool {
        self.matches_kind(fact)
            && self.matches_file(fact)
            && self.matches_name(fact)
            && self.repo.map_or(true, |repo| fact.repo == repo)
            && self.rel_kind.map_or(true, |kind| fact.has_relation_kind(kind))
            && self.matches_prop(fact)
    }

    fn matches_kind(&self, fact: &Fact) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&fact.kind)
    }

    fn matches_file(&self, fact: &Fact) -> bool {
        if self.files.is_empty() && self.file_prefix.is_none() {
            return true;
        }
        self.files.contains(fact.file.as_str())
            || self
                .file_prefix
                .is_some_and(|prefix| fact.file.starts_with(prefix))
    }

    fn matches_name(&self, fact: &Fact) -> bool {
        if self.names.is_empty() && self.name_substring.is_none() {
            return true;
        }
        self.names.contains(fact.name.as_str())
            || self
                .name_substring
                .is_some_and(|needle| fact.name.contains(needle))
    }

    fn matches_prop(&self, fact: &Fact) -> bool {
        let Some(key) = self.prop else {
            return true;
        };
        match (fact.props.get(key), self.prop_value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(value), Some(expected)) => value.render() == expected,
        }
    }
}

impl FactStore {
    /// Simple AND query. `name` is a substring match; the other arguments are exact.
    #[must_use]
    pub fn query(
        &self,
        kind: Option<FactKind>,
        file: Option<&str>,
        name: Option<&str>,
        rel_kind: Option<RelationKind>,
    ) -> Vec<Fact> {
        let file = file.filter(|f| !f.is_empty());
        let name = name.filter(|n| !n.is_empty());

        self.read()
            .facts
            .iter()
            .filter(|f| kind.map_or(true, |k| f.kind == k))
            .filter(|f| file.map_or(true, |file| f.file == file))
            .filter(|f| name.map_or(true, |needle| f.name.contains(needle)))
            .filter(|f| rel_kind.map_or(true, |k| f.has_relation_kind(k)))
            .cloned()
            .collect()
    }

    /// Filter the whole sequence, then return the requested page and the
    /// pre-pagination total. Offsets past the end yield an empty page.
    #[must_use]
    pub fn query_advanced(&self, opts: &QueryOpts) -> QueryPage {
        let filter = Filter::new(opts);
        let limit = effective_limit(opts.limit);

        let inner = self.read();
        let matched: Vec<&Fact> = inner.facts.iter().filter(|f| filter.matches(f)).collect();
        let total = matched.len();
        let start = opts.offset.min(total);
        let end = start.saturating_add(limit).min(total);
        let facts = matched[start..end].iter().map(|f| (*f).clone()).collect();

        QueryPage {
            facts,
            total,
            offset: opts.offset,
            limit,
        }
    }

    /// Exact-name lookup; the way relation targets are resolved.
    #[must_use]
    pub fn lookup_by_exact_name(&self, name: &str) -> Vec<Fact> {
        self.read().by_name(name)
    }

    /// Every fact holding a relation that points directly at `target`.
    #[must_use]
    pub fn reverse_lookup(&self, target: &str, rel_kind: Option<RelationKind>) -> Vec<Fact> {
        self.read()
            .facts
            .iter()
            .filter(|f| f.references(target, rel_kind))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(effective_limit(0), DEFAULT_QUERY_LIMIT);
        assert_eq!(effective_limit(7), 7);
        assert_eq!(effective_limit(10_000), MAX_QUERY_LIMIT);
    }

    #[test]
    fn empty_strings_impose_no_constraint() {
        let store = FactStore::from(vec![
            Fact::new(FactKind::Symbol, "a").with_file("x.go"),
            Fact::new(FactKind::Module, "b").with_file("y.go"),
        ]);
        let opts = QueryOpts {
            file: Some(String::new()),
            name: Some(String::new()),
            files: vec![String::new()],
            ..QueryOpts::default()
        };

        assert_eq!(store.query_advanced(&opts).total, 2);
        assert_eq!(store.query(None, Some(""), Some(""), None).len(), 2);
    }

    #[test]
    fn prop_value_compares_rendered_form() {
        let store = FactStore::from(vec![
            Fact::new(FactKind::Route, "r1").with_prop("status", 200_i64),
            Fact::new(FactKind::Route, "r2").with_prop("status", 404_i64),
            Fact::new(FactKind::Route, "r3"),
        ]);

        let present = QueryOpts {
            prop: Some("status".into()),
            ..QueryOpts::default()
        };
        assert_eq!(store.query_advanced(&present).total, 2);

        let exact = QueryOpts {
            prop: Some("status".into()),
            prop_value: Some("404".into()),
            ..QueryOpts::default()
        };
        let page = store.query_advanced(&exact);
        assert_eq!(page.total, 1);
        assert_eq!(page.facts[0].name, "r2");
    }

    #[test]
    fn page_reports_has_more() {
        let store = FactStore::from(
            (0..5)
                .map(|i| Fact::new(FactKind::Symbol, format!("s{i}")))
                .collect::<Vec<_>>(),
        );
        let page = store.query_advanced(&QueryOpts {
            limit: 2,
            ..QueryOpts::default()
        });
        assert!(page.has_more());

        let last = store.query_advanced(&QueryOpts {
            offset: 4,
            limit: 2,
            ..QueryOpts::default()
        });
        assert!(!last.has_more());
    }
}
