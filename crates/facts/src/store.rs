use crate::types::{Fact, FactKind};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Append-only sequence of facts plus the kind/file/name indices over it.
///
/// Every mutation and every snapshot read goes through the same lock, so an
/// appended fact is never observable without its index entries.
#[derive(Debug, Default)]
pub struct FactStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub(crate) facts: Vec<Fact>,
    by_kind: HashMap<FactKind, Vec<usize>>,
    by_file: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
}

impl Inner {
    fn push(&mut self, fact: Fact) {
        let idx = self.facts.len();
        self.by_kind.entry(fact.kind).or_default().push(idx);
        if !fact.file.is_empty() {
            self.by_file.entry(fact.file.clone()).or_default().push(idx);
        }
        if !fact.name.is_empty() {
            self.by_name.entry(fact.name.clone()).or_default().push(idx);
        }
        self.facts.push(fact);
    }

    fn rebuild_file_index(&mut self) {
        self.by_file.clear();
        for (idx, fact) in self.facts.iter().enumerate() {
            if !fact.file.is_empty() {
                self.by_file.entry(fact.file.clone()).or_default().push(idx);
            }
        }
    }

    fn collect(&self, indices: Option<&Vec<usize>>) -> Vec<Fact> {
        indices
            .map(|ids| ids.iter().map(|&i| self.facts[i].clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn by_name(&self, name: &str) -> Vec<Fact> {
        self.collect(self.by_name.get(name))
    }

    fn repos(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.facts
            .iter()
            .filter(|f| !f.repo.is_empty() && seen.insert(f.repo.as_str()))
            .map(|f| f.repo.clone())
            .collect()
    }
}

/// Summary counts over the current sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct StoreStats {
    pub facts: usize,
    pub relations: usize,
    pub files: usize,
    pub names: usize,
    pub by_kind: BTreeMap<FactKind, usize>,
    pub repos: Vec<String>,
}

impl FactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append facts in order, indexing each one under the same lock.
    pub fn add<I>(&self, facts: I)
    where
        I: IntoIterator<Item = Fact>,
    {
        let mut inner = self.write();
        let before = inner.facts.len();
        for fact in facts {
            inner.push(fact);
        }
        log::debug!("Added {} facts (total {})", inner.facts.len() - before, inner.facts.len());
    }

    pub fn add_one(&self, fact: Fact) {
        self.write().push(fact);
    }

    /// Full sequence in insertion order; this is also the persisted order.
    #[must_use]
    pub fn all(&self) -> Vec<Fact> {
        self.read().facts.clone()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.read().facts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    #[must_use]
    pub fn by_kind(&self, kind: FactKind) -> Vec<Fact> {
        let inner = self.read();
        inner.collect(inner.by_kind.get(&kind))
    }

    #[must_use]
    pub fn by_file(&self, file: &str) -> Vec<Fact> {
        let inner = self.read();
        inner.collect(inner.by_file.get(file))
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Vec<Fact> {
        self.read().by_name(name)
    }

    /// Empty the sequence and every index in one step.
    pub fn clear(&self) {
        *self.write() = Inner::default();
    }

    /// Set `repo` on every fact at or after `from_index`.
    pub fn set_repo_range(&self, from_index: usize, repo: &str) {
        let mut inner = self.write();
        for fact in inner.facts.iter_mut().skip(from_index) {
            fact.repo = repo.to_string();
        }
        log::debug!(
            "Tagged facts {from_index}..{} with repo '{repo}'",
            inner.facts.len()
        );
    }

    /// Set `repo` and prefix `file` on every fact at or after `from_index`.
    ///
    /// Facts with an empty file keep it empty.
    pub fn tag_range(&self, from_index: usize, repo: &str, file_prefix: &str) {
        let mut inner = self.write();
        if from_index >= inner.facts.len() {
            return;
        }
        for fact in inner.facts.iter_mut().skip(from_index) {
            retag(fact, repo, file_prefix);
        }
        inner.rebuild_file_index();
        log::debug!(
            "Tagged facts {from_index}..{} with repo '{repo}' and prefix '{file_prefix}'",
            inner.facts.len()
        );
    }

    /// Tag every fact that has no repo yet. Returns how many facts changed.
    pub fn tag_untagged(&self, repo: &str, file_prefix: &str) -> usize {
        let mut inner = self.write();
        let mut changed = 0;
        for fact in inner.facts.iter_mut().filter(|f| f.repo.is_empty()) {
            retag(fact, repo, file_prefix);
            changed += 1;
        }
        if changed > 0 {
            inner.rebuild_file_index();
        }
        log::debug!("Tagged {changed} untagged facts with repo '{repo}'");
        changed
    }

    /// Distinct repo labels in first-seen order.
    #[must_use]
    pub fn repos(&self) -> Vec<String> {
        self.read().repos()
    }

    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let inner = self.read();
        StoreStats {
            facts: inner.facts.len(),
            relations: inner.facts.iter().map(|f| f.relations.len()).sum(),
            files: inner.by_file.len(),
            names: inner.by_name.len(),
            by_kind: inner
                .by_kind
                .iter()
                .map(|(kind, ids)| (*kind, ids.len()))
                .collect(),
            repos: inner.repos(),
        }
    }
}

impl From<Vec<Fact>> for FactStore {
    fn from(facts: Vec<Fact>) -> Self {
        let store = Self::new();
        store.add(facts);
        store
    }
}

fn retag(fact: &mut Fact, repo: &str, file_prefix: &str) {
    fact.repo = repo.to_string();
    if !fact.file.is_empty() {
        fact.file = format!("{file_prefix}{}", fact.file);
    }
}
