use crate::error::ParseKindError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// What a fact describes.
///
/// Producers attach kind-specific props by convention, not by schema:
///
/// - `module`: `language`, `exported` (bool)
/// - `symbol`: `symbol_kind` (`function`, `type`, `method`, ...), `exported` (bool)
/// - `route`: `method` (`GET`, `POST`, ...), `path`, `handler`
/// - `storage`: `engine` (`sql`, `redis`, ...), `table`, `operation`
/// - `dependency`: `version`, `external` (bool)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Module,
    Symbol,
    Route,
    Storage,
    Dependency,
}

impl FactKind {
    pub const ALL: [FactKind; 5] = [
        FactKind::Module,
        FactKind::Symbol,
        FactKind::Route,
        FactKind::Storage,
        FactKind::Dependency,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FactKind::Module => "module",
            FactKind::Symbol => "symbol",
            FactKind::Route => "route",
            FactKind::Storage => "storage",
            FactKind::Dependency => "dependency",
        }
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError {
                what: "fact kind",
                value: s.to_string(),
            })
    }
}

/// Directed edge label between two facts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Declares,
    Imports,
    Calls,
    Implements,
    DependsOn,
}

impl RelationKind {
    pub const ALL: [RelationKind; 5] = [
        RelationKind::Declares,
        RelationKind::Imports,
        RelationKind::Calls,
        RelationKind::Implements,
        RelationKind::DependsOn,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationKind::Declares => "declares",
            RelationKind::Imports => "imports",
            RelationKind::Calls => "calls",
            RelationKind::Implements => "implements",
            RelationKind::DependsOn => "depends_on",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError {
                what: "relation kind",
                value: s.to_string(),
            })
    }
}

/// A single property value. Numbers are always carried as `f64`, which is
/// also what they decode to after a JSONL round trip.
///
/// Scalars get their own variants; `null`, arrays and objects are kept
/// verbatim in [`PropValue::Json`] so no producer record is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    String(String),
    Json(serde_json::Value),
}

impl PropValue {
    /// String form used when comparing against a `prop_value` filter.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            PropValue::Bool(b) => b.to_string(),
            PropValue::Number(n) => n.to_string(),
            PropValue::String(s) => s.clone(),
            PropValue::Json(value) => value.to_string(),
        }
    }

    /// JSON has no encoding for NaN or infinities.
    #[must_use]
    pub fn is_encodable(&self) -> bool {
        match self {
            PropValue::Number(n) => n.is_finite(),
            _ => true,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i64> for PropValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value)
    }
}

pub type Props = BTreeMap<String, PropValue>;

/// Weak, name-addressed reference from the owning fact to another fact.
///
/// `target` is resolved through the name index at read time; it may point at
/// nothing, at several facts, or at a fact that is added later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Relation {
    pub kind: RelationKind,
    pub target: String,
}

impl Relation {
    pub fn new(kind: RelationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }
}

/// One architectural observation. This is also the JSONL record schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Fact {
    pub kind: FactKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(line: &u32) -> bool {
    *line == 0
}

impl Fact {
    pub fn new(kind: FactKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            file: String::new(),
            line: 0,
            repo: String::new(),
            props: Props::new(),
            relations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    #[must_use]
    pub const fn with_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    #[must_use]
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = repo.into();
        self
    }

    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_relation(mut self, kind: RelationKind, target: impl Into<String>) -> Self {
        self.relations.push(Relation::new(kind, target));
        self
    }

    /// True if any relation of this fact has the given kind.
    #[must_use]
    pub fn has_relation_kind(&self, kind: RelationKind) -> bool {
        self.relations.iter().any(|r| r.kind == kind)
    }

    /// True if this fact references `target` directly, optionally restricted to one kind.
    #[must_use]
    pub fn references(&self, target: &str, kind: Option<RelationKind>) -> bool {
        self.relations
            .iter()
            .any(|r| r.target == target && kind.map_or(true, |k| r.kind == k))
    }
}
