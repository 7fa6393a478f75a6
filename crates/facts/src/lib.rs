//! # Archmap Facts
//!
//! Concurrent, multi-index store for architectural facts extracted from a codebase.
//!
//! ## Architecture
//!
//! ```text
//! Extractors
//!     │  add(facts)
//!     ▼
//! FactStore ──────────────┐
//!     ├─ sequence (append-only, insertion order)
//!     ├─ kind / file / name indices
//!     │                   │
//!     ├──> Query engine   │  query, query_advanced, reverse_lookup
//!     ├──> Retagging      │  set_repo_range, tag_range, tag_untagged
//!     └──> JSONL          │  write_jsonl / read_jsonl (facts.jsonl)
//!                         ▼
//!                  archmap-graph (derived snapshot)
//! ```
//!
//! ## Example
//!
//! ```
//! use archmap_facts::{Fact, FactKind, FactStore, QueryOpts, RelationKind};
//!
//! let store = FactStore::new();
//! store.add([
//!     Fact::new(FactKind::Symbol, "api.Handler")
//!         .with_file("api/handler.go")
//!         .with_relation(RelationKind::Calls, "db.Query"),
//!     Fact::new(FactKind::Symbol, "db.Query").with_file("db/query.go"),
//! ]);
//!
//! let callers = store.reverse_lookup("db.Query", Some(RelationKind::Calls));
//! assert_eq!(callers[0].name, "api.Handler");
//!
//! let page = store.query_advanced(&QueryOpts {
//!     file_prefix: Some("db/".into()),
//!     ..QueryOpts::default()
//! });
//! assert_eq!(page.total, 1);
//! ```

mod error;
mod jsonl;
mod query;
mod store;
mod types;

pub use error::{FactsError, ParseKindError, Result};
pub use jsonl::FACTS_FILE_NAME;
pub use query::{effective_limit, QueryOpts, QueryPage, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT};
pub use store::{FactStore, StoreStats};
pub use types::{Fact, FactKind, PropValue, Props, Relation, RelationKind};
