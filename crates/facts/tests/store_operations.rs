//! Tests for FactStore indexing, querying, retagging and persistence

use archmap_facts::{Fact, FactKind, FactStore, PropValue, QueryOpts, RelationKind};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;

fn symbol(name: &str, file: &str) -> Fact {
    Fact::new(FactKind::Symbol, name).with_file(file).with_line(1)
}

fn names(facts: &[Fact]) -> Vec<&str> {
    facts.iter().map(|f| f.name.as_str()).collect()
}

fn two_symbols() -> FactStore {
    FactStore::from(vec![symbol("A", "x"), symbol("B", "y")])
}

#[test]
fn test_every_fact_is_reachable_through_its_indices() {
    let facts = vec![
        symbol("pkg.Foo", "pkg/foo.go"),
        Fact::new(FactKind::Module, "pkg").with_file("pkg/foo.go"),
        Fact::new(FactKind::Dependency, "").with_prop("external", true),
        Fact::new(FactKind::Route, "GET /users"),
    ];
    let store = FactStore::from(facts.clone());

    for fact in &facts {
        assert!(store.by_kind(fact.kind).contains(fact));
        if !fact.file.is_empty() {
            assert!(store.by_file(&fact.file).contains(fact));
        }
        if !fact.name.is_empty() {
            assert!(store.by_name(&fact.name).contains(fact));
        }
    }
    assert_eq!(names(&store.by_file("pkg/foo.go")), vec!["pkg.Foo", "pkg"]);
}

#[test]
fn test_unknown_keys_return_empty() {
    let store = two_symbols();
    assert!(store.by_kind(FactKind::Storage).is_empty());
    assert!(store.by_file("nope").is_empty());
    assert!(store.by_name("nope").is_empty());
}

#[test]
fn test_count_tracks_all_across_add_and_clear() {
    let store = FactStore::new();
    assert_eq!(store.count(), store.all().len());

    store.add([symbol("a", "f"), symbol("a", "g")]);
    assert_eq!(store.count(), 2);
    assert_eq!(store.count(), store.all().len());
    assert_eq!(store.by_name("a").len(), 2);

    store.clear();
    assert_eq!(store.count(), 0);
    assert_eq!(store.count(), store.all().len());

    store.add_one(symbol("b", "f"));
    assert_eq!(store.count(), store.all().len());
}

#[test]
fn test_simple_query_dimensions() {
    let store = two_symbols();

    assert_eq!(names(&store.query(None, None, None, None)), vec!["A", "B"]);
    assert_eq!(
        names(&store.query(Some(FactKind::Symbol), None, Some("A"), None)),
        vec!["A"]
    );
    assert_eq!(names(&store.query(None, Some("y"), None, None)), vec!["B"]);
    assert!(store.query(Some(FactKind::Module), None, None, None).is_empty());
}

#[test]
fn test_simple_query_name_is_case_sensitive_substring() {
    let store = FactStore::from(vec![
        symbol("pkg.Handler", "a"),
        symbol("pkg.handlerHelper", "b"),
    ]);
    assert_eq!(
        names(&store.query(None, None, Some("Handler"), None)),
        vec!["pkg.Handler"]
    );
    assert_eq!(store.query(None, None, Some("andler"), None).len(), 2);
}

#[test]
fn test_simple_query_rel_kind() {
    let store = FactStore::from(vec![
        symbol("a", "f").with_relation(RelationKind::Calls, "b"),
        symbol("b", "f").with_relation(RelationKind::Imports, "c"),
    ]);
    assert_eq!(
        names(&store.query(None, None, None, Some(RelationKind::Calls))),
        vec!["a"]
    );
}

#[test]
fn test_advanced_names_batch() {
    let store = two_symbols();
    let page = store.query_advanced(&QueryOpts {
        names: vec!["A".into(), "B".into()],
        ..QueryOpts::default()
    });
    assert_eq!(names(&page.facts), vec!["A", "B"]);

    let page = store.query_advanced(&QueryOpts {
        name: Some("zzz".into()),
        names: vec!["A".into(), "B".into()],
        ..QueryOpts::default()
    });
    assert_eq!(names(&page.facts), vec!["A", "B"]);
}

#[test]
fn test_advanced_union_within_dimension_and_across_dimensions() {
    let store = FactStore::from(vec![
        symbol("a", "api/a.go").with_repo("r1"),
        Fact::new(FactKind::Module, "api").with_file("api/mod.go").with_repo("r1"),
        Fact::new(FactKind::Route, "GET /").with_file("web/routes.go").with_repo("r2"),
        Fact::new(FactKind::Storage, "users").with_file("db/users.go").with_repo("r1"),
    ]);

    let page = store.query_advanced(&QueryOpts {
        kind: Some(FactKind::Symbol),
        kinds: vec![FactKind::Route],
        ..QueryOpts::default()
    });
    assert_eq!(names(&page.facts), vec!["a", "GET /"]);

    let page = store.query_advanced(&QueryOpts {
        files: vec!["db/users.go".into()],
        file_prefix: Some("api/".into()),
        ..QueryOpts::default()
    });
    assert_eq!(names(&page.facts), vec!["a", "api", "users"]);

    let page = store.query_advanced(&QueryOpts {
        kinds: vec![FactKind::Module, FactKind::Storage, FactKind::Route],
        file_prefix: Some("api/".into()),
        file: Some("web/routes.go".into()),
        repo: Some("r1".into()),
        ..QueryOpts::default()
    });
    assert_eq!(names(&page.facts), vec!["api"]);
    assert_eq!(page.total, 1);
}

#[test]
fn test_advanced_prop_filter_applies_before_pagination() {
    let facts: Vec<Fact> = (0..10)
        .map(|i| {
            let fact = symbol(&format!("s{i}"), "f");
            if i % 2 == 0 {
                fact.with_prop("exported", true)
            } else {
                fact.with_prop("exported", false)
            }
        })
        .collect();
    let store = FactStore::from(facts);

    let page = store.query_advanced(&QueryOpts {
        prop: Some("exported".into()),
        prop_value: Some("true".into()),
        offset: 1,
        limit: 2,
        ..QueryOpts::default()
    });
    assert_eq!(page.total, 5);
    assert_eq!(names(&page.facts), vec!["s2", "s4"]);
}

#[test]
fn test_pagination_defaults_and_bounds() {
    let facts: Vec<Fact> = (0..200)
        .map(|i| symbol(&format!("s{i:03}"), "f"))
        .collect();
    let store = FactStore::from(facts);

    let page = store.query_advanced(&QueryOpts::default());
    assert_eq!(page.facts.len(), 100);
    assert_eq!(page.total, 200);
    assert_eq!(page.facts[0].name, "s000");

    let page = store.query_advanced(&QueryOpts {
        offset: 199,
        limit: 5,
        ..QueryOpts::default()
    });
    assert_eq!(names(&page.facts), vec!["s199"]);

    let page = store.query_advanced(&QueryOpts {
        offset: 250,
        ..QueryOpts::default()
    });
    assert!(page.facts.is_empty());
    assert_eq!(page.total, 200);

    let page = store.query_advanced(&QueryOpts {
        limit: 1000,
        ..QueryOpts::default()
    });
    assert_eq!(page.facts.len(), 200);
    assert_eq!(page.limit, 500);
}

#[test]
fn test_lookup_by_exact_name_is_not_substring() {
    let store = FactStore::from(vec![symbol("pkg.Foo", "a"), symbol("pkg.FooBar", "b")]);
    assert_eq!(names(&store.lookup_by_exact_name("pkg.Foo")), vec!["pkg.Foo"]);
    assert!(store.lookup_by_exact_name("Foo").is_empty());
}

#[test]
fn test_reverse_lookup_is_direct_only() {
    let store = FactStore::from(vec![
        symbol("A", "a").with_relation(RelationKind::Calls, "B"),
        symbol("B", "b").with_relation(RelationKind::Calls, "C"),
        symbol("D", "d").with_relation(RelationKind::Imports, "C"),
    ]);

    assert_eq!(
        names(&store.reverse_lookup("C", Some(RelationKind::Calls))),
        vec!["B"]
    );
    assert_eq!(names(&store.reverse_lookup("C", None)), vec!["B", "D"]);
    assert!(store.reverse_lookup("A", None).is_empty());
}

#[test]
fn test_retagging_ranges() {
    let store = FactStore::new();
    store.add([symbol("a", "a.go"), symbol("b", "b.go")]);
    store.set_repo_range(0, "repo1");
    assert!(store.all().iter().all(|f| f.repo == "repo1"));

    store.add([symbol("c", "c.go")]);
    store.tag_range(2, "repo2", "repo2/");

    let all = store.all();
    assert_eq!(all[0].repo, "repo1");
    assert_eq!(all[0].file, "a.go");
    assert_eq!(all[1].repo, "repo1");
    assert_eq!(all[2].repo, "repo2");
    assert_eq!(all[2].file, "repo2/c.go");
    assert_eq!(names(&store.by_file("repo2/c.go")), vec!["c"]);

    let page = store.query_advanced(&QueryOpts {
        repo: Some("repo2".into()),
        ..QueryOpts::default()
    });
    assert_eq!(names(&page.facts), vec!["c"]);
}

#[test]
fn test_retagging_never_touches_names_or_relations() {
    let store = FactStore::from(vec![
        symbol("a", "a.go").with_relation(RelationKind::Imports, "b"),
        symbol("b", "b.go"),
    ]);
    let before = store.all();

    store.tag_untagged("main", "main/");
    let after = store.all();

    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(old.name, new.name);
        assert_eq!(old.kind, new.kind);
        assert_eq!(old.relations, new.relations);
    }
    assert_eq!(names(&store.reverse_lookup("b", None)), vec!["a"]);
}

#[test]
fn test_append_mode_composes_two_repositories() {
    let first = FactStore::from(vec![symbol("svc.A", "a.go"), symbol("svc.B", "b.go")]);
    let mut dump = Vec::new();
    first.write_jsonl(&mut dump).unwrap();

    let store = FactStore::read_jsonl(dump.as_slice()).unwrap();
    let changed = store.tag_untagged("svc", "svc/");
    assert_eq!(changed, 2);

    let from = store.count();
    store.add([symbol("web.Page", "page.go").with_relation(RelationKind::Calls, "svc.A")]);
    store.tag_range(from, "web", "web/");

    assert_eq!(store.repos(), vec!["svc".to_string(), "web".to_string()]);
    assert_eq!(names(&store.by_file("svc/a.go")), vec!["svc.A"]);
    assert_eq!(names(&store.by_file("web/page.go")), vec!["web.Page"]);
    assert_eq!(names(&store.reverse_lookup("svc.A", None)), vec!["web.Page"]);
}

#[test]
fn test_jsonl_round_trip_preserves_order_and_content() {
    let store = FactStore::from(vec![
        Fact::new(FactKind::Module, "api").with_file("api/mod.go").with_line(1),
        symbol("api.Serve", "api/serve.go")
            .with_prop("exported", true)
            .with_prop("complexity", 7_i64)
            .with_prop("ratio", 0.25)
            .with_relation(RelationKind::Calls, "db.Open")
            .with_relation(RelationKind::Declares, "api.Server"),
        Fact::new(FactKind::Dependency, "github.com/lib/pq").with_repo("api"),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("facts.jsonl");
    store.save_jsonl(&path).unwrap();
    let loaded = FactStore::load_jsonl(&path).unwrap();

    assert_eq!(loaded.all(), store.all());
    let serve = &loaded.by_name("api.Serve")[0];
    assert_eq!(serve.props["complexity"].as_f64(), Some(7.0));
    assert_eq!(serve.props["ratio"], PropValue::Number(0.25));
    assert!(!path.with_extension("jsonl.tmp").exists());
}

#[test]
fn test_load_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(FactStore::load_jsonl(&dir.path().join("missing.jsonl")).is_err());
    assert!(FactStore::load_jsonl(dir.path()).is_err());
}

#[test]
fn test_concurrent_add_and_query() {
    let store = Arc::new(FactStore::new());
    let writers: Vec<_> = (0..4)
        .map(|w| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..250 {
                    store.add_one(symbol(&format!("w{w}.s{i}"), &format!("w{w}.go")));
                }
            })
        })
        .collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..100 {
                    let page = store.query_advanced(&QueryOpts {
                        kind: Some(FactKind::Symbol),
                        limit: 500,
                        ..QueryOpts::default()
                    });
                    assert!(page.facts.len() <= page.total);
                    let _ = store.by_kind(FactKind::Symbol);
                    let _ = store.all();
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    assert_eq!(store.count(), 1000);
    assert_eq!(store.by_kind(FactKind::Symbol).len(), 1000);
    for w in 0..4 {
        let in_file = store.by_file(&format!("w{w}.go"));
        assert_eq!(in_file.len(), 250);
        assert_eq!(in_file[0].name, format!("w{w}.s0"));
        assert_eq!(in_file[249].name, format!("w{w}.s249"));
    }
}
