use linkstore::rdf::namespace::{ld, owl, rdf, rdfs};
use linkstore::{FieldValue, LinkedStore, Quad, QuadPattern, Store, Term};

fn iri(s: &str) -> Term {
    Term::iri(format!("http://example.org/{}", s))
}

#[test]
fn test_idempotent_add() {
    let mut store = Store::new();
    let quad = Quad::triple(iri("bob"), iri("name"), Term::literal("Bob"));

    assert!(store.add(&quad));
    assert!(!store.add(&quad));
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.get_field(&iri("bob"), &iri("name")),
        Some(FieldValue::Single(Term::literal("Bob")))
    );
}

#[test]
fn test_alias_transitivity() {
    let mut store = Store::new();
    let (a, b, c) = (iri("a"), iri("b"), iri("c"));
    store.add_field(&a, &iri("name"), Term::literal("A")).unwrap();

    store.with_alias(&a, &b);
    store.with_alias(&b, &c);
    assert_eq!(store.primary(&a), c);

    store.add_field(&a, &iri("age"), Term::literal("30")).unwrap();
    assert_eq!(
        store.get_field(&c, &iri("age")),
        Some(FieldValue::Single(Term::literal("30")))
    );
    assert_eq!(
        store.get_field(&c, &iri("name")),
        Some(FieldValue::Single(Term::literal("A")))
    );
}

#[test]
fn test_same_as_object_and_field_stay_in_sync() {
    let mut store = Store::new();
    store.add(&Quad::triple(iri("dave"), iri("knows"), iri("b")));
    store.add(&Quad::triple(iri("dave"), iri("name2"), Term::literal("Dave")));
    store.add(&Quad::triple(iri("b"), Term::iri(owl::SAME_AS), iri("a")));
    store.add(&Quad::triple(iri("name2"), Term::iri(owl::SAME_AS), iri("name1")));

    // every fact the index holds for dave is visible as a record field
    for quad in store.match_quads(&QuadPattern::any().with_subject(iri("dave")), false) {
        let field = store.get_field(&quad.subject, &quad.predicate).unwrap();
        assert!(field.contains(&quad.object));
    }
    assert_eq!(
        store.get_field(&iri("dave"), &iri("knows")),
        Some(FieldValue::Single(iri("a")))
    );
    assert_eq!(
        store.get_field(&iri("dave"), &iri("name1")),
        Some(FieldValue::Single(Term::literal("Dave")))
    );

    store
        .remove(&Quad::triple(iri("dave"), iri("knows"), iri("b")))
        .unwrap();
    assert_eq!(store.get_field(&iri("dave"), &iri("knows")), None);
}

#[test]
fn test_alias_rewrites_references() {
    let mut store = Store::new();
    store.add_field(&iri("post"), &iri("author"), iri("old")).unwrap();
    store.add_field(&iri("old"), &iri("name"), Term::literal("Ann")).unwrap();

    store.with_alias(&iri("old"), &iri("new"));
    assert_eq!(
        store.get_field(&iri("post"), &iri("author")),
        Some(FieldValue::Single(iri("new")))
    );
    let by_author = store.match_quads(&QuadPattern::any().with_object(iri("new")), false);
    assert_eq!(by_author.len(), 1);
    assert_eq!(
        store.get_field(&iri("new"), &iri("name")),
        Some(FieldValue::Single(Term::literal("Ann")))
    );
}

#[test]
fn test_member_fields_in_numeric_order() {
    let mut store = Store::new();
    let list = iri("list");
    for (n, value) in [(0, "a"), (2, "c"), (1, "b")] {
        store
            .add_field(&list, &Term::iri(rdf::ordinal(n)), Term::literal(value))
            .unwrap();
    }

    let members = store.get_field(&list, &Term::iri(rdfs::MEMBER)).unwrap();
    let values: Vec<&str> = members.values().iter().map(|t| t.value()).collect();
    assert_eq!(values, vec!["a", "b", "c"]);
}

#[test]
fn test_missing_field_is_none() {
    let store = Store::new();
    assert_eq!(store.get_field(&iri("nobody"), &iri("name")), None);
    assert!(store.get_record(&iri("nobody")).is_none());
}

#[test]
fn test_remove_requires_existing_fact() {
    let mut store = Store::new();
    let quad = Quad::triple(iri("bob"), iri("name"), Term::literal("Bob"));
    assert!(store.remove(&quad).is_err());

    store.add(&quad);
    assert!(store.remove(&quad).is_ok());
    assert!(store.is_empty());
    assert_eq!(store.get_field(&iri("bob"), &iri("name")), None);
}

#[test]
fn test_remove_delta_clears_every_value() {
    let mut linked: LinkedStore<&str> = LinkedStore::default();
    for child in ["alice", "carol", "dave"] {
        linked
            .add_field(&iri("bob"), &iri("hasChild"), iri(child))
            .unwrap();
    }

    let summary = linked
        .process_delta(&[Quad::new(
            iri("bob"),
            iri("hasChild"),
            iri("alice"),
            Term::iri(ld::REMOVE),
        )])
        .unwrap();

    assert_eq!(summary.removed.len(), 3);
    let children = linked.store().match_quads(
        &QuadPattern::any()
            .with_subject(iri("bob"))
            .with_predicate(iri("hasChild")),
        false,
    );
    assert!(children.is_empty());
    assert_eq!(linked.store().get_field(&iri("bob"), &iri("hasChild")), None);
}

#[test]
fn test_delta_buckets_are_disjoint() {
    let mut linked: LinkedStore<&str> = LinkedStore::default();
    linked.add_field(&iri("a"), &iri("r"), iri("z")).unwrap();
    linked.add_field(&iri("a"), &iri("s"), iri("w")).unwrap();
    let delta = vec![
        Quad::new(iri("a"), iri("p"), iri("x"), Term::iri(ld::ADD)),
        Quad::new(iri("a"), iri("q"), iri("y"), Term::iri(ld::REPLACE)),
        Quad::new(iri("a"), iri("r"), iri("z"), Term::iri(ld::SLICE)),
        Quad::new(iri("a"), iri("s"), iri("w"), Term::iri(ld::PURGE)),
        Quad::new(iri("a"), iri("t"), iri("v"), Term::iri("http://purl.org/link-lib/bogus")),
    ];

    let buckets = linked.classify_delta(&delta);
    assert_eq!(buckets.addable.len(), 1);
    assert_eq!(buckets.replaceable.len(), 1);
    // slice and purge overlap on (a r z); it is removed once
    assert_eq!(buckets.removable.len(), 2);
    assert!(buckets.addable.iter().all(|q| !buckets.removable.contains(q)));
    assert!(buckets.replaceable.iter().all(|q| !buckets.removable.contains(q)));
}

#[test]
fn test_slice_removes_only_the_given_value() {
    let mut linked: LinkedStore<&str> = LinkedStore::default();
    for tag in ["rust", "rdf", "graphs"] {
        linked
            .add_field(&iri("post"), &iri("tag"), Term::literal(tag))
            .unwrap();
    }

    linked
        .process_delta(&[Quad::new(
            iri("post"),
            iri("tag"),
            Term::literal("rdf"),
            Term::iri(ld::SLICE),
        )])
        .unwrap();

    let tags = linked
        .store()
        .get_field(&iri("post"), &iri("tag"))
        .unwrap();
    assert_eq!(tags.len(), 2);
    assert!(!tags.contains(&Term::literal("rdf")));
}

#[test]
fn test_purge_removes_every_field() {
    let mut linked: LinkedStore<&str> = LinkedStore::default();
    linked
        .add_field(&iri("post"), &iri("title"), Term::literal("Hi"))
        .unwrap();
    linked
        .add_field(&iri("post"), &iri("tag"), Term::literal("rust"))
        .unwrap();

    linked
        .process_delta(&[Quad::new(
            iri("post"),
            iri("title"),
            Term::literal("Hi"),
            Term::iri(ld::PURGE),
        )])
        .unwrap();

    let remaining = linked
        .store()
        .match_quads(&QuadPattern::any().with_subject(iri("post")), false);
    assert!(remaining.is_empty());
}
