use linkstore::{ConfigError, InferenceRule, LinkedStore, Quad, StoreConfig, Term};
use linkstore::rdf::namespace::{rdf, rdfs};
use std::io::Write;
use tempfile::NamedTempFile;

fn iri(s: &str) -> Term {
    Term::iri(format!("http://example.org/{}", s))
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "broadcast:\n  slice_budget_ms: 32\n  max_delay_ms: 250\n\
         resolver:\n  cache_capacity: 16\n\
         reasoner:\n  materialize: false\n"
    )
    .unwrap();

    let config = StoreConfig::from_file(file.path()).unwrap();
    assert_eq!(config.broadcast.slice_budget_ms, 32);
    assert_eq!(config.broadcast.max_delay_ms, 250);
    assert_eq!(config.resolver.cache_capacity, 16);
    assert!(!config.reasoner.materialize);
    assert!(config.reasoner.owl);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = StoreConfig::from_file(dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_invalid_file_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "resolver:\n  cache_capacity: 0\n").unwrap();
    assert!(matches!(
        StoreConfig::from_file(file.path()),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_disabled_rule_is_not_applied() {
    let config = StoreConfig::from_yaml_str(
        "reasoner:\n  rules: [domain_inference, sub_class_of_transitive]\n",
    )
    .unwrap();
    assert!(!config.reasoner.rules.contains(&InferenceRule::RangeInference));

    let mut linked: LinkedStore<&str> = LinkedStore::new(config);
    linked
        .add_quads(&[
            Quad::triple(iri("author"), Term::iri(rdfs::DOMAIN), iri("Work")),
            Quad::triple(iri("author"), Term::iri(rdfs::RANGE), iri("Person")),
            Quad::triple(iri("post"), iri("author"), iri("alice")),
        ])
        .unwrap();

    let typed = |s: &str, c: &str| Quad::triple(iri(s), Term::iri(rdf::TYPE), iri(c));
    assert!(linked.store().contains(&typed("post", "Work")));
    assert!(!linked.store().contains(&typed("alice", "Person")));
}
