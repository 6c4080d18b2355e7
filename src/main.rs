use linkstore::rdf::namespace::{ld, rdf, rdfs};
use linkstore::{DataObject, LinkedStore, Quad, StoreConfig, Subscription, Term};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn schema(local: &str) -> Term {
    Term::iri(format!("http://schema.org/{}", local))
}

fn example(local: &str) -> Term {
    Term::iri(format!("http://example.org/{}", local))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Linkstore v{}", linkstore::version());
    println!("==========================================");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => StoreConfig::from_file(&path)?,
        None => StoreConfig::default(),
    };
    let mut store: LinkedStore<&'static str> = LinkedStore::new(config);

    let changes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&changes);
    store.subscribe(Subscription::new(move |set| {
        counter.fetch_add(set.len(), Ordering::SeqCst);
    }));

    demo_schema(&mut store)?;
    demo_resolver(&mut store)?;
    demo_delta(&mut store)?;

    store.broadcast().await;
    println!(
        "\n✓ Subscribers saw {} changed quads",
        changes.load(Ordering::SeqCst)
    );
    Ok(())
}

fn demo_schema(store: &mut LinkedStore<&'static str>) -> anyhow::Result<()> {
    println!("=== Demo 1: Schema Reasoning ===");
    store.add_quads(&[
        Quad::triple(schema("BlogPosting"), Term::iri(rdfs::SUB_CLASS_OF), schema("Article")),
        Quad::triple(schema("Article"), Term::iri(rdfs::SUB_CLASS_OF), schema("CreativeWork")),
        Quad::triple(schema("author"), Term::iri(rdfs::RANGE), schema("Person")),
    ])?;

    let post = DataObject::new()
        .with_id(example("post/1"))
        .field(rdf::TYPE, schema("BlogPosting"))
        .field("http://schema.org/headline", "Hello, linked data")
        .field("http://schema.org/author", example("alice"));
    let subject = store.add_object(&post)?;
    println!("✓ Stored {}", subject);

    let expanded = store.expand(&[schema("BlogPosting")]);
    println!("✓ BlogPosting expands to {} types:", expanded.len());
    for ty in &expanded {
        println!("    {}", ty);
    }
    println!(
        "✓ alice is a Person: {}",
        store.is_instance_of(&example("alice"), &schema("Person"))
    );
    Ok(())
}

fn demo_resolver(store: &mut LinkedStore<&'static str>) -> anyhow::Result<()> {
    println!("\n=== Demo 2: Handler Resolution ===");
    store.register_renderer("thing-view", &[Term::iri(rdfs::RESOURCE)])?;
    store.register_renderer("work-view", &[schema("CreativeWork")])?;
    store.register(
        "article-card",
        &[schema("Article")],
        &[Term::iri(ld::TYPE_RENDERER)],
        &[example("topology/card")],
    )?;

    let renderer = [Term::iri(ld::TYPE_RENDERER)];
    let page = store.resolve_for(
        &example("post/1"),
        &renderer,
        &Term::iri(ld::DEFAULT_TOPOLOGY),
        None,
    );
    let card = store.resolve_for(&example("post/1"), &renderer, &example("topology/card"), None);
    let person = store.resolve_for(
        &example("alice"),
        &renderer,
        &Term::iri(ld::DEFAULT_TOPOLOGY),
        None,
    );
    println!("✓ post/1 in the default topology: {:?}", page);
    println!("✓ post/1 in the card topology: {:?}", card);
    println!("✓ alice in the default topology: {:?}", person);
    Ok(())
}

fn demo_delta(store: &mut LinkedStore<&'static str>) -> anyhow::Result<()> {
    println!("\n=== Demo 3: Deltas ===");
    let headline = schema("headline");
    store.queue_delta(vec![
        Quad::new(
            example("post/1"),
            headline.clone(),
            Term::literal("Hello again"),
            Term::iri(ld::REPLACE),
        ),
        Quad::new(
            example("post/1"),
            schema("keywords"),
            Term::literal("rdf"),
            Term::iri(ld::ADD),
        ),
    ]);
    let summary = store.flush()?;
    println!(
        "✓ Applied delta: {} added, {} removed, {} skipped",
        summary.added.len(),
        summary.removed.len(),
        summary.skipped
    );
    if let Some(value) = store.store().get_field(&example("post/1"), &headline) {
        println!("✓ headline is now {:?}", value.values());
    }
    for document in store.take_changed_documents() {
        println!("✓ Changed document: {}", document);
    }
    Ok(())
}
