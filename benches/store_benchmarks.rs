use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use linkstore::rdf::namespace::{ld, rdf, rdfs};
use linkstore::{HandlerResolver, Quad, QuadPattern, ResolverConfig, Schema, Store, Term};

fn iri(s: String) -> Term {
    Term::iri(format!("http://example.org/{}", s))
}

/// A linear class chain `Class0 <- Class1 <- ... <- ClassN`
fn class_chain(depth: usize) -> Vec<Quad> {
    (1..depth)
        .map(|i| {
            Quad::triple(
                iri(format!("Class{}", i)),
                Term::iri(rdfs::SUB_CLASS_OF),
                iri(format!("Class{}", i - 1)),
            )
        })
        .collect()
}

/// Benchmark quad insertion throughput
fn bench_quad_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("quad_insertion");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut store = Store::new();
                for i in 0..size {
                    let subject = iri(format!("person/{}", i));
                    store.add(&Quad::triple(
                        subject.clone(),
                        iri("name".to_string()),
                        Term::literal(format!("Person{}", i)),
                    ));
                    store.add(&Quad::triple(
                        subject,
                        Term::iri(rdf::TYPE),
                        iri("Person".to_string()),
                    ));
                }
            });
        });
    }
    group.finish();
}

/// Benchmark pattern matching against the positional indices
fn bench_pattern_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_match");

    for size in [1000, 10_000].iter() {
        let mut store = Store::new();
        for i in 0..*size {
            store.add(&Quad::triple(
                iri(format!("person/{}", i)),
                Term::iri(rdf::TYPE),
                iri(if i % 2 == 0 { "Person" } else { "Company" }.to_string()),
            ));
        }
        let pattern = QuadPattern::any()
            .with_predicate(Term::iri(rdf::TYPE))
            .with_object(iri("Person".to_string()));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| store.match_quads(&pattern, false).len());
        });
    }
    group.finish();
}

/// Benchmark type expansion over deep hierarchies
fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand");

    for depth in [10, 100].iter() {
        let mut schema = Schema::default();
        if schema.add_quads(&class_chain(*depth)).is_err() {
            return;
        }
        let leaf = iri(format!("Class{}", depth - 1));

        group.bench_with_input(BenchmarkId::new("uncached", depth), depth, |b, _| {
            b.iter(|| schema.mine_for_types(std::slice::from_ref(&leaf)).len());
        });
        group.bench_with_input(BenchmarkId::new("cached", depth), depth, |b, _| {
            b.iter(|| schema.expand(std::slice::from_ref(&leaf)).len());
        });
    }
    group.finish();
}

/// Benchmark handler resolution falling back through ancestors
fn bench_resolve(c: &mut Criterion) {
    let mut schema = Schema::default();
    if schema.add_quads(&class_chain(50)).is_err() {
        return;
    }
    let mut resolver: HandlerResolver<usize> = HandlerResolver::new(&ResolverConfig::default());
    if resolver.register_renderer(0, &[iri("Class0".to_string())]).is_err() {
        return;
    }
    let types = [iri("Class49".to_string())];
    let properties = [Term::iri(ld::TYPE_RENDERER)];
    let topology = Term::iri(ld::DEFAULT_TOPOLOGY);

    c.bench_function("resolve_cached", |b| {
        b.iter(|| resolver.resolve(&mut schema, &types, &properties, &topology, None));
    });
}

criterion_group!(
    benches,
    bench_quad_insertion,
    bench_pattern_match,
    bench_expand,
    bench_resolve
);
criterion_main!(benches);
