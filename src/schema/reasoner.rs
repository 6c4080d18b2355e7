//! Incremental type-hierarchy reasoner
//!
//! Statements are fed through a queue: every vocabulary processor looks at
//! each new statement and may infer more statements, which go back on the
//! queue. Processed statements are remembered so the loop terminates.
//!
//! The reasoner maintains, per type, the set of its ancestors (itself and
//! `rdfs:Resource` included). Type expansion and specificity ordering are
//! read from that map.

use super::equivalence::EquivalenceSet;
use crate::config::ReasonerConfig;
use crate::rdf::namespace::{rdf, rdfs};
use crate::rdf::{Quad, Term};
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, warn};

/// Reasoning errors
#[derive(Error, Debug, PartialEq)]
pub enum ReasoningError {
    /// `rdfs:subClassOf` must point at a node
    #[error("Object of subClassOf statement must be a node: {0}")]
    InvalidSubClassObject(String),

    /// `rdfs:subPropertyOf` must point at a node
    #[error("Object of subPropertyOf statement must be a node: {0}")]
    InvalidSubPropertyObject(String),
}

pub type ReasoningResult<T> = Result<T, ReasoningError>;

/// Inference rules a processor can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceRule {
    /// `(P domain C) ∧ (X P Y) → (X type C)`
    DomainInference,
    /// `(P range C) ∧ (X P Y) → (Y type C)`
    RangeInference,
    /// ancestor-set closure over `rdfs:subClassOf`
    SubClassOfTransitive,
    /// closure over `rdfs:subPropertyOf`, feeding domain/range inference
    SubPropertyOfTransitive,
    /// `owl:sameAs` / `owl:equivalentClass` between types
    TypeEquivalence,
}

impl InferenceRule {
    pub fn all() -> Vec<InferenceRule> {
        vec![
            InferenceRule::DomainInference,
            InferenceRule::RangeInference,
            InferenceRule::SubClassOfTransitive,
            InferenceRule::SubPropertyOfTransitive,
            InferenceRule::TypeEquivalence,
        ]
    }
}

fn push_unique(list: &mut Vec<Term>, term: Term) -> bool {
    if list.contains(&term) {
        return false;
    }
    list.push(term);
    true
}

/// Mutable schema knowledge shared by all processors
#[derive(Debug, Default)]
pub struct SchemaContext {
    /// type → ancestors, self and `rdfs:Resource` included
    pub super_map: FxHashMap<Term, FxHashSet<Term>>,
    /// schema-level type equivalence
    pub equivalence: EquivalenceSet<Term>,
    /// property → declared domains
    pub domains: FxHashMap<Term, Vec<Term>>,
    /// property → declared ranges
    pub ranges: FxHashMap<Term, Vec<Term>>,
    /// property → transitive super-properties
    pub super_properties: FxHashMap<Term, FxHashSet<Term>>,
    /// predicate → statements seen with it, for retroactive rules
    pub by_predicate: FxHashMap<Term, Vec<Quad>>,
    /// resource → asserted and inferred types
    pub types_of: FxHashMap<Term, Vec<Term>>,
    /// types seeded by `process_type`
    pub processed_types: FxHashSet<Term>,
    requested_types: Vec<Term>,
    dirty: bool,
}

impl SchemaContext {
    fn base() -> Term {
        Term::iri(rdfs::RESOURCE)
    }

    /// Ask the reasoner to run `process_type` for `ty` if it has not yet
    pub fn request_type(&mut self, ty: &Term) {
        if !self.processed_types.contains(ty) {
            self.requested_types.push(ty.clone());
        }
    }

    /// Make sure `ty` has an ancestor set
    pub fn ensure_type(&mut self, ty: &Term) {
        if !self.super_map.contains_key(ty) {
            let mut set = FxHashSet::default();
            set.insert(ty.clone());
            set.insert(Self::base());
            self.super_map.insert(ty.clone(), set);
            self.dirty = true;
        }
    }

    /// Record `sub rdfs:subClassOf sup` and keep the closure eager
    pub fn add_subclass(&mut self, sub: &Term, sup: &Term) {
        self.ensure_type(sup);
        self.ensure_type(sub);

        let mut parents = self.super_map[sup].clone();
        parents.insert(sup.clone());
        parents.insert(Self::base());

        let Some(own) = self.super_map.get_mut(sub) else {
            return;
        };
        let before = own.len();
        own.extend(parents);
        if own.len() == before {
            return;
        }
        let updated = own.clone();

        for (ty, ancestors) in self.super_map.iter_mut() {
            if ty != sub && ancestors.contains(sub) {
                ancestors.extend(updated.iter().cloned());
            }
        }
        self.dirty = true;
        debug!(sub = %sub, sup = %sup, depth = updated.len(), "subclass asserted");
    }

    /// Record `sub rdfs:subPropertyOf sup` with transitive closure
    pub fn add_subproperty(&mut self, sub: &Term, sup: &Term) {
        let mut supers = self.super_properties.get(sup).cloned().unwrap_or_default();
        supers.insert(sup.clone());
        let own = self.super_properties.entry(sub.clone()).or_default();
        own.extend(supers);
        let updated = own.clone();
        for (prop, ancestors) in self.super_properties.iter_mut() {
            if prop != sub && ancestors.contains(sub) {
                ancestors.extend(updated.iter().cloned());
            }
        }
    }

    /// `property` itself followed by its super-properties
    pub fn property_chain(&self, property: &Term) -> Vec<Term> {
        let mut chain = vec![property.clone()];
        if let Some(supers) = self.super_properties.get(property) {
            chain.extend(supers.iter().cloned());
        }
        chain
    }

    /// Properties whose chain contains `property`, itself included
    pub fn sub_properties(&self, property: &Term) -> Vec<Term> {
        let mut subs = vec![property.clone()];
        subs.extend(
            self.super_properties
                .iter()
                .filter(|(_, supers)| supers.contains(property))
                .map(|(sub, _)| sub.clone()),
        );
        subs
    }

    pub fn add_domain(&mut self, property: &Term, class: &Term) -> bool {
        push_unique(self.domains.entry(property.clone()).or_default(), class.clone())
    }

    pub fn add_range(&mut self, property: &Term, class: &Term) -> bool {
        push_unique(self.ranges.entry(property.clone()).or_default(), class.clone())
    }

    /// Union two types and give every member of the class the same
    /// ancestors; cached expansions become stale
    pub fn equate_types(&mut self, a: &Term, b: &Term) {
        if !self.equivalence.union(a, b) {
            return;
        }
        let members = self.equivalence.all_equals(a);
        let mut shared: FxHashSet<Term> = members.iter().cloned().collect();
        shared.insert(Self::base());
        for member in &members {
            if let Some(ancestors) = self.super_map.get(member) {
                shared.extend(ancestors.iter().cloned());
            }
        }

        // descendants of any member inherit the merged set
        for ancestors in self.super_map.values_mut() {
            if members.iter().any(|m| ancestors.contains(m)) {
                ancestors.extend(shared.iter().cloned());
            }
        }
        for member in members {
            self.super_map.insert(member, shared.clone());
        }
        self.dirty = true;
        debug!(a = %a, b = %b, depth = shared.len(), "types equated");
    }

    /// Statements previously seen for `property` or any of its sub-properties
    pub fn statements_using(&self, property: &Term) -> Vec<Quad> {
        self.sub_properties(property)
            .iter()
            .filter_map(|p| self.by_predicate.get(p))
            .flatten()
            .cloned()
            .collect()
    }

    pub fn ancestors(&self, ty: &Term) -> Option<&FxHashSet<Term>> {
        self.super_map.get(ty)
    }
}

/// A rule set over a vocabulary (RDFS, OWL, ...)
pub trait VocabularyProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Statements seeded into every new schema
    fn axioms(&self) -> Vec<Quad>;

    /// Inspect a newly asserted statement and return inferred ones
    fn process_statement(
        &self,
        quad: &Quad,
        ctx: &mut SchemaContext,
    ) -> ReasoningResult<Vec<Quad>>;

    /// Seed a type seen for the first time
    fn process_type(&self, ty: &Term, ctx: &mut SchemaContext) -> Vec<Quad>;
}

/// Type-hierarchy reasoner
pub struct Schema {
    ctx: SchemaContext,
    processors: Vec<Box<dyn VocabularyProcessor>>,
    /// processed statements, graph-normalized
    statements: FxHashSet<Quad>,
    expansion_cache: FxHashMap<Term, Vec<Term>>,
    /// inferred by lazy type processing, not yet handed out
    inferred: Vec<Quad>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field(
                "processors",
                &self.processors.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("statements", &self.statements.len())
            .field("types", &self.ctx.super_map.len())
            .finish()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(&ReasonerConfig::default())
    }
}

impl Schema {
    /// Schema with the processors enabled in `config`, axioms seeded
    pub fn new(config: &ReasonerConfig) -> Self {
        let mut processors: Vec<Box<dyn VocabularyProcessor>> =
            vec![Box::new(super::rdfs::RdfsProcessor::with_rules(config.rules.clone()))];
        if config.owl && config.rules.contains(&InferenceRule::TypeEquivalence) {
            processors.push(Box::new(super::owl::OwlProcessor::new()));
        }
        Self::with_processors(processors)
    }

    /// Schema driven by the given processors
    pub fn with_processors(processors: Vec<Box<dyn VocabularyProcessor>>) -> Self {
        let mut schema = Self {
            ctx: SchemaContext::default(),
            processors,
            statements: FxHashSet::default(),
            expansion_cache: FxHashMap::default(),
            inferred: Vec::new(),
        };
        let axioms: Vec<Quad> = schema.processors.iter().flat_map(|p| p.axioms()).collect();
        if let Err(e) = schema.add_quads(&axioms) {
            warn!(error = %e, "axiom seeding failed");
        }
        schema.inferred.clear();
        debug!(
            statements = schema.statements.len(),
            types = schema.ctx.super_map.len(),
            "schema seeded"
        );
        schema
    }

    fn base() -> Term {
        Term::iri(rdfs::RESOURCE)
    }

    /// Feed statements through the inference pipeline.
    ///
    /// Returns every statement inferred along the way that was not known
    /// before, in the default graph.
    pub fn add_quads(&mut self, quads: &[Quad]) -> ReasoningResult<Vec<Quad>> {
        let mut queue: VecDeque<(Quad, bool)> = quads
            .iter()
            .map(|q| (q.with_graph(Term::default_graph()), false))
            .collect();
        let inferred = self.run(&mut queue)?;
        Ok(inferred)
    }

    fn run(&mut self, queue: &mut VecDeque<(Quad, bool)>) -> ReasoningResult<Vec<Quad>> {
        let mut inferred = Vec::new();
        loop {
            while let Some((quad, is_inferred)) = queue.pop_front() {
                if !self.statements.insert(quad.clone()) {
                    continue;
                }
                if is_inferred {
                    inferred.push(quad.clone());
                }
                if quad.predicate.is_iri(rdf::TYPE) && quad.object.is_node() {
                    push_unique(
                        self.ctx.types_of.entry(quad.subject.clone()).or_default(),
                        quad.object.clone(),
                    );
                }
                for processor in &self.processors {
                    for out in processor.process_statement(&quad, &mut self.ctx)? {
                        let out = out.with_graph(Term::default_graph());
                        if !self.statements.contains(&out) {
                            queue.push_back((out, true));
                        }
                    }
                }
                self.ctx
                    .by_predicate
                    .entry(quad.predicate.clone())
                    .or_default()
                    .push(quad);
            }

            let requested = std::mem::take(&mut self.ctx.requested_types);
            if requested.is_empty() {
                break;
            }
            for ty in requested {
                for out in self.seed_type(&ty) {
                    queue.push_back((out, true));
                }
            }
        }
        if std::mem::take(&mut self.ctx.dirty) {
            self.expansion_cache.clear();
        }
        Ok(inferred)
    }

    fn seed_type(&mut self, ty: &Term) -> Vec<Quad> {
        if !self.ctx.processed_types.insert(ty.clone()) {
            return Vec::new();
        }
        let mut out = Vec::new();
        for processor in &self.processors {
            out.extend(processor.process_type(ty, &mut self.ctx));
        }
        out
    }

    fn process_type(&mut self, ty: &Term) {
        let mut queue: VecDeque<(Quad, bool)> =
            self.seed_type(ty).into_iter().map(|q| (q, true)).collect();
        match self.run(&mut queue) {
            Ok(inferred) => self.inferred.extend(inferred),
            Err(e) => warn!(ty = %ty, error = %e, "type processing failed"),
        }
    }

    /// Drain statements inferred while lazily processing types
    pub fn take_inferred(&mut self) -> Vec<Quad> {
        std::mem::take(&mut self.inferred)
    }

    /// Union of the given types and all their ancestors, most specific first
    pub fn mine_for_types(&mut self, types: &[Term]) -> Vec<Term> {
        if types.is_empty() {
            return vec![Self::base()];
        }

        // queried types lead their equivalents on ties
        let mut members: IndexSet<Term> = types.iter().cloned().collect();
        for ty in types {
            let representative = self.ctx.equivalence.find(ty);
            members.insert(representative);
            members.extend(self.ctx.equivalence.all_equals(ty));
        }
        for member in members.iter() {
            if !self.ctx.processed_types.contains(member) {
                self.process_type(member);
            }
        }

        let mut all: IndexSet<Term> = IndexSet::new();
        for member in &members {
            all.insert(member.clone());
            if let Some(ancestors) = self.ctx.ancestors(member) {
                all.extend(ancestors.iter().cloned());
            }
        }
        let with_equals: Vec<Term> = all
            .iter()
            .flat_map(|t| self.ctx.equivalence.all_equals(t))
            .collect();
        all.extend(with_equals);
        all.insert(Self::base());

        self.sort(&all.into_iter().collect::<Vec<_>>())
    }

    /// Types plus ancestors, most specific first; single-type calls cached
    pub fn expand(&mut self, types: &[Term]) -> Vec<Term> {
        if let [single] = types {
            if let Some(hit) = self.expansion_cache.get(single) {
                return hit.clone();
            }
            let expanded = self.mine_for_types(types);
            self.expansion_cache.insert(single.clone(), expanded.clone());
            return expanded;
        }
        self.mine_for_types(types)
    }

    /// Order types from most to least specific.
    ///
    /// The ancestor closure is eager and equivalent types share one set, so
    /// a subclass always has a strictly larger ancestor set than its
    /// superclass unless they are equivalent.
    /// Sorting by descending ancestor count therefore puts subclasses
    /// first; the sort is stable for ties.
    pub fn sort(&self, types: &[Term]) -> Vec<Term> {
        let mut sorted = types.to_vec();
        sorted.sort_by_key(|ty| Reverse(self.ctx.ancestors(ty).map_or(0, |a| a.len())));
        sorted
    }

    /// Whether `sub` is `sup` or a transitive subclass of it
    pub fn is_subclass_of(&self, sub: &Term, sup: &Term) -> bool {
        self.ctx.equivalence.same(sub, sup)
            || self
                .ctx
                .ancestors(sub)
                .map_or(false, |ancestors| ancestors.contains(sup))
    }

    /// Whether a resource with `asserted` types is an instance of `ty`
    pub fn is_instance_of(&mut self, asserted: &[Term], ty: &Term) -> bool {
        if asserted.is_empty() {
            return ty.is_iri(rdfs::RESOURCE);
        }
        let targets = self.ctx.equivalence.all_equals(ty);
        self.expand(asserted)
            .iter()
            .any(|candidate| targets.contains(candidate))
    }

    /// Types the reasoner has seen asserted or inferred for `resource`
    pub fn types_of(&self, resource: &Term) -> Vec<Term> {
        self.ctx
            .types_of
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    pub fn context(&self) -> &SchemaContext {
        &self.ctx
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.statements
            .contains(&quad.with_graph(Term::default_graph()))
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_org(s: &str) -> Term {
        Term::iri(format!("http://schema.org/{}", s))
    }

    fn sub_class(sub: &Term, sup: &Term) -> Quad {
        Quad::triple(sub.clone(), Term::iri(rdfs::SUB_CLASS_OF), sup.clone())
    }

    #[test]
    fn test_empty_expansion_is_base_type() {
        let mut schema = Schema::default();
        assert_eq!(schema.expand(&[]), vec![Term::iri(rdfs::RESOURCE)]);
    }

    #[test]
    fn test_expand_orders_most_specific_first() {
        let mut schema = Schema::default();
        let (thing, work, post) = (
            schema_org("Thing"),
            schema_org("CreativeWork"),
            schema_org("BlogPosting"),
        );
        schema
            .add_quads(&[sub_class(&work, &thing), sub_class(&post, &work)])
            .unwrap();

        assert_eq!(
            schema.expand(&[post.clone()]),
            vec![post, work, thing, Term::iri(rdfs::RESOURCE)]
        );
    }

    #[test]
    fn test_closure_is_monotonic_in_any_order() {
        let mut schema = Schema::default();
        let (a, b, c) = (schema_org("A"), schema_org("B"), schema_org("C"));
        schema.add_quads(&[sub_class(&b, &a)]).unwrap();
        schema.add_quads(&[sub_class(&c, &b)]).unwrap();

        let expanded = schema.expand(&[c.clone()]);
        assert!(expanded.contains(&a));
        assert!(expanded.contains(&b));
        assert_eq!(
            schema.sort(&[a.clone(), c.clone(), b.clone()]),
            vec![c.clone(), b.clone(), a.clone()]
        );

        // superclass declared after the fact reaches existing subclasses
        let root = schema_org("Root");
        schema.add_quads(&[sub_class(&a, &root)]).unwrap();
        assert!(schema.expand(&[c]).contains(&root));
    }

    #[test]
    fn test_invalid_subclass_object() {
        let mut schema = Schema::default();
        let result = schema.add_quads(&[Quad::triple(
            schema_org("A"),
            Term::iri(rdfs::SUB_CLASS_OF),
            Term::literal("B"),
        )]);
        assert!(matches!(result, Err(ReasoningError::InvalidSubClassObject(_))));
    }

    #[test]
    fn test_domain_and_range_inference() {
        let mut schema = Schema::default();
        let author = schema_org("author");
        let post = Term::iri("http://example.org/post/1");
        let alice = Term::iri("http://example.org/alice");

        // data first, schema later: inference is retroactive
        schema
            .add_quads(&[Quad::triple(post.clone(), author.clone(), alice.clone())])
            .unwrap();
        let inferred = schema
            .add_quads(&[
                Quad::triple(author.clone(), Term::iri(rdfs::DOMAIN), schema_org("CreativeWork")),
                Quad::triple(author.clone(), Term::iri(rdfs::RANGE), schema_org("Person")),
            ])
            .unwrap();

        let typed = |s: &Term, c: &Term| {
            Quad::triple(s.clone(), Term::iri(rdf::TYPE), c.clone())
        };
        assert!(inferred.contains(&typed(&post, &schema_org("CreativeWork"))));
        assert!(inferred.contains(&typed(&alice, &schema_org("Person"))));
        assert!(inferred.contains(&typed(&author, &Term::iri(rdf::PROPERTY))));
        assert!(schema.types_of(&post).contains(&schema_org("CreativeWork")));

        // and forward for new data
        let bob = Term::iri("http://example.org/bob");
        let more = schema
            .add_quads(&[Quad::triple(post.clone(), author, bob.clone())])
            .unwrap();
        assert!(more.contains(&typed(&bob, &schema_org("Person"))));
    }

    #[test]
    fn test_is_instance_of() {
        let mut schema = Schema::default();
        let (thing, person) = (schema_org("Thing"), schema_org("Person"));
        schema.add_quads(&[sub_class(&person, &thing)]).unwrap();

        assert!(schema.is_instance_of(&[person.clone()], &thing));
        assert!(schema.is_instance_of(&[person.clone()], &person));
        assert!(!schema.is_instance_of(&[thing], &person));
    }

    #[test]
    fn test_equivalent_type_sorts_like_its_class() {
        use crate::rdf::namespace::owl;

        let mut schema = Schema::default();
        let (thing, person) = (schema_org("Thing"), schema_org("Person"));
        let foaf_person = Term::iri("http://xmlns.com/foaf/0.1/Person");
        schema
            .add_quads(&[
                sub_class(&person, &thing),
                Quad::triple(foaf_person.clone(), Term::iri(owl::EQUIVALENT_CLASS), person.clone()),
            ])
            .unwrap();

        assert_eq!(
            schema.sort(&[thing.clone(), foaf_person.clone()]),
            vec![foaf_person.clone(), thing.clone()]
        );
        assert!(schema.is_subclass_of(&foaf_person, &thing));
        assert!(!schema.is_subclass_of(&thing, &foaf_person));
        assert_eq!(schema.expand(&[foaf_person.clone()])[0], foaf_person);

        // a superclass added later reaches both members
        let agent = schema_org("Agent");
        schema.add_quads(&[sub_class(&person, &agent)]).unwrap();
        assert!(schema.is_subclass_of(&foaf_person, &agent));
        assert_eq!(
            schema.sort(&[agent.clone(), foaf_person.clone()]),
            vec![foaf_person, agent]
        );
    }

    #[test]
    fn test_lazy_type_processing_infers_class() {
        let mut schema = Schema::default();
        let fresh = schema_org("Event");
        schema.expand(&[fresh.clone()]);

        let inferred = schema.take_inferred();
        assert!(inferred.contains(&Quad::triple(
            fresh,
            Term::iri(rdf::TYPE),
            Term::iri(rdfs::CLASS)
        )));
        assert!(schema.take_inferred().is_empty());
    }
}
