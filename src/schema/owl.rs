//! OWL type equivalence
//!
//! `owl:sameAs` and `owl:equivalentClass` between two type identifiers
//! union them in the schema's equivalence set. This only affects type
//! expansion; record identity is handled by the store.

use super::reasoner::{ReasoningResult, SchemaContext, VocabularyProcessor};
use crate::rdf::namespace::{owl, rdf, rdfs};
use crate::rdf::{Quad, Term};

/// OWL vocabulary processor
#[derive(Debug, Clone, Default)]
pub struct OwlProcessor;

impl OwlProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl VocabularyProcessor for OwlProcessor {
    fn name(&self) -> &'static str {
        "owl"
    }

    fn axioms(&self) -> Vec<Quad> {
        let iri = Term::iri;
        vec![
            Quad::triple(iri(owl::CLASS), iri(rdfs::SUB_CLASS_OF), iri(rdfs::CLASS)),
            Quad::triple(iri(owl::SAME_AS), iri(rdf::TYPE), iri(rdf::PROPERTY)),
            Quad::triple(iri(owl::EQUIVALENT_CLASS), iri(rdf::TYPE), iri(rdf::PROPERTY)),
            Quad::triple(iri(owl::EQUIVALENT_CLASS), iri(rdfs::DOMAIN), iri(rdfs::CLASS)),
            Quad::triple(iri(owl::EQUIVALENT_CLASS), iri(rdfs::RANGE), iri(rdfs::CLASS)),
        ]
    }

    fn process_statement(
        &self,
        quad: &Quad,
        ctx: &mut SchemaContext,
    ) -> ReasoningResult<Vec<Quad>> {
        let equates = quad.predicate.is_iri(owl::SAME_AS)
            || quad.predicate.is_iri(owl::EQUIVALENT_CLASS);
        if !equates || !quad.subject.is_node() || !quad.object.is_node() {
            if quad.predicate.is_iri(rdf::TYPE) && quad.object.is_iri(owl::CLASS) {
                ctx.request_type(&quad.subject);
            }
            return Ok(Vec::new());
        }

        // sameAs only concerns the schema when one side is a known type
        let is_type = |t: &Term| ctx.super_map.contains_key(t);
        if quad.predicate.is_iri(owl::SAME_AS) && !is_type(&quad.subject) && !is_type(&quad.object)
        {
            return Ok(Vec::new());
        }

        ctx.equate_types(&quad.subject, &quad.object);
        ctx.request_type(&quad.subject);
        ctx.request_type(&quad.object);
        Ok(Vec::new())
    }

    fn process_type(&self, _ty: &Term, _ctx: &mut SchemaContext) -> Vec<Quad> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://schema.org/{}", s))
    }

    fn sub_class(sub: &Term, sup: &Term) -> Quad {
        Quad::triple(sub.clone(), Term::iri(rdfs::SUB_CLASS_OF), sup.clone())
    }

    #[test]
    fn test_equivalent_classes_share_expansion() {
        let mut schema = Schema::default();
        let person = iri("Person");
        let foaf_person = Term::iri("http://xmlns.com/foaf/0.1/Person");
        schema
            .add_quads(&[
                sub_class(&person, &iri("Thing")),
                Quad::triple(foaf_person.clone(), Term::iri(owl::EQUIVALENT_CLASS), person.clone()),
            ])
            .unwrap();

        let expanded = schema.expand(&[foaf_person.clone()]);
        assert!(expanded.contains(&person));
        assert!(expanded.contains(&iri("Thing")));
        assert!(schema.is_instance_of(&[foaf_person], &person));
    }

    #[test]
    fn test_same_as_between_types() {
        let mut schema = Schema::default();
        let (a, b) = (iri("Article"), Term::iri("http://example.org/Article"));
        schema.add_quads(&[sub_class(&a, &iri("CreativeWork"))]).unwrap();
        schema
            .add_quads(&[Quad::triple(b.clone(), Term::iri(owl::SAME_AS), a.clone())])
            .unwrap();

        assert!(schema.expand(&[b]).contains(&iri("CreativeWork")));
    }

    #[test]
    fn test_same_as_between_records_is_ignored() {
        let mut schema = Schema::default();
        let (x, y) = (
            Term::iri("http://example.org/alice"),
            Term::iri("http://example.org/alice2"),
        );
        schema
            .add_quads(&[Quad::triple(x.clone(), Term::iri(owl::SAME_AS), y.clone())])
            .unwrap();
        assert!(!schema.context().equivalence.same(&x, &y));
    }

    #[test]
    fn test_owl_can_be_disabled() {
        let config = crate::config::ReasonerConfig {
            owl: false,
            ..Default::default()
        };
        let mut schema = Schema::new(&config);
        let (a, b) = (iri("A"), iri("B"));
        schema
            .add_quads(&[Quad::triple(a.clone(), Term::iri(owl::EQUIVALENT_CLASS), b.clone())])
            .unwrap();
        assert!(!schema.expand(&[a]).contains(&b));
    }
}
