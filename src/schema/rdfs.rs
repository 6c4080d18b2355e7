//! RDFS entailment over the type hierarchy
//!
//! Implements the subset of the RDFS rules that shape types:
//! - rdfs:domain / rdfs:range: `(P domain C) ∧ (X P Y) → (X type C)`
//! - rdfs:subClassOf closure, kept eagerly in the ancestor map
//! - rdfs:subPropertyOf closure, feeding domain/range inference

use super::reasoner::{
    InferenceRule, ReasoningError, ReasoningResult, SchemaContext, VocabularyProcessor,
};
use crate::rdf::namespace::{rdf, rdfs, xsd};
use crate::rdf::{Quad, Term};

fn statement(s: &str, p: &str, o: &str) -> Quad {
    Quad::triple(Term::iri(s), Term::iri(p), Term::iri(o))
}

fn typed(subject: &Term, class: &Term) -> Quad {
    Quad::triple(subject.clone(), Term::iri(rdf::TYPE), class.clone())
}

/// RDFS vocabulary processor
#[derive(Debug, Clone)]
pub struct RdfsProcessor {
    /// Enable specific rules
    enabled_rules: Vec<InferenceRule>,
}

impl RdfsProcessor {
    /// Processor with all rules enabled
    pub fn new() -> Self {
        Self {
            enabled_rules: InferenceRule::all(),
        }
    }

    /// Processor with specific rules
    pub fn with_rules(rules: Vec<InferenceRule>) -> Self {
        Self {
            enabled_rules: rules,
        }
    }

    fn enabled(&self, rule: InferenceRule) -> bool {
        self.enabled_rules.contains(&rule)
    }

    /// Domain and range inference for a data statement
    fn infer_types(&self, quad: &Quad, ctx: &SchemaContext) -> Vec<Quad> {
        let mut out = Vec::new();
        let chain = if self.enabled(InferenceRule::SubPropertyOfTransitive) {
            ctx.property_chain(&quad.predicate)
        } else {
            vec![quad.predicate.clone()]
        };
        for property in &chain {
            if self.enabled(InferenceRule::DomainInference) && quad.subject.is_node() {
                if let Some(domains) = ctx.domains.get(property) {
                    out.extend(domains.iter().map(|c| typed(&quad.subject, c)));
                }
            }
            if self.enabled(InferenceRule::RangeInference) && quad.object.is_node() {
                if let Some(ranges) = ctx.ranges.get(property) {
                    out.extend(ranges.iter().map(|c| typed(&quad.object, c)));
                }
            }
        }
        out
    }
}

impl Default for RdfsProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl VocabularyProcessor for RdfsProcessor {
    fn name(&self) -> &'static str {
        "rdfs"
    }

    fn axioms(&self) -> Vec<Quad> {
        let mut axioms = vec![
            statement(rdf::TYPE, rdfs::DOMAIN, rdfs::RESOURCE),
            statement(rdfs::DOMAIN, rdfs::DOMAIN, rdf::PROPERTY),
            statement(rdfs::RANGE, rdfs::DOMAIN, rdf::PROPERTY),
            statement(rdfs::SUB_PROPERTY_OF, rdfs::DOMAIN, rdf::PROPERTY),
            statement(rdfs::SUB_CLASS_OF, rdfs::DOMAIN, rdfs::CLASS),
            statement(rdf::SUBJECT, rdfs::DOMAIN, rdf::STATEMENT),
            statement(rdf::PREDICATE, rdfs::DOMAIN, rdf::STATEMENT),
            statement(rdf::OBJECT, rdfs::DOMAIN, rdf::STATEMENT),
            statement(rdfs::MEMBER, rdfs::DOMAIN, rdfs::RESOURCE),
            statement(rdf::FIRST, rdfs::DOMAIN, rdf::LIST),
            statement(rdf::REST, rdfs::DOMAIN, rdf::LIST),
            statement(rdfs::SEE_ALSO, rdfs::DOMAIN, rdfs::RESOURCE),
            statement(rdfs::IS_DEFINED_BY, rdfs::DOMAIN, rdfs::RESOURCE),
            statement(rdfs::COMMENT, rdfs::DOMAIN, rdfs::RESOURCE),
            statement(rdfs::LABEL, rdfs::DOMAIN, rdfs::RESOURCE),
            statement(rdf::VALUE, rdfs::DOMAIN, rdfs::RESOURCE),
            statement(rdf::TYPE, rdfs::RANGE, rdfs::CLASS),
            statement(rdfs::DOMAIN, rdfs::RANGE, rdfs::CLASS),
            statement(rdfs::RANGE, rdfs::RANGE, rdfs::CLASS),
            statement(rdfs::SUB_PROPERTY_OF, rdfs::RANGE, rdf::PROPERTY),
            statement(rdfs::SUB_CLASS_OF, rdfs::RANGE, rdfs::CLASS),
            statement(rdf::SUBJECT, rdfs::RANGE, rdfs::RESOURCE),
            statement(rdf::PREDICATE, rdfs::RANGE, rdfs::RESOURCE),
            statement(rdf::OBJECT, rdfs::RANGE, rdfs::RESOURCE),
            statement(rdfs::MEMBER, rdfs::RANGE, rdfs::RESOURCE),
            statement(rdf::FIRST, rdfs::RANGE, rdfs::RESOURCE),
            statement(rdf::REST, rdfs::RANGE, rdf::LIST),
            statement(rdfs::SEE_ALSO, rdfs::RANGE, rdfs::RESOURCE),
            statement(rdfs::IS_DEFINED_BY, rdfs::RANGE, rdfs::RESOURCE),
            statement(rdfs::COMMENT, rdfs::RANGE, rdfs::LITERAL),
            statement(rdfs::LABEL, rdfs::RANGE, rdfs::LITERAL),
            statement(rdf::VALUE, rdfs::RANGE, rdfs::RESOURCE),
            statement(rdf::ALT, rdfs::SUB_CLASS_OF, rdfs::CONTAINER),
            statement(rdf::BAG, rdfs::SUB_CLASS_OF, rdfs::CONTAINER),
            statement(rdf::SEQ, rdfs::SUB_CLASS_OF, rdfs::CONTAINER),
            statement(
                rdfs::CONTAINER_MEMBERSHIP_PROPERTY,
                rdfs::SUB_CLASS_OF,
                rdf::PROPERTY,
            ),
            statement(rdfs::IS_DEFINED_BY, rdfs::SUB_PROPERTY_OF, rdfs::SEE_ALSO),
            statement(rdfs::DATATYPE, rdfs::SUB_CLASS_OF, rdfs::CLASS),
            statement(rdf::XML_LITERAL, rdf::TYPE, rdfs::DATATYPE),
            statement(rdf::LANG_STRING, rdf::TYPE, rdfs::DATATYPE),
            statement(rdf::HTML, rdf::TYPE, rdfs::DATATYPE),
        ];
        axioms.extend(
            xsd::DATATYPES
                .iter()
                .map(|local| typed(&xsd::NS.term(local), &Term::iri(rdfs::DATATYPE))),
        );
        axioms
    }

    fn process_statement(
        &self,
        quad: &Quad,
        ctx: &mut SchemaContext,
    ) -> ReasoningResult<Vec<Quad>> {
        let mut out = self.infer_types(quad, ctx);
        let Some(predicate) = quad.predicate.as_iri() else {
            return Ok(out);
        };

        match predicate {
            rdfs::SUB_CLASS_OF => {
                if !quad.object.is_node() {
                    return Err(ReasoningError::InvalidSubClassObject(quad.to_string()));
                }
                if self.enabled(InferenceRule::SubClassOfTransitive) {
                    ctx.add_subclass(&quad.subject, &quad.object);
                } else {
                    ctx.ensure_type(&quad.subject);
                    ctx.ensure_type(&quad.object);
                }
                ctx.request_type(&quad.subject);
                ctx.request_type(&quad.object);
            }
            rdfs::SUB_PROPERTY_OF => {
                if !quad.object.is_node() {
                    return Err(ReasoningError::InvalidSubPropertyObject(quad.to_string()));
                }
                if self.enabled(InferenceRule::SubPropertyOfTransitive) {
                    ctx.add_subproperty(&quad.subject, &quad.object);
                    // statements using the sub-property pick up the new
                    // super-property's domain and range
                    for existing in ctx.statements_using(&quad.subject) {
                        out.extend(self.infer_types(&existing, ctx));
                    }
                }
            }
            rdfs::DOMAIN | rdfs::RANGE if quad.object.is_node() => {
                let is_domain = predicate == rdfs::DOMAIN;
                let added = if is_domain {
                    ctx.add_domain(&quad.subject, &quad.object)
                } else {
                    ctx.add_range(&quad.subject, &quad.object)
                };
                out.push(typed(&quad.subject, &Term::iri(rdf::PROPERTY)));
                out.push(typed(&quad.object, &Term::iri(rdfs::CLASS)));

                let rule = if is_domain {
                    InferenceRule::DomainInference
                } else {
                    InferenceRule::RangeInference
                };
                if added && self.enabled(rule) {
                    for existing in ctx.statements_using(&quad.subject) {
                        let target = if is_domain {
                            &existing.subject
                        } else {
                            &existing.object
                        };
                        if target.is_node() {
                            out.push(typed(target, &quad.object));
                        }
                    }
                }
            }
            rdf::TYPE if quad.object.is_iri(rdfs::CLASS) || quad.object.is_iri(rdfs::DATATYPE) => {
                ctx.request_type(&quad.subject);
            }
            _ => {}
        }
        Ok(out)
    }

    fn process_type(&self, ty: &Term, ctx: &mut SchemaContext) -> Vec<Quad> {
        if ty.is_literal() {
            return Vec::new();
        }
        ctx.ensure_type(ty);
        vec![
            Quad::triple(ty.clone(), Term::iri(rdfs::SUB_CLASS_OF), Term::iri(rdfs::RESOURCE)),
            typed(ty, &Term::iri(rdfs::CLASS)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://example.org/{}", s))
    }

    #[test]
    fn test_processor_creation() {
        let processor = RdfsProcessor::new();
        assert_eq!(processor.enabled_rules.len(), InferenceRule::all().len());
        assert_eq!(processor.name(), "rdfs");
    }

    #[test]
    fn test_axioms_include_datatypes() {
        let axioms = RdfsProcessor::new().axioms();
        assert!(axioms.contains(&typed(
            &Term::iri(xsd::INTEGER),
            &Term::iri(rdfs::DATATYPE)
        )));
        assert!(axioms.contains(&statement(rdf::TYPE, rdfs::RANGE, rdfs::CLASS)));
    }

    #[test]
    fn test_seeded_schema_knows_datatypes() {
        let mut schema = Schema::default();
        assert!(schema.contains(&typed(&Term::iri(xsd::STRING), &Term::iri(rdfs::DATATYPE))));
        assert!(schema.is_subclass_of(&Term::iri(rdfs::DATATYPE), &Term::iri(rdfs::CLASS)));
        assert!(schema
            .expand(&[Term::iri(rdf::SEQ)])
            .contains(&Term::iri(rdfs::CONTAINER)));
    }

    #[test]
    fn test_custom_rules_disable_domain_inference() {
        let mut schema = Schema::with_processors(vec![Box::new(RdfsProcessor::with_rules(vec![
            InferenceRule::SubClassOfTransitive,
        ]))]);
        let inferred = schema
            .add_quads(&[
                Quad::triple(iri("author"), Term::iri(rdfs::DOMAIN), iri("Work")),
                Quad::triple(iri("post"), iri("author"), iri("alice")),
            ])
            .unwrap();
        assert!(!inferred.contains(&typed(&iri("post"), &iri("Work"))));
    }

    #[test]
    fn test_subproperty_inherits_domain() {
        let mut schema = Schema::default();
        schema
            .add_quads(&[Quad::triple(iri("creator"), Term::iri(rdfs::DOMAIN), iri("Work"))])
            .unwrap();
        schema
            .add_quads(&[Quad::triple(iri("post"), iri("author"), iri("alice"))])
            .unwrap();
        let inferred = schema
            .add_quads(&[Quad::triple(
                iri("author"),
                Term::iri(rdfs::SUB_PROPERTY_OF),
                iri("creator"),
            )])
            .unwrap();

        assert!(inferred.contains(&typed(&iri("post"), &iri("Work"))));
    }

    #[test]
    fn test_literal_objects_get_no_range_type() {
        let mut schema = Schema::default();
        let inferred = schema
            .add_quads(&[
                Quad::triple(iri("name"), Term::iri(rdfs::RANGE), iri("Name")),
                Quad::triple(iri("alice"), iri("name"), Term::literal("Alice")),
            ])
            .unwrap();
        assert!(inferred
            .iter()
            .all(|q| !(q.predicate.is_iri(rdf::TYPE) && q.subject.is_literal())));
    }
}
