//! Vocabulary IRIs used by the store, the reasoner and the delta protocol.

use super::types::Term;

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix
    pub prefix: &'static str,
    /// IRI
    pub iri: &'static str,
}

impl Namespace {
    pub const fn new(prefix: &'static str, iri: &'static str) -> Self {
        Self { prefix, iri }
    }

    /// Named term for `local` in this namespace
    pub fn term(&self, local: &str) -> Term {
        Term::iri(format!("{}{}", self.iri, local))
    }

    /// Local part of `iri` if it lives in this namespace
    pub fn local_name<'a>(&self, iri: &'a str) -> Option<&'a str> {
        iri.strip_prefix(self.iri)
    }
}

pub mod rdf {
    use super::Namespace;

    pub const NS: Namespace = Namespace::new("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");

    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
    pub const STATEMENT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Statement";
    pub const SUBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#subject";
    pub const PREDICATE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#predicate";
    pub const OBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#object";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const VALUE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#value";
    pub const LIST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#List";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const SEQ: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Seq";
    pub const BAG: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Bag";
    pub const ALT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Alt";
    pub const XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    pub const HTML: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#HTML";
    pub const DEFAULT_GRAPH: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#defaultGraph";

    /// Prefix of the ordinal member properties `rdf:_1`, `rdf:_2`, ...
    pub const ORDINAL_PREFIX: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#_";

    /// Ordinal member property for position `n`
    pub fn ordinal(n: usize) -> String {
        format!("{}{}", ORDINAL_PREFIX, n)
    }
}

pub mod rdfs {
    use super::Namespace;

    pub const NS: Namespace = Namespace::new("rdfs", "http://www.w3.org/2000/01/rdf-schema#");

    pub const RESOURCE: &str = "http://www.w3.org/2000/01/rdf-schema#Resource";
    pub const CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
    pub const LITERAL: &str = "http://www.w3.org/2000/01/rdf-schema#Literal";
    pub const DATATYPE: &str = "http://www.w3.org/2000/01/rdf-schema#Datatype";
    pub const CONTAINER: &str = "http://www.w3.org/2000/01/rdf-schema#Container";
    pub const CONTAINER_MEMBERSHIP_PROPERTY: &str =
        "http://www.w3.org/2000/01/rdf-schema#ContainerMembershipProperty";
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    pub const SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
    pub const DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
    pub const RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
    pub const MEMBER: &str = "http://www.w3.org/2000/01/rdf-schema#member";
    pub const SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
    pub const IS_DEFINED_BY: &str = "http://www.w3.org/2000/01/rdf-schema#isDefinedBy";
}

pub mod owl {
    use super::Namespace;

    pub const NS: Namespace = Namespace::new("owl", "http://www.w3.org/2002/07/owl#");

    pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
    pub const EQUIVALENT_CLASS: &str = "http://www.w3.org/2002/07/owl#equivalentClass";
    pub const THING: &str = "http://www.w3.org/2002/07/owl#Thing";
    pub const CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
}

pub mod xsd {
    use super::Namespace;

    pub const NS: Namespace = Namespace::new("xsd", "http://www.w3.org/2001/XMLSchema#");

    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// Primitive datatypes seeded into the schema as `rdfs:Datatype`s
    pub const DATATYPES: &[&str] = &[
        "anyURI", "base64Binary", "boolean", "byte", "date", "dateTime", "dateTimeStamp",
        "decimal", "double", "duration", "float", "gDay", "gMonth", "gMonthDay", "gYear",
        "gYearMonth", "hexBinary", "int", "integer", "language", "long", "Name", "NCName",
        "negativeInteger", "NMTOKEN", "nonNegativeInteger", "nonPositiveInteger",
        "normalizedString", "positiveInteger", "short", "string", "time", "token",
        "unsignedByte", "unsignedInt", "unsignedLong", "unsignedShort",
    ];
}

/// Link-lib delta protocol and rendering vocabulary
pub mod ld {
    use super::Namespace;

    pub const NS: Namespace = Namespace::new("ld", "http://purl.org/link-lib/");

    pub const ADD: &str = "http://purl.org/link-lib/add";
    pub const REPLACE: &str = "http://purl.org/link-lib/replace";
    pub const REMOVE: &str = "http://purl.org/link-lib/remove";
    pub const PURGE: &str = "http://purl.org/link-lib/purge";
    pub const SLICE: &str = "http://purl.org/link-lib/slice";

    /// Synthetic property under which whole-resource handlers are registered
    pub const TYPE_RENDERER: &str = "http://purl.org/link-lib/typeRenderClass";
    /// Topology used when none is given
    pub const DEFAULT_TOPOLOGY: &str = "http://purl.org/link-lib/defaultTopology";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_terms() {
        assert!(rdf::NS.term("type").is_iri(rdf::TYPE));
        assert!(rdfs::NS.term("Resource").is_iri(rdfs::RESOURCE));
        assert_eq!(rdf::ordinal(3), format!("{}_3", rdf::NS.iri));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(ld::NS.local_name(ld::PURGE), Some("purge"));
        assert_eq!(ld::NS.local_name("http://example.org/purge"), None);
    }
}
