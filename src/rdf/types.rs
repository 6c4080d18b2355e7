//! Term and quad definitions
//!
//! Thin wrappers around the oxrdf primitives plus the `Term` union used by
//! every layer of the store.

use oxrdf::{
    BlankNode as OxBlankNode, GraphName as OxGraphName, Literal as OxLiteral,
    NamedNode as OxNamedNode, Quad as OxQuad, Subject as OxSubject, Term as OxTerm,
};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use super::namespace::rdf;

/// Term errors
#[derive(Error, Debug, PartialEq)]
pub enum RdfError {
    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Invalid blank node
    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),

    /// Invalid literal
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    /// A term of the wrong kind in a quad position
    #[error("{kind} is not allowed in {position} position")]
    InvalidPosition {
        kind: &'static str,
        position: &'static str,
    },

    /// Term kinds this store does not model (e.g. quoted triples)
    #[error("Unsupported term: {0}")]
    Unsupported(String),
}

pub type RdfResult<T> = Result<T, RdfError>;

/// Named node (IRI)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    /// Create a new named node from an IRI string
    pub fn new(iri: &str) -> RdfResult<Self> {
        OxNamedNode::new(iri)
            .map(Self)
            .map_err(|e| RdfError::InvalidIri(e.to_string()))
    }

    /// Create a named node without validating the IRI
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self(OxNamedNode::new_unchecked(iri))
    }

    /// Get the IRI string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// IRI with any `#fragment` removed
    pub fn document(&self) -> &str {
        let iri = self.as_str();
        iri.split_once('#').map_or(iri, |(doc, _)| doc)
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.as_str())
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(node: OxNamedNode) -> Self {
        Self(node)
    }
}

impl From<NamedNode> for OxNamedNode {
    fn from(node: NamedNode) -> Self {
        node.0
    }
}

/// Blank node, scoped to the store that created it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    /// Create a new blank node with a unique identifier
    pub fn new() -> Self {
        Self(OxBlankNode::default())
    }

    /// Create a blank node from a string identifier
    pub fn with_id(id: &str) -> RdfResult<Self> {
        OxBlankNode::new(id)
            .map(Self)
            .map_err(|e| RdfError::InvalidBlankNode(e.to_string()))
    }

    /// Get the blank node identifier
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for BlankNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.as_str())
    }
}

impl From<OxBlankNode> for BlankNode {
    fn from(node: OxBlankNode) -> Self {
        Self(node)
    }
}

/// RDF literal value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    /// Create a simple literal (plain string)
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(OxLiteral::new_simple_literal(value))
    }

    /// Create a literal with language tag
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> RdfResult<Self> {
        OxLiteral::new_language_tagged_literal(value, language)
            .map(Self)
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()))
    }

    /// Create a typed literal
    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        Self(OxLiteral::new_typed_literal(value, datatype.0))
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    /// Get the datatype
    pub fn datatype(&self) -> NamedNode {
        NamedNode(self.0.datatype().into_owned())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(lang) = self.language() {
            write!(f, "\"{}\"@{}", self.value(), lang)
        } else {
            write!(f, "\"{}\"^^{}", self.value(), self.datatype())
        }
    }
}

impl From<OxLiteral> for Literal {
    fn from(lit: OxLiteral) -> Self {
        Self(lit)
    }
}

/// Any value that can occupy a quad position.
///
/// Terms are totally ordered by kind (literal, named, local) and then by
/// lexical value. The identity layer keeps the smaller of two equated terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Dereferenceable resource (IRI)
    Named(NamedNode),
    /// Node scoped to the store
    Local(BlankNode),
    /// Literal value
    Literal(Literal),
}

impl Term {
    /// Named term from an IRI, without validation
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Named(NamedNode::new_unchecked(iri))
    }

    /// Local node with the given identifier
    pub fn local(id: &str) -> RdfResult<Self> {
        BlankNode::with_id(id).map(Term::Local)
    }

    /// Fresh local node
    pub fn fresh_local() -> Self {
        Term::Local(BlankNode::new())
    }

    /// Plain string literal
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::new_simple_literal(value))
    }

    /// The store's default graph
    pub fn default_graph() -> Self {
        Term::iri(rdf::DEFAULT_GRAPH)
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Term::Named(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Term::Local(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// Named or local, i.e. something that can be a record
    pub fn is_node(&self) -> bool {
        !self.is_literal()
    }

    /// Lexical value: the IRI, the blank node id, or the literal value
    pub fn value(&self) -> &str {
        match self {
            Term::Named(n) => n.as_str(),
            Term::Local(b) => b.as_str(),
            Term::Literal(l) => l.value(),
        }
    }

    /// The IRI if this is a named term
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Named(n) => Some(n.as_str()),
            _ => None,
        }
    }

    /// Whether this is the named term `iri`
    pub fn is_iri(&self, iri: &str) -> bool {
        self.as_iri() == Some(iri)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Term::Named(_) => "named node",
            Term::Local(_) => "local node",
            Term::Literal(_) => "literal",
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Term::Literal(_) => 0,
            Term::Named(_) => 1,
            Term::Local(_) => 2,
        }
    }

    /// Identifier grouping co-located records (fragment stripped)
    pub fn document_id(&self) -> String {
        match self {
            Term::Named(n) => n.document().to_string(),
            other => other.to_string(),
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind_rank()
            .cmp(&other.kind_rank())
            .then_with(|| self.value().cmp(other.value()))
            .then_with(|| match (self, other) {
                (Term::Literal(a), Term::Literal(b)) => a
                    .language()
                    .cmp(&b.language())
                    .then_with(|| a.datatype().as_str().cmp(b.datatype().as_str())),
                _ => Ordering::Equal,
            })
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Named(n) => write!(f, "{}", n),
            Term::Local(b) => write!(f, "{}", b),
            Term::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(node: NamedNode) -> Self {
        Term::Named(node)
    }
}

impl From<BlankNode> for Term {
    fn from(node: BlankNode) -> Self {
        Term::Local(node)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl From<Term> for OxTerm {
    fn from(term: Term) -> Self {
        match term {
            Term::Named(n) => OxTerm::NamedNode(n.0),
            Term::Local(b) => OxTerm::BlankNode(b.0),
            Term::Literal(l) => OxTerm::Literal(l.0),
        }
    }
}

impl TryFrom<OxTerm> for Term {
    type Error = RdfError;

    fn try_from(term: OxTerm) -> RdfResult<Self> {
        match term {
            OxTerm::NamedNode(n) => Ok(Term::Named(n.into())),
            OxTerm::BlankNode(b) => Ok(Term::Local(b.into())),
            OxTerm::Literal(l) => Ok(Term::Literal(l.into())),
            #[allow(unreachable_patterns)]
            other => Err(RdfError::Unsupported(other.to_string())),
        }
    }
}

/// A fact: subject, predicate, object and graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Term,
}

impl Quad {
    /// Create a new quad
    pub fn new(subject: Term, predicate: Term, object: Term, graph: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Create a quad in the default graph
    pub fn triple(subject: Term, predicate: Term, object: Term) -> Self {
        Self::new(subject, predicate, object, Term::default_graph())
    }

    /// Same statement, different graph
    pub fn with_graph(&self, graph: Term) -> Self {
        Self::new(
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
            graph,
        )
    }

    pub fn in_default_graph(&self) -> bool {
        self.graph.is_iri(rdf::DEFAULT_GRAPH)
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.in_default_graph() {
            write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
        } else {
            write!(
                f,
                "{} {} {} {} .",
                self.subject, self.predicate, self.object, self.graph
            )
        }
    }
}

impl TryFrom<OxQuad> for Quad {
    type Error = RdfError;

    fn try_from(quad: OxQuad) -> RdfResult<Self> {
        let subject = match quad.subject {
            OxSubject::NamedNode(n) => Term::Named(n.into()),
            OxSubject::BlankNode(b) => Term::Local(b.into()),
            #[allow(unreachable_patterns)]
            other => return Err(RdfError::Unsupported(other.to_string())),
        };
        let graph = match quad.graph_name {
            OxGraphName::NamedNode(n) => Term::Named(n.into()),
            OxGraphName::BlankNode(b) => Term::Local(b.into()),
            OxGraphName::DefaultGraph => Term::default_graph(),
        };
        Ok(Quad::new(
            subject,
            Term::Named(quad.predicate.into()),
            Term::try_from(quad.object)?,
            graph,
        ))
    }
}

impl TryFrom<&Quad> for OxQuad {
    type Error = RdfError;

    fn try_from(quad: &Quad) -> RdfResult<Self> {
        let subject: OxSubject = match &quad.subject {
            Term::Named(n) => n.0.clone().into(),
            Term::Local(b) => b.0.clone().into(),
            Term::Literal(_) => {
                return Err(RdfError::InvalidPosition {
                    kind: "literal",
                    position: "subject",
                })
            }
        };
        let predicate = match &quad.predicate {
            Term::Named(n) => n.0.clone(),
            other => {
                return Err(RdfError::InvalidPosition {
                    kind: other.kind(),
                    position: "predicate",
                })
            }
        };
        let graph = match &quad.graph {
            _ if quad.in_default_graph() => OxGraphName::DefaultGraph,
            Term::Named(n) => OxGraphName::NamedNode(n.0.clone()),
            Term::Local(b) => OxGraphName::BlankNode(b.0.clone()),
            Term::Literal(_) => {
                return Err(RdfError::InvalidPosition {
                    kind: "literal",
                    position: "graph",
                })
            }
        };
        Ok(OxQuad::new(
            subject,
            predicate,
            OxTerm::from(quad.object.clone()),
            graph,
        ))
    }
}

/// Quad pattern for lookups; `None` positions are wildcards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadPattern {
    pub subject: Option<Term>,
    pub predicate: Option<Term>,
    pub object: Option<Term>,
    pub graph: Option<Term>,
}

impl QuadPattern {
    /// Create a new quad pattern
    pub fn new(
        subject: Option<Term>,
        predicate: Option<Term>,
        object: Option<Term>,
        graph: Option<Term>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Pattern matching every quad
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: Term) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_predicate(mut self, predicate: Term) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    pub fn with_graph(mut self, graph: Term) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Positions in subject, predicate, object, graph order
    pub fn positions(&self) -> [Option<&Term>; 4] {
        [
            self.subject.as_ref(),
            self.predicate.as_ref(),
            self.object.as_ref(),
            self.graph.as_ref(),
        ]
    }

    /// Check if a quad matches this pattern
    pub fn matches(&self, quad: &Quad) -> bool {
        let values = [&quad.subject, &quad.predicate, &quad.object, &quad.graph];
        self.positions()
            .iter()
            .zip(values)
            .all(|(bound, value)| bound.map_or(true, |b| b == value))
    }
}
