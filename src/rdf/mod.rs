//! RDF data model for the link store
//!
//! This module provides:
//! - terms and quads on top of `oxrdf` (named nodes, blank nodes, literals)
//! - quad patterns with wildcard positions
//! - vocabulary constants (rdf, rdfs, owl, xsd and the link-lib delta markers)
//! - a typed builder turning nested data objects into quads
//!
//! # Example
//!
//! ```rust
//! use linkstore::rdf::{Quad, QuadPattern, Term};
//!
//! let alice = Term::iri("http://example.org/alice");
//! let name = Term::iri("http://xmlns.com/foaf/0.1/name");
//! let quad = Quad::triple(alice.clone(), name, Term::literal("Alice"));
//!
//! assert!(quad.in_default_graph());
//! assert!(QuadPattern::any().with_subject(alice).matches(&quad));
//! ```

pub mod data;
pub mod namespace;
mod types;

pub use data::{DataError, DataObject, DataResult, Value};
pub use namespace::Namespace;
pub use types::{BlankNode, Literal, NamedNode, Quad, QuadPattern, RdfError, RdfResult, Term};
