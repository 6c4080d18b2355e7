//! Linkstore
//!
//! An embeddable, in-process store for linked data quads with schema
//! reasoning, handler resolution and change notification.
//!
//! # Architecture
//!
//! - `rdf`: terms, quads, vocabularies and the data object builder
//! - `store`: positional indices, identifier canonicalization, the record
//!   view and the per-document journal, composed by `Store`
//! - `schema`: incremental RDFS/OWL type hierarchy reasoning
//! - `resolver`: most specific handler for a (type, property, topology) key
//! - `delta`: add/replace/remove/purge/slice change sets
//! - `broadcast`: buffered, time-sliced fan-out to subscribers
//! - `linked`: `LinkedStore`, wiring all of the above together
//! - `config`: YAML-loadable configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use linkstore::rdf::namespace::{ld, rdf, rdfs};
//! use linkstore::{LinkedStore, Quad, Term};
//!
//! let mut store: LinkedStore<&str> = LinkedStore::default();
//! let schema = |s: &str| Term::iri(format!("http://schema.org/{}", s));
//!
//! store
//!     .add_quads(&[
//!         Quad::triple(
//!             schema("BlogPosting"),
//!             Term::iri(rdfs::SUB_CLASS_OF),
//!             schema("CreativeWork"),
//!         ),
//!         Quad::triple(
//!             Term::iri("http://example.org/post/1"),
//!             Term::iri(rdf::TYPE),
//!             schema("BlogPosting"),
//!         ),
//!     ])
//!     .unwrap();
//! store.register_renderer("work", &[schema("CreativeWork")]).unwrap();
//!
//! let handler = store.resolve_for(
//!     &Term::iri("http://example.org/post/1"),
//!     &[Term::iri(ld::TYPE_RENDERER)],
//!     &Term::iri(ld::DEFAULT_TOPOLOGY),
//!     None,
//! );
//! assert_eq!(handler, Some("work"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod broadcast;
pub mod config;
pub mod delta;
pub mod linked;
pub mod rdf;
pub mod resolver;
pub mod schema;
pub mod store;

use thiserror::Error;

// Re-export main types for convenience
pub use broadcast::{
    ChangeBroadcaster, ChangeSender, ChangeSet, Subscription, SubscriptionHandle,
};

pub use config::{
    BroadcastConfig, ConfigError, ConfigResult, ReasonerConfig, ResolverConfig, StoreConfig,
};

pub use delta::{
    DeltaBuckets, DeltaError, DeltaMarker, DeltaOperation, DeltaReconciler, DeltaSummary,
};

pub use linked::LinkedStore;

pub use rdf::{
    BlankNode, DataError, DataObject, Literal, NamedNode, Quad, QuadPattern, RdfError, Term,
    Value,
};

pub use resolver::{HandlerResolver, ResolverError};

pub use schema::{EquivalenceSet, InferenceRule, ReasoningError, Schema};

pub use store::{
    DataRecord, FieldValue, RecordState, RecordStatus, Store, StoreError,
};

/// Any error raised by the store
#[derive(Error, Debug)]
pub enum LinkStoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Reasoning(#[from] ReasoningError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    #[error(transparent)]
    Delta(#[from] DeltaError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Rdf(#[from] RdfError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type LinkStoreResult<T> = Result<T, LinkStoreError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
