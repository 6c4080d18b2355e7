//! Schema reasoning
//!
//! - `equivalence`: union-find used for schema-level type equivalence
//! - `reasoner`: the `Schema` with its ancestor map and inference loop
//! - `rdfs` / `owl`: vocabulary processors plugged into the reasoner

pub mod equivalence;
pub mod owl;
pub mod rdfs;
pub mod reasoner;

pub use equivalence::EquivalenceSet;
pub use owl::OwlProcessor;
pub use rdfs::RdfsProcessor;
pub use reasoner::{
    InferenceRule, ReasoningError, ReasoningResult, Schema, SchemaContext, VocabularyProcessor,
};
