//! In-memory fact storage
//!
//! - `journal`: per-document presence and freshness
//! - `record`: record id → field map with aliases and ordinal members
//! - `index`: four positional indices over interned terms
//! - `identity`: canonicalization of equated identifiers
//! - `quad_store`: the `Store` facade keeping all of the above in step

pub mod identity;
pub mod index;
pub mod journal;
pub mod quad_store;
pub mod record;

pub use identity::{IdentityLayer, Merge};
pub use index::{IndexLayer, QuadKey, TermId, TermTable};
pub use journal::{RecordJournal, RecordState, RecordStatus};
pub use quad_store::{Store, StoreError, StoreResult};
pub use record::{DataRecord, FieldValue, RecordStore};
