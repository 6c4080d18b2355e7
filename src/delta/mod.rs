//! Delta reconciliation
//!
//! A delta is a batch of quads whose graph position holds an operation
//! marker (see [`marker`]). Reconciling happens in two steps so callers
//! can inspect what is about to change:
//!
//! 1. `classify` sorts the batch into addable, replaceable and removable
//!    quads against the current store contents;
//! 2. `apply` commits the buckets: removals first, then replacements,
//!    then additions.
//!
//! Quads with unknown markers are skipped without failing the batch.

pub mod marker;

pub use marker::{DeltaError, DeltaMarker, DeltaOperation, DeltaResult};

use crate::rdf::{Quad, QuadPattern, Term};
use crate::store::Store;
use indexmap::IndexSet;
use tracing::{debug, warn};

/// Effective changes of a delta, before they are applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaBuckets {
    pub addable: Vec<Quad>,
    pub replaceable: Vec<Quad>,
    pub removable: Vec<Quad>,
}

impl DeltaBuckets {
    pub fn len(&self) -> usize {
        self.addable.len() + self.replaceable.len() + self.removable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What applying a delta changed in the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaSummary {
    /// Quads that were not present before
    pub added: Vec<Quad>,
    /// Quads that are gone, including values overwritten by replace
    pub removed: Vec<Quad>,
    /// Tuples skipped because of an unknown or malformed marker
    pub skipped: usize,
}

impl DeltaSummary {
    /// Every quad whose presence changed
    pub fn changes(&self) -> impl Iterator<Item = &Quad> {
        self.added.iter().chain(self.removed.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Classifies and applies operation-marked quads
#[derive(Debug, Clone)]
pub struct DeltaReconciler {
    /// Graph for add/replace without an override
    default_graph: Term,
}

impl Default for DeltaReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl DeltaReconciler {
    pub fn new() -> Self {
        Self {
            default_graph: Term::default_graph(),
        }
    }

    pub fn with_default_graph(default_graph: Term) -> Self {
        Self { default_graph }
    }

    /// Sort `delta` into buckets against the current contents of `store`
    pub fn classify(&self, store: &Store, delta: &[Quad]) -> (DeltaBuckets, usize) {
        let mut addable = IndexSet::new();
        let mut replaceable = IndexSet::new();
        let mut removable = IndexSet::new();
        let mut skipped = 0;

        for quad in delta {
            let marker = match DeltaMarker::try_from(&quad.graph) {
                Ok(marker) => marker,
                Err(e) => {
                    warn!(quad = %quad, error = %e, "ignoring delta quad");
                    skipped += 1;
                    continue;
                }
            };
            let target = marker
                .graph
                .clone()
                .unwrap_or_else(|| self.default_graph.clone());
            let s = quad.subject.clone();
            let p = quad.predicate.clone();
            let o = quad.object.clone();

            match marker.operation {
                DeltaOperation::Add => {
                    addable.insert(Quad::new(s, p, o, target));
                }
                DeltaOperation::Replace => {
                    replaceable.insert(Quad::new(s, p, o, target));
                }
                DeltaOperation::Remove => {
                    let pattern = QuadPattern::new(Some(s), Some(p), None, marker.graph);
                    removable.extend(store.match_quads(&pattern, false));
                }
                DeltaOperation::Purge => {
                    let pattern = QuadPattern::new(Some(s), None, None, marker.graph);
                    removable.extend(store.match_quads(&pattern, false));
                }
                DeltaOperation::Slice => {
                    let pattern = QuadPattern::new(Some(s), Some(p), Some(o), marker.graph);
                    removable.extend(store.match_quads(&pattern, false));
                }
            }
        }

        let buckets = DeltaBuckets {
            addable: addable.into_iter().collect(),
            replaceable: replaceable.into_iter().collect(),
            removable: removable.into_iter().collect(),
        };
        debug!(
            addable = buckets.addable.len(),
            replaceable = buckets.replaceable.len(),
            removable = buckets.removable.len(),
            skipped,
            "classified delta"
        );
        (buckets, skipped)
    }

    /// Commit classified buckets to `store`
    pub fn apply(&self, store: &mut Store, buckets: &DeltaBuckets) -> DeltaSummary {
        let mut summary = DeltaSummary::default();

        for quad in &buckets.removable {
            if store.remove(quad).is_ok() {
                summary.removed.push(quad.clone());
            }
        }

        let mut cleared: IndexSet<(&Term, &Term, &Term)> = IndexSet::new();
        for quad in &buckets.replaceable {
            if cleared.insert((&quad.subject, &quad.predicate, &quad.graph)) {
                let pattern = QuadPattern::new(
                    Some(quad.subject.clone()),
                    Some(quad.predicate.clone()),
                    None,
                    Some(quad.graph.clone()),
                );
                summary.removed.extend(store.remove_matches(&pattern));
            }
        }

        for quad in buckets.replaceable.iter().chain(&buckets.addable) {
            if store.add(quad) {
                summary.added.push(quad.clone());
            }
        }

        // a replaced value identical to the old one did not change
        if !buckets.replaceable.is_empty() {
            let added: IndexSet<&Quad> = summary.added.iter().collect();
            let removed: IndexSet<&Quad> = summary.removed.iter().collect();
            let unchanged: IndexSet<Quad> = added
                .intersection(&removed)
                .map(|q| (*q).clone())
                .collect();
            summary.added.retain(|q| !unchanged.contains(q));
            summary.removed.retain(|q| !unchanged.contains(q));
        }

        debug!(
            added = summary.added.len(),
            removed = summary.removed.len(),
            "applied delta"
        );
        summary
    }

    /// Classify and apply in one step
    pub fn process(&self, store: &mut Store, delta: &[Quad]) -> (DeltaBuckets, DeltaSummary) {
        let (buckets, skipped) = self.classify(store, delta);
        let mut summary = self.apply(store, &buckets);
        summary.skipped = skipped;
        (buckets, summary)
    }
}
