//! Store facade
//!
//! Composes the index, the identity layer and the record store behind a
//! single API and keeps them in lock-step: every fact written to the index
//! is mirrored as a record field, every removal clears the field value once
//! no graph holds the statement any more.

use super::identity::{IdentityLayer, Merge};
use super::index::IndexLayer;
use super::journal::RecordStatus;
use super::record::{DataRecord, FieldValue, RecordStore};
use crate::rdf::namespace::owl;
use crate::rdf::{Quad, QuadPattern, Term};
use thiserror::Error;
use tracing::debug;

/// Store errors
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    /// Quad not found
    #[error("Quad not found: {0}")]
    QuadNotFound(String),

    /// Literals cannot identify records
    #[error("Invalid record id: {0}")]
    InvalidRecordId(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Indexed quad store with identity canonicalization and record view
#[derive(Debug, Default)]
pub struct Store {
    index: IndexLayer,
    identity: IdentityLayer,
    records: RecordStore,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact, returning whether it was new.
    ///
    /// An `owl:sameAs` statement between two nodes merges them first.
    pub fn add(&mut self, quad: &Quad) -> bool {
        if quad.predicate.is_iri(owl::SAME_AS) && quad.subject.is_node() && quad.object.is_node()
        {
            self.equate(&quad.subject, &quad.object);
        }
        let quad = self.identity.canonicalize(quad);
        if !self.index.add(&quad) {
            return false;
        }
        if quad.subject.is_node() {
            self.records
                .add_field(&quad.subject, quad.predicate.clone(), quad.object.clone());
        }
        true
    }

    /// Insert many facts, returning the ones that were new
    pub fn add_all<'a>(&mut self, quads: impl IntoIterator<Item = &'a Quad>) -> Vec<Quad> {
        let mut added = Vec::new();
        for quad in quads {
            if self.add(quad) {
                added.push(self.identity.canonicalize(quad));
            }
        }
        added
    }

    /// Remove a fact that must exist
    pub fn remove(&mut self, quad: &Quad) -> StoreResult<()> {
        let quad = self.identity.canonicalize(quad);
        if !self.index.remove_quad(&quad) {
            return Err(StoreError::QuadNotFound(quad.to_string()));
        }
        self.unmirror(&quad);
        Ok(())
    }

    /// Remove every fact matching `pattern`, returning what was removed
    pub fn remove_matches(&mut self, pattern: &QuadPattern) -> Vec<Quad> {
        let removed = self.match_quads(pattern, false);
        for quad in &removed {
            if self.index.remove_quad(quad) {
                self.unmirror(quad);
            }
        }
        removed
    }

    fn unmirror(&mut self, quad: &Quad) {
        if !quad.subject.is_node() {
            return;
        }
        let still_held = !self
            .index
            .match_pattern(
                &QuadPattern::new(
                    Some(quad.subject.clone()),
                    Some(quad.predicate.clone()),
                    Some(quad.object.clone()),
                    None,
                ),
                true,
            )
            .is_empty();
        if !still_held {
            self.records
                .delete_field_matching(&quad.subject, &quad.predicate, &quad.object);
        }
    }

    /// Facts matching `pattern`, after canonicalizing its terms
    pub fn match_quads(&self, pattern: &QuadPattern, just_one: bool) -> Vec<Quad> {
        self.index
            .match_pattern(&self.identity.canonicalize_pattern(pattern), just_one)
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.index.contains(&self.identity.canonicalize(quad))
    }

    /// Merge two identifiers in the index and the record store
    pub fn equate(&mut self, a: &Term, b: &Term) -> Option<Merge> {
        let merge = self.identity.equate(&mut self.index, a, b)?;
        self.remirror(&merge);
        Some(merge)
    }

    /// Make `previous` an alias of `current`, moving its data over
    pub fn with_alias(&mut self, previous: &Term, current: &Term) -> Option<Merge> {
        let merge = self.identity.alias(&mut self.index, previous, current)?;
        self.remirror(&merge);
        Some(merge)
    }

    /// Bring records in line with the facts a merge rewrote.
    ///
    /// The merged record itself moves through the alias; fields naming the
    /// merged term as value or field id are rewritten one fact at a time.
    fn remirror(&mut self, merge: &Merge) {
        self.records.with_alias(&merge.from, &merge.to);
        for (old, new) in &merge.rewritten {
            if old.predicate == new.predicate && old.object == new.object {
                continue;
            }
            if old.subject.is_node() {
                self.records
                    .delete_field_matching(&old.subject, &old.predicate, &old.object);
            }
            if new.subject.is_node() {
                self.records
                    .add_field(&new.subject, new.predicate.clone(), new.object.clone());
            }
        }
    }

    /// Canonical id for a record
    pub fn primary(&self, id: &Term) -> Term {
        self.records.primary(&self.identity.canonical(id))
    }

    pub fn canonical(&self, term: &Term) -> Term {
        self.identity.canonical(term)
    }

    pub fn all_equals(&self, term: &Term) -> Vec<Term> {
        self.identity.all_equals(term)
    }

    pub fn get_record(&self, id: &Term) -> Option<&DataRecord> {
        self.records.get_record(&self.identity.canonical(id))
    }

    pub fn get_field(&self, id: &Term, field: &Term) -> Option<FieldValue> {
        self.records
            .get_field(&self.identity.canonical(id), &self.identity.canonical(field))
    }

    /// Replace a field's value in the default graph
    pub fn set_field(&mut self, id: &Term, field: &Term, value: FieldValue) -> StoreResult<()> {
        self.check_id(id)?;
        self.delete_field(id, field);
        for term in value.into_vec() {
            self.add(&Quad::triple(id.clone(), field.clone(), term));
        }
        Ok(())
    }

    /// Add a value to a field in the default graph
    pub fn add_field(&mut self, id: &Term, field: &Term, value: Term) -> StoreResult<bool> {
        self.check_id(id)?;
        Ok(self.add(&Quad::triple(id.clone(), field.clone(), value)))
    }

    /// Remove a field in every graph
    pub fn delete_field(&mut self, id: &Term, field: &Term) -> Vec<Quad> {
        self.remove_matches(
            &QuadPattern::any()
                .with_subject(id.clone())
                .with_predicate(field.clone()),
        )
    }

    /// Remove one value of a field in every graph
    pub fn delete_field_matching(&mut self, id: &Term, field: &Term, value: &Term) -> Vec<Quad> {
        self.remove_matches(
            &QuadPattern::any()
                .with_subject(id.clone())
                .with_predicate(field.clone())
                .with_object(value.clone()),
        )
    }

    /// Remove all data about a record and mark its document absent
    pub fn delete_record(&mut self, id: &Term) -> Vec<Quad> {
        let removed = self.remove_matches(&QuadPattern::any().with_subject(id.clone()));
        self.records.delete_record(&self.identity.canonical(id));
        debug!(id = %id, removed = removed.len(), "deleted record");
        removed
    }

    fn check_id(&self, id: &Term) -> StoreResult<()> {
        if id.is_literal() {
            return Err(StoreError::InvalidRecordId(id.to_string()));
        }
        Ok(())
    }

    pub fn mark_receiving(&mut self, id: &Term) {
        let id = self.identity.canonical(id);
        self.records.mark_receiving(&id);
    }

    pub fn status(&self, id: &Term) -> RecordStatus {
        self.records.status(&self.identity.canonical(id))
    }

    /// Register the listener called with the document id of every change
    pub fn set_on_change(&mut self, listener: impl FnMut(&str) + Send + 'static) {
        self.records.set_on_change(listener);
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn index(&self) -> &IndexLayer {
        &self.index
    }

    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        self.index.quads()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
