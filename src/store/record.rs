//! Record store: record id → field map
//!
//! Fields hold either a single term or an ordered, deduplicated multimap of
//! terms. Every mutation updates the record's journal entry and notifies
//! the on-change listener with the affected document id.

use super::journal::{RecordJournal, RecordState, RecordStatus};
use crate::rdf::namespace::{rdf, rdfs};
use crate::rdf::Term;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::trace;

/// Value of a record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(Term),
    Multiple(Vec<Term>),
}

impl FieldValue {
    /// All values as a slice
    pub fn values(&self) -> &[Term] {
        match self {
            FieldValue::Single(term) => std::slice::from_ref(term),
            FieldValue::Multiple(terms) => terms,
        }
    }

    pub fn contains(&self, term: &Term) -> bool {
        self.values().contains(term)
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn into_vec(self) -> Vec<Term> {
        match self {
            FieldValue::Single(term) => vec![term],
            FieldValue::Multiple(terms) => terms,
        }
    }

    /// First value, if any
    pub fn first(&self) -> Option<&Term> {
        self.values().first()
    }

    /// Build from a list, deduplicating and collapsing singletons
    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> Option<Self> {
        let mut unique: Vec<Term> = Vec::new();
        for term in terms {
            if !unique.contains(&term) {
                unique.push(term);
            }
        }
        match unique.len() {
            0 => None,
            1 => unique.pop().map(FieldValue::Single),
            _ => Some(FieldValue::Multiple(unique)),
        }
    }

    /// Merge `term` in, returning whether it was new
    fn merge(&mut self, term: Term) -> bool {
        if self.contains(&term) {
            return false;
        }
        match self {
            FieldValue::Single(existing) => {
                *self = FieldValue::Multiple(vec![existing.clone(), term]);
            }
            FieldValue::Multiple(terms) => terms.push(term),
        }
        true
    }

    /// Remove `term`; `None` when the field became empty
    fn without(self, term: &Term) -> Option<Self> {
        FieldValue::from_terms(self.into_vec().into_iter().filter(|t| t != term))
    }
}

impl From<Term> for FieldValue {
    fn from(term: Term) -> Self {
        FieldValue::Single(term)
    }
}

/// A record: its id plus its fields in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    pub id: Term,
    pub fields: IndexMap<Term, FieldValue>,
}

impl DataRecord {
    fn new(id: Term) -> Self {
        Self {
            id,
            fields: IndexMap::new(),
        }
    }
}

/// Position of an ordinal member field; `None` for `rdf:_x` style fields
/// whose suffix is not a number.
fn ordinal_position(field: &Term) -> Option<Option<u64>> {
    let suffix = field.as_iri()?.strip_prefix(rdf::ORDINAL_PREFIX)?;
    Some(suffix.parse::<u64>().ok())
}

pub type ChangeListener = Box<dyn FnMut(&str) + Send>;

/// Primary record storage with alias resolution
#[derive(Default)]
pub struct RecordStore {
    records: FxHashMap<Term, DataRecord>,
    aliases: FxHashMap<Term, Term>,
    journal: RecordJournal,
    on_change: Option<ChangeListener>,
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("records", &self.records.len())
            .field("aliases", &self.aliases.len())
            .field("journal", &self.journal.len())
            .finish()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the listener called with the document id of every change
    pub fn set_on_change(&mut self, listener: impl FnMut(&str) + Send + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    /// Follow the alias chain of `id` to its fixed point
    pub fn primary(&self, id: &Term) -> Term {
        let mut current = id;
        let mut hops = 0;
        while let Some(next) = self.aliases.get(current) {
            current = next;
            hops += 1;
            if hops > self.aliases.len() {
                break;
            }
        }
        current.clone()
    }

    fn changed(&mut self, id: &Term, state: RecordState) {
        let doc = id.document_id();
        self.journal.transition(&doc, state);
        if let Some(listener) = self.on_change.as_mut() {
            listener(&doc);
        }
    }

    pub fn get_record(&self, id: &Term) -> Option<&DataRecord> {
        self.records.get(&self.primary(id))
    }

    pub fn contains_record(&self, id: &Term) -> bool {
        self.get_record(id).is_some()
    }

    /// Read a field; `rdfs:member` materializes the ordinal fields in order
    pub fn get_field(&self, id: &Term, field: &Term) -> Option<FieldValue> {
        let record = self.get_record(id)?;
        if field.is_iri(rdfs::MEMBER) {
            return Self::members(record);
        }
        record.fields.get(field).cloned()
    }

    fn members(record: &DataRecord) -> Option<FieldValue> {
        let mut ordinals: Vec<(Option<u64>, &FieldValue)> = record
            .fields
            .iter()
            .filter_map(|(field, value)| ordinal_position(field).map(|pos| (pos, value)))
            .collect();
        // stable: equal keys keep insertion order
        ordinals.sort_by_key(|(pos, _)| (pos.is_none(), pos.unwrap_or(0)));

        let explicit = record
            .fields
            .iter()
            .find(|(field, _)| field.is_iri(rdfs::MEMBER))
            .map(|(_, value)| value);

        FieldValue::from_terms(
            ordinals
                .into_iter()
                .map(|(_, value)| value)
                .chain(explicit)
                .flat_map(|value| value.values().iter().cloned()),
        )
    }

    /// Replace the whole value of a field
    pub fn set_field(&mut self, id: &Term, field: Term, value: FieldValue) {
        let id = self.primary(id);
        let value = FieldValue::from_terms(value.into_vec());
        let record = self
            .records
            .entry(id.clone())
            .or_insert_with(|| DataRecord::new(id.clone()));
        match value {
            Some(value) => {
                record.fields.insert(field, value);
            }
            None => {
                record.fields.shift_remove(&field);
            }
        }
        self.changed(&id, RecordState::Present);
    }

    /// Merge a value into a field, returning whether it was new
    pub fn add_field(&mut self, id: &Term, field: Term, value: Term) -> bool {
        let id = self.primary(id);
        let record = self
            .records
            .entry(id.clone())
            .or_insert_with(|| DataRecord::new(id.clone()));
        let added = match record.fields.get_mut(&field) {
            Some(existing) => existing.merge(value),
            None => {
                record.fields.insert(field, FieldValue::Single(value));
                true
            }
        };
        if added {
            self.changed(&id, RecordState::Present);
        }
        added
    }

    /// Drop a field entirely
    pub fn delete_field(&mut self, id: &Term, field: &Term) -> Option<FieldValue> {
        let id = self.primary(id);
        let removed = self.records.get_mut(&id)?.fields.shift_remove(field);
        if removed.is_some() {
            self.changed(&id, RecordState::Present);
        }
        removed
    }

    /// Remove a single value from a field, returning whether it was present
    pub fn delete_field_matching(&mut self, id: &Term, field: &Term, value: &Term) -> bool {
        let id = self.primary(id);
        let Some(record) = self.records.get_mut(&id) else {
            return false;
        };
        let Some(existing) = record.fields.get(field) else {
            return false;
        };
        if !existing.contains(value) {
            return false;
        }
        let remaining = existing.clone().without(value);
        match remaining {
            Some(rest) => {
                record.fields.insert(field.clone(), rest);
            }
            None => {
                record.fields.shift_remove(field);
            }
        }
        self.changed(&id, RecordState::Present);
        true
    }

    /// Clear a record and mark its document absent; journal history stays
    pub fn delete_record(&mut self, id: &Term) -> Option<DataRecord> {
        let id = self.primary(id);
        let removed = self.records.remove(&id);
        self.changed(&id, RecordState::Absent);
        removed
    }

    /// Merge `previous` into `current` and make `previous` an alias of it.
    ///
    /// Aliasing a record to itself, or in a way that would close a cycle,
    /// does nothing.
    pub fn with_alias(&mut self, previous: &Term, current: &Term) {
        let from = self.primary(previous);
        let to = self.primary(current);
        if from == to {
            return;
        }
        trace!(from = %from, to = %to, "aliasing record");

        if let Some(old) = self.records.remove(&from) {
            let target = self
                .records
                .entry(to.clone())
                .or_insert_with(|| DataRecord::new(to.clone()));
            for (field, value) in old.fields {
                match target.fields.get_mut(&field) {
                    Some(existing) => {
                        for term in value.into_vec() {
                            existing.merge(term);
                        }
                    }
                    None => {
                        target.fields.insert(field, value);
                    }
                }
            }
        }

        self.journal.copy(&from.document_id(), &to.document_id());
        for target in self.aliases.values_mut() {
            if *target == from {
                *target = to.clone();
            }
        }
        self.aliases.insert(from, to.clone());
        self.changed(&to, RecordState::Present);
    }

    /// Flag a document as being fetched
    pub fn mark_receiving(&mut self, id: &Term) {
        let id = self.primary(id);
        self.changed(&id, RecordState::Receiving);
    }

    /// Journal status for the document `id` belongs to
    pub fn status(&self, id: &Term) -> RecordStatus {
        self.journal.get(&self.primary(id).document_id())
    }

    pub fn journal(&self) -> &RecordJournal {
        &self.journal
    }

    pub fn all_records(&self) -> impl Iterator<Item = &DataRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
