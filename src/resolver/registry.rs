//! Registration table: property → type → topology → handler

use crate::rdf::Term;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;

type ByTopology<H> = FxHashMap<Term, H>;
type ByType<H> = FxHashMap<Term, ByTopology<H>>;

#[derive(Debug, Clone)]
pub struct Registrations<H> {
    table: FxHashMap<Term, ByType<H>>,
    len: usize,
}

impl<H> Default for Registrations<H> {
    fn default() -> Self {
        Self {
            table: FxHashMap::default(),
            len: 0,
        }
    }
}

impl<H: Clone> Registrations<H> {
    /// Store `handler`, replacing any previous one for the same key
    pub fn insert(&mut self, property: Term, ty: Term, topology: Term, handler: H) {
        let previous = self
            .table
            .entry(property)
            .or_default()
            .entry(ty)
            .or_default()
            .insert(topology, handler);
        if previous.is_none() {
            self.len += 1;
        }
    }

    /// Ensure `property` has an entry, even without handlers
    pub fn reserve(&mut self, property: Term) {
        self.table.entry(property).or_default();
    }

    pub fn lookup(&self, property: &Term, ty: &Term, topology: &Term) -> Option<&H> {
        self.table.get(property)?.get(ty)?.get(topology)
    }

    /// Types registered under any of `properties` at `topology`
    pub fn types_at(&self, properties: &[Term], topology: &Term) -> IndexSet<Term> {
        let mut types = IndexSet::new();
        for property in properties {
            let Some(by_type) = self.table.get(property) else {
                continue;
            };
            for (ty, by_topology) in by_type {
                if by_topology.contains_key(topology) {
                    types.insert(ty.clone());
                }
            }
        }
        types
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://example.org/{}", s))
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = Registrations::default();
        table.insert(iri("p"), iri("T"), iri("default"), 1);
        table.insert(iri("p"), iri("T"), iri("default"), 2);
        table.insert(iri("p"), iri("U"), iri("card"), 3);

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(&iri("p"), &iri("T"), &iri("default")), Some(&2));
        assert_eq!(table.lookup(&iri("p"), &iri("U"), &iri("default")), None);

        let at_card = table.types_at(&[iri("p")], &iri("card"));
        assert_eq!(at_card.into_iter().collect::<Vec<_>>(), vec![iri("U")]);
    }
}
