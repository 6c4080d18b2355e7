//! Positional quad indices
//!
//! Terms are interned into numeric ids. Four indices (subject, predicate,
//! object, graph) map a term id to the facts holding it in that position,
//! next to a flat fact set used for wildcard scans and existence checks.

use crate::rdf::{Quad, QuadPattern, Term};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;

/// Numeric id of an interned term
pub type TermId = u32;

/// A fact as interned ids: subject, predicate, object, graph
pub type QuadKey = [TermId; 4];

const POSITIONS: usize = 4;

/// Term ↔ id interning table
#[derive(Debug, Default, Clone)]
pub struct TermTable {
    terms: IndexSet<Term>,
}

impl TermTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `term`, interning it on first sight
    pub fn intern(&mut self, term: &Term) -> TermId {
        if let Some(id) = self.terms.get_index_of(term) {
            return id as TermId;
        }
        self.terms.insert_full(term.clone()).0 as TermId
    }

    /// Id for `term` if it was ever interned
    pub fn lookup(&self, term: &Term) -> Option<TermId> {
        self.terms.get_index_of(term).map(|id| id as TermId)
    }

    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id as usize]
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Facts plus the four positional indices
#[derive(Debug, Default, Clone)]
pub struct IndexLayer {
    terms: TermTable,
    facts: IndexSet<QuadKey>,
    indices: [FxHashMap<TermId, Vec<QuadKey>>; POSITIONS],
}

impl IndexLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern_quad(&mut self, quad: &Quad) -> QuadKey {
        [
            self.terms.intern(&quad.subject),
            self.terms.intern(&quad.predicate),
            self.terms.intern(&quad.object),
            self.terms.intern(&quad.graph),
        ]
    }

    fn lookup_quad(&self, quad: &Quad) -> Option<QuadKey> {
        Some([
            self.terms.lookup(&quad.subject)?,
            self.terms.lookup(&quad.predicate)?,
            self.terms.lookup(&quad.object)?,
            self.terms.lookup(&quad.graph)?,
        ])
    }

    fn materialize(&self, key: &QuadKey) -> Quad {
        Quad::new(
            self.terms.term(key[0]).clone(),
            self.terms.term(key[1]).clone(),
            self.terms.term(key[2]).clone(),
            self.terms.term(key[3]).clone(),
        )
    }

    fn insert_key(&mut self, key: QuadKey) -> bool {
        if !self.facts.insert(key) {
            return false;
        }
        for (position, index) in self.indices.iter_mut().enumerate() {
            index.entry(key[position]).or_default().push(key);
        }
        true
    }

    fn remove_key(&mut self, key: &QuadKey) -> bool {
        if !self.facts.swap_remove(key) {
            return false;
        }
        for (position, index) in self.indices.iter_mut().enumerate() {
            if let Some(bucket) = index.get_mut(&key[position]) {
                if let Some(at) = bucket.iter().position(|k| k == key) {
                    bucket.swap_remove(at);
                }
                if bucket.is_empty() {
                    index.remove(&key[position]);
                }
            }
        }
        true
    }

    /// Insert a fact; a materially equal fact is not inserted twice
    pub fn add(&mut self, quad: &Quad) -> bool {
        let key = self.intern_quad(quad);
        self.insert_key(key)
    }

    /// Remove a fact from all indices; absent facts are ignored
    pub fn remove_quad(&mut self, quad: &Quad) -> bool {
        match self.lookup_quad(quad) {
            Some(key) => self.remove_key(&key),
            None => false,
        }
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.lookup_quad(quad)
            .map_or(false, |key| self.facts.contains(&key))
    }

    /// Facts matching `pattern`.
    ///
    /// With several bound positions the shortest bucket among them is
    /// scanned and filtered against the rest. `just_one` stops at the first
    /// hit.
    pub fn match_pattern(&self, pattern: &QuadPattern, just_one: bool) -> Vec<Quad> {
        let mut bound: Vec<(usize, TermId)> = Vec::with_capacity(POSITIONS);
        for (position, term) in pattern.positions().iter().enumerate() {
            if let Some(term) = term {
                match self.terms.lookup(term) {
                    Some(id) => bound.push((position, id)),
                    None => return Vec::new(),
                }
            }
        }

        let limit = if just_one { 1 } else { usize::MAX };

        if bound.is_empty() {
            return self
                .facts
                .iter()
                .take(limit)
                .map(|key| self.materialize(key))
                .collect();
        }

        let empty = Vec::new();
        let bucket_of = |(position, id): (usize, TermId)| {
            self.indices[position].get(&id).unwrap_or(&empty)
        };

        let (driver_at, driver) = bound
            .iter()
            .enumerate()
            .map(|(at, b)| (at, bucket_of(*b)))
            .min_by_key(|(_, bucket)| bucket.len())
            .unwrap_or((0, &empty));

        driver
            .iter()
            .filter(|key| {
                bound
                    .iter()
                    .enumerate()
                    .all(|(at, (position, id))| at == driver_at || key[*position] == *id)
            })
            .take(limit)
            .map(|key| self.materialize(key))
            .collect()
    }

    /// Rewrite every fact mentioning `from` so it mentions `to` instead.
    ///
    /// Facts that collapse onto an existing fact are merged. Returns each
    /// rewritten fact as an `(old, new)` pair.
    pub fn replace_term(&mut self, from: &Term, to: &Term) -> Vec<(Quad, Quad)> {
        let Some(from_id) = self.terms.lookup(from) else {
            return Vec::new();
        };
        let to_id = self.terms.intern(to);

        let mut affected: Vec<QuadKey> = Vec::new();
        for index in &self.indices {
            if let Some(bucket) = index.get(&from_id) {
                for key in bucket {
                    if !affected.contains(key) {
                        affected.push(*key);
                    }
                }
            }
        }

        let mut rewrites = Vec::with_capacity(affected.len());
        for key in &affected {
            self.remove_key(key);
            let rewritten = key.map(|id| if id == from_id { to_id } else { id });
            self.insert_key(rewritten);
            rewrites.push((self.materialize(key), self.materialize(&rewritten)));
        }
        rewrites
    }

    /// Every fact, in no particular order
    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        self.facts.iter().map(|key| self.materialize(key))
    }

    pub fn terms(&self) -> &TermTable {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://example.org/{}", s))
    }

    fn quad(s: &str, p: &str, o: &str) -> Quad {
        Quad::triple(iri(s), iri(p), iri(o))
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut index = IndexLayer::new();
        assert!(index.add(&quad("alice", "knows", "bob")));
        assert!(!index.add(&quad("alice", "knows", "bob")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_match_by_bound_positions() {
        let mut index = IndexLayer::new();
        index.add(&quad("alice", "knows", "bob"));
        index.add(&quad("alice", "knows", "carol"));
        index.add(&quad("bob", "knows", "carol"));
        index.add(&quad("alice", "likes", "carol"));

        assert_eq!(index.match_pattern(&QuadPattern::any(), false).len(), 4);
        assert_eq!(
            index
                .match_pattern(&QuadPattern::any().with_subject(iri("alice")), false)
                .len(),
            3
        );
        let hits = index.match_pattern(
            &QuadPattern::any()
                .with_subject(iri("alice"))
                .with_object(iri("carol")),
            false,
        );
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|q| q.subject == iri("alice") && q.object == iri("carol")));

        let one = index.match_pattern(&QuadPattern::any().with_predicate(iri("knows")), true);
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn test_unknown_term_matches_nothing() {
        let mut index = IndexLayer::new();
        index.add(&quad("alice", "knows", "bob"));
        let hits = index.match_pattern(&QuadPattern::any().with_subject(iri("nobody")), false);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_remove_quad() {
        let mut index = IndexLayer::new();
        let q = quad("alice", "knows", "bob");
        index.add(&q);
        assert!(index.remove_quad(&q));
        assert!(!index.remove_quad(&q));
        assert!(index.is_empty());
        assert!(index
            .match_pattern(&QuadPattern::any().with_subject(iri("alice")), false)
            .is_empty());
    }

    #[test]
    fn test_replace_term_merges_duplicates() {
        let mut index = IndexLayer::new();
        index.add(&quad("a", "knows", "carol"));
        index.add(&quad("b", "knows", "carol"));
        index.add(&quad("dave", "knows", "b"));

        assert_eq!(index.replace_term(&iri("b"), &iri("a")).len(), 2);
        assert_eq!(index.len(), 2);
        assert!(index.contains(&quad("a", "knows", "carol")));
        assert!(index.contains(&quad("dave", "knows", "a")));
        assert!(index
            .match_pattern(&QuadPattern::any().with_subject(iri("b")), false)
            .is_empty());
    }
}
