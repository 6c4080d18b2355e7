//! Term canonicalization for equated identifiers
//!
//! When two terms are declared the same, the larger one (by term order) is
//! replaced by the smaller one in every index, and all reads and writes are
//! routed through the resulting redirect table.

use super::index::IndexLayer;
use crate::rdf::{Quad, QuadPattern, Term};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Outcome of a merge: `from` now resolves to `to`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub from: Term,
    pub to: Term,
    /// Facts rewritten in the index, as `(old, new)` pairs
    pub rewritten: Vec<(Quad, Quad)>,
}

/// Redirect table from merged terms to their canonical term
#[derive(Debug, Default, Clone)]
pub struct IdentityLayer {
    redirections: FxHashMap<Term, Term>,
    /// canonical term → terms that resolve to it
    aliases: FxHashMap<Term, Vec<Term>>,
}

impl IdentityLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical representative of `term`
    pub fn canonical(&self, term: &Term) -> Term {
        let mut current = term;
        let mut hops = 0;
        while let Some(next) = self.redirections.get(current) {
            current = next;
            hops += 1;
            if hops > self.redirections.len() {
                break;
            }
        }
        current.clone()
    }

    pub fn canonicalize(&self, quad: &Quad) -> Quad {
        if self.redirections.is_empty() {
            return quad.clone();
        }
        Quad::new(
            self.canonical(&quad.subject),
            self.canonical(&quad.predicate),
            self.canonical(&quad.object),
            self.canonical(&quad.graph),
        )
    }

    pub fn canonicalize_pattern(&self, pattern: &QuadPattern) -> QuadPattern {
        if self.redirections.is_empty() {
            return pattern.clone();
        }
        let canon = |term: &Option<Term>| term.as_ref().map(|t| self.canonical(t));
        QuadPattern::new(
            canon(&pattern.subject),
            canon(&pattern.predicate),
            canon(&pattern.object),
            canon(&pattern.graph),
        )
    }

    /// Declare `a` and `b` the same; the smaller term survives.
    ///
    /// Returns `None` when they already resolve to the same term or when
    /// either side is a literal.
    pub fn equate(&mut self, index: &mut IndexLayer, a: &Term, b: &Term) -> Option<Merge> {
        let a = self.canonical(a);
        let b = self.canonical(b);
        if a == b {
            return None;
        }
        if a.is_literal() || b.is_literal() {
            warn!(a = %a, b = %b, "ignoring equivalence involving a literal");
            return None;
        }
        let (small, big) = if a < b { (a, b) } else { (b, a) };
        Some(self.redirect(index, big, small))
    }

    /// Make `from` resolve to `to` regardless of term order
    pub fn alias(&mut self, index: &mut IndexLayer, from: &Term, to: &Term) -> Option<Merge> {
        let from = self.canonical(from);
        let to = self.canonical(to);
        if from == to || from.is_literal() || to.is_literal() {
            return None;
        }
        Some(self.redirect(index, from, to))
    }

    fn redirect(&mut self, index: &mut IndexLayer, from: Term, to: Term) -> Merge {
        let rewritten = index.replace_term(&from, &to);

        let mut moved = self.aliases.remove(&from).unwrap_or_default();
        for alias in &moved {
            self.redirections.insert(alias.clone(), to.clone());
        }
        moved.push(from.clone());
        self.redirections.insert(from.clone(), to.clone());
        self.aliases.entry(to.clone()).or_default().extend(moved);

        debug!(from = %from, to = %to, migrated = rewritten.len(), "merged identifiers");
        Merge {
            from,
            to,
            rewritten,
        }
    }

    /// Every term known to resolve to the same canonical term as `term`
    pub fn all_equals(&self, term: &Term) -> Vec<Term> {
        let canonical = self.canonical(term);
        let mut all = vec![canonical.clone()];
        if let Some(aliases) = self.aliases.get(&canonical) {
            all.extend(aliases.iter().cloned());
        }
        all
    }

    pub fn is_empty(&self) -> bool {
        self.redirections.is_empty()
    }
}
