//! Union-find over opaque identifiers
//!
//! Path compression on `find`, union by rank. Read-only lookups go through
//! `canonical`, which walks the parent chain without compressing it.

use rustc_hash::FxHashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct EquivalenceSet<T> {
    /// element → parent (self if root)
    parent: FxHashMap<T, T>,
    rank: FxHashMap<T, u8>,
}

impl<T> Default for EquivalenceSet<T> {
    fn default() -> Self {
        Self {
            parent: FxHashMap::default(),
            rank: FxHashMap::default(),
        }
    }
}

impl<T: Clone + Eq + Hash> EquivalenceSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, x: &T) {
        if !self.parent.contains_key(x) {
            self.parent.insert(x.clone(), x.clone());
            self.rank.insert(x.clone(), 0);
        }
    }

    /// Representative of `x`'s class, compressing the path on the way
    pub fn find(&mut self, x: &T) -> T {
        self.ensure(x);

        let mut root = x.clone();
        while self.parent[&root] != root {
            root = self.parent[&root].clone();
        }

        let mut current = x.clone();
        while self.parent[&current] != root {
            let next = self.parent[&current].clone();
            self.parent.insert(current, root.clone());
            current = next;
        }

        root
    }

    /// Representative of `x` without mutating; unknown elements are their
    /// own representative
    pub fn canonical(&self, x: &T) -> T {
        let mut current = x;
        while let Some(parent) = self.parent.get(current) {
            if parent == current {
                break;
            }
            current = parent;
        }
        current.clone()
    }

    /// Merge the classes of `x` and `y`; `true` if they were distinct
    pub fn union(&mut self, x: &T, y: &T) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }

        let rank_x = self.rank[&root_x];
        let rank_y = self.rank[&root_y];
        if rank_x < rank_y {
            self.parent.insert(root_x, root_y);
        } else if rank_x > rank_y {
            self.parent.insert(root_y, root_x);
        } else {
            self.parent.insert(root_y, root_x.clone());
            self.rank.insert(root_x, rank_x + 1);
        }
        true
    }

    pub fn same(&self, x: &T, y: &T) -> bool {
        x == y || self.canonical(x) == self.canonical(y)
    }

    /// Every member of `x`'s class, `x` included
    pub fn all_equals(&self, x: &T) -> Vec<T> {
        let root = self.canonical(x);
        let mut members: Vec<T> = self
            .parent
            .keys()
            .filter(|k| self.canonical(k) == root)
            .cloned()
            .collect();
        if !members.contains(x) {
            members.push(x.clone());
        }
        members
    }

    /// Number of tracked elements
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.iter().all(|(k, v)| k == v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_find() {
        let mut set = EquivalenceSet::new();
        assert!(set.union(&"a", &"b"));
        assert!(set.union(&"b", &"c"));
        assert!(!set.union(&"a", &"c"));

        assert_eq!(set.find(&"a"), set.find(&"c"));
        assert!(set.same(&"a", &"c"));
        assert!(!set.same(&"a", &"d"));
    }

    #[test]
    fn test_all_equals() {
        let mut set = EquivalenceSet::new();
        set.union(&1, &2);
        set.union(&3, &4);
        set.union(&2, &4);
        set.union(&5, &6);

        let mut class = set.all_equals(&4);
        class.sort();
        assert_eq!(class, vec![1, 2, 3, 4]);
        assert_eq!(set.all_equals(&9), vec![9]);
    }

    #[test]
    fn test_empty() {
        let mut set: EquivalenceSet<&str> = EquivalenceSet::new();
        assert!(set.is_empty());
        set.find(&"x");
        assert!(set.is_empty());
        set.union(&"x", &"y");
        assert!(!set.is_empty());
    }
}
