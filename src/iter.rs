//! Scoped enumeration over a hybrid container
//!
//! Every enumeration API takes a [`Scope`] selecting which storage regions
//! participate. Forward iteration over integer keys is in ascending key
//! order (the dense run, then sparse entries); the random region follows in
//! insertion order. Reverse iteration yields the random region first, then
//! sparse descending, then the dense run descending.
//!
//! The `keys`/`values`/`pairs` accessors and the per-region snapshots return
//! owned copies; mutating them never affects the container.

use crate::key::Key;
use crate::map::HybridMap;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::hash::Hash;

/// Selects which storage regions an operation applies to.
///
/// `Dense`, `Sparse`, and `Random` name single regions; `Ints` covers
/// dense + sparse, `NonDense` covers sparse + random, and `All` covers
/// everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// All three regions
    All,
    /// Dense and sparse regions (the integer key space)
    Ints,
    /// The dense region only
    Dense,
    /// The sparse region only
    Sparse,
    /// The random region only
    Random,
    /// Sparse and random regions
    NonDense,
}

impl<K, V> HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Integer-keyed entries in ascending key order.
    pub(crate) fn int_pairs(&self) -> impl Iterator<Item = (i64, &V)> + '_ {
        let start = self.dense_start();
        self.dense
            .iter()
            .enumerate()
            .map(move |(offset, value)| (start + offset as i64, value))
            .chain(self.sparse.iter().map(|(key, value)| (*key, value)))
    }

    fn dense_pairs(&self) -> impl DoubleEndedIterator<Item = (Key<K>, &V)> + '_ {
        let start = self.dense_start();
        self.dense
            .iter()
            .enumerate()
            .map(move |(offset, value)| (Key::Index(start + offset as i64), value))
    }

    fn sparse_pairs(&self) -> impl DoubleEndedIterator<Item = (Key<K>, &V)> + '_ {
        self.sparse
            .iter()
            .map(|(key, value)| (Key::Index(*key), value))
    }

    fn random_pairs(&self) -> impl DoubleEndedIterator<Item = (Key<K>, &V)> + '_ {
        self.random
            .iter()
            .map(|(key, value)| (Key::Name(key.clone()), value))
    }

    /// Iterate every entry: dense ascending, sparse ascending, then the
    /// random region in insertion order
    pub fn iter(&self) -> Box<dyn Iterator<Item = (Key<K>, &V)> + '_> {
        self.iter_scope(Scope::All)
    }

    /// Iterate the entries within `scope` in forward order
    pub fn iter_scope(&self, scope: Scope) -> Box<dyn Iterator<Item = (Key<K>, &V)> + '_> {
        match scope {
            Scope::All => Box::new(
                self.dense_pairs()
                    .chain(self.sparse_pairs())
                    .chain(self.random_pairs()),
            ),
            Scope::Ints => Box::new(self.dense_pairs().chain(self.sparse_pairs())),
            Scope::Dense => Box::new(self.dense_pairs()),
            Scope::Sparse => Box::new(self.sparse_pairs()),
            Scope::Random => Box::new(self.random_pairs()),
            Scope::NonDense => Box::new(self.sparse_pairs().chain(self.random_pairs())),
        }
    }

    /// Iterate the entries within `scope` in reverse order: random region
    /// first (reverse insertion order), then sparse keys descending, then
    /// the dense run descending
    pub fn iter_rev(&self, scope: Scope) -> Box<dyn Iterator<Item = (Key<K>, &V)> + '_> {
        match scope {
            Scope::All => Box::new(
                self.random_pairs()
                    .rev()
                    .chain(self.sparse_pairs().rev())
                    .chain(self.dense_pairs().rev()),
            ),
            Scope::Ints => Box::new(self.sparse_pairs().rev().chain(self.dense_pairs().rev())),
            Scope::Dense => Box::new(self.dense_pairs().rev()),
            Scope::Sparse => Box::new(self.sparse_pairs().rev()),
            Scope::Random => Box::new(self.random_pairs().rev()),
            Scope::NonDense => Box::new(self.random_pairs().rev().chain(self.sparse_pairs().rev())),
        }
    }

    /// The keys within `scope`, in forward iteration order (owned copy)
    pub fn keys(&self, scope: Scope) -> Vec<Key<K>> {
        self.iter_scope(scope).map(|(key, _)| key).collect()
    }

    /// The values within `scope`, in forward iteration order (owned copy)
    pub fn values(&self, scope: Scope) -> Vec<V> {
        self.iter_scope(scope).map(|(_, value)| value.clone()).collect()
    }

    /// The key/value pairs within `scope`, in forward iteration order
    /// (owned copy)
    pub fn pairs(&self, scope: Scope) -> Vec<(Key<K>, V)> {
        self.iter_scope(scope)
            .map(|(key, value)| (key, value.clone()))
            .collect()
    }

    /// Snapshot of the dense run in key order
    pub fn dense_values(&self) -> Vec<V> {
        self.dense.clone()
    }

    /// Snapshot of the sparse region
    pub fn sparse_entries(&self) -> BTreeMap<i64, V> {
        self.sparse.clone()
    }

    /// Snapshot of the random region in insertion order
    pub fn random_entries(&self) -> IndexMap<K, V> {
        self.random.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HybridMap<String, i32> {
        let mut map = HybridMap::new();
        map.push([1, 2]);
        map.set(5, 50).unwrap();
        map.set("a", 100).unwrap();
        map.set("b", 200).unwrap();
        map
    }

    #[test]
    fn test_forward_order() {
        let map = sample();
        let keys = map.keys(Scope::All);
        assert_eq!(
            keys,
            vec![
                Key::Index(0),
                Key::Index(1),
                Key::Index(5),
                Key::name("a".to_string()),
                Key::name("b".to_string()),
            ]
        );
        assert_eq!(map.values(Scope::Ints), vec![1, 2, 50]);
    }

    #[test]
    fn test_reverse_order() {
        let map = sample();
        let keys: Vec<_> = map.iter_rev(Scope::All).map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                Key::name("b".to_string()),
                Key::name("a".to_string()),
                Key::Index(5),
                Key::Index(1),
                Key::Index(0),
            ]
        );
        let ints: Vec<_> = map.iter_rev(Scope::Ints).map(|(_, v)| *v).collect();
        assert_eq!(ints, vec![50, 2, 1]);
    }

    #[test]
    fn test_scope_selection() {
        let map = sample();
        assert_eq!(map.values(Scope::Dense), vec![1, 2]);
        assert_eq!(map.values(Scope::Sparse), vec![50]);
        assert_eq!(map.values(Scope::Random), vec![100, 200]);
        assert_eq!(map.values(Scope::NonDense), vec![50, 100, 200]);
    }

    #[test]
    fn test_snapshots_are_copies() {
        let map = sample();
        let mut dense = map.dense_values();
        dense.push(999);
        assert_eq!(map.len_in(Scope::Dense), 2);
        let mut random = map.random_entries();
        random.insert("c".to_string(), 300);
        assert_eq!(map.len_in(Scope::Random), 2);
    }
}
