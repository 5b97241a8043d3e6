//! Derived operations composed from the core container API
//!
//! Set algebra, concatenation, search, and counting. Everything here works
//! through the container's public surface (enumeration, `set`, `push`); no
//! operation in this module touches a storage region directly.
//!
//! For the set operations the integer key space is treated as a sequence of
//! values (duplicates matter, keys do not) while the random region is
//! treated as a set of pairs (both key and value must match for two entries
//! to be considered equal).

use crate::iter::Scope;
use crate::key::Key;
use crate::map::HybridMap;
use rand::seq::SliceRandom;
use std::fmt::Display;
use std::hash::Hash;
use std::ops::{Add, BitAnd, BitOr, Sub};

impl<K, V> HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    /// Values of both containers with duplicates removed (this container's
    /// first), plus both random regions with the other side winning on key
    /// collision
    pub fn union(&self, other: &Self) -> Self {
        let mut values: Vec<V> = Vec::new();
        for value in self.values(Scope::Ints).into_iter().chain(other.values(Scope::Ints)) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        let mut out = self.new_similar();
        out.push(values);
        for (key, value) in self.random_entries() {
            out.put_name(key, value);
        }
        for (key, value) in other.random_entries() {
            out.put_name(key, value);
        }
        out
    }

    /// This container's distinct values that also occur in `other`, plus the
    /// random pairs equal in both
    pub fn intersection(&self, other: &Self) -> Self {
        let other_values = other.values(Scope::Ints);
        let mut values: Vec<V> = Vec::new();
        for value in self.values(Scope::Ints) {
            if other_values.contains(&value) && !values.contains(&value) {
                values.push(value);
            }
        }
        let mut out = self.new_similar();
        out.push(values);
        let other_random = other.random_entries();
        for (key, value) in self.random_entries() {
            if other_random.get(&key) == Some(&value) {
                out.put_name(key, value);
            }
        }
        out
    }

    /// This container's values that do not occur in `other` (duplicates
    /// kept), plus the random pairs not equal in `other`
    pub fn difference(&self, other: &Self) -> Self {
        let other_values = other.values(Scope::Ints);
        let values: Vec<V> = self
            .values(Scope::Ints)
            .into_iter()
            .filter(|value| !other_values.contains(value))
            .collect();
        let mut out = self.new_similar();
        out.push(values);
        let other_random = other.random_entries();
        for (key, value) in self.random_entries() {
            if other_random.get(&key) != Some(&value) {
                out.put_name(key, value);
            }
        }
        out
    }

    /// Key of the first entry equal to `value`, integer keys before random
    pub fn key_of(&self, value: &V) -> Option<Key<K>> {
        self.iter_scope(Scope::All)
            .find(|(_, stored)| *stored == value)
            .map(|(key, _)| key)
    }

    /// Lowest integer key holding `value`
    pub fn position(&self, value: &V) -> Option<i64> {
        self.int_pairs()
            .find(|(_, stored)| *stored == value)
            .map(|(key, _)| key)
    }

    /// Highest integer key holding `value`
    pub fn rposition(&self, value: &V) -> Option<i64> {
        self.int_pairs()
            .filter(|(_, stored)| *stored == value)
            .last()
            .map(|(key, _)| key)
    }

    /// True if any entry in any region equals `value`
    pub fn contains_value(&self, value: &V) -> bool {
        self.iter_scope(Scope::All).any(|(_, stored)| stored == value)
    }

    /// Number of entries in `scope` equal to `value`
    pub fn count_value(&self, scope: Scope, value: &V) -> usize {
        self.iter_scope(scope)
            .filter(|(_, stored)| *stored == value)
            .count()
    }
}

impl<K, V> HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Lowest integer key whose value matches `pred`
    pub fn position_by<F>(&self, mut pred: F) -> Option<i64>
    where
        F: FnMut(&V) -> bool,
    {
        self.int_pairs()
            .find(|(_, value)| pred(value))
            .map(|(key, _)| key)
    }

    /// Number of entries in `scope` matching `pred`
    pub fn count_by<F>(&self, scope: Scope, mut pred: F) -> usize
    where
        F: FnMut(&Key<K>, &V) -> bool,
    {
        self.iter_scope(scope)
            .filter(|(key, value)| pred(key, value))
            .count()
    }

    /// First integer-keyed value
    pub fn first(&self) -> Option<V> {
        self.int_pairs().next().map(|(_, value)| value.clone())
    }

    /// Last integer-keyed value
    pub fn last(&self) -> Option<V> {
        self.int_pairs().last().map(|(_, value)| value.clone())
    }

    /// Up to `count` leading integer-keyed values in ascending key order
    pub fn first_n(&self, count: usize) -> Vec<V> {
        self.int_pairs()
            .take(count)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Up to `count` trailing integer-keyed values in ascending key order
    pub fn last_n(&self, count: usize) -> Vec<V> {
        let values = self.values(Scope::Ints);
        let skip = values.len().saturating_sub(count);
        values[skip..].to_vec()
    }

    /// Look up several keys at once; each slot holds the stored value or the
    /// configured default
    pub fn values_at<I>(&self, keys: I) -> crate::error::Result<Vec<Option<V>>>
    where
        I: IntoIterator<Item = Key<K>>,
    {
        keys.into_iter()
            .map(|key| self.get_or_default(key))
            .collect()
    }

    /// Look up several keys at once, returning only the pairs found
    pub fn pairs_at<I>(&self, keys: I) -> crate::error::Result<Vec<(Key<K>, V)>>
    where
        I: IntoIterator<Item = Key<K>>,
    {
        let mut out = Vec::new();
        for key in keys {
            if let Some(value) = self.stored(&key)? {
                out.push((key, value.clone()));
            }
        }
        Ok(out)
    }

    /// A new container holding the entries matching `pred`, keys preserved
    pub fn select<F>(&self, mut pred: F) -> Self
    where
        F: FnMut(&Key<K>, &V) -> bool,
    {
        let mut out = self.new_similar();
        for (key, value) in self.iter_scope(Scope::All) {
            if pred(&key, value) {
                match key {
                    Key::Index(index) => out.set_effective(index, value.clone()),
                    Key::Name(name) => out.put_name(name, value.clone()),
                }
            }
        }
        out
    }

    /// A uniformly random integer-keyed value, `None` when there are none
    pub fn sample(&self) -> Option<V> {
        let values = self.values(Scope::Ints);
        values.choose(&mut rand::thread_rng()).cloned()
    }

    /// Pair the integer-keyed values with `other` positionally; the result
    /// is as long as this container's integer region, with `None` past the
    /// end of `other`
    pub fn zip<T: Clone>(&self, other: &[T]) -> Vec<(V, Option<T>)> {
        self.int_pairs()
            .enumerate()
            .map(|(position, (_, value))| (value.clone(), other.get(position).cloned()))
            .collect()
    }

    /// Append `other`'s integer-keyed values (in key order) at this
    /// container's `next_key`, then copy its random region over ours
    pub fn concat(&mut self, other: &Self) {
        self.push(other.values(Scope::Ints));
        for (key, value) in other.random_entries() {
            self.put_name(key, value);
        }
    }

    /// Join the integer-keyed values into a string
    pub fn join(&self, separator: &str) -> String
    where
        V: Display,
    {
        self.values(Scope::Ints)
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl<K, V> BitOr for &HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    type Output = HybridMap<K, V>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl<K, V> BitAnd for &HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    type Output = HybridMap<K, V>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl<K, V> Sub for &HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    type Output = HybridMap<K, V>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.difference(rhs)
    }
}

impl<K, V> Add for &HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Output = HybridMap<K, V>;

    fn add(self, rhs: Self) -> Self::Output {
        let mut out = self.clone();
        out.concat(rhs);
        out
    }
}
