//! Bulk loading from external collections
//!
//! [`MergeSource`] is a capability probe: a source advertises positional
//! enumeration ([`by_position`](MergeSource::by_position)), pair enumeration
//! ([`by_pairs`](MergeSource::by_pairs)), or both, by overriding the
//! corresponding method. The bulk operations on
//! [`HybridMap`](crate::HybridMap) probe in a documented order and fail with
//! `InvalidArgument` when a source offers neither capability.
//!
//! Slices and `Vec<V>` are positional; the map types and pair vectors
//! enumerate pairs; a `HybridMap` used as a source enumerates pairs only, so
//! merging a container copies every entry under its original key (use
//! [`concat`](crate::HybridMap::concat) for positional appends of another
//! container's values).

use crate::error::{HybridError, Result};
use crate::iter::Scope;
use crate::key::{Key, NegativeMode};
use crate::map::HybridMap;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// A collection that can seed or extend a [`HybridMap`].
///
/// Implementors override at least one of the two probes; the defaults
/// report the capability as absent.
pub trait MergeSource<K, V> {
    /// Enumerate values by position, for sources with a natural order but
    /// no keys of their own
    fn by_position(&self) -> Option<Box<dyn Iterator<Item = &V> + '_>> {
        None
    }

    /// Enumerate explicit key/value pairs
    fn by_pairs(&self) -> Option<Box<dyn Iterator<Item = (Key<K>, &V)> + '_>> {
        None
    }
}

impl<K, V> MergeSource<K, V> for [V] {
    fn by_position(&self) -> Option<Box<dyn Iterator<Item = &V> + '_>> {
        Some(Box::new(self.iter()))
    }
}

impl<K, V> MergeSource<K, V> for Vec<V> {
    fn by_position(&self) -> Option<Box<dyn Iterator<Item = &V> + '_>> {
        Some(Box::new(self.iter()))
    }
}

impl<K, V, const N: usize> MergeSource<K, V> for [V; N] {
    fn by_position(&self) -> Option<Box<dyn Iterator<Item = &V> + '_>> {
        Some(Box::new(self.iter()))
    }
}

impl<K, V> MergeSource<K, V> for BTreeMap<i64, V> {
    fn by_pairs(&self) -> Option<Box<dyn Iterator<Item = (Key<K>, &V)> + '_>> {
        Some(Box::new(
            self.iter().map(|(key, value)| (Key::Index(*key), value)),
        ))
    }
}

impl<K, V> MergeSource<K, V> for HashMap<K, V>
where
    K: Hash + Eq + Clone,
{
    fn by_pairs(&self) -> Option<Box<dyn Iterator<Item = (Key<K>, &V)> + '_>> {
        Some(Box::new(
            self.iter()
                .map(|(key, value)| (Key::Name(key.clone()), value)),
        ))
    }
}

impl<K, V> MergeSource<K, V> for IndexMap<K, V>
where
    K: Hash + Eq + Clone,
{
    fn by_pairs(&self) -> Option<Box<dyn Iterator<Item = (Key<K>, &V)> + '_>> {
        Some(Box::new(
            self.iter()
                .map(|(key, value)| (Key::Name(key.clone()), value)),
        ))
    }
}

impl<K, V> MergeSource<K, V> for Vec<(Key<K>, V)>
where
    K: Clone,
{
    fn by_pairs(&self) -> Option<Box<dyn Iterator<Item = (Key<K>, &V)> + '_>> {
        Some(Box::new(
            self.iter().map(|(key, value)| (key.clone(), value)),
        ))
    }
}

impl<K, V> MergeSource<K, V> for HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn by_pairs(&self) -> Option<Box<dyn Iterator<Item = (Key<K>, &V)> + '_>> {
        Some(Box::new(self.iter_scope(Scope::All)))
    }
}

impl<K, V> HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Copy every entry of `source` into this container, preferring pair
    /// enumeration (positional sources load at indices 0, 1, ...). Later
    /// entries win on key collision.
    pub fn merge<S>(&mut self, source: &S) -> Result<()>
    where
        S: MergeSource<K, V> + ?Sized,
    {
        if let Some(pairs) = source.by_pairs() {
            for (key, value) in pairs {
                self.set(key, value.clone())?;
            }
            Ok(())
        } else if let Some(values) = source.by_position() {
            for (index, value) in values.enumerate() {
                self.set(index as i64, value.clone())?;
            }
            Ok(())
        } else {
            Err(HybridError::invalid_argument(
                "merge source offers neither positional nor pair enumeration",
            ))
        }
    }

    /// Add `source` at the back: positional sources push their values in
    /// order; pair sources fall back to [`merge`](Self::merge)
    pub fn append<S>(&mut self, source: &S) -> Result<()>
    where
        S: MergeSource<K, V> + ?Sized,
    {
        if let Some(values) = source.by_position() {
            let values: Vec<V> = values.cloned().collect();
            self.push(values);
            Ok(())
        } else if source.by_pairs().is_some() {
            self.merge(source)
        } else {
            Err(HybridError::invalid_argument(
                "append source offers neither positional nor pair enumeration",
            ))
        }
    }

    /// Add `source` at the front: positional sources unshift their values
    /// in order; pair sources fall back to [`merge`](Self::merge)
    pub fn insert_front<S>(&mut self, source: &S) -> Result<()>
    where
        S: MergeSource<K, V> + ?Sized,
    {
        if let Some(values) = source.by_position() {
            let values: Vec<V> = values.cloned().collect();
            self.unshift(values);
            Ok(())
        } else if source.by_pairs().is_some() {
            self.merge(source)
        } else {
            Err(HybridError::invalid_argument(
                "insert source offers neither positional nor pair enumeration",
            ))
        }
    }
}

impl<K, V> From<Vec<V>> for HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn from(values: Vec<V>) -> Self {
        let mut map = Self::new();
        map.push(values);
        map
    }
}

impl<K, V> FromIterator<V> for HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut map = Self::new();
        map.push(iter);
        map
    }
}

/// Out-of-range negative indices in the pair stream are dropped rather than
/// failing construction; the finished container is in the default mode.
impl<K, V> FromIterator<(Key<K>, V)> for HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn from_iter<I: IntoIterator<Item = (Key<K>, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.set_negative_mode(NegativeMode::Ignore);
        for (key, value) in iter {
            let _ = map.set(key, value);
        }
        map.set_negative_mode(NegativeMode::Error);
        map
    }
}
