//! HybridMap: hybrid indexed container
//!
//! A `HybridMap` presents one key-based interface over three cooperating
//! stores:
//!
//! - a **dense region** (`Vec<V>`) holding the maximal contiguous run of
//!   integer keys starting at the run origin,
//! - a **sparse region** (`BTreeMap<i64, V>`) holding integer keys outside
//!   that run,
//! - a **random region** (`IndexMap<K, V>`) holding non-integer keys in
//!   insertion order.
//!
//! Values migrate between the dense and sparse regions as holes in the
//! integer key space open or close: writing the key one past the dense end
//! promotes any sparse entries that have become contiguous, and removing a
//! dense entry without reindexing demotes the entries behind it. Two scalars,
//! `first_key` and `next_key`, track the bounds of the integer key space and
//! are recomputed after every structural change.
//!
//! # Performance Characteristics
//!
//! - **Dense reads/writes**: O(1)
//! - **Sparse reads/writes**: O(log n)
//! - **Structural mutation** (reindexing deletes, shifts, unshifts): O(n) in
//!   the sparse size, paid only on structural change, never on overwrite
//!
//! # Examples
//!
//! ```rust
//! use hybrid_map::{HybridMap, Scope};
//!
//! let mut map: HybridMap<String, i32> = HybridMap::new();
//! map.set(0, 10)?;
//! map.set(1, 20)?;
//! map.set(5, 50)?;
//! map.set("tag", 99)?;
//!
//! assert_eq!(map.get(1)?, Some(&20));
//! assert_eq!(map.len_in(Scope::Dense), 2);
//! assert_eq!(map.len_in(Scope::Sparse), 1);
//! assert_eq!(map.len_in(Scope::Random), 1);
//! # Ok::<(), hybrid_map::HybridError>(())
//! ```

use crate::error::{HybridError, Result};
use crate::iter::Scope;
use crate::key::{resolve, Key, NegativeMode, Resolved};
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::ops::{Bound, RangeBounds};
use std::rc::Rc;

/// Callback producing a default value for a missing key.
///
/// The rule receives the container and the requested key (`None` for a shift
/// or pop on an empty integer key space). When set, it takes precedence over
/// the plain default value.
pub type DefaultRule<K, V> = Rc<dyn Fn(&HybridMap<K, V>, Option<&Key<K>>) -> V>;

/// Hybrid indexed container combining dense, sparse, and non-integer keyed
/// storage.
///
/// Integer keys live in the dense or sparse region depending on contiguity;
/// non-integer keys live in the random region. Callers address all three
/// through [`Key`] and never observe which side of the dense/sparse boundary
/// a value currently sits on.
///
/// Negative integer keys are interpreted per [`NegativeMode`]; see
/// [`HybridMap::set_negative_mode`] for the guarded transitions between
/// modes.
pub struct HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub(crate) dense: Vec<V>,
    pub(crate) sparse: BTreeMap<i64, V>,
    pub(crate) random: IndexMap<K, V>,
    first_key: i64,
    next_key: i64,
    negative_mode: NegativeMode,
    default_value: Option<V>,
    default_rule: Option<DefaultRule<K, V>>,
}

impl<K, V> HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new empty container (negative mode `Error`, no default)
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: BTreeMap::new(),
            random: IndexMap::new(),
            first_key: 0,
            next_key: 0,
            negative_mode: NegativeMode::default(),
            default_value: None,
            default_rule: None,
        }
    }

    /// Create a container with the specified dense-region capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let mut map = Self::new();
        map.dense = Vec::with_capacity(capacity);
        map
    }

    /// Create a container returning `default_value` for missing keys
    pub fn with_default(default_value: V) -> Self {
        let mut map = Self::new();
        map.default_value = Some(default_value);
        map
    }

    /// Start building a container with configured defaults and mode
    pub fn builder() -> HybridMapBuilder<K, V> {
        HybridMapBuilder::new()
    }

    /// Create an empty container sharing this one's mode and defaults
    pub fn new_similar(&self) -> Self {
        Self {
            dense: Vec::new(),
            sparse: BTreeMap::new(),
            random: IndexMap::new(),
            first_key: 0,
            next_key: 0,
            negative_mode: self.negative_mode,
            default_value: self.default_value.clone(),
            default_rule: self.default_rule.clone(),
        }
    }

    /// The current negative-key interpretation mode
    pub fn negative_mode(&self) -> NegativeMode {
        self.negative_mode
    }

    /// Switch the negative-key mode, returning the mode now in effect.
    ///
    /// Switching away from `Actual` is refused while any negative key is in
    /// use (`first_key < 0`); the request is ignored and the current mode is
    /// returned. Switching to `Actual` always succeeds and makes all keys
    /// literal immediately.
    pub fn set_negative_mode(&mut self, mode: NegativeMode) -> NegativeMode {
        if mode == self.negative_mode {
            return mode;
        }
        if self.negative_mode == NegativeMode::Actual {
            if self.first_key < 0 {
                return self.negative_mode;
            }
            // A dense run starting above zero is legal only under Actual;
            // spill it to sparse so the zero-origin invariant holds.
            if self.first_key > 0 && !self.dense.is_empty() {
                let origin = self.first_key;
                self.demote_from(origin);
            }
            self.negative_mode = mode;
        } else {
            self.negative_mode = mode;
        }
        self.rescan(0, 0);
        self.promote();
        self.negative_mode
    }

    /// The default value returned for missing keys, if any
    pub fn default_value(&self) -> Option<&V> {
        self.default_value.as_ref()
    }

    /// Set or clear the default value for missing keys
    pub fn set_default_value(&mut self, value: Option<V>) {
        self.default_value = value;
    }

    /// Set the default rule called for missing keys.
    ///
    /// The rule takes precedence over the plain default value.
    pub fn set_default_rule<F>(&mut self, rule: F)
    where
        F: Fn(&HybridMap<K, V>, Option<&Key<K>>) -> V + 'static,
    {
        self.default_rule = Some(Rc::new(rule));
    }

    /// Remove any configured default rule
    pub fn clear_default_rule(&mut self) {
        self.default_rule = None;
    }

    /// True if a default rule is configured
    pub fn has_default_rule(&self) -> bool {
        self.default_rule.is_some()
    }

    /// Lowest integer key currently in use (0 when none)
    pub fn first_key(&self) -> i64 {
        self.first_key
    }

    /// One past the highest integer key currently in use (0 when none)
    pub fn next_key(&self) -> i64 {
        self.next_key
    }

    /// Total number of stored values across all three regions
    pub fn len(&self) -> usize {
        self.dense.len() + self.sparse.len() + self.random.len()
    }

    /// True if no values are stored in any region
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored values within `scope`
    pub fn len_in(&self, scope: Scope) -> usize {
        match scope {
            Scope::All => self.len(),
            Scope::Ints => self.dense.len() + self.sparse.len(),
            Scope::Dense => self.dense.len(),
            Scope::Sparse => self.sparse.len(),
            Scope::Random => self.random.len(),
            Scope::NonDense => self.sparse.len() + self.random.len(),
        }
    }

    /// True if no values are stored within `scope`
    pub fn is_empty_in(&self, scope: Scope) -> bool {
        self.len_in(scope) == 0
    }

    // ---- key resolution and region selection ------------------------------

    /// First key of the dense run. Zero under Error/Ignore; under Actual the
    /// run may start anywhere, tracked by `first_key`.
    pub(crate) fn dense_start(&self) -> i64 {
        match self.negative_mode {
            NegativeMode::Actual => self.first_key,
            _ => 0,
        }
    }

    fn resolve_index(&self, index: i64) -> Result<Resolved> {
        resolve(index, self.negative_mode, self.next_key)
    }

    fn get_int(&self, key: i64) -> Option<&V> {
        let start = self.dense_start();
        if !self.dense.is_empty() && key >= start && key < start + self.dense.len() as i64 {
            self.dense.get((key - start) as usize)
        } else {
            self.sparse.get(&key)
        }
    }

    pub(crate) fn stored(&self, key: &Key<K>) -> Result<Option<&V>> {
        match key {
            Key::Name(name) => Ok(self.random.get(name)),
            Key::Index(index) => match self.resolve_index(*index)? {
                Resolved::OutOfRange => Ok(None),
                Resolved::Key(effective) => Ok(self.get_int(effective)),
            },
        }
    }

    fn default_for(&self, key: Option<&Key<K>>) -> Option<V> {
        if let Some(rule) = &self.default_rule {
            Some(rule(self, key))
        } else {
            self.default_value.clone()
        }
    }

    // ---- read/write API ----------------------------------------------------

    /// Get a reference to the stored value for `key`.
    ///
    /// Returns `Ok(None)` when no value is stored; the configured default is
    /// not consulted. Fails only when a negative key resolves out of range
    /// under `Error` mode.
    pub fn get(&self, key: impl Into<Key<K>>) -> Result<Option<&V>> {
        self.stored(&key.into())
    }

    /// Get the stored value for `key`, or the configured default.
    ///
    /// The default rule (passed this container and the key) takes precedence
    /// over the default value; `Ok(None)` means the key is absent and no
    /// default is configured.
    pub fn get_or_default(&self, key: impl Into<Key<K>>) -> Result<Option<V>> {
        let key = key.into();
        if let Some(value) = self.stored(&key)? {
            return Ok(Some(value.clone()));
        }
        Ok(self.default_for(Some(&key)))
    }

    /// Get the stored value for `key`, failing with `KeyNotFound` if absent.
    ///
    /// Unlike [`get_or_default`](Self::get_or_default), the container's
    /// defaults are not consulted; use [`fetch_or`](Self::fetch_or) or
    /// [`fetch_or_else`](Self::fetch_or_else) to supply a per-call fallback.
    pub fn fetch(&self, key: impl Into<Key<K>>) -> Result<V>
    where
        K: fmt::Debug,
    {
        let key = key.into();
        match self.stored(&key)? {
            Some(value) => Ok(value.clone()),
            None => Err(HybridError::key_not_found(format!("{:?}", key))),
        }
    }

    /// Like [`fetch`](Self::fetch), but returns `fallback` when absent
    pub fn fetch_or(&self, key: impl Into<Key<K>>, fallback: V) -> Result<V> {
        Ok(self.stored(&key.into())?.cloned().unwrap_or(fallback))
    }

    /// Like [`fetch`](Self::fetch), but calls `fallback` with the key when
    /// absent
    pub fn fetch_or_else<F>(&self, key: impl Into<Key<K>>, fallback: F) -> Result<V>
    where
        F: FnOnce(&Key<K>) -> V,
    {
        let key = key.into();
        match self.stored(&key)? {
            Some(value) => Ok(value.clone()),
            None => Ok(fallback(&key)),
        }
    }

    /// Store `value` under `key`.
    ///
    /// Integer keys within or adjacent to the dense run extend or overwrite
    /// it (promoting newly contiguous sparse entries); other integer keys go
    /// to the sparse region; non-integer keys go to the random region. Under
    /// `Ignore` mode an out-of-range negative key is silently dropped; under
    /// `Error` mode it fails before any mutation.
    pub fn set(&mut self, key: impl Into<Key<K>>, value: V) -> Result<()> {
        match key.into() {
            Key::Name(name) => {
                self.random.insert(name, value);
                Ok(())
            }
            Key::Index(index) => match self.resolve_index(index)? {
                Resolved::OutOfRange => Ok(()),
                Resolved::Key(effective) => {
                    self.set_effective(effective, value);
                    Ok(())
                }
            },
        }
    }

    /// True iff a value is stored for `key` (defaults are not consulted).
    /// Out-of-range keys report `false` in every mode.
    pub fn contains_key(&self, key: impl Into<Key<K>>) -> bool {
        matches!(self.stored(&key.into()), Ok(Some(_)))
    }

    pub(crate) fn put_name(&mut self, name: K, value: V) {
        self.random.insert(name, value);
    }

    /// Place a value at an already-resolved integer key.
    pub(crate) fn set_effective(&mut self, key: i64, value: V) {
        let start = self.dense_start();
        let end = start + self.dense.len() as i64;
        if !self.dense.is_empty() && key >= start && key < end {
            // Overwrite inside the dense run: no structural change, so the
            // boundary tracker stays as-is.
            self.dense[(key - start) as usize] = value;
            return;
        }
        if key == end {
            self.dense.push(value);
        } else if self.negative_mode == NegativeMode::Actual && key < start && !self.dense.is_empty()
        {
            // Writing before the run start would break contiguity; spill the
            // run to sparse and let promotion rebuild it from the new origin.
            self.demote_from(start);
            self.sparse.insert(key, value);
        } else {
            self.sparse.insert(key, value);
        }
        self.rescan(0, 0);
        self.promote();
    }

    // ---- migration ---------------------------------------------------------

    /// Pull sparse entries contiguous with the dense end into the dense run.
    fn promote(&mut self) {
        let mut key = self.dense_start() + self.dense.len() as i64;
        while let Some(value) = self.sparse.remove(&key) {
            self.dense.push(value);
            key += 1;
        }
    }

    /// Pop the dense tail, from key `from` upward, into the sparse region
    /// under the keys the entries already occupy.
    fn demote_from(&mut self, from: i64) {
        let start = self.dense_start();
        let keep = (from - start).max(0) as usize;
        while self.dense.len() > keep {
            let key = start + self.dense.len() as i64 - 1;
            if let Some(value) = self.dense.pop() {
                self.sparse.insert(key, value);
            }
        }
    }

    /// Re-derive `first_key`/`next_key` from the current stores, optionally
    /// shifting every sparse key `>= from` by `adjustment` first.
    fn rescan(&mut self, adjustment: i64, from: i64) {
        if adjustment != 0 && !self.sparse.is_empty() {
            let shifted: BTreeMap<i64, V> = std::mem::take(&mut self.sparse)
                .into_iter()
                .map(|(key, value)| {
                    if key >= from {
                        (key + adjustment, value)
                    } else {
                        (key, value)
                    }
                })
                .collect();
            self.sparse = shifted;
        }
        if self.dense.is_empty() {
            self.first_key = self.sparse.keys().next().copied().unwrap_or(0);
            self.next_key = self.sparse.keys().next_back().map(|k| k + 1).unwrap_or(0);
        } else {
            let origin = self.dense_start();
            let end = origin + self.dense.len() as i64;
            self.first_key = origin;
            self.next_key = self
                .sparse
                .keys()
                .next_back()
                .map(|k| k + 1)
                .unwrap_or(end)
                .max(end);
        }
    }

    fn lowest_int_key(&self) -> Option<i64> {
        if self.dense.is_empty() {
            self.sparse.keys().next().copied()
        } else {
            Some(self.dense_start())
        }
    }

    fn highest_int_key(&self) -> Option<i64> {
        self.sparse.keys().next_back().copied().or_else(|| {
            if self.dense.is_empty() {
                None
            } else {
                Some(self.dense_start() + self.dense.len() as i64 - 1)
            }
        })
    }

    /// Remove the value at an effective integer key. With `reindex`, every
    /// integer key above the removed one shifts down by one; without it, the
    /// dense tail behind a removed dense entry demotes to sparse under its
    /// original keys.
    fn take_int(&mut self, key: i64, reindex: bool) -> Option<V> {
        let start = self.dense_start();
        let end = start + self.dense.len() as i64;
        let removed = if !self.dense.is_empty() && key >= start && key < end {
            if reindex {
                Some(self.dense.remove((key - start) as usize))
            } else {
                self.demote_from(key + 1);
                self.dense.pop()
            }
        } else {
            self.sparse.remove(&key)
        };
        if removed.is_some() {
            if reindex {
                self.rescan(-1, key + 1);
            } else {
                self.rescan(0, 0);
            }
            self.promote();
        }
        removed
    }

    // ---- structural mutation ------------------------------------------------

    /// Remove the value at `key`, reindexing: every integer key above it
    /// shifts down by one, keeping the key space contiguous. Under `Actual`
    /// mode reindexing would renumber literal keys, so this delegates to
    /// [`unset_at`](Self::unset_at).
    ///
    /// Returns the removed value, or the configured default when absent.
    pub fn delete_at(&mut self, key: impl Into<Key<K>>) -> Result<Option<V>> {
        let key = key.into();
        if self.negative_mode == NegativeMode::Actual {
            return self.unset_at(key);
        }
        self.remove_key(key, true)
    }

    /// Remove the value at `key` without renumbering any other key.
    ///
    /// A removed dense entry truncates the dense run at the removal point;
    /// the entries behind it fall into the sparse region under their
    /// original keys. Returns the removed value, or the configured default
    /// when absent.
    pub fn unset_at(&mut self, key: impl Into<Key<K>>) -> Result<Option<V>> {
        self.remove_key(key.into(), false)
    }

    fn remove_key(&mut self, key: Key<K>, reindex: bool) -> Result<Option<V>> {
        match &key {
            Key::Name(name) => {
                if let Some(value) = self.random.shift_remove(name) {
                    return Ok(Some(value));
                }
            }
            Key::Index(index) => match self.resolve_index(*index)? {
                Resolved::OutOfRange => {}
                Resolved::Key(effective) => {
                    if let Some(value) = self.take_int(effective, reindex) {
                        return Ok(Some(value));
                    }
                }
            },
        }
        Ok(self.default_for(Some(&key)))
    }

    /// Remove and return the first integer-keyed value, reindexing the rest
    /// (under `Actual` mode the key space is left untouched apart from the
    /// removed key). Returns the configured default when no integer keys are
    /// in use.
    pub fn shift(&mut self) -> Result<Option<V>> {
        match self.lowest_int_key() {
            None => Ok(self.default_for(None)),
            Some(key) => Ok(self.take_int(key, self.negative_mode != NegativeMode::Actual)),
        }
    }

    /// Remove and return up to `count` leading integer-keyed values in
    /// ascending key order; short when fewer are available
    pub fn shift_n(&mut self, count: usize) -> Vec<V> {
        let mut out = Vec::new();
        for _ in 0..count {
            let Some(key) = self.lowest_int_key() else {
                break;
            };
            if let Some(value) = self.take_int(key, self.negative_mode != NegativeMode::Actual) {
                out.push(value);
            }
        }
        out
    }

    /// Remove and return the last integer-keyed value. Returns the
    /// configured default when no integer keys are in use.
    pub fn pop(&mut self) -> Result<Option<V>> {
        match self.highest_int_key() {
            None => Ok(self.default_for(None)),
            Some(key) => Ok(self.take_int(key, self.negative_mode != NegativeMode::Actual)),
        }
    }

    /// Remove and return up to `count` trailing integer-keyed values, in
    /// ascending key order
    pub fn pop_n(&mut self, count: usize) -> Vec<V> {
        let mut out = Vec::new();
        for _ in 0..count {
            let Some(key) = self.highest_int_key() else {
                break;
            };
            if let Some(value) = self.take_int(key, self.negative_mode != NegativeMode::Actual) {
                out.push(value);
            }
        }
        out.reverse();
        out
    }

    /// Append values at the conceptual back of the integer key space: each
    /// lands at `next_key`, so existing gaps are preserved and appends stay
    /// compact
    pub fn push(&mut self, values: impl IntoIterator<Item = V>) {
        for value in values {
            let key = self.next_key;
            self.set_effective(key, value);
        }
    }

    /// Insert values at the conceptual front of the integer key space.
    ///
    /// Under `Error`/`Ignore` every existing integer key shifts up by the
    /// inserted count; under `Actual`, `first_key` decrements by the count
    /// and the values occupy the new run start without touching any other
    /// entry.
    pub fn unshift(&mut self, values: impl IntoIterator<Item = V>) {
        let values: Vec<V> = values.into_iter().collect();
        if values.is_empty() {
            return;
        }
        let count = values.len() as i64;
        if self.negative_mode == NegativeMode::Actual {
            self.promote();
            self.first_key -= count;
            self.dense.splice(0..0, values);
        } else {
            self.rescan(count, 0);
            self.dense.splice(0..0, values);
        }
        self.rescan(0, 0);
        self.promote();
    }

    fn scope_flags(scope: Scope) -> (bool, bool, bool) {
        let dense_in = matches!(scope, Scope::All | Scope::Ints | Scope::Dense);
        let sparse_in = matches!(
            scope,
            Scope::All | Scope::Ints | Scope::Sparse | Scope::NonDense
        );
        let random_in = matches!(scope, Scope::All | Scope::Random | Scope::NonDense);
        (dense_in, sparse_in, random_in)
    }

    fn drain_ints(&mut self) -> Vec<(i64, V, bool)> {
        let start = self.dense_start();
        let mut out = Vec::with_capacity(self.dense.len() + self.sparse.len());
        for (offset, value) in self.dense.drain(..).enumerate() {
            out.push((start + offset as i64, value, true));
        }
        let sparse = std::mem::take(&mut self.sparse);
        for (key, value) in sparse {
            out.push((key, value, false));
        }
        out
    }

    fn restore_ints(&mut self, pairs: Vec<(i64, V)>) {
        for (key, value) in pairs {
            self.sparse.insert(key, value);
        }
        self.rescan(0, 0);
        self.promote();
    }

    /// Remove every entry in `scope` matching `pred`, reindexing: each
    /// surviving integer key drops by the number of deleted integer keys
    /// below it. This holds even when the predicate matches several dense
    /// entries. Under `Actual` mode this delegates to
    /// [`unset_if`](Self::unset_if).
    ///
    /// Returns the number of removed entries.
    pub fn delete_if<F>(&mut self, scope: Scope, mut pred: F) -> usize
    where
        F: FnMut(&Key<K>, &V) -> bool,
    {
        if self.negative_mode == NegativeMode::Actual {
            return self.unset_if(scope, pred);
        }
        let (dense_in, sparse_in, random_in) = Self::scope_flags(scope);
        let mut removed = 0;
        if dense_in || sparse_in {
            let entries = self.drain_ints();
            let mut dropped = 0i64;
            let mut survivors = Vec::with_capacity(entries.len());
            for (key, value, is_dense) in entries {
                let in_scope = if is_dense { dense_in } else { sparse_in };
                if in_scope && pred(&Key::Index(key), &value) {
                    dropped += 1;
                    removed += 1;
                } else {
                    survivors.push((key - dropped, value));
                }
            }
            self.restore_ints(survivors);
        }
        if random_in {
            let before = self.random.len();
            self.random.retain(|key, value| !pred(&Key::Name(key.clone()), value));
            removed += before - self.random.len();
        }
        removed
    }

    /// Remove every entry in `scope` matching `pred` without renumbering:
    /// surviving keys keep their values, and dense survivors behind a
    /// removed entry fall into the sparse region.
    ///
    /// Returns the number of removed entries.
    pub fn unset_if<F>(&mut self, scope: Scope, mut pred: F) -> usize
    where
        F: FnMut(&Key<K>, &V) -> bool,
    {
        let (dense_in, sparse_in, random_in) = Self::scope_flags(scope);
        let mut removed = 0;
        if dense_in || sparse_in {
            let entries = self.drain_ints();
            let mut survivors = Vec::with_capacity(entries.len());
            for (key, value, is_dense) in entries {
                let in_scope = if is_dense { dense_in } else { sparse_in };
                if in_scope && pred(&Key::Index(key), &value) {
                    removed += 1;
                } else {
                    survivors.push((key, value));
                }
            }
            self.restore_ints(survivors);
        }
        if random_in {
            let before = self.random.len();
            self.random.retain(|key, value| !pred(&Key::Name(key.clone()), value));
            removed += before - self.random.len();
        }
        removed
    }

    /// Remove every entry in `scope` equal to `value`, reindexing survivors
    pub fn delete_value(&mut self, scope: Scope, value: &V) -> usize
    where
        V: PartialEq,
    {
        self.delete_if(scope, |_, stored| stored == value)
    }

    /// Remove every entry in `scope` equal to `value` without renumbering
    pub fn unset_value(&mut self, scope: Scope, value: &V) -> usize
    where
        V: PartialEq,
    {
        self.unset_if(scope, |_, stored| stored == value)
    }

    // ---- slices --------------------------------------------------------------

    fn collect_from(&self, start: i64, len: usize) -> Vec<(i64, V)> {
        self.int_pairs()
            .filter(|(key, _)| *key >= start)
            .take(len)
            .map(|(key, value)| (key, value.clone()))
            .collect()
    }

    fn collect_range(&self, lo: Bound<i64>, hi: Bound<i64>) -> Vec<(i64, V)> {
        self.int_pairs()
            .filter(|(key, _)| (lo, hi).contains(key))
            .map(|(key, value)| (key, value.clone()))
            .collect()
    }

    fn build_slice(&self, picked: Vec<(i64, V)>) -> Self {
        let mut out = self.new_similar();
        for (key, value) in picked {
            out.set_effective(key, value);
        }
        out.random = self.random.clone();
        out
    }

    fn remove_picked(&mut self, picked: &[(i64, V)]) {
        let reindex = self.negative_mode != NegativeMode::Actual;
        for (key, _) in picked.iter().rev() {
            self.take_int(*key, reindex);
        }
    }

    fn resolve_bound(&self, bound: Bound<&i64>) -> Result<Option<Bound<i64>>> {
        Ok(match bound {
            Bound::Unbounded => Some(Bound::Unbounded),
            Bound::Included(&b) => match self.resolve_index(b)? {
                Resolved::Key(e) => Some(Bound::Included(e)),
                Resolved::OutOfRange => None,
            },
            Bound::Excluded(&b) => match self.resolve_index(b)? {
                Resolved::Key(e) => Some(Bound::Excluded(e)),
                Resolved::OutOfRange => None,
            },
        })
    }

    /// Return a new container holding up to `len` integer-keyed entries in
    /// ascending key order, starting at the first key `>=` the resolved
    /// `start`. Original keys are preserved and the random region is copied
    /// into the result.
    pub fn slice(&self, start: i64, len: usize) -> Result<Self> {
        let effective = match self.resolve_index(start)? {
            Resolved::Key(e) => e,
            Resolved::OutOfRange => return Ok(self.build_slice(Vec::new())),
        };
        Ok(self.build_slice(self.collect_from(effective, len)))
    }

    /// Like [`slice`](Self::slice), selecting the integer keys within
    /// `range` (bounds resolved per the negative mode)
    pub fn slice_range<R: RangeBounds<i64>>(&self, range: R) -> Result<Self> {
        let lo = self.resolve_bound(range.start_bound())?;
        let hi = self.resolve_bound(range.end_bound())?;
        let (Some(lo), Some(hi)) = (lo, hi) else {
            return Ok(self.build_slice(Vec::new()));
        };
        Ok(self.build_slice(self.collect_range(lo, hi)))
    }

    /// Like [`slice`](Self::slice), additionally removing the selected
    /// integer entries from this container: reindexing under
    /// `Error`/`Ignore`, gap-leaving under `Actual`
    pub fn slice_off(&mut self, start: i64, len: usize) -> Result<Self> {
        let effective = match self.resolve_index(start)? {
            Resolved::Key(e) => e,
            Resolved::OutOfRange => return Ok(self.build_slice(Vec::new())),
        };
        let picked = self.collect_from(effective, len);
        let out = self.build_slice(picked.clone());
        self.remove_picked(&picked);
        Ok(out)
    }

    /// Range form of [`slice_off`](Self::slice_off)
    pub fn slice_range_off<R: RangeBounds<i64>>(&mut self, range: R) -> Result<Self> {
        let lo = self.resolve_bound(range.start_bound())?;
        let hi = self.resolve_bound(range.end_bound())?;
        let (Some(lo), Some(hi)) = (lo, hi) else {
            return Ok(self.build_slice(Vec::new()));
        };
        let picked = self.collect_range(lo, hi);
        let out = self.build_slice(picked.clone());
        self.remove_picked(&picked);
        Ok(out)
    }

    // ---- bulk rebuilds ---------------------------------------------------------

    /// Materialize the dense+sparse values in key order, transform them, and
    /// replace the integer key space with the result: dense holds everything,
    /// sparse is empty, `first_key` resets to zero.
    fn rebuild_ints<F: FnOnce(&mut Vec<V>)>(&mut self, transform: F) {
        let mut values: Vec<V> = self.dense.drain(..).collect();
        let sparse = std::mem::take(&mut self.sparse);
        values.extend(sparse.into_values());
        transform(&mut values);
        self.first_key = 0;
        self.next_key = values.len() as i64;
        self.dense = values;
    }

    /// Renumber all integer keys contiguously from zero, closing every gap
    pub fn reindex(&mut self) {
        self.rebuild_ints(|_| {});
    }

    /// Reverse the order of the integer-keyed values (keys renumber from 0)
    pub fn reverse(&mut self) {
        self.rebuild_ints(|values| values.reverse());
    }

    /// Rotate the integer-keyed values left by `steps` (negative rotates
    /// right); keys renumber from 0
    pub fn rotate(&mut self, steps: i64) {
        self.rebuild_ints(|values| {
            if !values.is_empty() {
                let by = steps.rem_euclid(values.len() as i64) as usize;
                values.rotate_left(by);
            }
        });
    }

    /// Sort the integer-keyed values; keys renumber from 0
    pub fn sort(&mut self)
    where
        V: Ord,
    {
        self.rebuild_ints(|values| values.sort());
    }

    /// Sort the integer-keyed values with a comparator; keys renumber from 0
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&V, &V) -> std::cmp::Ordering,
    {
        self.rebuild_ints(|values| values.sort_by(cmp));
    }

    /// Shuffle the integer-keyed values; keys renumber from 0
    pub fn shuffle(&mut self) {
        self.rebuild_ints(|values| values.shuffle(&mut rand::thread_rng()));
    }

    /// Drop duplicate integer-keyed values, keeping first occurrences; keys
    /// renumber from 0
    pub fn dedup(&mut self)
    where
        V: PartialEq,
    {
        self.rebuild_ints(|values| {
            let mut kept: Vec<V> = Vec::with_capacity(values.len());
            for value in values.drain(..) {
                if !kept.contains(&value) {
                    kept.push(value);
                }
            }
            *values = kept;
        });
    }

    /// Drop every value for which `is_void` is true. Integer-keyed values
    /// compact into a fresh dense run; the random region is filtered in
    /// place when `scope` covers it. This is the only rebuild that can touch
    /// the random region.
    pub fn compact_by<F>(&mut self, scope: Scope, is_void: F)
    where
        F: Fn(&V) -> bool,
    {
        let ints_in = matches!(
            scope,
            Scope::All | Scope::Ints | Scope::Dense | Scope::Sparse
        );
        let (_, _, random_in) = Self::scope_flags(scope);
        if ints_in {
            self.rebuild_ints(|values| values.retain(|value| !is_void(value)));
        }
        if random_in {
            self.random.retain(|_, value| !is_void(value));
        }
    }

    /// Apply `transform` to every value in `scope` in place; keys are
    /// untouched
    pub fn map_values<F>(&mut self, scope: Scope, mut transform: F)
    where
        F: FnMut(&V) -> V,
    {
        let (dense_in, sparse_in, random_in) = Self::scope_flags(scope);
        if dense_in {
            for value in self.dense.iter_mut() {
                *value = transform(value);
            }
        }
        if sparse_in {
            for value in self.sparse.values_mut() {
                *value = transform(value);
            }
        }
        if random_in {
            for value in self.random.values_mut() {
                *value = transform(value);
            }
        }
    }

    /// Non-mutating [`reindex`](Self::reindex)
    pub fn reindexed(&self) -> Self {
        let mut out = self.clone();
        out.reindex();
        out
    }

    /// Non-mutating [`reverse`](Self::reverse)
    pub fn reversed(&self) -> Self {
        let mut out = self.clone();
        out.reverse();
        out
    }

    /// Non-mutating [`rotate`](Self::rotate)
    pub fn rotated(&self, steps: i64) -> Self {
        let mut out = self.clone();
        out.rotate(steps);
        out
    }

    /// Non-mutating [`sort`](Self::sort)
    pub fn sorted(&self) -> Self
    where
        V: Ord,
    {
        let mut out = self.clone();
        out.sort();
        out
    }

    /// Non-mutating [`shuffle`](Self::shuffle)
    pub fn shuffled(&self) -> Self {
        let mut out = self.clone();
        out.shuffle();
        out
    }

    /// Non-mutating [`dedup`](Self::dedup)
    pub fn deduped(&self) -> Self
    where
        V: PartialEq,
    {
        let mut out = self.clone();
        out.dedup();
        out
    }

    // ---- whole-container operations ---------------------------------------------

    /// Remove every entry within `scope`
    pub fn clear(&mut self, scope: Scope) {
        match scope {
            Scope::All => {
                self.dense.clear();
                self.sparse.clear();
                self.random.clear();
            }
            Scope::Ints => {
                self.dense.clear();
                self.sparse.clear();
            }
            Scope::Dense => self.dense.clear(),
            Scope::Sparse => self.sparse.clear(),
            Scope::Random => self.random.clear(),
            Scope::NonDense => {
                self.sparse.clear();
                self.random.clear();
            }
        }
        self.rescan(0, 0);
        self.promote();
    }

    /// Replace this container's contents (all three regions, bounds, and
    /// mode) with a copy of `other`'s; defaults are kept
    pub fn replace(&mut self, other: &Self) {
        self.dense = other.dense.clone();
        self.sparse = other.sparse.clone();
        self.random = other.random.clone();
        self.first_key = other.first_key;
        self.next_key = other.next_key;
        self.negative_mode = other.negative_mode;
    }
}

impl<K, V> Default for HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            dense: self.dense.clone(),
            sparse: self.sparse.clone(),
            random: self.random.clone(),
            first_key: self.first_key,
            next_key: self.next_key,
            negative_mode: self.negative_mode,
            default_value: self.default_value.clone(),
            default_rule: self.default_rule.clone(),
        }
    }
}

impl<K, V> fmt::Debug for HybridMap<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridMap")
            .field("dense", &self.dense)
            .field("sparse", &self.sparse)
            .field("random", &self.random)
            .field("first_key", &self.first_key)
            .field("next_key", &self.next_key)
            .field("negative_mode", &self.negative_mode)
            .field("default_value", &self.default_value)
            .field("default_rule", &self.default_rule.is_some())
            .finish()
    }
}

/// Contents compare by stored entries only; modes and defaults are
/// configuration, not content.
impl<K, V> PartialEq for HybridMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len_in(Scope::Ints) == other.len_in(Scope::Ints)
            && self.int_pairs().eq(other.int_pairs())
            && self.random == other.random
    }
}

/// Builder for containers with configured defaults, mode, and capacity
///
/// ```rust
/// use hybrid_map::{HybridMap, NegativeMode};
///
/// let map: HybridMap<String, i32> = HybridMap::builder()
///     .default_value(0)
///     .negative_mode(NegativeMode::Ignore)
///     .build();
/// assert_eq!(map.get_or_default(7).unwrap(), Some(0));
/// ```
pub struct HybridMapBuilder<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    default_value: Option<V>,
    default_rule: Option<DefaultRule<K, V>>,
    negative_mode: NegativeMode,
    capacity: usize,
}

impl<K, V> HybridMapBuilder<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn new() -> Self {
        Self {
            default_value: None,
            default_rule: None,
            negative_mode: NegativeMode::default(),
            capacity: 0,
        }
    }

    /// Default value returned for missing keys
    pub fn default_value(mut self, value: V) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Default rule called for missing keys (takes precedence over the
    /// default value)
    pub fn default_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&HybridMap<K, V>, Option<&Key<K>>) -> V + 'static,
    {
        self.default_rule = Some(Rc::new(rule));
        self
    }

    /// Initial negative-key mode
    pub fn negative_mode(mut self, mode: NegativeMode) -> Self {
        self.negative_mode = mode;
        self
    }

    /// Initial dense-region capacity
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the configured container
    pub fn build(self) -> HybridMap<K, V> {
        let mut map = HybridMap::with_capacity(self.capacity);
        map.default_value = self.default_value;
        map.default_rule = self.default_rule;
        map.negative_mode = self.negative_mode;
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Map = HybridMap<String, i32>;

    fn seeded(dense: &[i32], sparse: &[(i64, i32)]) -> Map {
        let mut map = Map::new();
        map.push(dense.iter().copied());
        for (k, v) in sparse {
            map.set(*k, *v).unwrap();
        }
        map
    }

    #[test]
    fn test_promote_on_contiguous_set() {
        let mut map = seeded(&[1, 2], &[(5, 50)]);
        assert_eq!(map.len_in(Scope::Dense), 2);
        map.set(2, 3).unwrap();
        // 5 is still detached from the run
        assert_eq!(map.len_in(Scope::Dense), 3);
        assert_eq!(map.len_in(Scope::Sparse), 1);
        map.set(4, 40).unwrap();
        map.set(3, 30).unwrap();
        // 4 and 5 become contiguous and promote in one pass
        assert_eq!(map.len_in(Scope::Dense), 6);
        assert_eq!(map.len_in(Scope::Sparse), 0);
        assert_eq!(map.next_key(), 6);
    }

    #[test]
    fn test_demote_on_unset() {
        let mut map = seeded(&[1, 2, 3], &[]);
        let removed = map.unset_at(1).unwrap();
        assert_eq!(removed, Some(2));
        assert_eq!(map.len_in(Scope::Dense), 1);
        assert_eq!(map.sparse_entries(), [(2i64, 3)].into_iter().collect());
        assert_eq!(map.next_key(), 3);
    }

    #[test]
    fn test_delete_reindexes_sparse() {
        let mut map = seeded(&[0, 1, 2], &[(5, 5), (7, 7), (9, 9)]);
        assert_eq!(map.delete_at(7).unwrap(), Some(7));
        assert_eq!(map.delete_at(1).unwrap(), Some(1));
        assert_eq!(map.dense_values(), vec![0, 2]);
        assert_eq!(
            map.sparse_entries(),
            [(4i64, 5), (7i64, 9)].into_iter().collect()
        );
    }

    #[test]
    fn test_rescan_bounds() {
        let mut map = Map::new();
        assert_eq!((map.first_key(), map.next_key()), (0, 0));
        map.set(3, 30).unwrap();
        assert_eq!((map.first_key(), map.next_key()), (3, 4));
        map.set(0, 0).unwrap();
        assert_eq!((map.first_key(), map.next_key()), (0, 4));
        map.unset_at(3).unwrap();
        assert_eq!((map.first_key(), map.next_key()), (0, 1));
    }

    #[test]
    fn test_push_lands_at_next_key() {
        let mut map = seeded(&[1], &[(5, 50)]);
        map.push([60]);
        assert_eq!(map.get(6).unwrap(), Some(&60));
        assert_eq!(map.next_key(), 7);
    }

    #[test]
    fn test_actual_mode_set_before_run() {
        let mut map = Map::new();
        map.set_negative_mode(NegativeMode::Actual);
        map.push([1, 2]);
        map.set(-3, -3).unwrap();
        assert_eq!(map.first_key(), -3);
        assert_eq!(map.get(-3).unwrap(), Some(&-3));
        assert_eq!(map.get(0).unwrap(), Some(&1));
        assert_eq!(map.get(1).unwrap(), Some(&2));
        // -3 alone is the dense run; 0 and 1 are detached
        assert_eq!(map.len_in(Scope::Dense), 1);
        assert_eq!(map.len_in(Scope::Sparse), 2);
    }

    #[test]
    fn test_mode_guard() {
        let mut map = Map::new();
        map.set_negative_mode(NegativeMode::Actual);
        map.set(-1, 10).unwrap();
        assert_eq!(
            map.set_negative_mode(NegativeMode::Error),
            NegativeMode::Actual
        );
        map.unset_at(-1).unwrap();
        assert_eq!(
            map.set_negative_mode(NegativeMode::Error),
            NegativeMode::Error
        );
    }

    #[test]
    fn test_mode_switch_normalizes_offset_run() {
        let mut map = Map::new();
        map.set_negative_mode(NegativeMode::Actual);
        map.set(5, 50).unwrap();
        map.set(6, 60).unwrap();
        assert_eq!(map.len_in(Scope::Dense), 2);
        assert_eq!(map.first_key(), 5);
        map.set_negative_mode(NegativeMode::Error);
        // the run no longer starts at zero, so it lives in sparse now
        assert_eq!(map.len_in(Scope::Dense), 0);
        assert_eq!(map.len_in(Scope::Sparse), 2);
        assert_eq!(map.get(5).unwrap(), Some(&50));
    }

    #[test]
    fn test_default_rule_precedence() {
        let mut map = Map::with_default(-1);
        assert_eq!(map.get_or_default(9).unwrap(), Some(-1));
        map.set_default_rule(|_, key| match key {
            Some(Key::Index(i)) => *i as i32,
            _ => 0,
        });
        assert_eq!(map.get_or_default(9).unwrap(), Some(9));
        map.clear_default_rule();
        assert_eq!(map.get_or_default(9).unwrap(), Some(-1));
    }

    #[test]
    fn test_set_is_atomic_on_resolution_failure() {
        let mut map = seeded(&[1, 2], &[]);
        assert!(map.set(-5, 9).is_err());
        assert_eq!(map.dense_values(), vec![1, 2]);
        assert_eq!(map.next_key(), 2);
    }

    #[test]
    fn test_clear_scopes() {
        let mut map = seeded(&[1, 2], &[(5, 50)]);
        map.set("a", 9).unwrap();
        let mut ints_only = map.clone();
        ints_only.clear(Scope::Ints);
        assert_eq!(ints_only.len_in(Scope::Ints), 0);
        assert_eq!(ints_only.len_in(Scope::Random), 1);
        let mut random_only = map.clone();
        random_only.clear(Scope::Random);
        assert_eq!(random_only.len_in(Scope::Ints), 3);
        assert_eq!(random_only.len_in(Scope::Random), 0);
    }

    #[test]
    fn test_rotate_and_reverse() {
        let mut map = seeded(&[1, 2, 3, 4, 5], &[(9, 6)]);
        map.rotate(2);
        assert_eq!(map.dense_values(), vec![3, 4, 5, 6, 1, 2]);
        map.rotate(-4);
        assert_eq!(map.dense_values(), vec![5, 6, 1, 2, 3, 4]);
        map.reverse();
        assert_eq!(map.dense_values(), vec![4, 3, 2, 1, 6, 5]);
        assert_eq!(map.first_key(), 0);
        assert_eq!(map.next_key(), 6);
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut map = seeded(&[3, 1, 4, 1, 5, 9, 2, 6, 5, 3], &[]);
        map.dedup();
        assert_eq!(map.dense_values(), vec![3, 1, 4, 5, 9, 2, 6]);
    }
}
