//! Keys and the negative-index resolution policy
//!
//! A [`HybridMap`](crate::HybridMap) addresses values through [`Key`]: either
//! an integer index or an arbitrary non-integer name. Integer keys pass
//! through a resolution step governed by [`NegativeMode`] before any storage
//! region is consulted:
//!
//! - **`Error`** (the default): a negative index is adjusted by the
//!   container's `next_key`; if it still resolves below zero the operation
//!   fails with [`HybridError::IndexOutOfRange`](crate::HybridError).
//! - **`Ignore`**: the same adjustment, but an unresolvable index degrades
//!   gracefully: reads return the default, writes are no-ops, and removals
//!   report absence.
//! - **`Actual`**: indices are literal; negative keys are ordinary keys.

use crate::error::{HybridError, Result};
use std::fmt;

/// A key addressing one value in a hybrid container.
///
/// Integer keys select the dense or sparse region; name keys select the
/// random region. Which region holds an integer key is an internal concern
/// that callers never see; the key type alone decides the key space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key<K> {
    /// An integer key into the dense/sparse key space
    Index(i64),
    /// A non-integer key into the random region
    Name(K),
}

impl<K> Key<K> {
    /// Construct a name key.
    ///
    /// Integer keys convert with `From`; this constructor exists because a
    /// blanket `From<K>` would overlap with the integer conversion.
    pub fn name(key: K) -> Self {
        Key::Name(key)
    }

    /// True if this is an integer key
    pub fn is_index(&self) -> bool {
        matches!(self, Key::Index(_))
    }
}

impl<K> From<i64> for Key<K> {
    fn from(index: i64) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key<String> {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key<String> {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl<K: fmt::Display> fmt::Display for Key<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(k) => write!(f, "{}", k),
        }
    }
}

/// Policy governing the interpretation of negative integer keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeMode {
    /// Adjust negative keys by `next_key`; unresolvable keys are errors
    #[default]
    Error,
    /// Adjust negative keys by `next_key`; unresolvable keys degrade to
    /// defaults/no-ops
    Ignore,
    /// Negative keys are literal keys; no adjustment is performed
    Actual,
}

/// Outcome of resolving an integer key against the current policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// The effective key to address storage with
    Key(i64),
    /// Unresolvable under ignore mode; the operation degrades gracefully
    OutOfRange,
}

/// Resolve a requested integer key under `mode`.
///
/// `next_key` is one past the highest integer key in use; negative keys in
/// the adjusting modes are taken relative to it. Error mode is the only
/// mode that can fail.
pub fn resolve(index: i64, mode: NegativeMode, next_key: i64) -> Result<Resolved> {
    match mode {
        NegativeMode::Actual => Ok(Resolved::Key(index)),
        NegativeMode::Error | NegativeMode::Ignore if index >= 0 => Ok(Resolved::Key(index)),
        NegativeMode::Error => {
            let effective = index + next_key;
            if effective < 0 {
                Err(HybridError::index_out_of_range(index, next_key))
            } else {
                Ok(Resolved::Key(effective))
            }
        }
        NegativeMode::Ignore => {
            let effective = index + next_key;
            if effective < 0 {
                Ok(Resolved::OutOfRange)
            } else {
                Ok(Resolved::Key(effective))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative_passthrough() {
        for mode in [NegativeMode::Error, NegativeMode::Ignore, NegativeMode::Actual] {
            assert_eq!(resolve(3, mode, 10).unwrap(), Resolved::Key(3));
            assert_eq!(resolve(0, mode, 0).unwrap(), Resolved::Key(0));
        }
    }

    #[test]
    fn test_error_mode_adjusts_or_fails() {
        assert_eq!(resolve(-1, NegativeMode::Error, 4).unwrap(), Resolved::Key(3));
        assert_eq!(resolve(-4, NegativeMode::Error, 4).unwrap(), Resolved::Key(0));
        let err = resolve(-5, NegativeMode::Error, 4).unwrap_err();
        assert_eq!(err.category(), "bounds");
    }

    #[test]
    fn test_ignore_mode_degrades() {
        assert_eq!(resolve(-1, NegativeMode::Ignore, 4).unwrap(), Resolved::Key(3));
        assert_eq!(
            resolve(-5, NegativeMode::Ignore, 4).unwrap(),
            Resolved::OutOfRange
        );
        assert_eq!(
            resolve(-3, NegativeMode::Ignore, 0).unwrap(),
            Resolved::OutOfRange
        );
    }

    #[test]
    fn test_actual_mode_is_literal() {
        assert_eq!(
            resolve(-7, NegativeMode::Actual, 4).unwrap(),
            Resolved::Key(-7)
        );
    }

    #[test]
    fn test_key_conversions() {
        let k: Key<String> = 5.into();
        assert_eq!(k, Key::Index(5));
        let k: Key<String> = "a".into();
        assert_eq!(k, Key::Name("a".to_string()));
        assert!(Key::<String>::Index(0).is_index());
        assert!(!Key::name("a".to_string()).is_index());
    }
}
