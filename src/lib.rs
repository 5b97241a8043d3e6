//! # Hybrid Map: Dense, Sparse, and Named Storage Behind One Interface
//!
//! This crate provides [`HybridMap`], a container that unifies a contiguous
//! array, a sparse integer-keyed map, and a non-integer-keyed map behind a
//! single key-based interface with transparent migration between them.
//!
//! ## Key Features
//!
//! - **Hybrid Storage**: Contiguous integer keys live in a dense `Vec`;
//!   detached integer keys live in a sorted sparse map; non-integer keys
//!   live in an insertion-ordered random region
//! - **Transparent Migration**: Values promote to dense storage as gaps
//!   close and demote to sparse storage as gaps open, with no change in
//!   observable behavior
//! - **Negative-Key Policies**: End-relative addressing with strict or
//!   lenient out-of-range handling, or fully literal (possibly negative)
//!   integer keys, switchable at runtime with guarded transitions
//! - **Array and Map Idioms Together**: push/pop/shift/unshift and
//!   sort/reverse/rotate next to keyed lookup, scoped deletion, slicing,
//!   and set algebra
//! - **Configurable Defaults**: A default value or a default rule answers
//!   reads of missing keys
//! - **Bulk Loading**: The [`MergeSource`] capability probe merges slices,
//!   maps, pair lists, and other containers
//!
//! ## Quick Start
//!
//! ```rust
//! use hybrid_map::{HybridMap, Scope};
//!
//! let mut map: HybridMap<String, &str> = HybridMap::new();
//!
//! // Array-style usage: contiguous keys stay dense
//! map.push(["zero", "one"]);
//! assert_eq!(map.len_in(Scope::Dense), 2);
//!
//! // Sparse integer keys and named keys coexist
//! map.set(5, "five")?;
//! map.set("label", "named")?;
//! assert_eq!(map.get(5)?, Some(&"five"));
//! assert_eq!(map.get("label")?, Some(&"named"));
//! assert_eq!(map.len_in(Scope::Sparse), 1);
//!
//! // Filling the gap promotes everything into the dense run
//! map.set(2, "two")?;
//! map.set(3, "three")?;
//! map.set(4, "four")?;
//! assert_eq!(map.len_in(Scope::Dense), 6);
//! assert_eq!(map.len_in(Scope::Sparse), 0);
//!
//! // Negative keys address from the end by default
//! assert_eq!(map.get(-1)?, Some(&"five"));
//! # Ok::<(), hybrid_map::HybridError>(())
//! ```
//!
//! ## Negative-Key Modes
//!
//! | Mode | Negative key handling |
//! |------|----------------------|
//! | [`NegativeMode::Error`] | end-relative; out of range fails |
//! | [`NegativeMode::Ignore`] | end-relative; out of range degrades to defaults/no-ops |
//! | [`NegativeMode::Actual`] | literal; negative keys are ordinary keys |
//!
//! Switching away from `Actual` while negative keys are in use is refused;
//! see [`HybridMap::set_negative_mode`].

#![warn(missing_docs)]

pub mod compose;
pub mod error;
pub mod iter;
pub mod key;
pub mod macros;
pub mod map;
pub mod merge;

pub use error::{HybridError, Result};
pub use iter::Scope;
pub use key::{Key, NegativeMode};
pub use map::{DefaultRule, HybridMap, HybridMapBuilder};
pub use merge::MergeSource;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_surface() {
        let mut map: HybridMap<String, i32> = HybridMap::new();
        map.push([1, 2, 3]);
        map.set("x", 9).unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map.len_in(Scope::Random), 1);
        assert_eq!(map.negative_mode(), NegativeMode::Error);
        let key: Key<String> = 0.into();
        assert_eq!(map.get(key).unwrap(), Some(&1));
    }
}
