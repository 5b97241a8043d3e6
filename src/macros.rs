//! Literal construction macro

/// Construct a [`HybridMap`](crate::HybridMap) from literal contents.
///
/// Positional values list first and land at keys 0, 1, ...; keyed entries
/// follow after a `;`, each written `key => value`. Integer keys in the
/// literal must be in range for the default negative mode.
///
/// ```rust
/// use hybrid_map::hybrid_map;
///
/// let map = hybrid_map![10, 20; 5 => 50, "name" => 99];
/// assert_eq!(map.get(0).unwrap(), Some(&10));
/// assert_eq!(map.get(5).unwrap(), Some(&50));
/// assert_eq!(map.get("name").unwrap(), Some(&99));
/// ```
#[macro_export]
macro_rules! hybrid_map {
    () => {
        $crate::HybridMap::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut map = $crate::HybridMap::new();
        map.push([$($value),+]);
        map
    }};
    ($($value:expr),* ; $($key:expr => $keyed:expr),+ $(,)?) => {{
        let mut map = $crate::HybridMap::new();
        $(map.push([$value]);)*
        $(map.set($key, $keyed).expect("invalid literal key");)+
        map
    }};
}

#[cfg(test)]
mod tests {
    use crate::{HybridMap, Scope};

    #[test]
    fn test_empty_literal() {
        let map: HybridMap<String, i32> = hybrid_map![];
        assert!(map.is_empty());
    }

    #[test]
    fn test_positional_literal() {
        let map: HybridMap<String, i32> = hybrid_map![1, 2, 3];
        assert_eq!(map.dense_values(), vec![1, 2, 3]);
    }

    #[test]
    fn test_mixed_literal() {
        let map: HybridMap<String, i32> = hybrid_map![1, 2; 9 => 90, "a" => 100];
        assert_eq!(map.len_in(Scope::Dense), 2);
        assert_eq!(map.get(9).unwrap(), Some(&90));
        assert_eq!(map.get("a").unwrap(), Some(&100));
    }

    #[test]
    fn test_keyed_only_literal() {
        let map: HybridMap<String, i32> = hybrid_map![; 3 => 30, 4 => 40];
        assert_eq!(map.sparse_entries().len(), 2);
        assert_eq!(map.first_key(), 3);
    }
}
