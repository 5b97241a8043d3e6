//! Property-based tests for the storage-migration and boundary-tracking
//! invariants: whatever sequence of operations runs, the dense run stays
//! maximal, the sparse region stays strictly detached from it, and the key
//! bounds match the keys actually in use.

use hybrid_map::{HybridMap, Key, NegativeMode, Scope};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

type Map = HybridMap<String, i32>;

#[derive(Debug, Clone)]
enum Op {
    Set(i64, i32),
    DeleteAt(i64),
    UnsetAt(i64),
    Push(i32),
    Unshift(i32),
    Shift,
    Pop,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0i64..32, -100i32..100).prop_map(|(key, value)| Op::Set(key, value)),
        (0i64..32).prop_map(Op::DeleteAt),
        (0i64..32).prop_map(Op::UnsetAt),
        (-100i32..100).prop_map(Op::Push),
        (-100i32..100).prop_map(Op::Unshift),
        Just(Op::Shift),
        Just(Op::Pop),
    ]
}

fn apply(map: &mut Map, op: &Op) {
    match op {
        Op::Set(key, value) => map.set(*key, *value).unwrap(),
        Op::DeleteAt(key) => {
            map.delete_at(*key).unwrap();
        }
        Op::UnsetAt(key) => {
            map.unset_at(*key).unwrap();
        }
        Op::Push(value) => map.push([*value]),
        Op::Unshift(value) => map.unshift([*value]),
        Op::Shift => {
            map.shift().unwrap();
        }
        Op::Pop => {
            map.pop().unwrap();
        }
    }
}

fn int_keys(map: &Map) -> Vec<i64> {
    map.keys(Scope::Ints)
        .into_iter()
        .map(|key| match key {
            Key::Index(i) => i,
            Key::Name(_) => unreachable!("integer scope yielded a name key"),
        })
        .collect()
}

fn check_invariants(map: &Map) -> std::result::Result<(), TestCaseError> {
    // the dense run is maximal: no sparse key extends or overlaps it
    let dense_end = map.dense_values().len() as i64;
    for key in map.sparse_entries().keys() {
        prop_assert!(
            *key > dense_end,
            "sparse key {} overlaps or extends a dense run ending at {}",
            key,
            dense_end
        );
    }
    let keys = int_keys(map);
    match (keys.first(), keys.last()) {
        (Some(min), Some(max)) => {
            prop_assert_eq!(map.first_key(), *min);
            prop_assert_eq!(map.next_key(), *max + 1);
        }
        _ => {
            prop_assert_eq!(map.first_key(), 0);
            prop_assert_eq!(map.next_key(), 0);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_regions_stay_normalized(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut map = Map::new();
        for op in &ops {
            apply(&mut map, op);
            check_invariants(&map)?;
        }
    }

    #[test]
    fn prop_get_after_set(
        ops in prop::collection::vec(op_strategy(), 0..32),
        key in 0i64..32,
        value in -100i32..100,
    ) {
        let mut map = Map::new();
        for op in &ops {
            apply(&mut map, op);
        }
        map.set(key, value).unwrap();
        prop_assert_eq!(map.get(key).unwrap(), Some(&value));
    }

    #[test]
    fn prop_unshift_shift_round_trip(
        base in prop::collection::vec(-100i32..100, 0..8),
        gap in 1i64..8,
        prefix in prop::collection::vec(-100i32..100, 1..5),
    ) {
        let mut map = Map::new();
        map.push(base.iter().copied());
        map.set(base.len() as i64 + gap, 999).unwrap();
        let before = map.pairs(Scope::Ints);

        map.unshift(prefix.iter().copied());
        let returned = map.shift_n(prefix.len());

        prop_assert_eq!(returned, prefix);
        prop_assert_eq!(map.pairs(Scope::Ints), before);
    }

    #[test]
    fn prop_delete_removes_one_and_closes_ranks(
        values in prop::collection::vec(-100i32..100, 1..16),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut map = Map::new();
        map.push(values.iter().copied());
        let position = pick.index(values.len());

        let removed = map.delete_at(position as i64).unwrap();
        prop_assert_eq!(removed, Some(values[position]));

        let mut expected = values.clone();
        expected.remove(position);
        prop_assert_eq!(map.dense_values(), expected);
        prop_assert_eq!(map.next_key(), values.len() as i64 - 1);
    }

    #[test]
    fn prop_actual_unshift_extends_downward(
        base in prop::collection::vec(-100i32..100, 0..8),
        prefix in prop::collection::vec(-100i32..100, 1..5),
    ) {
        let mut map = Map::new();
        map.set_negative_mode(NegativeMode::Actual);
        map.push(base.iter().copied());

        map.unshift(prefix.iter().copied());
        prop_assert_eq!(map.first_key(), -(prefix.len() as i64));
        for (offset, value) in prefix.iter().enumerate() {
            let key = map.first_key() + offset as i64;
            prop_assert_eq!(map.get(key).unwrap(), Some(value));
        }
        for (offset, value) in base.iter().enumerate() {
            prop_assert_eq!(map.get(offset as i64).unwrap(), Some(value));
        }
    }

    #[test]
    fn prop_rebuild_preserves_value_order(
        ops in prop::collection::vec(op_strategy(), 0..32),
    ) {
        let mut map = Map::new();
        for op in &ops {
            apply(&mut map, op);
        }
        let values = map.values(Scope::Ints);
        map.reindex();
        prop_assert_eq!(map.dense_values(), values);
        prop_assert!(map.sparse_entries().is_empty());
    }

    #[test]
    fn prop_sort_yields_sorted_permutation(
        ops in prop::collection::vec(op_strategy(), 0..32),
    ) {
        let mut map = Map::new();
        for op in &ops {
            apply(&mut map, op);
        }
        let mut expected = map.values(Scope::Ints);
        expected.sort();
        map.sort();
        prop_assert_eq!(map.dense_values(), expected);
    }

    #[test]
    fn prop_delete_value_removes_all_matches(
        ops in prop::collection::vec(op_strategy(), 0..32),
        target in -100i32..100,
    ) {
        let mut map = Map::new();
        for op in &ops {
            apply(&mut map, op);
        }
        map.delete_value(Scope::Ints, &target);
        prop_assert_eq!(map.count_value(Scope::Ints, &target), 0);
        check_invariants(&map)?;
    }
}
