use proptest::prelude::*;
use std::collections::BTreeSet;

/// Distinct team ids, in no particular order
pub fn team_ids_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::btree_set(1i64..=10_000, 0..300)
        .prop_map(|ids: BTreeSet<i64>| ids.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

/// Teams with a cohort count on either side of the threshold
pub fn team_population_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
    team_ids_strategy().prop_flat_map(|ids| {
        let len = ids.len();
        (Just(ids), prop::collection::vec(0i64..=100, len))
            .prop_map(|(ids, counts)| ids.into_iter().zip(counts).collect())
    })
}

pub fn page_size_strategy() -> impl Strategy<Value = usize> {
    1usize..=150
}

pub fn batch_size_strategy() -> impl Strategy<Value = usize> {
    1usize..=60
}
