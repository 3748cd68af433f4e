#![cfg(test)]

// Property tests for IntMap, checked against std::collections::HashMap.

use crate::error::MapError;
use crate::int_map::IntMap;
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations shrink toward earlier keys and shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, u64),
    Remove(usize),
    Get(usize),
    Contains(u64),
    Mutate(usize, u64),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<u64>, Vec<Op>)> {
    // Mix small keys with extremes so sign-extended canonical keys show up.
    let key = prop_oneof![0u64..16, Just(u64::MAX), Just(u64::MAX - 1), any::<u64>()];
    proptest::collection::vec(key, 1..=8).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<u64>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![proptest::sample::select(pool.clone()), any::<u64>()]
                .prop_map(Op::Contains),
            1 => (idx, any::<u64>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Iterate),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Invariants exercised across random operation sequences:
// - `insert` overwrites and returns the model's previous value; new keys are
//   refused with `MapError::Full` exactly when the model is at the limit.
// - `get`/`contains_key` parity with the model for pool and random keys.
// - `remove` returns the model's value and the key becomes absent.
// - `iter` yields each live entry once; `len`/`is_empty` parity after each op.
fn check<S>(
    mut sut: IntMap<u64, S>,
    limit: Option<usize>,
    pool: &[u64],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone + Default,
{
    let mut model: HashMap<u64, u64> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i];
                let full = limit.is_some_and(|l| model.len() >= l) && !model.contains_key(&k);
                match sut.insert(k, v) {
                    Ok(prev) => {
                        prop_assert!(!full, "insert must fail when full");
                        prop_assert_eq!(prev, model.insert(k, v));
                    }
                    Err(MapError::Full { limit: l }) => {
                        prop_assert!(full, "full error only for new keys at the limit");
                        prop_assert_eq!(Some(l), limit);
                    }
                }
            }
            Op::Remove(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(&k));
                prop_assert!(!sut.contains_key(k));
            }
            Op::Get(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.get(k), model.get(&k));
            }
            Op::Contains(k) => {
                prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
            }
            Op::Mutate(i, d) => {
                let k = pool[i];
                match (sut.get_mut(k), model.get_mut(&k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence must match the model"),
                }
            }
            Op::Iterate => {
                let s: BTreeSet<(u64, u64)> = sut.iter().map(|(k, v)| (k, *v)).collect();
                let m: BTreeSet<(u64, u64)> = model.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(s.len(), sut.len());
                prop_assert_eq!(s, m);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        check(IntMap::new(), None, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_bounded((pool, ops) in arb_scenario(), limit in 1usize..=4) {
        check(IntMap::with_capacity_and_limit(limit, Some(limit)), Some(limit), &pool, ops)?;
    }
}

// Collision variant: a constant hasher forces every key into one bucket so
// equality probing does all the work.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        check(IntMap::with_hasher(ConstBuildHasher), None, &pool, ops)?;
    }
}
