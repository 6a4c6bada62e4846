#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can check
// the bucket array directly after every operation.

use crate::chain_map::ChainHashMap;
use crate::policy::ResizePolicy;
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so failing cases shrink toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Set(usize, i32),
    Get(usize),
    GetMut(usize, i32),
    Remove(usize),
    RemoveEntry(usize),
    Contains(String),
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
            1 => idx.clone().prop_map(Op::Get),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::GetMut(i, d)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::RemoveEntry),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(Op::Contains),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S: BuildHasher>(
    mut sut: ChainHashMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let floor = sut.policy().initial_capacity();
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Set(i, v) => {
                let k = key_from(pool, i);
                let prev = sut.set(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            Op::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            Op::GetMut(i, d) => {
                let k = key_from(pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "get_mut mismatch: {:?} vs {:?}", s, m),
                }
            }
            Op::Remove(i) => {
                let k = key_from(pool, i);
                let removed = sut.remove(&k);
                prop_assert_eq!(removed, model.remove(&k).is_some());
                prop_assert!(sut.get(&k).is_none());
            }
            Op::RemoveEntry(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove_entry(&k), model.remove_entry(&k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(s.as_str()));
            }
            Op::Iterate => {
                // Each live entry exactly once, and the order is repeatable.
                let first: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let mut second = Vec::new();
                sut.for_each(|k, v| second.push((k.clone(), *v)));
                prop_assert_eq!(&first, &second);
                let seen: BTreeMap<Key, i32> = first.into_iter().collect();
                prop_assert_eq!(seen.len(), sut.len());
                let expected: BTreeMap<Key, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen, expected);
            }
        }

        sut.table_for_tests().assert_consistent();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity() >= floor);
    }
    Ok(())
}

// Property: state-machine equivalence against hashbrown::HashMap.
// Invariants exercised across random operation sequences:
// - `set` returns the previous value exactly when the model had one.
// - `get`/`get_mut`/`contains_key` parity with the model.
// - `remove` reports presence; `remove_entry` returns the owned pair.
// - iteration yields each live entry once, in a repeatable order.
// - after every op: every chained entry sits in its hash slot, `len` equals
//   the number of reachable entries, and capacity never drops below the floor.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ChainHashMap::new(), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_strict_shrink((pool, ops) in arb_scenario()) {
        let policy = ResizePolicy::new().with_shrink_on_miss(false);
        run_scenario(ChainHashMap::with_policy(policy), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_unit_floor((pool, ops) in arb_scenario()) {
        let policy = ResizePolicy::new().with_initial_capacity(1).unwrap();
        run_scenario(ChainHashMap::with_policy(policy), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
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

// Property: same invariants under worst-case collisions, where every entry
// shares one chain and only `Eq` tells keys apart.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(ChainHashMap::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Key whose Hash only looks at the first byte: many partial collisions.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Prefix(String);
impl Hash for Prefix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_bytes().first().hash(state);
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_resize_transparency(raw in proptest::collection::vec("[a-d]{1,6}", 1..200)) {
        let mut m: ChainHashMap<Prefix, usize> = ChainHashMap::new();
        let words: Vec<String> = raw
            .into_iter()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        for (i, w) in words.iter().enumerate() {
            prop_assert!(m.set(Prefix(w.clone()), i).is_none());
        }
        m.table_for_tests().assert_consistent();
        prop_assert_eq!(m.len(), words.len());
        for (i, w) in words.iter().enumerate() {
            prop_assert_eq!(m.get(&Prefix(w.clone())), Some(&i));
        }
        for w in &words {
            prop_assert!(m.remove(&Prefix(w.clone())));
            m.table_for_tests().assert_consistent();
        }
        prop_assert!(m.is_empty());
    }
}
