//! ChainHashMap: public separate-chaining map with load-factor resizing.

use crate::chain_table::{ChainIter, ChainTable, Probe};
use crate::policy::{PolicyError, ResizePolicy};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Hash map whose buckets are singly-linked collision chains.
///
/// - `set` grows the bucket array (x2) when it is half full, `remove` halves
///   it at exactly half load, never below the policy's initial capacity.
/// - Updating an existing key replaces the value and keeps the key that was
///   stored first; the key passed to that `set` is dropped.
/// - Iteration order is slot order, then insertion order within a chain. It
///   is stable while the map is not modified and otherwise unspecified.
pub struct ChainHashMap<K, V, S = RandomState> {
    hasher: S,
    table: ChainTable<K, V>,
    policy: ResizePolicy,
    reentrancy: DebugReentrancy,
}

impl<K, V> ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_policy(policy: ResizePolicy) -> Self {
        Self::with_policy_and_hasher(policy, Default::default())
    }

    /// Builds a map whose initial capacity (and shrink floor) is `capacity`.
    pub fn with_initial_capacity(capacity: usize) -> Result<Self, PolicyError> {
        let policy = ResizePolicy::new().with_initial_capacity(capacity)?;
        Ok(Self::with_policy(policy))
    }
}

impl<K, V> Default for ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_policy_and_hasher(ResizePolicy::new(), hasher)
    }

    pub fn with_policy_and_hasher(policy: ResizePolicy, hasher: S) -> Self {
        Self {
            hasher,
            table: ChainTable::with_capacity(policy.initial_capacity()),
            policy,
            reentrancy: DebugReentrancy::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn policy(&self) -> &ResizePolicy {
        &self.policy
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Inserts or updates `key`. Returns the previous value when the key was
    /// already present; in that case the stored key is kept and `key` is
    /// dropped.
    ///
    /// The growth check runs first, against the length before this call,
    /// whether or not the key turns out to be new.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        if let Some(target) = self
            .policy
            .grow_target(self.table.len(), self.table.capacity())
        {
            resize(&mut self.table, target);
        }

        let hash = self.hasher.hash_one(&key);
        match self.table.probe(hash, |k| *k == key) {
            Probe::Occupied(pos) => {
                let entry = self.table.entry_mut(pos.key);
                Some(core::mem::replace(&mut entry.value, value))
            }
            Probe::Vacant(vacancy) => {
                self.table.append(vacancy, hash, key, value);
                None
            }
        }
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    /// Returns the stored key (the one from the first `set`) and its value.
    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let pos = self.table.find(hash, |k| k.borrow() == q)?;
        let entry = self.table.entry(pos.key);
        Some((&entry.key, &entry.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.hasher.hash_one(q);
        let pos = self.table.find(hash, |k| k.borrow() == q)?;
        Some(&mut self.table.entry_mut(pos.key).value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.table.find(hash, |k| k.borrow() == q).is_some()
    }

    /// Removes `q`, returning whether it was present.
    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).is_some()
    }

    /// Removes `q` and hands back the stored key and value.
    ///
    /// The shrink check runs before the chain is scanned, against the length
    /// before this call. With `shrink_on_miss` (the default) it runs even when
    /// `q` is absent, so a failed removal may still rehash.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.hasher.hash_one(q);
        let (len, capacity) = (self.table.len(), self.table.capacity());
        if self.policy.shrink_triggered(len, capacity) {
            let present = self.policy.shrink_on_miss()
                || self.table.find(hash, |k| k.borrow() == q).is_some();
            if present {
                match self.policy.shrink_target(capacity) {
                    Some(target) => resize(&mut self.table, target),
                    None => tracing::trace!(capacity, len, "shrink suppressed at capacity floor"),
                }
            }
        }

        let pos = self.table.find(hash, |k| k.borrow() == q)?;
        Some(self.table.unlink(pos))
    }

    /// Calls `visit` on every entry in iteration order.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for entry in self.table.iter() {
            visit(&entry.key, &entry.value);
        }
    }

    /// Like `for_each`, with mutable access to values.
    pub fn for_each_mut<F>(&mut self, visit: F)
    where
        F: FnMut(&K, &mut V),
    {
        self.table.for_each_mut(visit);
    }

    #[cfg(test)]
    pub(crate) fn table_for_tests(&self) -> &ChainTable<K, V> {
        &self.table
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.table.iter(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { it: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { it: self.iter() }
    }
}

fn resize<K, V>(table: &mut ChainTable<K, V>, target: usize) {
    tracing::debug!(
        from = table.capacity(),
        to = target,
        len = table.len(),
        "rehashing chain table"
    );
    table.rehash(target);
}

/// Iterator over `(&K, &V)` in slot order, then chain order.
pub struct Iter<'a, K, V> {
    it: ChainIter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            it: self.it.clone(),
        }
    }
}

pub struct Keys<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct Values<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> fmt::Debug for ChainHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.table.iter().map(|e| (&e.key, &e.value)))
            .finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}
