//! ChainTable: bucket array of collision chains over a slotmap arena.
//!
//! Chains are singly linked through arena keys. Every entry caches the hash
//! it was inserted with, so relinking during a rehash never calls back into
//! `K: Hash`.

use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    hash: u64,
    next: Option<DefaultKey>,
}

/// Location of a matched entry within its chain.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Position {
    slot: usize,
    prev: Option<DefaultKey>,
    pub(crate) key: DefaultKey,
}

/// Where a new entry should be appended: the slot and its current tail.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Vacancy {
    slot: usize,
    tail: Option<DefaultKey>,
}

pub(crate) enum Probe {
    Occupied(Position),
    Vacant(Vacancy),
}

#[inline]
fn slot_of(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

pub(crate) struct ChainTable<K, V> {
    heads: Vec<Option<DefaultKey>>,
    entries: SlotMap<DefaultKey, Entry<K, V>>,
}

impl<K, V> ChainTable<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "chain table needs at least one bucket");
        Self {
            heads: vec![None; capacity],
            entries: SlotMap::with_key(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Scans the chain `hash` maps to, head to tail, stopping at the first
    /// entry whose cached hash equals `hash` and whose key satisfies `is_match`.
    pub(crate) fn probe<F>(&self, hash: u64, mut is_match: F) -> Probe
    where
        F: FnMut(&K) -> bool,
    {
        let slot = slot_of(hash, self.capacity());
        let mut prev = None;
        let mut cur = self.heads[slot];
        while let Some(k) = cur {
            let entry = &self.entries[k];
            if entry.hash == hash && is_match(&entry.key) {
                return Probe::Occupied(Position { slot, prev, key: k });
            }
            prev = Some(k);
            cur = entry.next;
        }
        Probe::Vacant(Vacancy { slot, tail: prev })
    }

    pub(crate) fn find<F>(&self, hash: u64, is_match: F) -> Option<Position>
    where
        F: FnMut(&K) -> bool,
    {
        match self.probe(hash, is_match) {
            Probe::Occupied(pos) => Some(pos),
            Probe::Vacant(_) => None,
        }
    }

    /// Appends a new entry at the tail of the vacancy's chain.
    pub(crate) fn append(&mut self, vacancy: Vacancy, hash: u64, key: K, value: V) -> DefaultKey {
        let k = self.entries.insert(Entry {
            key,
            value,
            hash,
            next: None,
        });
        match vacancy.tail {
            Some(tail) => self.entries[tail].next = Some(k),
            None => self.heads[vacancy.slot] = Some(k),
        }
        k
    }

    /// Unlinks the entry at `pos` and returns its owned key and value.
    pub(crate) fn unlink(&mut self, pos: Position) -> (K, V) {
        let entry = self
            .entries
            .remove(pos.key)
            .unwrap_or_else(|| unreachable!("chain links a dead arena key"));
        match pos.prev {
            Some(prev) => self.entries[prev].next = entry.next,
            None => self.heads[pos.slot] = entry.next,
        }
        (entry.key, entry.value)
    }

    pub(crate) fn entry(&self, k: DefaultKey) -> &Entry<K, V> {
        &self.entries[k]
    }

    pub(crate) fn entry_mut(&mut self, k: DefaultKey) -> &mut Entry<K, V> {
        &mut self.entries[k]
    }

    /// Rebuilds the bucket array at `new_capacity`. Old slots are walked in
    /// ascending order and each chain head to tail; every entry is relinked
    /// at the tail of its new chain, so entries sharing a new slot keep their
    /// relative order. Entries are never moved in the arena.
    pub(crate) fn rehash(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity > 0, "chain table needs at least one bucket");
        let old_heads = std::mem::replace(&mut self.heads, vec![None; new_capacity]);
        let mut tails: Vec<Option<DefaultKey>> = vec![None; new_capacity];
        for head in old_heads {
            let mut cur = head;
            while let Some(k) = cur {
                let entry = &mut self.entries[k];
                cur = entry.next.take();
                let slot = slot_of(entry.hash, new_capacity);
                match tails[slot] {
                    Some(tail) => self.entries[tail].next = Some(k),
                    None => self.heads[slot] = Some(k),
                }
                tails[slot] = Some(k);
            }
        }
    }

    /// Visits every entry mutably in slot order, then chain order.
    pub(crate) fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        for slot in 0..self.heads.len() {
            let mut cur = self.heads[slot];
            while let Some(k) = cur {
                let entry = &mut self.entries[k];
                f(&entry.key, &mut entry.value);
                cur = entry.next;
            }
        }
    }

    /// Panics unless every entry is reachable exactly once and sits in the
    /// slot its cached hash maps to.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert!(self.capacity() > 0);
        let mut reachable = 0;
        for (slot, head) in self.heads.iter().enumerate() {
            let mut cur = *head;
            while let Some(k) = cur {
                let entry = &self.entries[k];
                assert_eq!(slot_of(entry.hash, self.capacity()), slot);
                reachable += 1;
                assert!(reachable <= self.len(), "chain cycle or stray entry");
                cur = entry.next;
            }
        }
        assert_eq!(reachable, self.len());
    }

    pub(crate) fn iter(&self) -> ChainIter<'_, K, V> {
        ChainIter {
            table: self,
            slot: 0,
            cur: None,
            remaining: self.len(),
        }
    }
}

/// Walks the table in slot order, then chain order.
pub(crate) struct ChainIter<'a, K, V> {
    table: &'a ChainTable<K, V>,
    slot: usize,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for ChainIter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let entry = &self.table.entries[k];
                self.cur = entry.next;
                self.remaining -= 1;
                return Some(entry);
            }
            if self.slot >= self.table.heads.len() {
                return None;
            }
            self.cur = self.table.heads[self.slot];
            self.slot += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for ChainIter<'a, K, V> {}

impl<'a, K, V> Clone for ChainIter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            slot: self.slot,
            cur: self.cur,
            remaining: self.remaining,
        }
    }
}
