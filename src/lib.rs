//! chain-hashmap: a single-threaded, separate-chaining hash map with
//! load-factor driven growth and shrinkage.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative container whose resize behavior is fully
//!   specified and observable, for caches and dispatch tables keyed by
//!   paths or small integers.
//! - Layers:
//!   - ChainTable<K, V>: bucket array of chain heads plus a slotmap arena
//!     that owns every entry. Chains link entries by arena key.
//!   - ChainHashMap<K, V, S>: public API. Owns the hasher, the
//!     `ResizePolicy` and a debug-only reentrancy guard, and decides when
//!     the table rehashes.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` through the reentrancy guard.
//! - One arena slot per entry; rehashing relinks entries in place and never
//!   moves or reallocates them.
//! - Capacity is always at least the policy's initial capacity (default 4).
//! - Updating an existing key keeps the first stored key.
//!
//! Resize rules
//! - `set`: if `len >= capacity / 2` before the call, capacity doubles.
//! - `remove`: if `len == capacity / 2` before the call, capacity halves,
//!   clamped to the initial capacity. By default the check runs even when
//!   the key is absent; `ResizePolicy::with_shrink_on_miss(false)` limits it
//!   to removals that will succeed.
//! - Rehash walks old slots in ascending order and each chain head to tail,
//!   appending to the tail of the new chains, so entries sharing a new slot
//!   keep their relative order.
//!
//! Hasher and rehashing invariants
//! - Each entry stores the `u64` hash it was inserted with. Rehashing uses
//!   the stored hash and never calls `K: Hash` or `K: Eq`.
//! - Probing compares the stored hash before calling `K: Eq`.
//!
//! Reentrancy policy
//! - Every public method that runs `K: Hash`/`K: Eq` holds the guard while
//!   it walks a chain; nested entry panics in debug builds.
//! - `for_each` callbacks run without the guard, so they may read the map.
//!   Mutation from a callback is rejected by the borrow checker.
//!
//! Iteration order
//! - Slot order, then chain order. Stable while the map is unmodified;
//!   otherwise unspecified.

mod chain_map;
#[cfg(test)]
mod chain_map_proptest;
mod chain_table;
pub mod hashers;
mod policy;
mod reentrancy;

// Public surface
pub use chain_map::{ChainHashMap, Iter, Keys, Values};
pub use hashers::{IdentityBuildHasher, IdentityHasher};
pub use policy::{
    PolicyError, ResizePolicy, DEFAULT_INITIAL_CAPACITY, GROWTH_FACTOR, SHRINK_FACTOR,
};
