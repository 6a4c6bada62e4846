//! Resize policy: initial capacity, growth and shrink triggers.

use thiserror::Error;

/// Number of buckets a map starts with unless configured otherwise.
pub const DEFAULT_INITIAL_CAPACITY: usize = 4;
/// Capacity multiplier applied when the table grows.
pub const GROWTH_FACTOR: usize = 2;
/// Capacity divisor applied when the table shrinks.
pub const SHRINK_FACTOR: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,
}

/// Controls when a `ChainHashMap` rehashes.
///
/// - Growth: before a `set`, if `len >= capacity / GROWTH_FACTOR`, the
///   capacity is multiplied by `GROWTH_FACTOR`.
/// - Shrink: before a `remove`, if `len == capacity / SHRINK_FACTOR`, the
///   capacity is divided by `SHRINK_FACTOR`, never going below the initial
///   capacity.
/// - `shrink_on_miss`: when `true` (the default) the shrink check runs even
///   if the key being removed turns out to be absent. When `false` it only
///   runs once the key is known to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePolicy {
    initial_capacity: usize,
    shrink_on_miss: bool,
}

impl ResizePolicy {
    pub const fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            shrink_on_miss: true,
        }
    }

    /// Sets the starting bucket count, which is also the shrink floor.
    pub fn with_initial_capacity(self, capacity: usize) -> Result<Self, PolicyError> {
        if capacity == 0 {
            return Err(PolicyError::ZeroCapacity);
        }
        Ok(Self {
            initial_capacity: capacity,
            ..self
        })
    }

    pub const fn with_shrink_on_miss(self, shrink_on_miss: bool) -> Self {
        Self {
            shrink_on_miss,
            ..self
        }
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn shrink_on_miss(&self) -> bool {
        self.shrink_on_miss
    }

    /// Capacity to grow to before inserting into a table holding `len`
    /// entries in `capacity` buckets, if any.
    pub(crate) fn grow_target(&self, len: usize, capacity: usize) -> Option<usize> {
        if len >= capacity / GROWTH_FACTOR {
            capacity.checked_mul(GROWTH_FACTOR)
        } else {
            None
        }
    }

    /// Whether the shrink trigger fires for `len` entries in `capacity` buckets.
    pub(crate) fn shrink_triggered(&self, len: usize, capacity: usize) -> bool {
        len == capacity / SHRINK_FACTOR
    }

    /// Capacity to shrink to, clamped to the floor. `None` once the floor
    /// has been reached.
    pub(crate) fn shrink_target(&self, capacity: usize) -> Option<usize> {
        let target = (capacity / SHRINK_FACTOR).max(self.initial_capacity);
        (target < capacity).then_some(target)
    }
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self::new()
    }
}
