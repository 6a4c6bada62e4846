//! Hasher for small integer keys such as enum discriminants.

use core::hash::{BuildHasher, Hasher};

/// Returns a single integer write unchanged; further writes are folded in
/// with a polynomial step (`h * 31 + x`), so composite and byte-string keys
/// still hash deterministically.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHasher {
    state: u64,
}

impl IdentityHasher {
    #[inline]
    fn fold(&mut self, x: u64) {
        self.state = self.state.wrapping_mul(31).wrapping_add(x);
    }
}

impl Hasher for IdentityHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.fold(u64::from(b));
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.fold(u64::from(i));
    }

    fn write_u16(&mut self, i: u16) {
        self.fold(u64::from(i));
    }

    fn write_u32(&mut self, i: u32) {
        self.fold(u64::from(i));
    }

    fn write_u64(&mut self, i: u64) {
        self.fold(i);
    }

    fn write_usize(&mut self, i: usize) {
        self.fold(i as u64);
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

/// `BuildHasher` for [`IdentityHasher`]. Use it for tables keyed by small
/// integers or fieldless enums where the key already spreads over the slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityBuildHasher;

impl BuildHasher for IdentityBuildHasher {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher::default()
    }
}
