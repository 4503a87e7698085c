/// An integer hash of the form `(multiplier * key + increment) mod modulus`.
///
/// The product is computed in 128 bits so it never overflows, and the result
/// is always strictly below `modulus`. Callers reduce it further modulo their
/// own table size (or mask off its low bits) to obtain an index.
///
/// This is a cheap mixing function, not a collision-resistant one: keys that
/// differ by a multiple of `modulus` always collide.
///
/// # Examples
///
/// ```rust
/// use grow_hash::H1;
///
/// assert_eq!(H1.hash(0), 639_360_243);
/// assert!(H1.hash(u64::MAX) < H1.modulus());
/// assert_eq!(H1.index(1, 4), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntHasher {
    multiplier: u64,
    increment: u64,
    modulus: u64,
}

/// The first hash function: `(885390553 * k + 639360243) mod 2147483629`.
pub const H1: IntHasher = IntHasher::new(885_390_553, 639_360_243, 2_147_483_629);

/// The second hash function: `(853977193 * k + 306837493) mod 2147483563`.
pub const H2: IntHasher = IntHasher::new(853_977_193, 306_837_493, 2_147_483_563);

impl IntHasher {
    /// Creates a hasher from its affine constants.
    ///
    /// # Panics
    ///
    /// Panics if `modulus` is zero.
    pub const fn new(multiplier: u64, increment: u64, modulus: u64) -> Self {
        assert!(modulus != 0, "hash modulus must be non-zero");
        Self {
            multiplier,
            increment,
            modulus,
        }
    }

    /// Hashes `key` to a value in `0..modulus`.
    #[inline(always)]
    pub const fn hash(&self, key: u64) -> u64 {
        let mixed = self.multiplier as u128 * key as u128 + self.increment as u128;
        (mixed % self.modulus as u128) as u64
    }

    /// Hashes `key` and reduces it to an index into an array of `size` slots.
    ///
    /// `size` must be non-zero.
    #[inline(always)]
    pub fn index(&self, key: u64, size: usize) -> usize {
        debug_assert!(size != 0);
        (self.hash(key) % size as u64) as usize
    }

    /// Exclusive upper bound of [`hash`](Self::hash).
    pub const fn modulus(&self) -> u64 {
        self.modulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_outputs() {
        assert_eq!(H1.hash(0), 639_360_243);
        assert_eq!(H1.hash(1), 1_524_750_796);
        assert_eq!(H1.hash(42), 1_318_541_776);
        assert_eq!(H2.hash(0), 306_837_493);
        assert_eq!(H2.hash(1), 1_160_814_686);
        assert_eq!(H2.hash(42), 1_814_142_591);
    }

    #[test]
    fn wide_keys_do_not_overflow() {
        assert_eq!(H1.hash(u64::MAX), 505_168_967);
        assert_eq!(H2.hash(u64::MAX), 512_632_004);
        assert_eq!(H1.hash(i64::MAX as u64), 1_203_311_143);
        assert_eq!(H2.hash(i64::MAX as u64), 2_130_229_715);
    }

    #[test]
    fn outputs_stay_below_modulus() {
        for key in (0..10_000u64).chain(u64::MAX - 10_000..=u64::MAX) {
            assert!(H1.hash(key) < H1.modulus());
            assert!(H2.hash(key) < H2.modulus());
        }
    }

    #[test]
    fn index_reduces_by_size() {
        for size in [1usize, 2, 3, 4, 7, 1024] {
            for key in 0..100u64 {
                let index = H1.index(key, size);
                assert!(index < size);
                assert_eq!(index as u64, H1.hash(key) % size as u64);
            }
        }
    }

    #[test]
    fn degenerate_hasher_is_constant() {
        let constant = IntHasher::new(0, 5, 7);
        for key in 0..32u64 {
            assert_eq!(constant.hash(key), 5);
        }
    }

    #[test]
    #[should_panic]
    fn zero_modulus_is_rejected() {
        let _ = IntHasher::new(1, 1, 0);
    }
}
