use core::fmt::Debug;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use smallvec::SmallVec;

use crate::DEFAULT_MAX_TABLE_SIZE;
use crate::cuckoo::Side;
use crate::error::InsertError;
use crate::extendible::ExtendibleBucketTable;
use crate::extendible::Swap;
use crate::hasher::H1;
use crate::hasher::H2;
use crate::hasher::IntHasher;

/// Seed of the eviction RNG used by [`HybridTable::new`] and friends, so that
/// two identically built tables end up with identical layouts.
pub const DEFAULT_SEED: u64 = 0x6879_6272_6964;

/// A set of `u64` keys split across two extendible tables.
///
/// Each key lives in exactly one of the two inner tables: the first hashes
/// with `H1`, the second with `H2`. An insert targets the emptier side. When
/// the addressed bucket is full, a random key of that bucket is evicted to
/// the other side, up to `floor(log2(total directory entries))` times, before
/// falling back to an ordinary bucket split.
///
/// # Examples
///
/// ```rust
/// use grow_hash::HybridTable;
/// use grow_hash::Side;
///
/// let mut table = HybridTable::new();
/// for key in 0..500 {
///     assert!(table.insert(key));
/// }
/// assert!(!table.insert(42));
///
/// assert_eq!(table.len(), 500);
/// assert_eq!(table.len_of(Side::First) + table.len_of(Side::Second), 500);
/// assert!(table.lookup(499));
/// assert!(!table.lookup(500));
/// ```
#[derive(Clone)]
pub struct HybridTable<R = SmallRng> {
    sides: [ExtendibleBucketTable; 2],
    rng: R,
}

impl<R> Debug for HybridTable<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HybridTable")
            .field("first", &self.sides[0])
            .field("second", &self.sides[1])
            .finish_non_exhaustive()
    }
}

impl Default for HybridTable<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl HybridTable<SmallRng> {
    /// Creates an empty table with single-key buckets.
    pub fn new() -> Self {
        Self::with_bucket_size(1)
    }

    /// Creates an empty table holding up to `bucket_size` keys per bucket.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_size` is zero.
    pub fn with_bucket_size(bucket_size: usize) -> Self {
        Self::with_limit(bucket_size, DEFAULT_MAX_TABLE_SIZE)
    }

    /// Creates an empty table whose two directories each refuse to grow past
    /// `limit` entries.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_size` or `limit` is zero.
    pub fn with_limit(bucket_size: usize, limit: usize) -> Self {
        Self::with_hashers(
            bucket_size,
            limit,
            H1,
            H2,
            SmallRng::seed_from_u64(DEFAULT_SEED),
        )
    }
}

impl<R: Rng> HybridTable<R> {
    /// Creates an empty table choosing evictions with `rng`.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_size` is zero.
    pub fn with_rng(bucket_size: usize, rng: R) -> Self {
        Self::with_hashers(bucket_size, DEFAULT_MAX_TABLE_SIZE, H1, H2, rng)
    }

    /// Creates an empty table with explicit hash functions for each side.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_size` or `limit` is zero.
    pub fn with_hashers(
        bucket_size: usize,
        limit: usize,
        first: IntHasher,
        second: IntHasher,
        rng: R,
    ) -> Self {
        Self {
            sides: [
                ExtendibleBucketTable::with_limit(bucket_size, first, limit),
                ExtendibleBucketTable::with_limit(bucket_size, second, limit),
            ],
            rng,
        }
    }

    /// Returns `true` if `key` is in either inner table.
    pub fn lookup(&self, key: u64) -> bool {
        self.sides.iter().any(|side| side.lookup(key))
    }

    /// Inserts `key`, returning `true` if it was not already present.
    ///
    /// Returns `false` both for duplicates and when the table could not grow;
    /// use [`try_insert`](Self::try_insert) to tell the two apart.
    pub fn insert(&mut self, key: u64) -> bool {
        match self.try_insert(key) {
            Ok(inserted) => inserted,
            Err(err) => {
                warn!("hybrid table rejected key {key}: {err}");
                false
            }
        }
    }

    /// Inserts `key`, evicting keys between the two sides and splitting
    /// buckets as needed.
    ///
    /// Returns `Ok(false)` without modifying the table if `key` is already
    /// present. If the final split fails, the evictions made by this call are
    /// undone before the error is returned.
    pub fn try_insert(&mut self, key: u64) -> Result<bool, InsertError> {
        if self.lookup(key) {
            return Ok(false);
        }

        let mut side = if self.sides[0].len() <= self.sides[1].len() {
            Side::First
        } else {
            Side::Second
        };
        let threshold = self.kick_threshold();
        let mut journal: SmallVec<[(Side, Swap); 16]> = SmallVec::new();
        let mut current = key;

        while journal.len() < threshold && !self.sides[side.index()].has_space(current) {
            let swap = self.sides[side.index()].swap_random(current, &mut self.rng);
            journal.push((side, swap));
            current = swap.evicted;
            side = side.flip();
        }

        if let Err(err) = self.sides[side.index()].insert_new(current) {
            warn!(
                "hybrid insert of {key} failed after {} evictions, rolling back",
                journal.len()
            );
            for (side, swap) in journal.into_iter().rev() {
                self.sides[side.index()].undo_swap(swap);
            }
            return Err(err);
        }

        Ok(true)
    }

    /// `floor(log2)` of the directory entries of both sides together.
    fn kick_threshold(&self) -> usize {
        (self.sides[0].directory_len() + self.sides[1].directory_len()).ilog2() as usize
    }
}

impl<R> HybridTable<R> {
    /// Returns the number of keys in the table.
    pub fn len(&self) -> usize {
        self.sides[0].len() + self.sides[1].len()
    }

    /// Returns `true` if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of keys stored in one side.
    pub fn len_of(&self, side: Side) -> usize {
        self.sides[side.index()].len()
    }

    /// Returns the number of key positions across both sides.
    pub fn capacity(&self) -> usize {
        self.sides[0].capacity() + self.sides[1].capacity()
    }

    /// Returns the maximum number of directory entries of each side.
    pub fn limit(&self) -> usize {
        self.sides[0].limit()
    }

    /// Borrows one of the inner tables.
    pub fn side(&self, side: Side) -> &ExtendibleBucketTable {
        &self.sides[side.index()]
    }

    /// Returns an iterator over the stored keys, first side first.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.sides.iter().flat_map(|side| side.iter())
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Keys living in the second side count as displaced.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::stats::DebugStats {
        let [first, second] = &self.sides;
        crate::stats::DebugStats::new(
            self.len(),
            self.capacity(),
            first.directory_len() + second.directory_len(),
            first.bucket_count() + second.bucket_count(),
            second.len(),
        )
    }
}
