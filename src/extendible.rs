//! Extendible hashing with multi-key buckets.
//!
//! The table keeps a directory of `2^global_depth` entries, each naming a
//! bucket. A key is addressed by the low `global_depth` bits of its hash. A
//! bucket with local depth `d` is shared by every directory entry whose low
//! `d` bits equal the bucket's id, so the directory can grow without touching
//! any bucket and a full bucket can split without touching the rest of the
//! table.
//!
//! Buckets live in an arena owned by the table and the directory stores arena
//! indices. Aliased directory entries therefore never own anything, and each
//! bucket is dropped exactly once together with the table.

use alloc::vec::Vec;
use core::fmt::Debug;

use rand::Rng;

use crate::DEFAULT_MAX_TABLE_SIZE;
use crate::error::InsertError;
use crate::hasher::H1;
use crate::hasher::IntHasher;

/// The low `depth` bits of `hash`. Depths of 64 and above keep every bit.
#[inline(always)]
fn low_bits(hash: u64, depth: u32) -> u64 {
    hash & 1u64.checked_shl(depth).map_or(u64::MAX, |bit| bit - 1)
}

/// A fixed-capacity group of keys sharing the low `depth` bits of their hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    id: usize,
    depth: u32,
    keys: Vec<u64>,
}

impl Bucket {
    fn with_capacity(id: usize, depth: u32, bucket_size: usize) -> Self {
        Self {
            id,
            depth,
            keys: Vec::with_capacity(bucket_size),
        }
    }

    /// The hash bits every key in this bucket shares; also the first
    /// directory slot referring to it.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The number of hash bits this bucket distinguishes (its local depth).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The keys held, in insertion order.
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the bucket holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Record of a random swap, enough to put the evicted key back.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Swap {
    pub(crate) bucket: usize,
    pub(crate) position: usize,
    pub(crate) evicted: u64,
}

/// A set of `u64` keys stored with extendible hashing.
///
/// # Examples
///
/// ```rust
/// use grow_hash::ExtendibleBucketTable;
///
/// let mut table = ExtendibleBucketTable::with_bucket_size(2);
/// for key in 0..100 {
///     assert!(table.insert(key));
/// }
/// assert!(!table.insert(50));
///
/// assert_eq!(table.len(), 100);
/// assert!(table.bucket_count() >= 50);
/// assert_eq!(table.directory_len(), 1 << table.global_depth());
/// assert!(table.lookup(99));
/// assert!(!table.lookup(100));
/// ```
#[derive(Clone)]
pub struct ExtendibleBucketTable {
    directory: Vec<usize>,
    buckets: Vec<Bucket>,
    global_depth: u32,
    bucket_size: usize,
    populated: usize,
    limit: usize,
    hasher: IntHasher,
}

impl Debug for ExtendibleBucketTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        // Each bucket's contents are shown once, at the first slot naming it.
        let rows = self
            .directory()
            .enumerate()
            .map(|(slot, bucket)| {
                let mut row = format!("{:>9} | {:<9}", slot, bucket.id);
                if bucket.id == slot {
                    row.push_str(" [");
                    for position in 0..self.bucket_size {
                        match bucket.keys.get(position) {
                            Some(key) => row.push_str(&format!(" {key}")),
                            None => row.push_str(" -"),
                        }
                    }
                    row.push_str(" ]");
                }
                row
            })
            .collect::<Vec<String>>();

        f.debug_struct("ExtendibleBucketTable")
            .field("directory", &rows)
            .field("global_depth", &self.global_depth)
            .field("bucket_size", &self.bucket_size)
            .field("populated", &self.populated)
            .finish()
    }
}

impl ExtendibleBucketTable {
    /// Creates an empty table holding up to `bucket_size` keys per bucket,
    /// hashing with [`H1`].
    ///
    /// The directory starts with a single entry (global depth 0).
    ///
    /// # Panics
    ///
    /// Panics if `bucket_size` is zero.
    pub fn with_bucket_size(bucket_size: usize) -> Self {
        Self::with_hasher(bucket_size, H1)
    }

    /// Creates an empty table using `hasher` to address keys.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_size` is zero.
    pub fn with_hasher(bucket_size: usize, hasher: IntHasher) -> Self {
        Self::with_limit(bucket_size, hasher, DEFAULT_MAX_TABLE_SIZE)
    }

    /// Creates an empty table whose directory refuses to grow past `limit`
    /// entries.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_size` or `limit` is zero.
    pub fn with_limit(bucket_size: usize, hasher: IntHasher, limit: usize) -> Self {
        assert!(bucket_size > 0, "bucket size must be at least one");
        assert!(limit > 0, "table limit must be at least one");

        Self {
            directory: alloc::vec![0],
            buckets: alloc::vec![Bucket::with_capacity(0, 0, bucket_size)],
            global_depth: 0,
            bucket_size,
            populated: 0,
            limit,
            hasher,
        }
    }

    #[inline(always)]
    fn slot(&self, hash: u64) -> usize {
        (hash as usize) & (self.directory.len() - 1)
    }

    #[inline(always)]
    fn bucket_index(&self, hash: u64) -> usize {
        self.directory[self.slot(hash)]
    }

    /// Returns `true` if `key` is in the table.
    ///
    /// Only the bucket `key` addresses is searched.
    pub fn lookup(&self, key: u64) -> bool {
        self.bucket_for(key).keys.contains(&key)
    }

    /// Returns `true` if the bucket `key` addresses has a free position.
    pub fn has_space(&self, key: u64) -> bool {
        self.bucket_for(key).keys.len() < self.bucket_size
    }

    /// Inserts `key`, returning `true` if it was not already present.
    ///
    /// Returns `false` both for duplicates and when the table could not grow;
    /// use [`try_insert`](Self::try_insert) to tell the two apart.
    pub fn insert(&mut self, key: u64) -> bool {
        match self.try_insert(key) {
            Ok(inserted) => inserted,
            Err(err) => {
                warn!("extendible table rejected key {key}: {err}");
                false
            }
        }
    }

    /// Inserts `key`, splitting buckets and doubling the directory as needed.
    ///
    /// Returns `Ok(false)` without modifying the table if `key` is already
    /// present. On error the table is unchanged: the number of splits needed
    /// is worked out, checked against the limit and allocated for before any
    /// bucket is touched.
    pub fn try_insert(&mut self, key: u64) -> Result<bool, InsertError> {
        if self.lookup(key) {
            return Ok(false);
        }

        self.insert_new(key)?;
        Ok(true)
    }

    /// Inserts a key known to be absent.
    pub(crate) fn insert_new(&mut self, key: u64) -> Result<(), InsertError> {
        debug_assert!(!self.lookup(key));

        let hash = self.hasher.hash(key);
        let splits = self.splits_needed(hash)?;
        if splits > 0 {
            let mut spare = self.reserve_splits(hash, splits)?;
            while let Some(keys) = spare.pop() {
                self.split(self.bucket_index(hash), keys);
            }
        }

        let index = self.bucket_index(hash);
        let bucket = &mut self.buckets[index];
        debug_assert!(bucket.keys.len() < self.bucket_size);
        bucket.keys.push(key);
        self.populated += 1;
        Ok(())
    }

    /// Counts the splits required before the bucket addressed by `hash` has
    /// room.
    ///
    /// After `n` splits the addressed bucket has depth `depth + n` and keeps
    /// exactly the keys that agree with `hash` on that many low bits, so the
    /// answer is the first depth at which fewer than `bucket_size` keys agree.
    fn splits_needed(&self, hash: u64) -> Result<u32, InsertError> {
        let bucket = &self.buckets[self.bucket_index(hash)];
        if bucket.keys.len() < self.bucket_size {
            return Ok(0);
        }

        let max_depth = self.limit.ilog2();
        let mut depth = bucket.depth;
        loop {
            depth += 1;
            if depth > max_depth {
                let requested = 1usize.checked_shl(depth).unwrap_or(usize::MAX);
                warn!(
                    "extendible table needs {requested} directory entries (limit {})",
                    self.limit
                );
                return Err(InsertError::CapacityExceeded {
                    requested,
                    limit: self.limit,
                });
            }

            let target = low_bits(hash, depth);
            let agreeing = bucket
                .keys
                .iter()
                .filter(|&&key| low_bits(self.hasher.hash(key), depth) == target)
                .count();
            if agreeing < self.bucket_size {
                return Ok(depth - bucket.depth);
            }
        }
    }

    /// Allocates everything `splits` consecutive splits of the bucket
    /// addressed by `hash` will need, returning one key buffer per split.
    fn reserve_splits(&mut self, hash: u64, splits: u32) -> Result<Vec<Vec<u64>>, InsertError> {
        let final_depth = self.buckets[self.bucket_index(hash)].depth + splits;
        let global_depth = self.global_depth.max(final_depth);
        let directory_len = 1usize << global_depth;

        self.directory
            .try_reserve_exact(directory_len - self.directory.len())
            .map_err(InsertError::allocation(directory_len))?;
        self.buckets
            .try_reserve(splits as usize)
            .map_err(InsertError::allocation(directory_len))?;

        let mut spare = Vec::new();
        spare
            .try_reserve_exact(splits as usize)
            .map_err(InsertError::allocation(directory_len))?;
        for _ in 0..splits {
            let mut keys = Vec::new();
            keys.try_reserve_exact(self.bucket_size)
                .map_err(InsertError::allocation(directory_len))?;
            spare.push(keys);
        }
        Ok(spare)
    }

    /// Doubles the directory; each new entry aliases the entry `len` below it.
    fn double_directory(&mut self) {
        self.directory.extend_from_within(..);
        self.global_depth += 1;
        debug!(
            "extendible directory doubled to {} entries",
            self.directory.len()
        );
    }

    /// Splits bucket `index` into itself and a sibling whose id has the
    /// next hash bit set, using `keys` as the sibling's storage.
    fn split(&mut self, index: usize, mut keys: Vec<u64>) {
        if self.buckets[index].depth == self.global_depth {
            self.double_directory();
        }

        let hasher = self.hasher;
        let old = &mut self.buckets[index];
        let bit = 1usize << old.depth;
        let id = old.id | bit;
        old.depth += 1;
        let depth = old.depth;

        keys.extend(
            old.keys
                .extract_if(.., |key| (hasher.hash(*key) as usize & bit) != 0),
        );

        let sibling = self.buckets.len();
        self.buckets.push(Bucket { id, depth, keys });
        for prefix in 0..(1usize << (self.global_depth - depth)) {
            self.directory[id | (prefix << depth)] = sibling;
        }

        debug!("extendible bucket {} split at depth {depth}, new sibling {id}", id ^ bit);
    }

    /// Replaces a uniformly chosen key of the bucket `key` addresses with
    /// `key`, returning the key that was replaced.
    ///
    /// This is a single cuckoo displacement step at bucket granularity. The
    /// key count does not change and no duplicate check is made.
    ///
    /// # Panics
    ///
    /// Panics if the addressed bucket is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grow_hash::ExtendibleBucketTable;
    /// use rand::SeedableRng;
    /// use rand::rngs::SmallRng;
    ///
    /// let mut rng = SmallRng::seed_from_u64(7);
    /// let mut table = ExtendibleBucketTable::with_bucket_size(1);
    /// table.insert(1);
    ///
    /// let evicted = table.rand_swap(2, &mut rng);
    /// assert_eq!(evicted, 1);
    /// assert!(table.lookup(2));
    /// assert!(!table.lookup(1));
    /// ```
    pub fn rand_swap<R: Rng + ?Sized>(&mut self, key: u64, rng: &mut R) -> u64 {
        self.swap_random(key, rng).evicted
    }

    pub(crate) fn swap_random<R: Rng + ?Sized>(&mut self, key: u64, rng: &mut R) -> Swap {
        let bucket = self.bucket_index(self.hasher.hash(key));
        let keys = &mut self.buckets[bucket].keys;
        assert!(!keys.is_empty(), "cannot swap into an empty bucket");

        let position = rng.random_range(0..keys.len());
        let evicted = core::mem::replace(&mut keys[position], key);
        Swap {
            bucket,
            position,
            evicted,
        }
    }

    /// Undoes a [`swap_random`](Self::swap_random), as long as nothing else
    /// has changed since.
    pub(crate) fn undo_swap(&mut self, swap: Swap) {
        self.buckets[swap.bucket].keys[swap.position] = swap.evicted;
    }

    /// Returns the number of keys in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of key positions across all buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len() * self.bucket_size
    }

    /// Number of bits of the hash used to index the directory.
    pub fn global_depth(&self) -> u32 {
        self.global_depth
    }

    /// Number of directory entries, always `2^global_depth`.
    pub fn directory_len(&self) -> usize {
        self.directory.len()
    }

    /// Maximum number of keys per bucket.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Number of distinct buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the maximum number of directory entries.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The bucket `key` addresses.
    pub fn bucket_for(&self, key: u64) -> &Bucket {
        &self.buckets[self.bucket_index(self.hasher.hash(key))]
    }

    /// Every distinct bucket, in creation order.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> + '_ {
        self.buckets.iter()
    }

    /// The bucket behind each directory entry, in slot order. Buckets with a
    /// local depth below the global depth appear more than once.
    pub fn directory(&self) -> impl Iterator<Item = &Bucket> + '_ {
        self.directory.iter().map(|&index| &self.buckets[index])
    }

    /// Returns an iterator over the stored keys, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.buckets.iter().flat_map(|bucket| bucket.keys.iter().copied())
    }

    /// Histogram of local depths, one entry per distinct bucket.
    #[cfg(any(test, feature = "stats"))]
    pub fn depth_histogram(&self) -> crate::stats::Histogram {
        let mut hist = crate::stats::Histogram::new("local depth");
        for bucket in &self.buckets {
            hist.record(bucket.depth as usize);
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::stats::DebugStats {
        crate::stats::DebugStats::new(
            self.populated,
            self.buckets.len() * self.bucket_size,
            self.directory.len(),
            self.buckets.len(),
            0,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::vec::Vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    /// Hashes every key to itself.
    pub(crate) const IDENTITY: IntHasher = IntHasher::new(1, 0, u64::MAX);

    /// Checks the directory routing and bookkeeping invariants.
    pub(crate) fn assert_invariants(table: &ExtendibleBucketTable) {
        assert_eq!(table.directory.len(), 1 << table.global_depth);
        assert!(table.directory.len() <= table.limit);

        let mut references = alloc::vec![0usize; table.buckets.len()];
        for (slot, &index) in table.directory.iter().enumerate() {
            let bucket = &table.buckets[index];
            assert!(bucket.depth <= table.global_depth, "{:#?}", table);
            assert_eq!(
                slot as u64 & ((1u64 << bucket.depth) - 1),
                bucket.id as u64,
                "slot {slot} routed to bucket {} of depth {}: {:#?}",
                bucket.id,
                bucket.depth,
                table
            );
            references[index] += 1;
        }

        let mut total = 0;
        for (index, bucket) in table.buckets.iter().enumerate() {
            assert_eq!(
                references[index],
                1 << (table.global_depth - bucket.depth),
                "{:#?}",
                table
            );
            assert!(bucket.keys.len() <= table.bucket_size);
            assert_eq!(table.directory[bucket.id], index);
            for &key in &bucket.keys {
                assert_eq!(table.bucket_index(table.hasher.hash(key)), index);
            }
            total += bucket.keys.len();
        }
        assert_eq!(total, table.populated);
    }

    #[test]
    fn insert_and_lookup() {
        let mut table = ExtendibleBucketTable::with_bucket_size(4);
        for k in 0..256u64 {
            assert!(table.insert(k), "{:#?}", table);
            assert!(table.lookup(k), "{:#?}", table);
        }
        assert_eq!(table.len(), 256);
        for k in 0..256u64 {
            assert!(table.lookup(k));
        }
        assert!(!table.lookup(256));
        assert_invariants(&table);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut table = ExtendibleBucketTable::with_bucket_size(1);
        assert!(table.insert(5));
        assert!(table.insert(6));
        let buckets = table.bucket_count();

        assert_eq!(table.try_insert(5), Ok(false));
        assert_eq!(table.try_insert(6), Ok(false));
        assert_eq!(table.len(), 2);
        assert_eq!(table.bucket_count(), buckets);
    }

    #[test]
    fn starts_with_single_bucket() {
        let table = ExtendibleBucketTable::with_bucket_size(3);
        assert_eq!(table.global_depth(), 0);
        assert_eq!(table.directory_len(), 1);
        assert_eq!(table.bucket_count(), 1);
        assert!(table.has_space(12345));
        assert!(table.is_empty());
        assert_invariants(&table);
    }

    #[test]
    fn colliding_low_bit_doubles_twice() {
        let mut table = ExtendibleBucketTable::with_bucket_size(1);
        let first = 0u64;
        let first_hash = H1.hash(first);
        // Same lowest bit, different second bit.
        let second = (1u64..)
            .find(|&k| {
                let hash = H1.hash(k);
                (hash & 1) == (first_hash & 1) && (hash & 2) != (first_hash & 2)
            })
            .unwrap();

        assert!(table.insert(first));
        assert_eq!(table.global_depth(), 0);
        assert!(table.insert(second));
        assert_eq!(table.global_depth(), 2);
        assert_eq!(table.directory_len(), 4);
        assert_eq!(table.bucket_count(), 3);

        assert!(table.lookup(first));
        assert!(table.lookup(second));
        assert_ne!(table.bucket_for(first).id(), table.bucket_for(second).id());
        assert_eq!(table.bucket_for(first).keys(), &[first]);
        assert_eq!(table.bucket_for(second).keys(), &[second]);
        assert_invariants(&table);
    }

    #[test]
    fn repeated_split_until_room() {
        let mut table = ExtendibleBucketTable::with_hasher(2, IDENTITY);
        assert!(table.insert(0));
        assert!(table.insert(2));
        assert!(!table.has_space(4));

        // 0, 2 and 4 agree on the lowest bit, so one split is not enough.
        assert!(table.insert(4));
        assert_eq!(table.global_depth(), 2);
        assert_eq!(table.bucket_count(), 3);

        let directory: Vec<(usize, u32)> = table
            .directory()
            .map(|bucket| (bucket.id(), bucket.depth()))
            .collect();
        assert_eq!(directory, [(0, 2), (1, 1), (2, 2), (1, 1)]);
        assert_eq!(table.bucket_for(0).keys(), &[0, 4]);
        assert_eq!(table.bucket_for(2).keys(), &[2]);
        assert!(table.bucket_for(1).is_empty());
        assert_invariants(&table);
    }

    #[test]
    fn split_without_directory_growth() {
        let mut table = ExtendibleBucketTable::with_hasher(1, IDENTITY);
        for key in [0, 1, 2] {
            assert!(table.insert(key));
        }
        // Bucket 1 has depth 1 while the directory has depth 2.
        assert_eq!(table.global_depth(), 2);
        assert_eq!(table.bucket_for(1).depth(), 1);

        assert!(table.insert(3));
        assert_eq!(table.global_depth(), 2);
        assert_eq!(table.bucket_for(1).depth(), 2);
        assert_eq!(table.bucket_for(3).depth(), 2);
        assert_eq!(table.bucket_count(), 4);
        assert_invariants(&table);
    }

    #[test]
    fn capacity_exceeded_leaves_table_unchanged() {
        let mut table = ExtendibleBucketTable::with_limit(1, IDENTITY, 8);
        assert!(table.insert(0));
        assert!(table.insert(4));
        assert_eq!(table.global_depth(), 3);
        let before = table.clone();

        // 0 and 8 agree on the low three bits.
        assert_eq!(
            table.try_insert(8),
            Err(InsertError::CapacityExceeded {
                requested: 16,
                limit: 8
            })
        );
        assert!(!table.insert(8));
        assert_eq!(table.directory, before.directory);
        assert_eq!(table.buckets, before.buckets);
        assert_eq!(table.len(), 2);
        assert!(!table.lookup(8));

        // Keys that fit within the limit still go in.
        assert!(table.insert(1));
        assert_invariants(&table);
    }

    #[test]
    fn identical_hashes_fail_instead_of_looping() {
        let constant = IntHasher::new(0, 9, 17);
        let mut table = ExtendibleBucketTable::with_limit(2, constant, 1 << 10);
        assert!(table.insert(1));
        assert!(table.insert(2));
        assert_eq!(
            table.try_insert(3),
            Err(InsertError::CapacityExceeded {
                requested: 1 << 11,
                limit: 1 << 10
            })
        );
        assert_eq!(table.global_depth(), 0);
        assert_eq!(table.bucket_count(), 1);
        assert_invariants(&table);
    }

    #[test]
    fn rand_swap_replaces_a_bucket_member() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut table = ExtendibleBucketTable::with_hasher(4, IDENTITY);
        for key in [0, 8, 16] {
            assert!(table.insert(key));
        }
        assert!(table.has_space(24));

        let evicted = table.rand_swap(24, &mut rng);
        assert!([0, 8, 16].contains(&evicted));
        assert!(table.lookup(24));
        assert!(!table.lookup(evicted));
        assert_eq!(table.len(), 3);
        assert_invariants(&table);
    }

    #[test]
    fn rand_swap_is_reproducible() {
        let build = || {
            let mut table = ExtendibleBucketTable::with_hasher(8, IDENTITY);
            for key in 0..8u64 {
                table.insert(key * 2);
            }
            table
        };

        let mut a = build();
        let mut b = build();
        let mut rng_a = SmallRng::seed_from_u64(3);
        let mut rng_b = SmallRng::seed_from_u64(3);
        for key in 100..120u64 {
            assert_eq!(
                a.rand_swap(key * 2, &mut rng_a),
                b.rand_swap(key * 2, &mut rng_b)
            );
        }
    }

    #[test]
    fn undo_swap_restores_bucket() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut table = ExtendibleBucketTable::with_hasher(2, IDENTITY);
        table.insert(0);
        table.insert(2);
        let before = table.clone();

        let swap = table.swap_random(4, &mut rng);
        assert!(table.lookup(4));
        table.undo_swap(swap);
        assert_eq!(table.buckets, before.buckets);
    }

    #[test]
    #[should_panic]
    fn rand_swap_into_empty_bucket_panics() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut table = ExtendibleBucketTable::with_bucket_size(1);
        table.rand_swap(1, &mut rng);
    }

    #[test]
    #[should_panic]
    fn zero_bucket_size_panics() {
        let _ = ExtendibleBucketTable::with_bucket_size(0);
    }

    #[test]
    fn stats_track_buckets() {
        let mut table = ExtendibleBucketTable::with_hasher(1, IDENTITY);
        for key in 0..8u64 {
            table.insert(key);
        }
        let stats = table.debug_stats();
        assert_eq!(stats.populated, 8);
        assert_eq!(stats.storage_units, 8);
        assert_eq!(stats.addressable, 8);
        assert_eq!(stats.load_factor, 1.0);
        assert_eq!(table.depth_histogram().bins(), &[0, 0, 0, 8]);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn insert_many_random() {
        let mut rng = SmallRng::seed_from_u64(0xe47);
        // Single-key buckets split until every pair of keys differs, so keep
        // that run small.
        for (bucket_size, count) in [(1usize, 1_000), (4, 20_000), (16, 20_000)] {
            let mut table = ExtendibleBucketTable::with_bucket_size(bucket_size);
            let keys: Vec<u64> = (0..count).map(|_| rng.random::<u64>()).collect();

            let mut inserted = 0;
            for (i, &k) in keys.iter().enumerate() {
                if table.insert(k) {
                    inserted += 1;
                }
                if i % 5_000 == 0 {
                    assert_invariants(&table);
                }
            }
            assert_eq!(table.len(), inserted);
            for &k in &keys {
                assert!(table.lookup(k));
            }
            assert_eq!(table.iter().count(), inserted);
            assert_invariants(&table);
        }
    }
}
