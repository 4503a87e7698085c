use alloc::vec::Vec;
use core::fmt::Debug;

use crate::DEFAULT_MAX_TABLE_SIZE;
use crate::error::InsertError;
use crate::hasher::H1;
use crate::hasher::IntHasher;

/// How many slots to advance at a time while looking for a free slot.
const STEP: usize = 1;

enum Probe {
    Found,
    Vacant { index: usize },
    Full,
}

/// Walks the probe sequence of `key` over `slots`, visiting each slot at most
/// once.
#[inline]
fn probe(slots: &[Option<u64>], home: usize, key: u64) -> Probe {
    let size = slots.len();
    let mut index = home;
    for _ in 0..size {
        match slots[index] {
            None => return Probe::Vacant { index },
            Some(existing) if existing == key => return Probe::Found,
            Some(_) => index = (index + STEP) % size,
        }
    }

    Probe::Full
}

/// An open-addressing set of `u64` keys using linear probing.
///
/// Each key starts probing at `hash(key) mod capacity` and steps forward one
/// slot at a time, wrapping around, until it finds either itself or a free
/// slot. When a probe visits every slot without success the table doubles and
/// every key is rehashed into the new array.
///
/// # Examples
///
/// ```rust
/// use grow_hash::LinearProbeTable;
///
/// let mut table = LinearProbeTable::with_capacity(2);
/// assert!(table.insert(10));
/// assert!(table.insert(20));
/// assert!(table.insert(30));
/// assert!(!table.insert(20));
///
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.capacity(), 4);
/// assert!(table.lookup(30));
/// assert!(!table.lookup(40));
/// ```
#[derive(Clone)]
pub struct LinearProbeTable {
    slots: Vec<Option<u64>>,
    populated: usize,
    limit: usize,
    hasher: IntHasher,
}

impl Debug for LinearProbeTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::ToString;

        f.debug_struct("LinearProbeTable")
            .field(
                "slots",
                &self
                    .slots
                    .iter()
                    .map(|slot| match slot {
                        Some(key) => format!("{key}"),
                        None => "-".to_string(),
                    })
                    .collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("capacity", &self.slots.len())
            .finish()
    }
}

impl LinearProbeTable {
    /// Creates a table with `capacity` slots hashing with [`H1`].
    ///
    /// A capacity of zero is rounded up to one slot.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_limit(capacity, DEFAULT_MAX_TABLE_SIZE)
    }

    /// Creates a table that refuses to grow past `limit` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds `limit`.
    pub fn with_limit(capacity: usize, limit: usize) -> Self {
        Self::with_hasher(capacity, limit, H1)
    }

    /// Creates a table with an explicit hash function.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds `limit`.
    pub fn with_hasher(capacity: usize, limit: usize, hasher: IntHasher) -> Self {
        let capacity = capacity.max(1);
        assert!(
            capacity <= limit,
            "initial capacity {capacity} exceeds the table limit of {limit}"
        );

        Self {
            slots: alloc::vec![None; capacity],
            populated: 0,
            limit,
            hasher,
        }
    }

    /// Inserts `key`, returning `true` if it was not already present.
    ///
    /// Returns `false` both for duplicates and when the table could not grow;
    /// use [`try_insert`](Self::try_insert) to tell the two apart.
    pub fn insert(&mut self, key: u64) -> bool {
        match self.try_insert(key) {
            Ok(inserted) => inserted,
            Err(err) => {
                warn!("linear table rejected key {key}: {err}");
                false
            }
        }
    }

    /// Inserts `key`, growing the table if every slot is taken.
    ///
    /// Returns `Ok(false)` without modifying the table if `key` is already
    /// present. On error the table is unchanged.
    pub fn try_insert(&mut self, key: u64) -> Result<bool, InsertError> {
        loop {
            let home = self.hasher.index(key, self.slots.len());
            match probe(&self.slots, home, key) {
                Probe::Found => return Ok(false),
                Probe::Vacant { index } => {
                    self.slots[index] = Some(key);
                    self.populated += 1;
                    return Ok(true);
                }
                Probe::Full => self.grow()?,
            }
        }
    }

    /// Returns `true` if `key` is in the table.
    pub fn lookup(&self, key: u64) -> bool {
        let home = self.hasher.index(key, self.slots.len());
        matches!(probe(&self.slots, home, key), Probe::Found)
    }

    /// Doubles the slot array and rehashes every key into it.
    #[cold]
    fn grow(&mut self) -> Result<(), InsertError> {
        let size = self.slots.len();
        let requested = size.saturating_mul(2);
        if requested > self.limit {
            warn!(
                "linear table cannot grow from {size} to {requested} slots (limit {})",
                self.limit
            );
            return Err(InsertError::CapacityExceeded {
                requested,
                limit: self.limit,
            });
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(requested)
            .map_err(InsertError::allocation(requested))?;
        slots.resize(requested, None);

        // Every key is unique and there is at least one free slot per key, so
        // placement can skip the duplicate check and never fails.
        for key in self.slots.iter().flatten().copied() {
            let mut index = self.hasher.index(key, requested);
            while slots[index].is_some() {
                index = (index + STEP) % requested;
            }
            slots[index] = Some(key);
        }

        debug!("linear table grew from {size} to {requested} slots");
        self.slots = slots;
        Ok(())
    }

    /// Returns the number of keys in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the maximum number of slots the table may grow to.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the contents of every slot, in address order.
    pub fn slots(&self) -> &[Option<u64>] {
        &self.slots
    }

    /// Returns an iterator over the stored keys in slot order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Distance (in probe steps) between a key's home slot and where it sits.
    #[cfg(any(test, feature = "stats"))]
    fn probe_distance(&self, index: usize, key: u64) -> usize {
        let size = self.slots.len();
        let home = self.hasher.index(key, size);
        ((index + size - home) % size) / STEP
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Bin `n` counts the keys stored `n` steps past their home slot.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> crate::stats::Histogram {
        let mut hist = crate::stats::Histogram::new("probe length");
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(key) = *slot {
                hist.record(self.probe_distance(index, key));
            }
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::stats::DebugStats {
        let displaced = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|key| (index, key)))
            .filter(|&(index, key)| self.probe_distance(index, key) != 0)
            .count();

        crate::stats::DebugStats::new(
            self.populated,
            self.slots.len(),
            self.slots.len(),
            self.slots.len(),
            displaced,
        )
    }
}
