use alloc::vec::Vec;
use core::fmt::Debug;

use smallvec::SmallVec;

use crate::DEFAULT_MAX_TABLE_SIZE;
use crate::error::InsertError;
use crate::hasher::H1;
use crate::hasher::H2;
use crate::hasher::IntHasher;

/// Factor by which both inner tables grow when displacement does not
/// terminate. Must be an integer so that rehashing never collides.
const GROWTH_FACTOR: usize = 2;

/// Selects one of the two inner tables of a [`CuckooTable`] or
/// [`HybridTable`](crate::HybridTable).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The first table, hashed with the first hash function.
    First,
    /// The second table, hashed with the second hash function.
    Second,
}

impl Side {
    /// The other side.
    #[inline(always)]
    pub fn flip(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    #[inline(always)]
    pub(crate) fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

/// Number of kicks tolerated before both tables grow: `floor(log2(size)) + 1`.
#[inline]
fn kick_threshold(size: usize) -> usize {
    size.ilog2() as usize + 1
}

/// One reversible step of an insertion.
#[derive(Clone, Copy)]
enum Undo {
    /// `slot` of `side` held `previous` before the current key was written.
    Place {
        side: Side,
        slot: usize,
        previous: Option<u64>,
    },
    /// Both tables doubled.
    Grow,
}

/// A set of `u64` keys stored with two-table cuckoo hashing.
///
/// Every key lives either at `h1(key) mod size` in the first table or at
/// `h2(key) mod size` in the second, so a lookup probes exactly two slots. An
/// insertion that lands on an occupied slot evicts the occupant and moves it
/// to its slot in the other table, repeating until a free slot is found. When
/// the chain of evictions grows past `floor(log2(size)) + 1` kicks, or returns
/// to the inserted key in the first table, both tables double in lockstep and
/// the displacement resumes.
///
/// # Examples
///
/// ```rust
/// use grow_hash::CuckooTable;
///
/// let mut table = CuckooTable::with_capacity(4);
/// for key in 0..20 {
///     assert!(table.insert(key));
/// }
/// assert!(!table.insert(7));
///
/// assert_eq!(table.len(), 20);
/// assert!(table.capacity() >= 16);
/// assert!((0..20).all(|key| table.lookup(key)));
/// ```
#[derive(Clone)]
pub struct CuckooTable {
    tables: [Vec<Option<u64>>; 2],
    hashers: [IntHasher; 2],
    size: usize,
    populated: usize,
    limit: usize,
}

impl Debug for CuckooTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        let rows = (0..self.size)
            .map(|slot| {
                let show = |entry: &Option<u64>| match entry {
                    Some(key) => format!("{key}"),
                    None => String::from("-"),
                };
                format!(
                    "{:>9} | {} | {}",
                    slot,
                    show(&self.tables[0][slot]),
                    show(&self.tables[1][slot])
                )
            })
            .collect::<Vec<_>>();

        f.debug_struct("CuckooTable")
            .field("slots", &rows)
            .field("populated", &self.populated)
            .field("capacity", &self.size)
            .finish()
    }
}

impl CuckooTable {
    /// Creates a table whose two inner tables each hold `capacity` slots,
    /// hashing with [`H1`] and [`H2`].
    ///
    /// A capacity of zero is rounded up to one slot.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_limit(capacity, DEFAULT_MAX_TABLE_SIZE)
    }

    /// Creates a table whose inner tables refuse to grow past `limit` slots
    /// each.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds `limit`.
    pub fn with_limit(capacity: usize, limit: usize) -> Self {
        Self::with_hashers(capacity, limit, H1, H2)
    }

    /// Creates a table with explicit hash functions for each inner table.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds `limit`.
    pub fn with_hashers(
        capacity: usize,
        limit: usize,
        first: IntHasher,
        second: IntHasher,
    ) -> Self {
        let capacity = capacity.max(1);
        assert!(
            capacity <= limit,
            "initial capacity {capacity} exceeds the table limit of {limit}"
        );

        Self {
            tables: [alloc::vec![None; capacity], alloc::vec![None; capacity]],
            hashers: [first, second],
            size: capacity,
            populated: 0,
            limit,
        }
    }

    #[inline(always)]
    fn slot_of(&self, side: Side, key: u64) -> usize {
        self.hashers[side.index()].index(key, self.size)
    }

    /// Returns `true` if `key` is in either inner table.
    pub fn lookup(&self, key: u64) -> bool {
        [Side::First, Side::Second]
            .into_iter()
            .any(|side| self.tables[side.index()][self.slot_of(side, key)] == Some(key))
    }

    /// Inserts `key`, returning `true` if it was not already present.
    ///
    /// Returns `false` both for duplicates and when the table could not grow;
    /// use [`try_insert`](Self::try_insert) to tell the two apart.
    pub fn insert(&mut self, key: u64) -> bool {
        match self.try_insert(key) {
            Ok(inserted) => inserted,
            Err(err) => {
                warn!("cuckoo table rejected key {key}: {err}");
                false
            }
        }
    }

    /// Inserts `key`, displacing existing keys and growing as needed.
    ///
    /// Returns `Ok(false)` without modifying the table if `key` is already
    /// present. If a required doubling fails, every displacement and doubling
    /// performed by this call is undone before the error is returned.
    pub fn try_insert(&mut self, key: u64) -> Result<bool, InsertError> {
        if self.lookup(key) {
            return Ok(false);
        }

        let mut journal: SmallVec<[Undo; 16]> = SmallVec::new();
        let mut threshold = kick_threshold(self.size);
        let mut kicks = 0;
        let mut side = Side::First;
        let mut current = key;

        loop {
            let cycled = kicks != 0 && current == key && side == Side::First;
            if kicks > threshold || cycled {
                if cycled {
                    debug!("cuckoo displacement of {key} cycled after {kicks} kicks");
                }
                if let Err(err) = self.grow() {
                    self.rollback(&journal);
                    return Err(err);
                }
                journal.push(Undo::Grow);
                kicks = 0;
                threshold = kick_threshold(self.size);
            }

            let slot = self.slot_of(side, current);
            let previous = self.tables[side.index()][slot].replace(current);
            journal.push(Undo::Place {
                side,
                slot,
                previous,
            });

            match previous {
                None => break,
                Some(evicted) => {
                    kicks += 1;
                    current = evicted;
                    side = side.flip();
                }
            }
        }

        self.populated += 1;
        Ok(true)
    }

    /// Grows both inner tables by [`GROWTH_FACTOR`], moving only the keys
    /// whose slot changes.
    ///
    /// With `new = factor * old`, `hash mod new` is `hash mod old` plus a
    /// multiple of `old`, so relocated keys only ever land in the freshly added
    /// region and never collide.
    #[cold]
    fn grow(&mut self) -> Result<(), InsertError> {
        let old = self.size;
        let requested = old.saturating_mul(GROWTH_FACTOR);
        if requested > self.limit {
            warn!(
                "cuckoo table cannot grow from {old} to {requested} slots per table (limit {})",
                self.limit
            );
            return Err(InsertError::CapacityExceeded {
                requested,
                limit: self.limit,
            });
        }

        for table in &mut self.tables {
            table
                .try_reserve_exact(requested - old)
                .map_err(InsertError::allocation(requested))?;
        }

        self.size = requested;
        for (table, hasher) in self.tables.iter_mut().zip(self.hashers) {
            table.resize(requested, None);
            for slot in 0..old {
                if let Some(key) = table[slot] {
                    let target = hasher.index(key, requested);
                    if target != slot {
                        debug_assert!(table[target].is_none());
                        table[target] = table[slot].take();
                    }
                }
            }
        }

        debug!("cuckoo table grew from {old} to {requested} slots per table");
        Ok(())
    }

    /// Reverses a doubling performed by [`grow`](Self::grow).
    ///
    /// Only valid while the tables are exactly as `grow` left them.
    fn shrink(&mut self) {
        let old = self.size / GROWTH_FACTOR;
        for table in &mut self.tables {
            for slot in old..self.size {
                if let Some(key) = table[slot].take() {
                    debug_assert!(table[slot % old].is_none());
                    table[slot % old] = Some(key);
                }
            }
            table.truncate(old);
        }
        self.size = old;
    }

    fn rollback(&mut self, journal: &[Undo]) {
        warn!(
            "cuckoo table rolling back {} displacement steps",
            journal.len()
        );
        for step in journal.iter().rev() {
            match *step {
                Undo::Place {
                    side,
                    slot,
                    previous,
                } => self.tables[side.index()][slot] = previous,
                Undo::Grow => self.shrink(),
            }
        }
    }

    /// Returns the number of keys in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots in each inner table.
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Returns the maximum number of slots each inner table may grow to.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the contents of every slot of one inner table.
    pub fn slots(&self, side: Side) -> &[Option<u64>] {
        &self.tables[side.index()]
    }

    /// Returns an iterator over the stored keys, first table before second.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.tables.iter().flat_map(|table| table.iter().flatten().copied())
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Keys living in the second table count as displaced.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::stats::DebugStats {
        crate::stats::DebugStats::new(
            self.populated,
            self.size * 2,
            self.size * 2,
            self.size * 2,
            self.tables[1].iter().flatten().count(),
        )
    }
}
