#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[macro_use]
mod macros;

/// Affine-congruential integer hash functions shared by every table.
pub mod hasher;

/// Error type returned when a table cannot grow.
pub mod error;

/// Open-addressing table resolving collisions by linear probing.
///
/// Uses a single hash function and doubles (with a full rehash) whenever a
/// probe sequence wraps around the whole array without finding a free slot.
pub mod linear;

/// Two-table cuckoo hashing with lockstep doubling.
pub mod cuckoo;

pub mod extendible;

/// Extendible hashing combined with cuckoo-style displacement between two
/// directories.
pub mod hybrid;

/// Statistics snapshots used by the `stats` feature and the tests.
#[cfg(any(test, feature = "stats"))]
pub mod stats;

pub use cuckoo::CuckooTable;
pub use cuckoo::Side;
pub use error::InsertError;
pub use extendible::ExtendibleBucketTable;
pub use hasher::H1;
pub use hasher::H2;
pub use hasher::IntHasher;
pub use hybrid::HybridTable;
pub use linear::LinearProbeTable;

/// Upper bound on the number of slots (or directory entries) a table may grow
/// to unless a different limit is supplied at construction.
///
/// For [`CuckooTable`] the bound applies to each of the two inner arrays.
pub const DEFAULT_MAX_TABLE_SIZE: usize = 1 << 26;
