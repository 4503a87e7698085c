use alloc::collections::TryReserveError;

/// The reason an insertion failed.
///
/// Inserting a key that is already present is not an error; `try_insert`
/// reports it as `Ok(false)`. Whenever one of these errors is returned the
/// table is left exactly as it was before the call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    /// Making room for the key required growing past the table's limit.
    #[error("growing to {requested} slots would exceed the table limit of {limit}")]
    CapacityExceeded {
        /// The size the table needed to grow to.
        requested: usize,
        /// The configured maximum size.
        limit: usize,
    },

    /// The allocator could not provide storage for the grown table.
    #[error("failed to allocate storage for {requested} slots")]
    AllocationFailure {
        /// The size the table was trying to grow to.
        requested: usize,
    },
}

impl InsertError {
    pub(crate) fn allocation(requested: usize) -> impl FnOnce(TryReserveError) -> Self {
        move |_| InsertError::AllocationFailure { requested }
    }
}
