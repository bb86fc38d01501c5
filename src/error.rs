use thiserror::Error;

/// Errors reported by table construction and by [`Cursor`] operations.
///
/// A missing key is never an error: lookups return `None` and removals of
/// absent keys are no-ops.
///
/// [`Cursor`]: crate::Cursor
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// A table was requested with fewer than one bucket.
    #[error("capacity must be at least 1, got {requested}")]
    InvalidCapacity {
        /// The rejected capacity.
        requested: usize,
    },
    /// The requested capacity has no power of two representable in `usize`.
    #[error("capacity {requested} cannot be rounded up to a power of two")]
    CapacityOverflow {
        /// The rejected capacity.
        requested: usize,
    },
    /// The table was structurally modified after the cursor was created, by
    /// something other than the cursor's own `remove_current`.
    #[error("table modified during iteration (expected generation {expected}, found {found})")]
    ConcurrentModification {
        /// Generation recorded by the cursor.
        expected: u64,
        /// Generation of the table at the time of the check.
        found: u64,
    },
    /// `next` was called on a cursor with no entries left.
    #[error("cursor has no remaining entries")]
    NoSuchElement,
    /// `remove_current` was called before `next`, or twice for one entry.
    #[error("no current entry to remove")]
    IllegalState,
    /// The cursor was handed a table other than the one that created it.
    /// Clones count as other tables.
    #[error("cursor used with a table it was not created from")]
    ForeignTable,
}
