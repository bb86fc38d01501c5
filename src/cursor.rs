use core::fmt::Debug;
use core::ptr::NonNull;

use crate::error::TableError;
use crate::hash_table::HashTable;
use crate::hash_table::Link;
use crate::hash_table::Node;

enum Position<V> {
    /// Before the first bucket.
    Start,
    /// On `node`, linked in chain `bucket` right after `prev`.
    At {
        bucket: usize,
        prev: Link<V>,
        node: NonNull<Node<V>>,
    },
    /// The node after `prev` in chain `bucket` was removed through the
    /// cursor. `None` means it was the chain head.
    Removed { bucket: usize, prev: Link<V> },
}

impl<V> Clone for Position<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Position<V> {}

/// A fail-fast cursor over a [`HashTable`].
///
/// Unlike [`Iter`](crate::hash_table::Iter), a cursor does not borrow the
/// table between steps. Every operation is handed the table explicitly, so
/// the table can be mutated while the cursor is alive. The cursor records
/// the table's generation when it is created and checks it on every step:
/// any structural change that did not go through [`remove_current`] makes
/// the next step return [`TableError::ConcurrentModification`].
///
/// The cursor remembers the node it stands on, so each step costs O(1) no
/// matter how long the chain is. Handing it a table other than the one that
/// created it returns [`TableError::ForeignTable`].
///
/// [`remove_current`]: Cursor::remove_current
///
/// # Examples
///
/// ```rust
/// # use chain_hash::TableError;
/// # use chain_hash::hash_table::HashTable;
/// #
/// let mut table = HashTable::new();
/// for v in 0..6u64 {
///     table.entry(v, |&x| x == v).or_insert(v);
/// }
///
/// let mut cursor = table.cursor();
/// while cursor.has_next(&table)? {
///     if cursor.next(&table)? % 2 == 0 {
///         cursor.remove_current(&mut table)?;
///     }
/// }
/// assert_eq!(table.len(), 3);
///
/// // Mutating the table directly invalidates the cursor.
/// let cursor = table.cursor();
/// table.entry(10, |&x| x == 10).or_insert(10);
/// assert!(matches!(
///     cursor.has_next(&table),
///     Err(TableError::ConcurrentModification { .. })
/// ));
/// # Ok::<(), TableError>(())
/// ```
pub struct Cursor<V> {
    position: Position<V>,
    remaining: usize,
    generation: u64,
    table_id: u64,
}

// SAFETY: The remembered node pointers are only dereferenced through the
// table handed to each call, so the cursor itself shares nothing.
unsafe impl<V> Send for Cursor<V> {}
// SAFETY: See above.
unsafe impl<V> Sync for Cursor<V> {}

impl<V> Clone for Cursor<V> {
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            remaining: self.remaining,
            generation: self.generation,
            table_id: self.table_id,
        }
    }
}

impl<V> Debug for Cursor<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cursor")
            .field("remaining", &self.remaining)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<V> Cursor<V> {
    pub(crate) fn new(table: &HashTable<V>) -> Self {
        Self {
            position: Position::Start,
            remaining: table.len(),
            generation: table.generation(),
            table_id: table.id(),
        }
    }

    /// Returns the number of entries not yet yielded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Every remembered pointer is valid once this passes: the table is the
    /// one the cursor walks, and nothing was unlinked behind its back.
    fn check(&self, table: &HashTable<V>) -> Result<(), TableError> {
        if table.id() != self.table_id {
            return Err(TableError::ForeignTable);
        }
        let found = table.generation();
        if found != self.generation {
            return Err(TableError::ConcurrentModification {
                expected: self.generation,
                found,
            });
        }
        Ok(())
    }

    /// Returns whether another entry remains.
    ///
    /// # Errors
    ///
    /// [`TableError::ConcurrentModification`] if the table changed
    /// structurally behind the cursor's back, [`TableError::ForeignTable`] if
    /// `table` did not create this cursor.
    pub fn has_next(&self, table: &HashTable<V>) -> Result<bool, TableError> {
        self.check(table)?;
        Ok(self.remaining > 0)
    }

    fn advance(&mut self, table: &HashTable<V>) -> Result<NonNull<Node<V>>, TableError> {
        self.check(table)?;
        if self.remaining == 0 {
            return Err(TableError::NoSuchElement);
        }

        // SAFETY: `check` passed, so every node the position names is still
        // linked into `table`.
        let (step, from) = match self.position {
            Position::Start => (None, 0),
            Position::At { bucket, node, .. } => (
                unsafe { table.successor(node) }.map(|next| (bucket, Some(node), next)),
                bucket + 1,
            ),
            Position::Removed { bucket, prev } => {
                let next = match prev {
                    Some(prev) => unsafe { table.successor(prev) },
                    None => table.head(bucket),
                };
                (next.map(|next| (bucket, prev, next)), bucket + 1)
            }
        };

        let (bucket, prev, node) = match step {
            Some(step) => step,
            None => {
                let (bucket, node) = table.first_from(from).ok_or(TableError::NoSuchElement)?;
                (bucket, None, node)
            }
        };

        self.position = Position::At { bucket, prev, node };
        self.remaining -= 1;
        Ok(node)
    }

    /// Advances to the next entry and returns it.
    ///
    /// # Errors
    ///
    /// [`TableError::ConcurrentModification`] if the table changed
    /// structurally, [`TableError::ForeignTable`] if `table` did not create
    /// this cursor, [`TableError::NoSuchElement`] if no entries remain.
    pub fn next<'t>(&mut self, table: &'t HashTable<V>) -> Result<&'t V, TableError> {
        let node = self.advance(table)?;
        // SAFETY: `advance` only returns nodes linked into `table`.
        Ok(unsafe { table.value_of(node) })
    }

    /// Advances to the next entry and returns it mutably. Writing through
    /// the returned reference is not a structural change.
    ///
    /// # Errors
    ///
    /// Same as [`next`](Cursor::next).
    pub fn next_mut<'t>(&mut self, table: &'t mut HashTable<V>) -> Result<&'t mut V, TableError> {
        let node = self.advance(table)?;
        // SAFETY: `advance` only returns nodes linked into `table`.
        Ok(unsafe { table.value_of_mut(node) })
    }

    /// Removes the entry most recently returned by `next`.
    ///
    /// This is the only structural change a cursor tolerates: the cursor
    /// adopts the table's new generation and continues with the removed
    /// entry's successor.
    ///
    /// # Errors
    ///
    /// [`TableError::ConcurrentModification`] if the table changed
    /// structurally, [`TableError::ForeignTable`] if `table` did not create
    /// this cursor, [`TableError::IllegalState`] if `next` has not been
    /// called yet or the current entry was already removed.
    pub fn remove_current(&mut self, table: &mut HashTable<V>) -> Result<V, TableError> {
        self.check(table)?;
        let Position::At { bucket, prev, node } = self.position else {
            return Err(TableError::IllegalState);
        };

        // SAFETY: `check` passed, so `node` is still linked in chain `bucket`
        // right after `prev`.
        let value = unsafe { table.unlink(bucket, prev, node) };
        self.generation = table.generation();
        self.position = Position::Removed { bucket, prev };
        Ok(value)
    }
}
