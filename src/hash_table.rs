use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::marker::PhantomData;
use core::ptr::NonNull;
use core::sync::atomic::AtomicU64;
use core::sync::atomic::Ordering;

use log::debug;
use log::trace;

use crate::cursor::Cursor;
use crate::error::TableError;

/// Bucket count used by [`HashTable::new`].
const DEFAULT_CAPACITY: usize = 16;

/// Source of [`HashTable::id`] values. Every table, clones included, draws a
/// fresh one.
static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(0);

/// Growth fires once `occupied / capacity` would reach 3/4.
#[inline(always)]
fn exceeds_load_factor(occupied: usize, capacity: usize) -> bool {
    occupied as u128 * 4 >= capacity as u128 * 3
}

#[inline(always)]
fn bucket_count(requested: usize) -> Result<usize, TableError> {
    if requested < 1 {
        return Err(TableError::InvalidCapacity { requested });
    }
    requested
        .checked_next_power_of_two()
        .ok_or(TableError::CapacityOverflow { requested })
}

/// An owning link to the next node of a chain.
pub(crate) type Link<V> = Option<NonNull<Node<V>>>;

/// A chain node. Nodes are allocated with [`Node::alloc`] and owned by
/// exactly one link of one table until [`Node::into_value`] frees them.
pub(crate) struct Node<V> {
    hash: u64,
    value: V,
    next: Link<V>,
}

impl<V> Node<V> {
    fn alloc(hash: u64, value: V) -> NonNull<Node<V>> {
        NonNull::from(Box::leak(Box::new(Node {
            hash,
            value,
            next: None,
        })))
    }

    /// # Safety
    ///
    /// `node` must come from [`Node::alloc`] and must no longer be reachable
    /// from any table.
    unsafe fn into_value(node: NonNull<Node<V>>) -> V {
        // SAFETY: Caller ensures the node was leaked by `alloc` and is unlinked,
        // so we are its only owner.
        let node = unsafe { Box::from_raw(node.as_ptr()) };
        let Node { value, .. } = *node;
        value
    }
}

fn empty_buckets<V>(capacity: usize) -> Vec<Link<V>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, || None);
    buckets
}

/// Frees a detached chain node by node.
///
/// # Safety
///
/// The caller must own every node reachable from `link`.
unsafe fn free_chain<V>(mut link: Link<V>) {
    while let Some(node) = link {
        // SAFETY: Caller hands over the whole chain, so each node is freed once.
        let node = unsafe { Box::from_raw(node.as_ptr()) };
        link = node.next;
    }
}

/// Bucket and chain statistics for a [`HashTable`].
///
/// Only available with the `stats` feature.
#[cfg(feature = "stats")]
#[derive(Debug, Clone)]
pub struct TableStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Number of buckets
    pub capacity: usize,
    /// Number of buckets with a non-empty chain
    pub occupied_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Occupied-bucket ratio, the quantity compared against 0.75 for growth
    pub load_factor: f64,
    /// Average chain length over occupied buckets
    pub mean_chain_length: f64,
    /// `chain_histogram[n]` is the number of buckets holding exactly `n`
    /// entries
    pub chain_histogram: Vec<usize>,
}

#[cfg(feature = "stats")]
impl TableStats {
    /// Pretty-print the statistics, including a horizontal bar chart of
    /// chain lengths.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Chained Table Statistics ===");
        println!(
            "Population: {} entries in {} buckets",
            self.populated, self.capacity
        );
        println!(
            "Occupied: {}/{} buckets ({:.2}% load factor)",
            self.occupied_buckets,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Chains: longest {}, mean {:.2}",
            self.longest_chain, self.mean_chain_length
        );

        let max = self.chain_histogram.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        for (length, &count) in self.chain_histogram.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", length, "█".repeat(width), count);
        }
    }
}

/// A separate-chaining hash table.
///
/// `HashTable<V>` stores values of type `V` in a power-of-two array of
/// buckets, each heading a singly-linked chain. Like the raw tables it is
/// modelled on, it does not hash anything itself: every operation takes the
/// value's hash and an equality predicate.
///
/// The table keeps a generation counter that changes exactly when the set
/// of stored values changes (a new value is linked, a value is unlinked, or
/// a non-empty table is cleared or drained). Overwriting a value in place,
/// reading, and growing leave it untouched. [`Cursor`] uses it to fail fast.
///
/// ## Growth
///
/// Before a new value is linked, the table checks the fraction of non-empty
/// buckets the insertion would produce. If it reaches 0.75 the bucket array
/// doubles and every node is moved to its new bucket. Nodes themselves are
/// never reallocated. The table never shrinks.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use chain_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     chain_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     chain_hash::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.len(), 1);
/// ```
pub struct HashTable<V> {
    buckets: Vec<Link<V>>,
    populated: usize,
    occupied: usize,
    generation: u64,
    id: u64,
    _phantom: PhantomData<Box<Node<V>>>,
}

// SAFETY: The table owns its nodes exclusively, exactly like a
// `Vec<Option<Box<Node<V>>>>` would, so it is as thread-safe as `V`.
unsafe impl<V: Send> Send for HashTable<V> {}
// SAFETY: Shared access only ever hands out `&V`.
unsafe impl<V: Sync> Sync for HashTable<V> {}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field(
                "chains",
                &(0..self.buckets.len())
                    .map(|index| self.chain(index).count())
                    .collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("occupied", &self.occupied)
            .field("capacity", &self.buckets.len())
            .field("generation", &self.generation)
            .finish()
    }
}

impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        // Built in place so that a panicking `V::clone` still frees the nodes
        // copied so far.
        let mut table = Self::with_bucket_count(self.buckets.len());
        for index in 0..self.buckets.len() {
            let mut tail = &mut table.buckets[index];
            for node in self.chain(index) {
                let mut copy = Node::alloc(node.hash, node.value.clone());
                *tail = Some(copy);
                // SAFETY: `copy` was just allocated and is owned by `table`.
                tail = unsafe { &mut copy.as_mut().next };
            }
        }

        table.populated = self.populated;
        table.occupied = self.occupied;
        table.generation = self.generation;
        table
    }
}

impl<V> Drop for HashTable<V> {
    fn drop(&mut self) {
        for link in &mut self.buckets {
            // SAFETY: The chain is detached from the table before it is freed.
            unsafe { free_chain(link.take()) };
        }
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with 16 buckets.
    pub fn new() -> Self {
        Self::with_bucket_count(DEFAULT_CAPACITY)
    }

    /// Creates an empty table with at least `capacity` buckets.
    ///
    /// The bucket count is the smallest power of two that is not less than
    /// `capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::TableError;
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100)?;
    /// assert_eq!(table.capacity(), 128);
    ///
    /// assert!(HashTable::<String>::with_capacity(0).is_err());
    /// # Ok::<(), TableError>(())
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Ok(Self::with_bucket_count(bucket_count(capacity)?))
    }

    fn with_bucket_count(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            buckets: empty_buckets(capacity),
            populated: 0,
            occupied: 0,
            generation: 0,
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            _phantom: PhantomData,
        }
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of buckets. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the structural modification counter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// let start = table.generation();
    ///
    /// table.entry(7, |&v: &u32| v == 7).or_insert(7);
    /// assert_eq!(table.generation(), start + 1);
    ///
    /// // Overwriting in place is not a structural change.
    /// *table.find_mut(7, |&v| v == 7).unwrap() = 7;
    /// assert_eq!(table.generation(), start + 1);
    /// ```
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Identifies this table among all live tables. Cursors compare it
    /// before touching any node they remember.
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline(always)]
    fn bucket_index(&self, hash: u64) -> usize {
        hash as usize & (self.buckets.len() - 1)
    }

    #[inline(always)]
    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn chain(&self, index: usize) -> impl Iterator<Item = &Node<V>> {
        // SAFETY: Linked nodes are owned by the table and outlive `&self`.
        core::iter::successors(self.buckets[index].map(|node| unsafe { node.as_ref() }), |node| {
            node.next.map(|next| unsafe { next.as_ref() })
        })
    }

    /// Finds the node matching `hash` and `eq` in chain `bucket`, along with
    /// its predecessor.
    fn locate(
        &self,
        bucket: usize,
        hash: u64,
        eq: impl Fn(&V) -> bool,
    ) -> Option<(Link<V>, NonNull<Node<V>>)> {
        let mut prev = None;
        let mut link = self.buckets[bucket];
        while let Some(node) = link {
            // SAFETY: Linked nodes are owned by the table and outlive `&self`.
            let current = unsafe { node.as_ref() };
            if current.hash == hash && eq(&current.value) {
                return Some((prev, node));
            }
            prev = Some(node);
            link = current.next;
        }
        None
    }

    /// Returns the first node of the first non-empty chain at or after
    /// `bucket`.
    pub(crate) fn first_from(&self, bucket: usize) -> Option<(usize, NonNull<Node<V>>)> {
        self.buckets
            .get(bucket..)?
            .iter()
            .enumerate()
            .find_map(|(offset, &link)| link.map(|node| (bucket + offset, node)))
    }

    /// Returns the head of chain `bucket`.
    pub(crate) fn head(&self, bucket: usize) -> Link<V> {
        self.buckets.get(bucket).copied().flatten()
    }

    /// # Safety
    ///
    /// `node` must be linked into this table.
    pub(crate) unsafe fn successor(&self, node: NonNull<Node<V>>) -> Link<V> {
        // SAFETY: Caller ensures `node` is linked, so it is alive while we hold
        // `&self`.
        unsafe { node.as_ref().next }
    }

    /// # Safety
    ///
    /// `node` must be linked into this table.
    pub(crate) unsafe fn value_of(&self, node: NonNull<Node<V>>) -> &V {
        // SAFETY: Caller ensures `node` is linked; the borrow is tied to `&self`.
        unsafe { &node.as_ref().value }
    }

    /// # Safety
    ///
    /// `node` must be linked into this table.
    pub(crate) unsafe fn value_of_mut(&mut self, mut node: NonNull<Node<V>>) -> &mut V {
        // SAFETY: Caller ensures `node` is linked, and `&mut self` gives us
        // exclusive access to every node.
        unsafe { &mut node.as_mut().value }
    }

    /// Unlinks `node` from chain `bucket` and returns its value.
    ///
    /// This is the single removal path: keyed removal, entry removal and
    /// cursor removal all end up here.
    ///
    /// # Safety
    ///
    /// `node` must be linked into chain `bucket` of this table, directly
    /// after `prev`, or at the head of the chain when `prev` is `None`.
    pub(crate) unsafe fn unlink(
        &mut self,
        bucket: usize,
        prev: Link<V>,
        node: NonNull<Node<V>>,
    ) -> V {
        // SAFETY: Caller ensures `node` is linked into this table.
        let next = unsafe { node.as_ref().next };
        match prev {
            // SAFETY: Caller ensures `prev` is linked into this table, and
            // `&mut self` gives us exclusive access to it.
            Some(mut prev) => unsafe { prev.as_mut().next = next },
            None => self.buckets[bucket] = next,
        }

        if self.buckets[bucket].is_none() {
            self.occupied -= 1;
        }
        self.populated -= 1;
        self.bump_generation();

        // SAFETY: `node` is no longer reachable from the table.
        unsafe { Node::into_value(node) }
    }

    /// Links a value whose hash is known to be absent, growing first if the
    /// insertion would reach the load factor.
    fn insert_new(&mut self, hash: u64, value: V) -> &mut V {
        let lands_in_empty = self.buckets[self.bucket_index(hash)].is_none();
        if exceeds_load_factor(
            self.occupied + usize::from(lands_in_empty),
            self.buckets.len(),
        ) {
            self.grow();
        }

        let index = self.bucket_index(hash);
        if self.buckets[index].is_none() {
            self.occupied += 1;
        }
        self.populated += 1;
        self.bump_generation();

        let mut node = Node::alloc(hash, value);
        let mut slot = &mut self.buckets[index];
        while let Some(mut next) = *slot {
            // SAFETY: Linked nodes are owned by the table, and `&mut self`
            // gives us exclusive access.
            slot = unsafe { &mut next.as_mut().next };
        }
        *slot = Some(node);

        // SAFETY: The node is now owned by the table, which we borrow mutably.
        unsafe { &mut node.as_mut().value }
    }

    /// Doubles the bucket array and moves every node onto the head of its
    /// new chain.
    fn grow(&mut self) {
        let old_capacity = self.buckets.len();
        let Some(new_capacity) = old_capacity.checked_mul(2) else {
            return;
        };

        let old_buckets = core::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        self.occupied = 0;

        for mut link in old_buckets {
            while let Some(mut node) = link {
                // SAFETY: Every node reachable from the old array is owned by
                // the table and is relinked exactly once.
                let current = unsafe { node.as_mut() };
                link = current.next;

                let index = self.bucket_index(current.hash);
                let head = &mut self.buckets[index];
                if head.is_none() {
                    self.occupied += 1;
                }
                current.next = *head;
                *head = Some(node);
            }
        }

        debug!(
            "grew chained table from {} to {} buckets ({} entries, {} occupied)",
            old_capacity, new_capacity, self.populated, self.occupied
        );
    }

    /// Returns a reference to the value matching `hash` and `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use chain_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table
    ///     .entry(hash_str("key"), |s: &String| s == "key")
    ///     .or_insert("key".to_string());
    ///
    /// assert_eq!(
    ///     table.find(hash_str("key"), |s| s == "key"),
    ///     Some(&"key".to_string())
    /// );
    /// assert_eq!(table.find(hash_str("nope"), |s| s == "nope"), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.chain(self.bucket_index(hash))
            .find(|node| node.hash == hash && eq(&node.value))
            .map(|node| &node.value)
    }

    /// Returns a mutable reference to the value matching `hash` and `eq`.
    ///
    /// Mutating through the returned reference is not a structural change.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let bucket = self.bucket_index(hash);
        let (_, node) = self.locate(bucket, hash, eq)?;
        // SAFETY: `locate` only returns nodes linked into this table.
        Some(unsafe { self.value_of_mut(node) })
    }

    /// Removes and returns the value matching `hash` and `eq`.
    ///
    /// Returns `None`, and leaves the table untouched, when nothing matches.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let bucket = self.bucket_index(hash);
        let (prev, node) = self.locate(bucket, hash, eq)?;
        // SAFETY: `locate` returned `node` from chain `bucket`, right after `prev`.
        Some(unsafe { self.unlink(bucket, prev, node) })
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::Entry;
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    ///
    /// match table.entry(5, |s: &String| s == "five") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("five".to_string());
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         *entry.get_mut() = "updated".to_string();
    ///     }
    /// }
    ///
    /// table
    ///     .entry(5, |s: &String| s == "five")
    ///     .or_insert("five".to_string());
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        let bucket = self.bucket_index(hash);
        match self.locate(bucket, hash, eq) {
            Some((prev, node)) => Entry::Occupied(OccupiedEntry {
                table: self,
                bucket,
                prev,
                node,
            }),
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Removes all elements from the table, keeping its capacity.
    ///
    /// Clearing a non-empty table is a structural change and invalidates
    /// outstanding cursors.
    pub fn clear(&mut self) {
        if self.populated == 0 {
            return;
        }

        for link in &mut self.buckets {
            // SAFETY: The chain is detached from the table before it is freed.
            unsafe { free_chain(link.take()) };
        }

        trace!("cleared {} entries from chained table", self.populated);
        self.populated = 0;
        self.occupied = 0;
        self.bump_generation();
    }

    /// Returns an iterator over all values, bucket by bucket and then along
    /// each chain.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            node: None,
            remaining: self.populated,
        }
    }

    /// Returns an iterator over mutable references to all values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            buckets: self.buckets.iter(),
            node: None,
            remaining: self.populated,
            _phantom: PhantomData,
        }
    }

    /// Returns an iterator that removes and yields all values.
    ///
    /// The table is empty once the iterator is dropped, even if it was not
    /// exhausted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |&v: &i32| v == 1).or_insert(1);
    /// table.entry(2, |&v: &i32| v == 2).or_insert(2);
    ///
    /// let mut values: Vec<i32> = table.drain().collect();
    /// values.sort();
    /// assert_eq!(values, vec![1, 2]);
    /// assert!(table.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        if self.populated > 0 {
            trace!("draining {} entries from chained table", self.populated);
            self.bump_generation();
        }
        Drain {
            table: self,
            bucket: 0,
        }
    }

    /// Returns a fail-fast cursor positioned before the first element.
    pub fn cursor(&self) -> Cursor<V> {
        Cursor::new(self)
    }

    /// Unlinks the first node at or after `bucket`, advancing `bucket` past
    /// emptied chains. Does not touch the generation.
    fn pop_front(&mut self, bucket: &mut usize) -> Option<V> {
        while *bucket < self.buckets.len() {
            if let Some(node) = self.buckets[*bucket] {
                // SAFETY: `node` heads chain `bucket`, so it is linked.
                self.buckets[*bucket] = unsafe { node.as_ref().next };
                if self.buckets[*bucket].is_none() {
                    self.occupied -= 1;
                }
                self.populated -= 1;

                // SAFETY: `node` was just unlinked.
                return Some(unsafe { Node::into_value(node) });
            }
            *bucket += 1;
        }
        None
    }

    /// Returns bucket and chain statistics.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> TableStats {
        let mut chain_histogram = alloc::vec![0usize; 1];
        let mut longest_chain = 0;

        for index in 0..self.buckets.len() {
            let length = self.chain(index).count();
            if length >= chain_histogram.len() {
                chain_histogram.resize(length + 1, 0);
            }
            chain_histogram[length] += 1;
            longest_chain = longest_chain.max(length);
        }

        TableStats {
            populated: self.populated,
            capacity: self.buckets.len(),
            occupied_buckets: self.occupied,
            longest_chain,
            load_factor: self.occupied as f64 / self.buckets.len() as f64,
            mean_chain_length: if self.occupied == 0 {
                0.0
            } else {
                self.populated as f64 / self.occupied as f64
            },
            chain_histogram,
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - no stored value matched
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - a stored value matched
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the stored value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the stored value.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Runs `f` on the stored value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the stored value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts `value` at the tail of its chain, growing the table first if
    /// needed, and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        self.table.insert_new(self.hash, value)
    }
}

/// A view into an occupied entry in a [`HashTable`].
///
/// The entry remembers the matched node and its predecessor, so reading,
/// replacing and removing it never walks the chain again.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    bucket: usize,
    prev: Link<V>,
    node: NonNull<Node<V>>,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the stored value.
    pub fn get(&self) -> &V {
        // SAFETY: The entry borrows the table mutably, so `node` stays linked.
        unsafe { self.table.value_of(self.node) }
    }

    /// Gets a mutable reference to the stored value.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: The entry borrows the table mutably, so `node` stays linked.
        unsafe { self.table.value_of_mut(self.node) }
    }

    /// Converts the entry into a mutable reference to the stored value.
    pub fn into_mut(self) -> &'a mut V {
        let mut node = self.node;
        // SAFETY: The entry held the table's only mutable borrow for `'a`, and
        // `node` stays linked for as long as that borrow lasts.
        unsafe { &mut node.as_mut().value }
    }

    /// Replaces the stored value, returning the old one. Not a structural
    /// change.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Unlinks the entry and returns its value.
    pub fn remove(self) -> V {
        // SAFETY: `entry` located `node` in chain `bucket` right after `prev`,
        // and the table has not changed since.
        unsafe { self.table.unlink(self.bucket, self.prev, self.node) }
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Link<V>>,
    node: Option<&'a Node<V>>,
    remaining: usize,
}

// SAFETY: `Iter` only hands out `&V`, like `core::slice::Iter<'_, V>`.
unsafe impl<V: Sync> Send for Iter<'_, V> {}
// SAFETY: See above.
unsafe impl<V: Sync> Sync for Iter<'_, V> {}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.node {
                // SAFETY: The iterator borrows the table, so linked nodes stay alive.
                self.node = node.next.map(|next| unsafe { next.as_ref() });
                self.remaining -= 1;
                return Some(&node.value);
            }
            let head = *self.buckets.next()?;
            // SAFETY: As above.
            self.node = head.map(|head| unsafe { head.as_ref() });
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A mutable iterator over the values in a [`HashTable`].
pub struct IterMut<'a, V> {
    buckets: core::slice::Iter<'a, Link<V>>,
    node: Link<V>,
    remaining: usize,
    _phantom: PhantomData<&'a mut V>,
}

// SAFETY: `IterMut` hands out disjoint `&mut V`, like `core::slice::IterMut`.
unsafe impl<V: Send> Send for IterMut<'_, V> {}
// SAFETY: See above.
unsafe impl<V: Sync> Sync for IterMut<'_, V> {}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(mut node) = self.node {
                // SAFETY: The iterator borrows the table mutably and yields each
                // node once, so the returned references never alias.
                let node = unsafe { node.as_mut() };
                self.node = node.next;
                self.remaining -= 1;
                return Some(&mut node.value);
            }
            self.node = *self.buckets.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    bucket: usize,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<'a, V> Iterator for Drain<'a, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.pop_front(&mut self.bucket)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    table: HashTable<V>,
    bucket: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.pop_front(&mut self.bucket)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> IntoIterator for HashTable<V> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            bucket: 0,
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut HashTable<V> {
    type Item = &'a mut V;
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
