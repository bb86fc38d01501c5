use core::fmt::Debug;
use core::fmt::Display;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ops::Index;

use crate::DefaultHashBuilder;
use crate::error::TableError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash map implemented on top of the separate-chaining [`HashTable`].
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement
/// `Hash + Eq`, hashing them with the builder `S`. The map starts with 16
/// buckets (or the power of two requested), doubles its bucket array
/// whenever three quarters of the buckets would be occupied, and never
/// shrinks.
///
/// Iteration order is bucket order, then chain order. It is unspecified
/// and changes when the map grows.
///
/// Besides the usual borrowing iterators, [`cursor`](HashMap::cursor)
/// returns a fail-fast [`Cursor`] that tolerates the map being mutated
/// between steps and reports it as [`TableError::ConcurrentModification`].
///
/// # Nullable values
///
/// Use `V = Option<T>` to store absent values. [`contains_value`] then
/// treats two absent values as equal, and [`display_nullable`] renders them
/// as `null`.
///
/// [`contains_value`]: HashMap::contains_value
/// [`display_nullable`]: HashMap::display_nullable
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Renders the map as `[k1=v1, k2=v2, ...]` in iteration order.
///
/// ```rust
/// # use chain_hash::HashMap;
/// #
/// let mut map = HashMap::new();
/// assert_eq!(map.to_string(), "[]");
///
/// map.insert("a", 1);
/// assert_eq!(map.to_string(), "[a=1]");
/// ```
impl<K, V, S> Display for HashMap<K, V, S>
where
    K: Display,
    V: Display,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write_pairs(f, self.iter(), |f, value| Display::fmt(value, f))
    }
}

fn write_pairs<'a, K, V>(
    f: &mut core::fmt::Formatter<'_>,
    pairs: impl Iterator<Item = (&'a K, &'a V)>,
    mut write_value: impl FnMut(&mut core::fmt::Formatter<'_>, &V) -> core::fmt::Result,
) -> core::fmt::Result
where
    K: Display + 'a,
    V: 'a,
{
    f.write_str("[")?;
    for (index, (key, value)) in pairs.enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}=")?;
        write_value(f, value)?;
    }
    f.write_str("]")
}

/// Renders a map with nullable values, printing absent ones as `null`.
///
/// Created by [`HashMap::display_nullable`].
pub struct DisplayNullable<'a, K, T, S> {
    map: &'a HashMap<K, Option<T>, S>,
}

impl<K, T, S> Display for DisplayNullable<'_, K, T, S>
where
    K: Display,
    T: Display,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write_pairs(f, self.map.iter(), |f, value| match value {
            Some(value) => Display::fmt(value, f),
            None => f.write_str("null"),
        })
    }
}

impl<K, T, S> HashMap<K, Option<T>, S> {
    /// Returns a [`Display`] adapter that renders the map like its own
    /// `Display` impl, with `None` values shown as `null`.
    ///
    /// `Option<T>` has no `Display` impl, so this is how a map with
    /// nullable values gets printed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_capacity(1)?;
    /// map.insert("port", Some(8080));
    /// map.insert("proxy", None);
    ///
    /// let rendered = map.display_nullable().to_string();
    /// assert!(rendered.contains("port=8080"));
    /// assert!(rendered.contains("proxy=null"));
    /// # Ok::<(), chain_hash::TableError>(())
    /// ```
    pub fn display_nullable(&self) -> DisplayNullable<'_, K, T, S> {
        DisplayNullable { map: self }
    }
}

impl<K, V> HashMap<K, V, DefaultHashBuilder> {
    /// Creates an empty map with 16 buckets and the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 16);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty map with at least `capacity` buckets and the default
    /// hasher.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// # use chain_hash::TableError;
    /// #
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100)?;
    /// assert_eq!(map.capacity(), 128);
    ///
    /// assert_eq!(
    ///     HashMap::<i32, String>::with_capacity(0).unwrap_err(),
    ///     TableError::InvalidCapacity { requested: 0 }
    /// );
    /// # Ok::<(), TableError>(())
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty map with 16 buckets and the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates an empty map with at least `capacity` buckets and the given
    /// hasher builder.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self, TableError> {
        Ok(Self {
            table: HashTable::with_capacity(capacity)?,
            hash_builder,
        })
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets. Always a power of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_capacity(3)?;
    /// assert_eq!(map.capacity(), 4);
    ///
    /// for i in 0..100 {
    ///     map.insert(i, i);
    /// }
    /// assert!(map.capacity() > 4);
    /// assert!(map.capacity().is_power_of_two());
    /// # Ok::<(), chain_hash::TableError>(())
    /// ```
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the structural modification counter.
    ///
    /// It changes exactly when the key set changes.
    pub fn generation(&self) -> u64 {
        self.table.generation()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all elements from the map, keeping its capacity.
    ///
    /// Outstanding cursors are invalidated if the map was not empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// let capacity = map.capacity();
    ///
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over the key-value pairs of the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("Key: {}, Value: {}", key, value);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the key-value pairs of the map, with mutable
    /// references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns an iterator that removes and yields all key-value pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let pairs: Vec<_> = map.drain().collect();
    /// assert!(map.is_empty());
    /// assert_eq!(pairs.len(), 2);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns a fail-fast cursor positioned before the first pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// # use chain_hash::TableError;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert("keep", 1);
    /// map.insert("drop", 2);
    ///
    /// let mut cursor = map.cursor();
    /// while cursor.has_next(&map)? {
    ///     let (key, _) = cursor.next(&map)?;
    ///     if *key == "drop" {
    ///         cursor.remove_current(&mut map)?;
    ///     }
    /// }
    /// assert_eq!(map.len(), 1);
    ///
    /// let cursor = map.cursor();
    /// map.insert("new", 3);
    /// assert!(matches!(
    ///     cursor.has_next(&map),
    ///     Err(TableError::ConcurrentModification { .. })
    /// ));
    /// # Ok::<(), TableError>(())
    /// ```
    pub fn cursor(&self) -> Cursor<K, V> {
        Cursor {
            inner: self.table.cursor(),
        }
    }

    /// Returns `true` if some key maps to a value equal to `value`.
    ///
    /// This scans every bucket.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, Some("a"));
    /// map.insert(2, None);
    ///
    /// assert!(map.contains_value(&Some("a")));
    /// assert!(map.contains_value(&None));
    /// assert!(!map.contains_value(&Some("b")));
    /// ```
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts a key-value pair into the map.
    ///
    /// If the key was absent, the pair is appended to its bucket's chain and
    /// `None` is returned. If the key was present, the value is overwritten
    /// in place and the old value is returned. Overwriting is not a
    /// structural change.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                Some(old_value)
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                None
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// Removing an absent key is a no-op.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut counts = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word).or_insert(0) += 1;
    /// }
    ///
    /// assert_eq!(counts.get(&"a"), Some(&2));
    /// assert_eq!(counts.get(&"b"), Some(&1));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Index<&K> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not present in HashMap")
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

/// The result of [`HashMap::entry`]: the key's place in its chain.
///
/// Only filling a [`Vacant`](Entry::Vacant) entry or removing an
/// [`Occupied`](Entry::Occupied) one is a structural change. Looking up the
/// entry and writing through an occupied one leave the map's generation, and
/// therefore any outstanding [`Cursor`], untouched.
///
/// # Examples
///
/// ```rust
/// # use chain_hash::HashMap;
/// #
/// let mut tally: HashMap<char, u32> = HashMap::new();
/// for c in "chained".chars() {
///     *tally.entry(c).or_default() += 1;
/// }
/// assert_eq!(tally[&'c'], 1);
///
/// let generation = tally.generation();
/// tally.entry('c').and_modify(|n| *n += 10);
/// assert_eq!(tally[&'c'], 11);
/// assert_eq!(tally.generation(), generation);
/// ```
pub enum Entry<'a, K, V> {
    /// The key is absent. Inserting appends it to the tail of its chain.
    Vacant(VacantEntry<'a, K, V>),
    /// The key is present.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Returns the stored value, inserting `default` first if the key is
    /// absent.
    pub fn or_insert(self, default: V) -> &'a mut V {
        self.or_insert_with(|| default)
    }

    /// Like [`or_insert`](Entry::or_insert), but only builds the value when
    /// the key is absent.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        self.or_insert_with_key(|_| default())
    }

    /// Like [`or_insert_with`](Entry::or_insert_with), with the key handed
    /// to the closure.
    pub fn or_insert_with_key<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce(&K) -> V,
    {
        match self {
            Entry::Vacant(vacant) => {
                let value = default(&vacant.key);
                vacant.insert(value)
            }
            Entry::Occupied(occupied) => occupied.into_mut(),
        }
    }

    /// Updates the stored value in place if the key is present. Never a
    /// structural change.
    pub fn and_modify<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        if let Entry::Occupied(occupied) = &mut self {
            f(occupied.get_mut());
        }
        self
    }

    /// Returns the key this entry was looked up with, or the stored key if
    /// it is occupied.
    pub fn key(&self) -> &K {
        match self {
            Entry::Vacant(vacant) => vacant.key(),
            Entry::Occupied(occupied) => occupied.key(),
        }
    }
}

impl<'a, K, V: Default> Entry<'a, K, V> {
    /// Returns the stored value, inserting `V::default()` first if the key
    /// is absent.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }
}

/// An absent key, holding the slot its chain would append to.
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// The key that [`insert`](VacantEntry::insert) would store.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Gives the key back without touching the map.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Links `(key, value)` at the tail of its chain and bumps the
    /// generation. The bucket array doubles first if this would bring
    /// occupancy to three quarters.
    pub fn insert(self, value: V) -> &'a mut V {
        let (_, stored) = self.entry.insert((self.key, value));
        stored
    }
}

/// A present key, remembering its node so nothing is searched twice.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// The stored key. This is the key first inserted, not the one used for
    /// the lookup.
    pub fn key(&self) -> &K {
        let (key, _) = self.entry.get();
        key
    }

    /// The stored value.
    pub fn get(&self) -> &V {
        let (_, value) = self.entry.get();
        value
    }

    /// Mutable access to the stored value. Not a structural change.
    pub fn get_mut(&mut self) -> &mut V {
        let (_, value) = self.entry.get_mut();
        value
    }

    /// Turns the entry into a mutable reference that lives as long as the
    /// map borrow.
    pub fn into_mut(self) -> &'a mut V {
        let (_, value) = self.entry.into_mut();
        value
    }

    /// Overwrites the value and returns the previous one. The generation is
    /// left as is.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Unlinks the pair, bumps the generation, and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Unlinks the pair, bumps the generation, and returns it whole.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// A fail-fast cursor over a [`HashMap`].
///
/// Created by [`HashMap::cursor`]. Like the table-level
/// [`Cursor`](crate::Cursor) it wraps, it borrows nothing between steps and
/// reports [`TableError::ForeignTable`] when handed any map other than the
/// one that created it.
pub struct Cursor<K, V> {
    inner: crate::cursor::Cursor<(K, V)>,
}

impl<K, V> Clone for Cursor<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Debug for Cursor<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.inner.fmt(f)
    }
}

impl<K, V> Cursor<K, V> {
    /// Returns the number of pairs not yet yielded.
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    /// Returns whether another pair remains.
    ///
    /// # Errors
    ///
    /// [`TableError::ConcurrentModification`] if the map changed
    /// structurally behind the cursor's back, [`TableError::ForeignTable`]
    /// if `map` did not create this cursor.
    pub fn has_next<S>(&self, map: &HashMap<K, V, S>) -> Result<bool, TableError> {
        self.inner.has_next(&map.table)
    }

    /// Advances to the next pair and returns it.
    ///
    /// # Errors
    ///
    /// [`TableError::ConcurrentModification`] if the map changed
    /// structurally, [`TableError::ForeignTable`] if `map` did not create
    /// this cursor, [`TableError::NoSuchElement`] if no pairs remain.
    pub fn next<'m, S>(&mut self, map: &'m HashMap<K, V, S>) -> Result<(&'m K, &'m V), TableError> {
        self.inner.next(&map.table).map(|(k, v)| (k, v))
    }

    /// Advances to the next pair and returns a handle that can replace its
    /// value.
    ///
    /// # Errors
    ///
    /// Same as [`next`](Cursor::next).
    pub fn next_mut<'m, S>(
        &mut self,
        map: &'m mut HashMap<K, V, S>,
    ) -> Result<EntryMut<'m, K, V>, TableError> {
        self.inner
            .next_mut(&mut map.table)
            .map(|pair| EntryMut { pair })
    }

    /// Removes the pair most recently returned by `next` or `next_mut`.
    ///
    /// # Errors
    ///
    /// [`TableError::ConcurrentModification`] if the map changed
    /// structurally, [`TableError::ForeignTable`] if `map` did not create
    /// this cursor, [`TableError::IllegalState`] if there is no current
    /// pair or it was already removed.
    pub fn remove_current<S>(&mut self, map: &mut HashMap<K, V, S>) -> Result<(K, V), TableError> {
        self.inner.remove_current(&mut map.table)
    }
}

/// A pair yielded by [`Cursor::next_mut`].
pub struct EntryMut<'a, K, V> {
    pair: &'a mut (K, V),
}

impl<'a, K, V> EntryMut<'a, K, V> {
    /// Gets a reference to the key.
    pub fn key(&self) -> &K {
        &self.pair.0
    }

    /// Gets a reference to the value.
    pub fn value(&self) -> &V {
        &self.pair.1
    }

    /// Gets a mutable reference to the value.
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.pair.1
    }

    /// Replaces the value, returning the old one. Not a structural change.
    pub fn set_value(&mut self, value: V) -> V {
        core::mem::replace(&mut self.pair.1, value)
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Drain<'a, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
