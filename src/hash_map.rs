//! Key/value maps over the open-addressing engine.
//!
//! [`HashMap`] pairs the raw [`HashTable`] with a [`BuildHasher`] so keys
//! implementing `Hash + Eq` can be used directly. The probing policy stays a
//! type parameter; [`LinearHashMap`] and [`QuadraticHashMap`] are the two
//! ready-made aliases.

use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::BuildError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::probe::Linear;
use crate::probe::Probing;
use crate::probe::Quadratic;

/// A map using linear probing with backward-shift deletion.
pub type LinearHashMap<K, V, S = DefaultHashBuilder> = HashMap<K, V, Linear, S>;

/// A map using quadratic (triangular) probing with tombstone deletion.
pub type QuadraticHashMap<K, V, S = DefaultHashBuilder> = HashMap<K, V, Quadratic, S>;

/// A hash map backed by an open-addressing [`HashTable`].
///
/// `HashMap<K, V, P, S>` stores key-value pairs where keys implement
/// `Hash + Eq`, hashes them with the builder `S`, and resolves collisions
/// with the probing policy `P`. Entries live directly in the table's slot
/// array; updating a key's value overwrites it in place without relocating
/// the entry.
///
/// Use the [`LinearHashMap`] or [`QuadraticHashMap`] alias unless you are
/// plugging in your own policy.
///
/// # Examples
///
/// ```rust
/// use probe_hash::LinearHashMap;
///
/// let mut map: LinearHashMap<&str, i32> = LinearHashMap::new();
/// map.insert("a", 1);
/// assert_eq!(map.get(&"a"), Some(&1));
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, P: Probing, S = DefaultHashBuilder> {
    table: HashTable<(K, V), P>,
    hash_builder: S,
}

impl<K, V, P, S> Debug for HashMap<K, V, P, S>
where
    K: Debug + Hash + Eq,
    V: Debug,
    P: Probing,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, P, S> HashMap<K, V, P, S>
where
    K: Hash + Eq,
    P: Probing,
    S: BuildHasher,
{
    /// Creates a new map with the given hasher builder and default capacity
    /// and load factor.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a new map with at least the specified capacity and the given
    /// hasher builder.
    ///
    /// The effective capacity is rounded up to a power of two.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Creates a new map with at least the specified capacity, the given
    /// load factor threshold, and the given hasher builder.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidLoadFactor`] unless `load_factor` is a
    /// finite value in `(0.0, 1.0]`, and [`BuildError::CapacityOverflow`]
    /// when `capacity` cannot be rounded up to a power of two.
    pub fn with_capacity_and_load_factor_and_hasher(
        capacity: usize,
        load_factor: f64,
        hash_builder: S,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            table: HashTable::with_capacity_and_load_factor(capacity, load_factor)?,
            hash_builder,
        })
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::QuadraticHashMap;
    ///
    /// let mut map: QuadraticHashMap<i32, &str> = QuadraticHashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the current capacity. Always a power of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::QuadraticHashMap;
    ///
    /// let map: QuadraticHashMap<i32, i32> = QuadraticHashMap::with_capacity(100);
    /// assert_eq!(map.capacity(), 128);
    /// ```
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the configured load factor threshold.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Removes all entries and resets the map to its configured initial
    /// capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::LinearHashMap;
    ///
    /// let mut map: LinearHashMap<i32, &str> = LinearHashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Reserves capacity for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key was already present its value is overwritten in place and
    /// the previous value is returned; otherwise `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::LinearHashMap;
    ///
    /// let mut map: LinearHashMap<i32, &str> = LinearHashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(mut entry) => {
                Some(core::mem::replace(&mut entry.get_mut().1, value))
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                None
            }
        }
    }

    /// Returns a reference to the value for `key`, if present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::QuadraticHashMap;
    ///
    /// let mut map: QuadraticHashMap<i32, &str> = QuadraticHashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value for `key`, if present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::LinearHashMap;
    ///
    /// let mut map: LinearHashMap<i32, i32> = LinearHashMap::new();
    /// map.insert(1, 10);
    /// if let Some(v) = map.get_mut(&1) {
    ///     *v += 1;
    /// }
    /// assert_eq!(map.get(&1), Some(&11));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::QuadraticHashMap;
    ///
    /// let mut map: QuadraticHashMap<i32, &str> = QuadraticHashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key` from the map, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::LinearHashMap;
    ///
    /// let mut map: LinearHashMap<&str, i32> = LinearHashMap::new();
    /// map.entry("poneyland").or_insert(3);
    /// assert_eq!(map.get(&"poneyland"), Some(&3));
    ///
    /// *map.entry("poneyland").or_insert(10) *= 2;
    /// assert_eq!(map.get(&"poneyland"), Some(&6));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, P> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Returns an iterator over the `(&K, &V)` pairs in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::QuadraticHashMap;
    ///
    /// let mut map: QuadraticHashMap<i32, &str> = QuadraticHashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert_eq!(map.iter().count(), 2);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the keys in slot order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in slot order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Removes and yields every entry, leaving the map empty.
    ///
    /// Dropping the iterator drops any entries it has not yielded yet.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::LinearHashMap;
    ///
    /// let mut map: LinearHashMap<i32, &str> = LinearHashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let drained: Vec<_> = map.drain().collect();
    /// assert_eq!(drained.len(), 2);
    /// assert!(map.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<K, V, P, S> HashMap<K, V, P, S>
where
    K: Hash + Eq,
    P: Probing,
    S: BuildHasher + Default,
{
    /// Creates a new map with the default hasher builder, capacity, and load
    /// factor.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new map with at least the specified capacity and the
    /// default hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    /// Creates a new map with at least the specified capacity and the given
    /// load factor threshold.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidLoadFactor`] unless `load_factor` is a
    /// finite value in `(0.0, 1.0]`, and [`BuildError::CapacityOverflow`]
    /// when `capacity` cannot be rounded up to a power of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::QuadraticHashMap;
    ///
    /// let map = QuadraticHashMap::<i32, i32>::with_capacity_and_load_factor(6, 0.9);
    /// assert!(map.is_ok());
    ///
    /// let map = QuadraticHashMap::<i32, i32>::with_capacity_and_load_factor(6, f64::INFINITY);
    /// assert!(map.is_err());
    /// ```
    pub fn with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f64,
    ) -> Result<Self, BuildError> {
        Self::with_capacity_and_load_factor_and_hasher(capacity, load_factor, S::default())
    }
}

impl<K, V, P, S> Default for HashMap<K, V, P, S>
where
    K: Hash + Eq,
    P: Probing,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A view into a single entry in a map, which may be vacant or occupied.
///
/// Constructed by [`HashMap::entry`].
pub enum Entry<'a, K, V, P: Probing> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, P>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, P>),
}

impl<'a, K, V, P: Probing> Entry<'a, K, V, P> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, P> Entry<'a, K, V, P>
where
    V: Default,
    P: Probing,
{
    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in a map.
pub struct VacantEntry<'a, K, V, P: Probing> {
    entry: crate::hash_table::VacantEntry<'a, (K, V), P>,
    key: K,
}

impl<'a, K, V, P: Probing> VacantEntry<'a, K, V, P> {
    /// Gets a reference to the key that would be used when inserting.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts `value` into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in a map.
pub struct OccupiedEntry<'a, K, V, P: Probing> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V), P>,
}

impl<'a, K, V, P: Probing> OccupiedEntry<'a, K, V, P> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Replaces the value and returns the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a map, in slot order.
#[derive(Clone)]
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }
}

/// An iterator over the keys of a map, in slot order.
#[derive(Clone)]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over the values of a map, in slot order.
#[derive(Clone)]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A draining iterator over the key-value pairs of a map.
pub struct Drain<K, V> {
    inner: crate::hash_table::Drain<(K, V)>,
}

impl<K, V> Iterator for Drain<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type LinearMap<K, V> = LinearHashMap<K, V, SipHashBuilder>;
    type QuadraticMap<K, V> = QuadraticHashMap<K, V, SipHashBuilder>;

    /// A key whose hash is a fixed discriminant shared with other keys, with
    /// equality still distinguishing the payload. Forces full collisions.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct HashObject {
        hash: u64,
        data: u64,
    }

    impl core::hash::Hash for HashObject {
        fn hash<H: Hasher>(&self, state: &mut H) {
            state.write_u64(self.hash);
        }
    }

    fn updating_value_impl<P: Probing>() {
        let mut map: HashMap<i32, i32, P, SipHashBuilder> = HashMap::new();
        map.insert(1, 1);
        assert_eq!(map.get(&1), Some(&1));

        map.insert(1, 5);
        assert_eq!(map.get(&1), Some(&5));

        map.insert(1, -7);
        assert_eq!(map.get(&1), Some(&-7));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn updating_value_linear() {
        updating_value_impl::<Linear>();
    }

    #[test]
    fn updating_value_quadratic() {
        updating_value_impl::<Quadratic>();
    }

    #[test]
    fn construction_validation() {
        assert!(QuadraticMap::<i32, i32>::with_capacity_and_load_factor(6, 0.9).is_ok());
        assert!(LinearMap::<i32, i32>::with_capacity_and_load_factor(6, 0.9).is_ok());

        for bad in [f64::INFINITY, f64::NAN, -0.5, 0.0] {
            assert!(
                matches!(
                    QuadraticMap::<i32, i32>::with_capacity_and_load_factor(5, bad),
                    Err(BuildError::InvalidLoadFactor { .. })
                ),
                "load factor {bad} should be rejected"
            );
        }
    }

    #[test]
    fn capacity_stays_power_of_two_while_growing() {
        for requested in 1..33 {
            let mut map = QuadraticMap::<u64, u64>::with_capacity(requested);
            for i in 0..200u64 {
                assert!(map.capacity().is_power_of_two(), "{}", map.capacity());
                map.insert(i, i);
            }
            assert_eq!(map.len(), 200);
        }
    }

    #[test]
    fn growth_from_small_capacity() {
        let mut map = QuadraticMap::<i32, i32>::with_capacity(7);
        let initial = map.capacity();
        for k in 1..=10 {
            map.insert(k, k);
        }
        assert_eq!(map.len(), 10);
        assert!(map.capacity() > initial);
    }

    fn colliding_keys_removed_out_of_order_impl<P: Probing>() {
        let mut map: HashMap<HashObject, i32, P, SipHashBuilder> = HashMap::new();

        let o1 = HashObject { hash: 88, data: 1 };
        let o2 = HashObject { hash: 88, data: 2 };
        let o3 = HashObject { hash: 88, data: 3 };
        let o4 = HashObject { hash: 88, data: 4 };

        map.insert(o1.clone(), 111);
        map.insert(o2.clone(), 222);
        map.insert(o3.clone(), 333);
        map.insert(o4.clone(), 444);
        assert_eq!(map.len(), 4);

        assert_eq!(map.remove(&o2), Some(222));
        assert_eq!(map.remove(&o3), Some(333));
        assert_eq!(map.remove(&o1), Some(111));
        assert_eq!(map.remove(&o4), Some(444));
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn colliding_keys_removed_out_of_order_linear() {
        colliding_keys_removed_out_of_order_impl::<Linear>();
    }

    #[test]
    fn colliding_keys_removed_out_of_order_quadratic() {
        colliding_keys_removed_out_of_order_impl::<Quadratic>();
    }

    fn random_operations_match_reference_impl<P: Probing>() {
        let mut rng = SmallRng::seed_from_u64(OsRng.try_next_u64().unwrap());

        for _ in 0..50 {
            let mut map: HashMap<i64, i64, P, SipHashBuilder> = HashMap::new();
            let mut reference = std::collections::HashMap::new();

            let insert_probability = rng.random::<f64>();
            let remove_probability = rng.random::<f64>();

            for i in 0..300i64 {
                let key = rng.random_range(-350..=350i64);

                if rng.random::<f64>() < insert_probability {
                    assert_eq!(map.insert(key, i), reference.insert(key, i));
                }

                assert_eq!(map.get(&key), reference.get(&key));
                assert_eq!(map.contains_key(&key), reference.contains_key(&key));
                assert_eq!(map.len(), reference.len());

                if rng.random::<f64>() > remove_probability {
                    assert_eq!(map.remove(&key), reference.remove(&key));
                }

                assert_eq!(map.get(&key), reference.get(&key));
                assert_eq!(map.len(), reference.len());
            }
        }
    }

    #[test]
    fn random_operations_match_reference_linear() {
        random_operations_match_reference_impl::<Linear>();
    }

    #[test]
    fn random_operations_match_reference_quadratic() {
        random_operations_match_reference_impl::<Quadratic>();
    }

    fn iteration_matches_reference_impl<P: Probing>() {
        let mut rng = SmallRng::seed_from_u64(OsRng.try_next_u64().unwrap());

        for _ in 0..25 {
            let mut map: HashMap<i64, i64, P, SipHashBuilder> = HashMap::new();
            let mut reference = std::collections::HashMap::new();

            for _ in 0..400 {
                let key = rng.random_range(-350..=350i64);
                map.insert(key, key);
                reference.insert(key, key);
                assert_eq!(map.len(), reference.len());
            }

            let mut seen = 0;
            for (k, v) in map.iter() {
                assert_eq!(k, v);
                assert_eq!(reference.get(k), Some(v));
                assert!(map.contains_key(k));
                seen += 1;
            }
            assert_eq!(seen, reference.len());

            let mut keys: Vec<i64> = map.keys().copied().collect();
            keys.sort_unstable();
            let mut expected: Vec<i64> = reference.keys().copied().collect();
            expected.sort_unstable();
            assert_eq!(keys, expected);
        }
    }

    #[test]
    fn iteration_matches_reference_linear() {
        iteration_matches_reference_impl::<Linear>();
    }

    #[test]
    fn iteration_matches_reference_quadratic() {
        iteration_matches_reference_impl::<Quadratic>();
    }

    fn insert_all_remove_all_impl<P: Probing>() {
        let mut rng = SmallRng::seed_from_u64(OsRng.try_next_u64().unwrap());

        for _ in 0..25 {
            let mut map: HashMap<i64, i64, P, SipHashBuilder> = HashMap::new();
            let mut keys = std::collections::HashSet::new();

            for _ in 0..500 {
                let key = rng.random_range(-350..=350i64);
                keys.insert(key);
                map.insert(key, 5);
            }
            assert_eq!(map.len(), keys.len());

            let snapshot: Vec<i64> = map.keys().copied().collect();
            for key in snapshot {
                assert_eq!(map.remove(&key), Some(5));
            }
            assert!(map.is_empty());
        }
    }

    #[test]
    fn insert_all_remove_all_linear() {
        insert_all_remove_all_impl::<Linear>();
    }

    #[test]
    fn insert_all_remove_all_quadratic() {
        insert_all_remove_all_impl::<Quadratic>();
    }

    #[test]
    fn interleaved_cluster_removal() {
        let mut map = LinearMap::<i32, i32>::with_capacity(16);

        map.insert(11, 0);
        map.insert(12, 0);
        map.insert(13, 0);
        assert_eq!(map.len(), 3);

        for i in 1..=10 {
            map.insert(i, 0);
        }
        assert_eq!(map.len(), 13);

        for i in 1..=10 {
            assert_eq!(map.remove(&i), Some(0));
        }
        assert_eq!(map.len(), 3);

        assert_eq!(map.remove(&11), Some(0));
        assert_eq!(map.remove(&12), Some(0));
        assert_eq!(map.remove(&13), Some(0));
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut map = LinearMap::<i32, String>::new();
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }
        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn remove_entry_returns_key_and_value() {
        let mut map = QuadraticMap::<i32, String>::new();
        map.insert(1, "hello".to_string());

        assert_eq!(map.remove_entry(&1), Some((1, "hello".to_string())));
        assert_eq!(map.len(), 0);
        assert_eq!(map.remove_entry(&1), None);
    }

    #[test]
    fn entry_api() {
        let mut map = QuadraticMap::<i32, String>::new();

        let value = map.entry(1).or_insert("hello".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        let value = map.entry(1).or_insert("world".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        map.entry(2).or_insert_with(|| "computed".to_string());
        assert_eq!(map.get(&2), Some(&"computed".to_string()));

        map.entry(1)
            .and_modify(|v| v.push_str(" world"))
            .or_insert("default".to_string());
        assert_eq!(map.get(&1), Some(&"hello world".to_string()));

        assert_eq!(map.entry(3).key(), &3);
    }

    #[test]
    fn entry_or_default() {
        let mut map: LinearMap<i32, Vec<i32>> = LinearMap::new();

        map.entry(1).or_default().push(42);
        map.entry(1).or_default().push(24);
        assert_eq!(map.get(&1), Some(&alloc::vec![42, 24]));
    }

    #[test]
    fn occupied_entry_operations() {
        let mut map = LinearMap::<i32, String>::new();
        map.insert(1, "hello".to_string());

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &"hello".to_string());

                *entry.get_mut() = "world".to_string();
                let old = entry.insert("new".to_string());
                assert_eq!(old, "world".to_string());

                let (key, value) = entry.remove_entry();
                assert_eq!(key, 1);
                assert_eq!(value, "new".to_string());
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }
        assert!(map.is_empty());
    }

    #[test]
    fn vacant_entry_operations() {
        let mut map = QuadraticMap::<i32, String>::new();

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);
                let value = entry.insert("hello".to_string());
                assert_eq!(value, &"hello".to_string());
            }
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn clear_drops_all_entries() {
        let mut map = LinearMap::<i32, String>::new();
        for i in 0..100 {
            map.insert(i, i.to_string());
        }
        map.clear();
        assert!(map.is_empty());
        assert!(!map.contains_key(&1));
        assert_eq!(map.capacity(), crate::hash_table::DEFAULT_CAPACITY);
    }

    #[test]
    fn drain_yields_all_pairs() {
        let mut map = QuadraticMap::<i32, i32>::new();
        for i in 0..50 {
            map.insert(i, i * 2);
        }

        let drained: std::collections::HashMap<i32, i32> = map.drain().collect();
        assert!(map.is_empty());
        assert_eq!(drained.len(), 50);
        for i in 0..50 {
            assert_eq!(drained.get(&i), Some(&(i * 2)));
        }
    }

    #[test]
    fn string_keys() {
        let mut map = LinearMap::<String, i32>::new();
        map.insert("hello".to_string(), 1);
        map.insert("world".to_string(), 2);

        assert_eq!(map.get(&"hello".to_string()), Some(&1));
        assert_eq!(map.get(&"world".to_string()), Some(&2));
        assert_eq!(map.get(&"missing".to_string()), None);
    }

    #[test]
    fn clone_and_default() {
        let mut map = QuadraticMap::<i32, i32>::default();
        map.insert(1, 10);

        let copy = map.clone();
        map.insert(2, 20);
        assert_eq!(copy.len(), 1);
        assert_eq!(map.len(), 2);
    }

    #[cfg(feature = "foldhash")]
    #[test]
    fn default_hash_builder_works() {
        let mut map: LinearHashMap<i32, i32> = LinearHashMap::new();
        let mut quad: QuadraticHashMap<i32, i32> = QuadraticHashMap::new();
        for i in 0..100 {
            map.insert(i, i);
            quad.insert(i, i);
        }
        assert_eq!(map.len(), 100);
        assert_eq!(quad.len(), 100);
    }
}
