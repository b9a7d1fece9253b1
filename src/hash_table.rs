//! The open-addressing engine shared by both probing policies.
//!
//! [`HashTable`] stores values directly in a power-of-two slot array and
//! resolves collisions by probing, with the candidate order and the deletion
//! strategy supplied by a [`Probing`] policy. It works with raw hashes and
//! equality predicates; the key-aware wrapper lives in [`crate::hash_map`].

use alloc::boxed::Box;
use core::fmt::Debug;
use core::marker::PhantomData;

use crate::error::BuildError;
use crate::probe::Probing;
use crate::slot::Slot;
use crate::slot::empty_slots;

/// Capacity used by [`HashTable::new`].
pub const DEFAULT_CAPACITY: usize = 8;

/// Load factor threshold used by the constructors that do not take one.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.65;

/// Bit-mixing finalizer applied to every caller-supplied hash.
///
/// Spreads the high bits into the low bits that the capacity mask keeps, so
/// tables stay usable even when the upstream hash concentrates its entropy
/// in the high half. Murmur3-style xor-shift-multiply.
#[inline]
fn mix(hash: u64) -> u64 {
    let h = (hash ^ (hash >> 33)).wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^ (h >> 33)
}

/// Result of probing for an insert position.
enum ProbedSlot {
    /// A slot already holding a matching entry.
    Existing(usize),
    /// The slot a new entry should be written to: the earliest tombstone on
    /// the probe path, or the empty slot that terminated the walk.
    Open(usize),
}

/// An open-addressing hash table parameterized over a probing policy.
///
/// `HashTable<V, P>` stores values of type `V` and requires the caller to
/// provide a hash and an equality predicate for each operation; it never
/// hashes anything itself. The policy `P` decides the probe order and the
/// deletion strategy: [`Linear`](crate::probe::Linear) compacts clusters by
/// shifting entries backward, [`Quadratic`](crate::probe::Quadratic) marks
/// tombstones.
///
/// Capacity is always a power of two and at least 1. The table grows by
/// doubling whenever an insert would push the used-slot fraction (live
/// entries plus tombstones) above the configured load factor threshold, so
/// every probe walk is guaranteed to terminate within `capacity` attempts.
///
/// # Example
///
/// ```rust
/// use probe_hash::HashTable;
/// use probe_hash::hash_table::Entry;
/// use probe_hash::probe::Quadratic;
///
/// let mut table: HashTable<(u64, &str), Quadratic> = HashTable::new();
/// match table.entry(7, |&(k, _)| k == 7) {
///     Entry::Vacant(entry) => {
///         entry.insert((7, "seven"));
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
/// assert_eq!(table.find(7, |&(k, _)| k == 7), Some(&(7, "seven")));
/// ```
pub struct HashTable<V, P: Probing> {
    slots: Box<[Slot<V>]>,
    len: usize,
    tombstones: usize,
    load_factor: f64,
    initial_capacity: usize,
    _probe: PhantomData<P>,
}

impl<V, P: Probing> Debug for HashTable<V, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("tombstones", &self.tombstones)
            .field("load_factor", &self.load_factor)
            .finish()
    }
}

impl<V: Clone, P: Probing> Clone for HashTable<V, P> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            len: self.len,
            tombstones: self.tombstones,
            load_factor: self.load_factor,
            initial_capacity: self.initial_capacity,
            _probe: PhantomData,
        }
    }
}

impl<V, P: Probing> Default for HashTable<V, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, P: Probing> HashTable<V, P> {
    /// Creates an empty table with the default capacity and load factor.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty table with at least the requested capacity and the
    /// default load factor.
    ///
    /// The effective capacity is the smallest power of two that is at least
    /// `capacity` and at least 1.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashTable;
    /// use probe_hash::probe::Linear;
    ///
    /// let table: HashTable<u64, Linear> = HashTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 128);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
            .expect("capacity overflow")
    }

    /// Creates an empty table with at least the requested capacity and the
    /// given load factor threshold.
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
    /// use probe_hash::HashTable;
    /// use probe_hash::probe::Quadratic;
    ///
    /// let table: HashTable<u64, Quadratic> =
    ///     HashTable::with_capacity_and_load_factor(6, 0.9).unwrap();
    /// assert_eq!(table.capacity(), 8);
    ///
    /// let err = HashTable::<u64, Quadratic>::with_capacity_and_load_factor(6, f64::INFINITY);
    /// assert!(err.is_err());
    /// ```
    pub fn with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f64,
    ) -> Result<Self, BuildError> {
        if !load_factor.is_finite() || load_factor <= 0.0 || load_factor > 1.0 {
            return Err(BuildError::InvalidLoadFactor { value: load_factor });
        }
        let capacity = capacity
            .max(1)
            .checked_next_power_of_two()
            .ok_or(BuildError::CapacityOverflow {
                requested: capacity,
            })?;

        Ok(Self {
            slots: empty_slots(capacity),
            len: 0,
            tombstones: 0,
            load_factor,
            initial_capacity: capacity,
            _probe: PhantomData,
        })
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current slot count. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the configured load factor threshold.
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    #[inline]
    fn mask(&self) -> usize {
        self.capacity() - 1
    }

    #[cfg(test)]
    fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Finds the value matching `hash` and `eq`, if present.
    ///
    /// The probe walk stops at the first empty slot: by the backward-shift
    /// invariant (linear) or by construction (quadratic, where inserts never
    /// stop early at a tombstone), no matching entry can live beyond it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashTable;
    /// use probe_hash::probe::Linear;
    ///
    /// let mut table: HashTable<(u64, i32), Linear> = HashTable::new();
    /// table.entry(3, |&(k, _)| k == 3).or_insert((3, 30));
    /// assert_eq!(table.find(3, |&(k, _)| k == 3), Some(&(3, 30)));
    /// assert_eq!(table.find(4, |&(k, _)| k == 4), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(mix(hash), eq)?;
        self.slots[index].value()
    }

    /// Finds the value matching `hash` and `eq` for in-place mutation.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(mix(hash), eq)?;
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Walks the probe sequence looking for a live match. `None` once an
    /// empty slot terminates the walk or every slot has been visited.
    fn find_index(&self, mixed: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let mask = self.mask();
        for index in P::probe(mixed as usize, mask).take(self.capacity()) {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied { hash, value } => {
                    if *hash == mixed && eq(value) {
                        return Some(index);
                    }
                }
            }
        }
        None
    }

    /// Walks the probe sequence for an insert, recording the earliest
    /// tombstone so reused slots keep probe chains short. Update semantics
    /// win over reuse: the scan keeps going until a match or an empty slot.
    fn probe_insert(&self, mixed: u64, eq: impl Fn(&V) -> bool) -> ProbedSlot {
        let mask = self.mask();
        let mut first_tombstone = None;
        for index in P::probe(mixed as usize, mask).take(self.capacity()) {
            match &self.slots[index] {
                Slot::Empty => {
                    return ProbedSlot::Open(first_tombstone.unwrap_or(index));
                }
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
                Slot::Occupied { hash, value } => {
                    if *hash == mixed && eq(value) {
                        return ProbedSlot::Existing(index);
                    }
                }
            }
        }
        match first_tombstone {
            Some(index) => ProbedSlot::Open(index),
            // The load factor keeps at least one empty or tombstone slot on
            // every probe path. Exhausting the walk without finding one means
            // the resize accounting is broken.
            None => panic!("probe sequence exhausted without an open slot"),
        }
    }

    /// Returns the entry for the value matching `hash` and `eq`, resizing
    /// first if an insert could push the table past its load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashTable;
    /// use probe_hash::hash_table::Entry;
    /// use probe_hash::probe::Linear;
    ///
    /// let mut table: HashTable<(u64, i32), Linear> = HashTable::new();
    /// table.entry(1, |&(k, _)| k == 1).or_insert((1, 10));
    /// match table.entry(1, |&(k, _)| k == 1) {
    ///     Entry::Occupied(mut entry) => entry.get_mut().1 += 1,
    ///     Entry::Vacant(_) => unreachable!(),
    /// }
    /// assert_eq!(table.find(1, |&(k, _)| k == 1), Some(&(1, 11)));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V, P> {
        self.grow_if_needed(1);
        let mixed = mix(hash);
        match self.probe_insert(mixed, eq) {
            ProbedSlot::Existing(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            ProbedSlot::Open(index) => Entry::Vacant(VacantEntry {
                table: self,
                hash: mixed,
                index,
            }),
        }
    }

    /// Removes and returns the value matching `hash` and `eq`, if present.
    ///
    /// Linear tables close the gap by shifting the rest of the cluster
    /// backward; quadratic tables leave a tombstone.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashTable;
    /// use probe_hash::probe::Quadratic;
    ///
    /// let mut table: HashTable<(u64, i32), Quadratic> = HashTable::new();
    /// table.entry(9, |&(k, _)| k == 9).or_insert((9, 90));
    /// assert_eq!(table.remove(9, |&(k, _)| k == 9), Some((9, 90)));
    /// assert_eq!(table.remove(9, |&(k, _)| k == 9), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(mix(hash), eq)?;
        Some(self.remove_at(index))
    }

    fn remove_at(&mut self, index: usize) -> V {
        debug_assert!(self.slots[index].is_occupied());
        self.len -= 1;
        if P::TOMBSTONES {
            self.tombstones += 1;
            self.slots[index].take(Slot::Tombstone)
        } else {
            let value = self.slots[index].take(Slot::Empty);
            self.shift_backward(index);
            value
        }
    }

    /// Backward-shift compaction after a linear-probing removal.
    ///
    /// Lookup correctness for linear probing requires that every cluster is
    /// contiguous up to its empty terminator; a hole in the middle would cut
    /// later keys off from their probe path. Each following entry moves back
    /// into the hole iff its home index does not lie in the cyclic range
    /// `(hole, index]`, that is, iff the entry could have probed through the
    /// hole on its way to `index`.
    fn shift_backward(&mut self, mut hole: usize) {
        let mask = self.mask();
        let mut index = hole.wrapping_add(1) & mask;
        loop {
            let home = match &self.slots[index] {
                Slot::Empty => break,
                Slot::Occupied { hash, .. } => *hash as usize & mask,
                Slot::Tombstone => unreachable!("tombstone in a backward-shift table"),
            };
            if (index.wrapping_sub(home) & mask) >= (index.wrapping_sub(hole) & mask) {
                self.slots[hole] = core::mem::replace(&mut self.slots[index], Slot::Empty);
                hole = index;
            }
            index = index.wrapping_add(1) & mask;
        }
    }

    /// Ensures `additional` more entries fit without crossing the load
    /// factor threshold, growing the table if necessary.
    pub fn reserve(&mut self, additional: usize) {
        self.grow_if_needed(additional);
    }

    fn grow_if_needed(&mut self, additional: usize) {
        let used = self.len + self.tombstones;
        if (used + additional) as f64 <= self.load_factor * self.capacity() as f64 {
            return;
        }
        // Tombstones are dropped during the rehash, so the new capacity only
        // has to cover the live entries.
        let mut new_capacity = self.capacity().checked_mul(2).expect("capacity overflow");
        while (self.len + additional) as f64 > self.load_factor * new_capacity as f64 {
            new_capacity = new_capacity.checked_mul(2).expect("capacity overflow");
        }
        self.resize(new_capacity);
    }

    /// Rehashes every live entry into a fresh slot array of `new_capacity`.
    ///
    /// Each entry's stored hash is reused, so keys are never re-hashed. The
    /// swap is atomic from the caller's perspective: nothing observes a
    /// partially resized table.
    fn resize(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity.is_power_of_two());
        debug_assert!(
            (self.len as f64) <= self.load_factor * new_capacity as f64,
            "resize target cannot hold the live entries"
        );

        let old = core::mem::replace(&mut self.slots, empty_slots(new_capacity));
        self.tombstones = 0;
        for slot in old.into_vec() {
            if let Slot::Occupied { hash, value } = slot {
                let index = self.first_empty(hash);
                self.slots[index] = Slot::Occupied { hash, value };
            }
        }
    }

    /// First empty slot on the probe path of `mixed`. Only valid while the
    /// table has a free slot for it, which resize guarantees.
    fn first_empty(&self, mixed: u64) -> usize {
        let mask = self.mask();
        for index in P::probe(mixed as usize, mask).take(self.capacity()) {
            if self.slots[index].is_empty() {
                return index;
            }
        }
        unreachable!("probe sequence exhausted during rehash")
    }

    /// Drops every entry and resets the table to its configured initial
    /// capacity. Never triggers growth.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashTable;
    /// use probe_hash::probe::Linear;
    ///
    /// let mut table: HashTable<(u64, i32), Linear> = HashTable::with_capacity(8);
    /// for k in 0..100 {
    ///     table.entry(k, |&(key, _)| key == k).or_insert((k, 0));
    /// }
    /// assert!(table.capacity() > 8);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 8);
    /// ```
    pub fn clear(&mut self) {
        self.slots = empty_slots(self.initial_capacity);
        self.len = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over the live values in slot order.
    ///
    /// Lazy and restartable (the iterator is `Clone`). The borrow rules
    /// prevent structural modification while an iterator is alive, so the
    /// classic "mutated mid-traversal" hazard cannot be expressed.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    /// Removes and yields every live value, leaving the table cleared to its
    /// initial capacity.
    ///
    /// Dropping the iterator drops any values it has not yielded yet.
    pub fn drain(&mut self) -> Drain<V> {
        self.len = 0;
        self.tombstones = 0;
        let slots = core::mem::replace(&mut self.slots, empty_slots(self.initial_capacity));
        Drain {
            inner: slots.into_vec().into_iter(),
        }
    }
}

/// A view into a single slot of a [`HashTable`], occupied or vacant.
///
/// Constructed by [`HashTable::entry`].
pub enum Entry<'a, V, P: Probing> {
    /// A slot holding a matching entry.
    Occupied(OccupiedEntry<'a, V, P>),
    /// The slot a matching entry would be inserted into.
    Vacant(VacantEntry<'a, V, P>),
}

impl<'a, V, P: Probing> Entry<'a, V, P> {
    /// Inserts `default` if the entry is vacant; returns a mutable reference
    /// to the value either way.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant; returns a
    /// mutable reference to the value either way.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the value if the entry is occupied and returns a
    /// mutable reference to it; `None` for vacant entries.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts `V::default()` if the entry is vacant; returns a mutable
    /// reference to the value either way.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into the slot a new entry will be written to.
pub struct VacantEntry<'a, V, P: Probing> {
    table: &'a mut HashTable<V, P>,
    hash: u64,
    index: usize,
}

impl<'a, V, P: Probing> VacantEntry<'a, V, P> {
    /// Writes `value` into the slot and returns a mutable reference to it.
    ///
    /// Reusing a tombstone slot decrements the table's tombstone count.
    pub fn insert(self, value: V) -> &'a mut V {
        let slot = &mut self.table.slots[self.index];
        if matches!(slot, Slot::Tombstone) {
            self.table.tombstones -= 1;
        }
        *slot = Slot::Occupied {
            hash: self.hash,
            value,
        };
        self.table.len += 1;
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }
}

/// A view into a slot holding a matching entry.
pub struct OccupiedEntry<'a, V, P: Probing> {
    table: &'a mut HashTable<V, P>,
    index: usize,
}

impl<'a, V, P: Probing> OccupiedEntry<'a, V, P> {
    /// Returns a reference to the stored value.
    pub fn get(&self) -> &V {
        match &self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Returns a mutable reference to the stored value.
    ///
    /// The value may be overwritten in place; the slot's identity (and the
    /// stored hash) never changes.
    pub fn get_mut(&mut self) -> &mut V {
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Converts the entry into a mutable reference tied to the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Removes the entry and returns its value, using the policy's deletion
    /// strategy.
    pub fn remove(self) -> V {
        self.table.remove_at(self.index)
    }
}

/// An iterator over the live values of a [`HashTable`] in slot order.
#[derive(Clone)]
pub struct Iter<'a, V> {
    inner: core::slice::Iter<'a, Slot<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.inner.len()))
    }
}

/// A draining iterator over the live values of a [`HashTable`].
pub struct Drain<V> {
    inner: alloc::vec::IntoIter<Slot<V>>,
}

impl<V> Iterator for Drain<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.inner.len()))
    }
}
