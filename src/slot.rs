//! Slot state for the backing array.

use alloc::boxed::Box;
use alloc::vec::Vec;

/// One cell of the backing array.
///
/// Occupied slots keep the full 64-bit hash next to the value so resize and
/// backward-shift deletion can recompute home indices without re-hashing
/// keys, and so lookups can reject most non-matching slots with an integer
/// compare before running the equality predicate.
#[derive(Debug, Clone)]
pub(crate) enum Slot<V> {
    /// Never held an entry, or was cleared by backward-shift compaction.
    /// Terminates every probe walk.
    Empty,
    /// Held an entry that was removed. Probe walks continue past it; inserts
    /// may reclaim it. Only the tombstone-based policies produce these.
    Tombstone,
    /// A live entry.
    Occupied {
        /// The mixed 64-bit hash of the stored value's key.
        hash: u64,
        /// The stored value.
        value: V,
    },
}

impl<V> Slot<V> {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    /// Returns a reference to the value of an occupied slot.
    #[inline]
    pub(crate) fn value(&self) -> Option<&V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Replaces the slot with `replacement` and returns the value it held.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not occupied. Callers only do this to indices
    /// the probe walk just matched.
    #[inline]
    pub(crate) fn take(&mut self, replacement: Slot<V>) -> V {
        match core::mem::replace(self, replacement) {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("took a slot that was not occupied"),
        }
    }
}

/// Allocates a fresh all-empty slot array of the given capacity.
pub(crate) fn empty_slots<V>(capacity: usize) -> Box<[Slot<V>]> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || Slot::Empty);
    slots.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_returns_the_value_and_installs_the_replacement() {
        let mut slot = Slot::Occupied {
            hash: 7,
            value: "seven",
        };
        assert_eq!(slot.take(Slot::Tombstone), "seven");
        assert!(matches!(slot, Slot::Tombstone));
        assert!(!slot.is_occupied());
        assert!(!slot.is_empty());
    }

    #[test]
    fn empty_slots_are_all_empty() {
        let slots = empty_slots::<u32>(16);
        assert_eq!(slots.len(), 16);
        assert!(slots.iter().all(Slot::is_empty));
    }
}
