//! Probe sequence generation for the open-addressing engine.
//!
//! A probing policy decides which slots are candidates for a given base
//! index, and which deletion strategy keeps lookups correct afterwards. The
//! two policies here cover the classic trade-off: [`Linear`] walks
//! consecutive slots and repairs clusters on removal, [`Quadratic`] jumps by
//! triangular numbers and leaves tombstones behind instead.

/// A probing policy for the open-addressing engine.
///
/// Implementations are type-level markers: the engine never constructs a
/// policy value, it only asks for probe sequences and consults
/// [`TOMBSTONES`](Probing::TOMBSTONES) to pick a deletion strategy.
///
/// # Contract
///
/// For any `base` and any power-of-two table size `mask + 1`, the first
/// `mask + 1` indices produced by [`probe`](Probing::probe) must visit every
/// slot in `0..=mask` exactly once. Policies with `TOMBSTONES = false`
/// additionally must visit consecutive indices (`base`, `base + 1`, ...,
/// wrapping), because backward-shift deletion relies on cluster adjacency.
pub trait Probing {
    /// Whether removal marks slots as tombstones (`true`) or compacts the
    /// cluster by shifting entries backward (`false`).
    const TOMBSTONES: bool;

    /// The candidate index sequence. Infinite; the engine bounds the number
    /// of attempts by the table capacity.
    type Seq: Iterator<Item = usize>;

    /// Returns the probe sequence starting at `base & mask`.
    fn probe(base: usize, mask: usize) -> Self::Seq;
}

/// Linear probing: the candidate at attempt `i` is `(base + i) & mask`.
///
/// Paired with backward-shift deletion, so the table never accumulates
/// tombstones.
#[derive(Debug, Clone, Copy)]
pub struct Linear;

impl Probing for Linear {
    const TOMBSTONES: bool = false;

    type Seq = LinearSeq;

    #[inline]
    fn probe(base: usize, mask: usize) -> Self::Seq {
        LinearSeq {
            pos: base & mask,
            mask,
        }
    }
}

/// Quadratic probing: the candidate at attempt `i` is
/// `(base + i * (i + 1) / 2) & mask`.
///
/// The triangular-number offsets visit every slot of a power-of-two table
/// exactly once, which is the reason capacities are constrained to powers of
/// two. Removal marks tombstones; the non-contiguous sequence offers no
/// adjacency test that would make compaction safe.
#[derive(Debug, Clone, Copy)]
pub struct Quadratic;

impl Probing for Quadratic {
    const TOMBSTONES: bool = true;

    type Seq = TriangularSeq;

    #[inline]
    fn probe(base: usize, mask: usize) -> Self::Seq {
        TriangularSeq {
            pos: base & mask,
            stride: 0,
            mask,
        }
    }
}

/// Iterator for [`Linear`] probing.
#[derive(Debug, Clone)]
pub struct LinearSeq {
    pos: usize,
    mask: usize,
}

impl Iterator for LinearSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let current = self.pos;
        self.pos = self.pos.wrapping_add(1) & self.mask;
        Some(current)
    }
}

/// Iterator for [`Quadratic`] probing.
///
/// The triangular offsets are generated incrementally: the difference
/// between consecutive triangular numbers grows by one each step, so the
/// sequence never computes `i * (i + 1) / 2` directly and cannot overflow.
#[derive(Debug, Clone)]
pub struct TriangularSeq {
    pos: usize,
    stride: usize,
    mask: usize,
}

impl Iterator for TriangularSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let current = self.pos;
        self.stride = self.stride.wrapping_add(1);
        self.pos = self.pos.wrapping_add(self.stride) & self.mask;
        Some(current)
    }
}
