//! Construction-time validation errors.

use core::fmt;

/// Error returned when table construction parameters fail validation.
///
/// Produced by the fallible constructors
/// ([`HashTable::with_capacity_and_load_factor`] and the map-level
/// equivalents). The infallible constructors use defaults that always pass
/// validation.
///
/// [`HashTable::with_capacity_and_load_factor`]: crate::HashTable::with_capacity_and_load_factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuildError {
    /// The requested capacity cannot be rounded up to a power of two without
    /// overflowing `usize`.
    CapacityOverflow {
        /// The capacity that was requested.
        requested: usize,
    },
    /// The load factor threshold is not a finite value in `(0.0, 1.0]`.
    InvalidLoadFactor {
        /// The threshold that was rejected.
        value: f64,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::CapacityOverflow { requested } => {
                write!(
                    f,
                    "requested capacity {requested} cannot be rounded up to a power of two"
                )
            }
            BuildError::InvalidLoadFactor { value } => {
                write!(
                    f,
                    "load factor {value} is outside the accepted range (0.0, 1.0]"
                )
            }
        }
    }
}

impl core::error::Error for BuildError {}
