#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;

/// Key-value maps over the open-addressing engine.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers and probing
/// policies.
pub mod hash_map;

pub mod hash_table;

pub mod probe;

mod slot;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The default [`BuildHasher`](core::hash::BuildHasher) for the map
        /// types.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The default [`BuildHasher`](core::hash::BuildHasher) for the map
        /// types.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        /// A placeholder hash builder. Enable the `foldhash` or `std`
        /// feature to get a usable default, or supply a builder through the
        /// `*_hasher` constructors.
        pub type DefaultHashBuilder = ();
    }
}

pub use error::BuildError;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_map::LinearHashMap;
pub use hash_map::QuadraticHashMap;
pub use hash_table::HashTable;
