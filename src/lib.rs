#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Fail-fast cursors that detect structural modification of their table.
pub mod cursor;

/// Errors returned by construction and cursor operations.
pub mod error;

/// A HashMap implementation using separate chaining.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

/// The raw separate-chaining table, addressed by hash and an equality
/// predicate.
///
/// [`HashMap`](crate::HashMap) is built on it. Use it directly to store
/// values whose key is computed from the value itself.
pub mod hash_table;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        /// The hasher builder used when none is specified.
        ///
        /// Without `foldhash` or `std` there is no source of random keys, so
        /// this hasher is deterministic.
        #[allow(deprecated)]
        pub type DefaultHashBuilder = core::hash::BuildHasherDefault<core::hash::SipHasher>;
    }
}

pub use cursor::Cursor;
pub use error::TableError;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
