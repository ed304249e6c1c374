#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Configuration of table size and neighborhood width.
pub mod config;

/// Error types for insertion and configuration.
pub mod error;

/// Strategies for turning keys into 64-bit hash codes.
///
/// The table is generic over a [`HashCoder`], so any hashing scheme can be
/// plugged in without touching the table itself.
pub mod hash_coder;

/// A string-keyed map using hopscotch hashing.
///
/// This module provides a `HashMap` that wraps the `HashTable` and hashes
/// keys with a configurable [`HashCoder`].
pub mod hash_map;

pub mod hash_table;

pub use config::TableConfig;
pub use error::ConfigError;
pub use error::InsertionFailed;
pub use hash_coder::HashCoder;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
