//! # coda-primitives
//!
//! Primitive types shared by the coda ABI codec.
//!
//! Provides the 20-byte [`Address`], the 32-byte [`H256`] hash, the
//! Ethereum-variant [`keccak256`] digest, and re-exports
//! [`primitive_types::U256`] as the 256-bit unsigned integer backbone.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{keccak256, HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Size of an ABI word in bytes.
pub const WORD: usize = 32;
