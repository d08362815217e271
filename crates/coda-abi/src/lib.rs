//! # coda-abi
//!
//! Encoding and decoding for the Ethereum contract ABI.
//!
//! ## Features
//!
//! - **Type grammar**: parse textual type expressions like
//!   `tuple(address to, uint256[] amounts)` into a type tree
//! - **Normalization**: coerce loosely-typed input (JSON numbers, hex
//!   strings, maps) into canonical values
//! - **Encoder/decoder**: the 32-byte-word head/tail wire format, with a
//!   decoder hardened against hostile bytes
//! - **Methods and events**: canonical signatures and Keccak-256 selectors
//! - **Struct projection**: map decoded tuples onto plain host structs
//!
//! ## Quick Start
//!
//! ```rust
//! use coda_abi::{decode, encode_any, DynValue, Type};
//!
//! let ty = Type::must("tuple(int32[] a, int32[2] b)");
//! let input = DynValue::map([
//!     ("a", DynValue::seq([1i32, 2, 3])),
//!     ("b", DynValue::seq([4i32, 5])),
//! ]);
//!
//! let encoded = encode_any(&input, &ty).unwrap();
//! let decoded = decode(&ty, &encoded).unwrap();
//! assert_eq!(decoded.field("a").unwrap().as_array().unwrap().len(), 3);
//! ```
//!
//! ## Calling a method
//!
//! ```rust
//! use coda_abi::{DynValue, Method, Type};
//!
//! let transfer = Method::new(
//!     "transfer",
//!     Type::must("tuple(address to, uint256 amount)"),
//!     Type::must("tuple(bool)"),
//! )
//! .unwrap();
//! assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
//!
//! let calldata = transfer
//!     .encode_call(&DynValue::seq([
//!         DynValue::from("0xdbb881a51cd4023e4400cef3ef73046743f08da3"),
//!         DynValue::from(1000u64),
//!     ]))
//!     .unwrap();
//! assert_eq!(calldata.len(), 68);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod argument;
mod decode;
mod encode;
mod error;
mod method;
mod normalize;
mod parser;
mod record;
mod types;
mod value;

pub use argument::Argument;
pub use decode::decode;
pub use encode::{encode, encode_any};
pub use error::AbiError;
pub use method::{selector, Event, Method};
pub use normalize::{normalize, DynValue};
pub use parser::parse;
pub use record::{
    decode_record, encode_record, lowercase_first, FieldSpec, FieldValue, Record,
};
pub use types::{TupleField, Type};
pub use value::{Value, I256};

// Re-export primitives for convenience
pub use coda_primitives::{keccak256, Address, H256, U256};
