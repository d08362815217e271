//! Method and event facade
//!
//! Wraps input/output tuples with the canonical signature and the 4-byte
//! Keccak-256 selector used for contract calls.

use bytes::Bytes;
use coda_primitives::{keccak256, H256};

use crate::argument::{tuple_type, Argument};
use crate::decode::decode_tuple_frame;
use crate::encode::encode_tuple_frame;
use crate::error::AbiError;
use crate::normalize::{normalize, DynValue};
use crate::types::Type;
use crate::value::Value;

/// Compute the 4-byte selector for a canonical signature string.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_bytes()[..4]);
    out
}

/// A contract method: name plus input and output tuples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name
    pub name: String,
    /// Input tuple
    pub inputs: Type,
    /// Output tuple
    pub outputs: Type,
}

impl Method {
    /// Create a method. Both `inputs` and `outputs` must be tuple types.
    pub fn new(name: impl Into<String>, inputs: Type, outputs: Type) -> Result<Self, AbiError> {
        for ty in [&inputs, &outputs] {
            if !matches!(ty, Type::Tuple(_)) {
                return Err(AbiError::Parse(format!(
                    "method argument lists must be tuples, got {}",
                    ty
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            inputs,
            outputs,
        })
    }

    /// Create a method from JSON ABI argument records.
    pub fn from_arguments(
        name: impl Into<String>,
        inputs: &[Argument],
        outputs: &[Argument],
    ) -> Result<Self, AbiError> {
        Ok(Self {
            name: name.into(),
            inputs: tuple_type(inputs)?,
            outputs: tuple_type(outputs)?,
        })
    }

    /// Canonical signature: `name(t1,t2,…)` with tuples inlined, no names.
    ///
    /// The selector depends only on this string, never on field names.
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.inputs.signature())
    }

    /// First four bytes of the Keccak-256 hash of the signature.
    pub fn selector(&self) -> [u8; 4] {
        selector(&self.signature())
    }

    /// Encode a call: selector followed by the bare input argument frame.
    ///
    /// `args` may be a mapping keyed by input names or a positional
    /// sequence.
    pub fn encode_call(&self, args: &DynValue) -> Result<Bytes, AbiError> {
        let value = normalize(&self.inputs, args)?;
        let mut out = self.selector().to_vec();
        out.extend(encode_tuple_frame(&value, &self.inputs)?);
        Ok(Bytes::from(out))
    }

    /// Decode calldata produced by [`Method::encode_call`].
    ///
    /// Verifies the selector and decodes the remainder under the input
    /// tuple.
    pub fn decode_call(&self, data: &[u8]) -> Result<Value, AbiError> {
        if data.len() < 4 {
            return Err(AbiError::Decode(format!(
                "calldata of {} bytes has no selector",
                data.len()
            )));
        }
        let (head, rest) = data.split_at(4);
        if head != self.selector() {
            return Err(AbiError::Decode(format!(
                "selector {} does not match {}",
                hex::encode(head),
                self.signature()
            )));
        }
        decode_tuple_frame(&self.inputs, rest)
    }

    /// Decode return data under the output tuple.
    pub fn decode_return(&self, data: &[u8]) -> Result<Value, AbiError> {
        decode_tuple_frame(&self.outputs, data)
    }
}

/// A contract event: name plus argument tuple.
///
/// Only plain argument decoding is supported; topic and indexed-field
/// handling belong to a log-processing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name
    pub name: String,
    /// Argument tuple
    pub inputs: Type,
}

impl Event {
    /// Create an event. `inputs` must be a tuple type.
    pub fn new(name: impl Into<String>, inputs: Type) -> Result<Self, AbiError> {
        if !matches!(inputs, Type::Tuple(_)) {
            return Err(AbiError::Parse(format!(
                "event argument lists must be tuples, got {}",
                inputs
            )));
        }
        Ok(Self {
            name: name.into(),
            inputs,
        })
    }

    /// Canonical signature, as for methods.
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.inputs.signature())
    }

    /// Full Keccak-256 hash of the signature (the log's first topic).
    pub fn id(&self) -> H256 {
        keccak256(self.signature().as_bytes())
    }

    /// Decode event data under the argument tuple.
    pub fn decode_data(&self, data: &[u8]) -> Result<Value, AbiError> {
        decode_tuple_frame(&self.inputs, data)
    }
}
