//! Canonical host values

use std::fmt;

use coda_primitives::{Address, U256};

use crate::error::AbiError;

/// Bit mask covering the low `bits` bits of a word.
pub(crate) fn width_mask(bits: usize) -> U256 {
    if bits >= 256 {
        U256::MAX
    } else {
        (U256::one() << bits) - 1
    }
}

/// Signed 256-bit integer in sign-magnitude form.
///
/// The magnitude is a `U256`; zero is always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I256 {
    abs: U256,
    negative: bool,
}

impl I256 {
    /// Zero value
    pub const ZERO: I256 = I256 {
        abs: U256([0; 4]),
        negative: false,
    };

    /// Create from magnitude and sign. Negative zero collapses to zero.
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            negative: negative && !abs.is_zero(),
            abs,
        }
    }

    /// Create from a native signed integer.
    pub fn from_i128(value: i128) -> Self {
        if value < 0 {
            Self::new(U256::from(value.unsigned_abs()), true)
        } else {
            Self::new(U256::from(value as u128), false)
        }
    }

    /// Parse a decimal string with optional leading sign.
    pub fn from_dec_str(s: &str) -> Result<Self, AbiError> {
        let (digits, negative) = match s.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (s.strip_prefix('+').unwrap_or(s), false),
        };
        let abs = U256::from_dec_str(digits)
            .map_err(|_| AbiError::Normalize(format!("invalid decimal integer '{}'", s)))?;
        Ok(Self::new(abs, negative))
    }

    /// Magnitude
    pub fn abs(&self) -> U256 {
        self.abs
    }

    /// Sign
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// Whether the value is representable as a signed integer of `bits` bits.
    pub fn fits(&self, bits: usize) -> bool {
        if self.abs.is_zero() {
            return true;
        }
        if self.negative {
            // -2^(bits-1) is in range
            (self.abs - 1).bits() <= bits - 1
        } else {
            // 2^(bits-1) - 1 is the top
            self.abs.bits() <= bits - 1
        }
    }

    /// Two's-complement big-endian word.
    ///
    /// In-range values of any declared width sign-extend naturally across
    /// the full 32 bytes.
    pub fn to_word(&self) -> [u8; 32] {
        let raw = if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        };
        let mut word = [0u8; 32];
        raw.to_big_endian(&mut word);
        word
    }

    /// Recover a value from a two's-complement word under a declared width.
    ///
    /// Bits above the width are discarded, so mismatched sign extensions
    /// re-canonicalize instead of failing.
    pub fn from_word(word: &[u8; 32], bits: usize) -> Self {
        let mask = width_mask(bits);
        let raw = U256::from_big_endian(word) & mask;
        let sign_bit = (raw >> (bits - 1)) & U256::one();
        if sign_bit.is_zero() {
            Self::new(raw, false)
        } else {
            let abs = ((!raw & mask).overflowing_add(U256::one()).0) & mask;
            Self::new(abs, true)
        }
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

impl From<i64> for I256 {
    fn from(value: i64) -> Self {
        Self::from_i128(value as i128)
    }
}

impl From<i128> for I256 {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

/// A host value in the canonical shape for its ABI type.
///
/// Tuples are ordered name-to-value pairs; fields with empty declared names
/// carry their ordinal index in decimal as the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 20-byte address
    Address(Address),
    /// Unsigned integer of any declared width
    Uint(U256),
    /// Signed integer of any declared width
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Fixed-size byte blob
    FixedBytes(Vec<u8>),
    /// Dynamic byte sequence
    Bytes(Vec<u8>),
    /// Text
    String(String),
    /// Fixed or dynamic array elements in order
    Array(Vec<Value>),
    /// Ordered named fields
    Tuple(Vec<(String, Value)>),
    /// 24-byte address+selector blob
    Function([u8; 24]),
}

impl Value {
    /// Look up a tuple field by key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Tuple(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Unsigned integer payload, if any
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Signed integer payload, if any
    pub fn as_int(&self) -> Option<I256> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Array elements, if any
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Name used in coercion/projection error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Value::Address(_) => "address",
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::FixedBytes(_) => "fixed bytes",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
            Value::Function(_) => "function",
        }
    }
}
