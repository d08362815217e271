//! Loose input values and best-effort coercion
//!
//! Callers rarely hold values in the exact canonical shape: JSON delivers
//! floats and strings, addresses arrive as hex text, tuples as maps. The
//! [`DynValue`] type models that loosely-typed input algebraically, and
//! [`normalize`] coerces it into the canonical [`Value`] for a declared
//! type. Normalization is idempotent: feeding a canonical value back
//! through is the identity.

use coda_primitives::{Address, U256};

use crate::error::AbiError;
use crate::types::Type;
use crate::value::{I256, Value};

/// A loosely-typed input value.
#[derive(Debug, Clone, PartialEq)]
pub enum DynValue {
    /// Absent value; never coercible
    Null,
    /// Unsigned native integer
    Uint(u128),
    /// Signed native integer
    Int(i128),
    /// Floating-point number; accepted only when integral and in range
    Float(f64),
    /// Text, including decimal and `0x` hex literals
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Boolean
    Bool(bool),
    /// Ordered sequence
    Sequence(Vec<DynValue>),
    /// Key-to-value mapping for tuples
    Mapping(Vec<(String, DynValue)>),
    /// Already-canonical value, revalidated on normalization
    Value(Value),
}

impl DynValue {
    /// Build a sequence from anything convertible.
    pub fn seq<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<DynValue>,
    {
        DynValue::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Build a mapping from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<DynValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        DynValue::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn describe(&self) -> &'static str {
        match self {
            DynValue::Null => "null",
            DynValue::Uint(_) | DynValue::Int(_) => "integer",
            DynValue::Float(_) => "float",
            DynValue::String(_) => "string",
            DynValue::Bytes(_) => "bytes",
            DynValue::Bool(_) => "bool",
            DynValue::Sequence(_) => "sequence",
            DynValue::Mapping(_) => "mapping",
            DynValue::Value(v) => v.kind_name(),
        }
    }
}

macro_rules! dyn_from_uint {
    ($($t:ty),*) => {
        $(impl From<$t> for DynValue {
            fn from(value: $t) -> Self {
                DynValue::Uint(value as u128)
            }
        })*
    };
}

macro_rules! dyn_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for DynValue {
            fn from(value: $t) -> Self {
                DynValue::Int(value as i128)
            }
        })*
    };
}

dyn_from_uint!(u8, u16, u32, u64, u128, usize);
dyn_from_int!(i8, i16, i32, i64, i128);

impl From<f64> for DynValue {
    fn from(value: f64) -> Self {
        DynValue::Float(value)
    }
}

impl From<bool> for DynValue {
    fn from(value: bool) -> Self {
        DynValue::Bool(value)
    }
}

impl From<&str> for DynValue {
    fn from(value: &str) -> Self {
        DynValue::String(value.to_string())
    }
}

impl From<String> for DynValue {
    fn from(value: String) -> Self {
        DynValue::String(value)
    }
}

impl From<Vec<u8>> for DynValue {
    fn from(value: Vec<u8>) -> Self {
        DynValue::Bytes(value)
    }
}

impl From<&[u8]> for DynValue {
    fn from(value: &[u8]) -> Self {
        DynValue::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for DynValue {
    fn from(value: [u8; N]) -> Self {
        DynValue::Bytes(value.to_vec())
    }
}

impl From<Vec<DynValue>> for DynValue {
    fn from(value: Vec<DynValue>) -> Self {
        DynValue::Sequence(value)
    }
}

impl From<U256> for DynValue {
    fn from(value: U256) -> Self {
        DynValue::Value(Value::Uint(value))
    }
}

impl From<I256> for DynValue {
    fn from(value: I256) -> Self {
        DynValue::Value(Value::Int(value))
    }
}

impl From<Address> for DynValue {
    fn from(value: Address) -> Self {
        DynValue::Value(Value::Address(value))
    }
}

impl From<Value> for DynValue {
    fn from(value: Value) -> Self {
        DynValue::Value(value)
    }
}

impl From<serde_json::Value> for DynValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DynValue::Null,
            serde_json::Value::Bool(b) => DynValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    DynValue::Uint(u as u128)
                } else if let Some(i) = n.as_i64() {
                    DynValue::Int(i as i128)
                } else {
                    DynValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => DynValue::String(s),
            serde_json::Value::Array(items) => {
                DynValue::Sequence(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => DynValue::Mapping(
                entries.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

fn mismatch(ty: &Type, input: &DynValue) -> AbiError {
    AbiError::Normalize(format!("cannot coerce {} into {}", input.describe(), ty))
}

/// Parse a hex magnitude (no `0x` prefix) with overflow checking.
///
/// Odd digit counts are fine here: this is numeric, not byte, syntax.
fn u256_from_hex(digits: &str) -> Result<U256, AbiError> {
    if digits.is_empty() {
        return Err(AbiError::Normalize("empty hex literal".into()));
    }
    let mut value = U256::zero();
    for c in digits.chars() {
        let digit = c
            .to_digit(16)
            .ok_or_else(|| AbiError::Normalize(format!("invalid hex digit '{}'", c)))?;
        value = value
            .checked_mul(U256::from(16u8))
            .and_then(|v| v.checked_add(U256::from(digit)))
            .ok_or_else(|| AbiError::Normalize("hex literal exceeds 256 bits".into()))?;
    }
    Ok(value)
}

fn u256_from_str(s: &str) -> Result<U256, AbiError> {
    if let Some(digits) = s.strip_prefix("0x") {
        u256_from_hex(digits)
    } else {
        U256::from_dec_str(s)
            .map_err(|_| AbiError::Normalize(format!("invalid unsigned integer '{}'", s)))
    }
}

fn i256_from_str(s: &str) -> Result<I256, AbiError> {
    let (magnitude, negative) = match s.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (s.strip_prefix('+').unwrap_or(s), false),
    };
    if let Some(digits) = magnitude.strip_prefix("0x") {
        Ok(I256::new(u256_from_hex(digits)?, negative))
    } else {
        I256::from_dec_str(s)
    }
}

fn float_to_i128(f: f64) -> Result<i128, AbiError> {
    if !f.is_finite() || f.fract() != 0.0 {
        return Err(AbiError::Normalize(format!(
            "float {} is not an integral value",
            f
        )));
    }
    // 2^127; the negated bound is exactly i128::MIN
    const LIMIT: f64 = 170141183460469231731687303715884105728.0;
    if f >= LIMIT || f < -LIMIT {
        return Err(AbiError::Normalize(format!("float {} is out of range", f)));
    }
    Ok(f as i128)
}

fn check_uint(value: U256, bits: usize) -> Result<Value, AbiError> {
    if value.bits() > bits {
        return Err(AbiError::Normalize(format!(
            "value {} does not fit uint{}",
            value, bits
        )));
    }
    Ok(Value::Uint(value))
}

fn check_int(value: I256, bits: usize) -> Result<Value, AbiError> {
    if !value.fits(bits) {
        return Err(AbiError::Normalize(format!(
            "value {} does not fit int{}",
            value, bits
        )));
    }
    Ok(Value::Int(value))
}

fn hex_bytes(s: &str) -> Result<Vec<u8>, AbiError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| AbiError::Normalize(format!("expected 0x-prefixed hex, got '{}'", s)))?;
    Ok(hex::decode(digits)?)
}

/// Coerce a loose input into the canonical shape for `ty`.
pub fn normalize(ty: &Type, input: &DynValue) -> Result<Value, AbiError> {
    if let DynValue::Value(value) = input {
        return from_canonical(ty, value);
    }

    match ty {
        Type::Uint(bits) => match input {
            DynValue::Uint(u) => check_uint(U256::from(*u), *bits),
            DynValue::Int(i) if *i >= 0 => check_uint(U256::from(*i as u128), *bits),
            DynValue::Float(f) => {
                let i = float_to_i128(*f)?;
                if i < 0 {
                    return Err(mismatch(ty, input));
                }
                check_uint(U256::from(i as u128), *bits)
            }
            DynValue::String(s) => check_uint(u256_from_str(s)?, *bits),
            _ => Err(mismatch(ty, input)),
        },
        Type::Int(bits) => match input {
            DynValue::Int(i) => check_int(I256::from_i128(*i), *bits),
            DynValue::Uint(u) => check_int(I256::new(U256::from(*u), false), *bits),
            DynValue::Float(f) => check_int(I256::from_i128(float_to_i128(*f)?), *bits),
            DynValue::String(s) => check_int(i256_from_str(s)?, *bits),
            _ => Err(mismatch(ty, input)),
        },
        Type::Address => match input {
            DynValue::Bytes(b) => Address::from_slice(b)
                .map(Value::Address)
                .map_err(|e| AbiError::Normalize(e.to_string())),
            DynValue::String(s) => Address::from_hex(s)
                .map(Value::Address)
                .map_err(|e| AbiError::Normalize(e.to_string())),
            _ => Err(mismatch(ty, input)),
        },
        Type::Bool => match input {
            DynValue::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(mismatch(ty, input)),
        },
        Type::FixedBytes(size) => match input {
            DynValue::Bytes(b) => {
                if b.len() != *size {
                    return Err(AbiError::Normalize(format!(
                        "expected {} bytes for bytes{}, got {}",
                        size,
                        size,
                        b.len()
                    )));
                }
                Ok(Value::FixedBytes(b.clone()))
            }
            DynValue::String(s) => {
                // Short hex literals zero-pad on the right
                let mut bytes = hex_bytes(s)?;
                if bytes.len() > *size {
                    return Err(AbiError::Normalize(format!(
                        "hex literal of {} bytes does not fit bytes{}",
                        bytes.len(),
                        size
                    )));
                }
                bytes.resize(*size, 0);
                Ok(Value::FixedBytes(bytes))
            }
            _ => Err(mismatch(ty, input)),
        },
        Type::Bytes => match input {
            DynValue::Bytes(b) => Ok(Value::Bytes(b.clone())),
            DynValue::String(s) if s.starts_with("0x") => Ok(Value::Bytes(hex_bytes(s)?)),
            DynValue::String(s) => Ok(Value::Bytes(s.clone().into_bytes())),
            _ => Err(mismatch(ty, input)),
        },
        Type::String => match input {
            DynValue::String(s) => Ok(Value::String(s.clone())),
            DynValue::Bytes(b) => String::from_utf8(b.clone())
                .map(Value::String)
                .map_err(|_| AbiError::Normalize("bytes are not valid UTF-8".into())),
            _ => Err(mismatch(ty, input)),
        },
        Type::Function => match input {
            DynValue::Bytes(b) => function_blob(b),
            DynValue::String(s) => function_blob(&hex_bytes(s)?),
            _ => Err(mismatch(ty, input)),
        },
        Type::Array(elem) => match input {
            DynValue::Sequence(items) => {
                let values = items
                    .iter()
                    .map(|item| normalize(elem, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
            _ => Err(mismatch(ty, input)),
        },
        Type::FixedArray(elem, size) => match input {
            DynValue::Sequence(items) => {
                if items.len() != *size {
                    return Err(AbiError::Normalize(format!(
                        "expected {} elements for {}, got {}",
                        size,
                        ty,
                        items.len()
                    )));
                }
                let values = items
                    .iter()
                    .map(|item| normalize(elem, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
            _ => Err(mismatch(ty, input)),
        },
        Type::Tuple(fields) => match input {
            DynValue::Mapping(entries) => {
                let mut values = Vec::with_capacity(fields.len());
                for (i, field) in fields.iter().enumerate() {
                    let key = field.key(i);
                    let entry = entries
                        .iter()
                        .find(|(k, _)| *k == key)
                        .ok_or_else(|| {
                            AbiError::Normalize(format!("missing tuple field '{}'", key))
                        })?;
                    values.push((key, normalize(&field.ty, &entry.1)?));
                }
                Ok(Value::Tuple(values))
            }
            // Sequences bind to fields positionally
            DynValue::Sequence(items) => {
                if items.len() != fields.len() {
                    return Err(AbiError::Normalize(format!(
                        "expected {} tuple fields, got {}",
                        fields.len(),
                        items.len()
                    )));
                }
                let mut values = Vec::with_capacity(fields.len());
                for (i, (field, item)) in fields.iter().zip(items).enumerate() {
                    values.push((field.key(i), normalize(&field.ty, item)?));
                }
                Ok(Value::Tuple(values))
            }
            _ => Err(mismatch(ty, input)),
        },
    }
}

fn function_blob(bytes: &[u8]) -> Result<Value, AbiError> {
    let blob: [u8; 24] = bytes.try_into().map_err(|_| {
        AbiError::Normalize(format!(
            "expected 24 bytes for function, got {}",
            bytes.len()
        ))
    })?;
    Ok(Value::Function(blob))
}

/// Revalidate an already-canonical value against `ty`.
fn from_canonical(ty: &Type, value: &Value) -> Result<Value, AbiError> {
    match (ty, value) {
        (Type::Uint(bits), Value::Uint(u)) => check_uint(*u, *bits),
        (Type::Int(bits), Value::Int(i)) => check_int(*i, *bits),
        (Type::Address, Value::Address(_))
        | (Type::Bool, Value::Bool(_))
        | (Type::Bytes, Value::Bytes(_))
        | (Type::String, Value::String(_))
        | (Type::Function, Value::Function(_)) => Ok(value.clone()),
        (Type::FixedBytes(size), Value::FixedBytes(b)) if b.len() == *size => Ok(value.clone()),
        (Type::Array(elem), Value::Array(items)) => {
            let values = items
                .iter()
                .map(|item| from_canonical(elem, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        }
        (Type::FixedArray(elem, size), Value::Array(items)) if items.len() == *size => {
            let values = items
                .iter()
                .map(|item| from_canonical(elem, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        }
        (Type::Tuple(fields), Value::Tuple(entries)) => {
            let mut values = Vec::with_capacity(fields.len());
            for (i, field) in fields.iter().enumerate() {
                let key = field.key(i);
                let entry = entries.iter().find(|(k, _)| *k == key).ok_or_else(|| {
                    AbiError::Normalize(format!("missing tuple field '{}'", key))
                })?;
                values.push((key, from_canonical(&field.ty, &entry.1)?));
            }
            Ok(Value::Tuple(values))
        }
        _ => Err(AbiError::Normalize(format!(
            "canonical {} value does not match {}",
            value.kind_name(),
            ty
        ))),
    }
}
