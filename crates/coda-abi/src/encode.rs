//! ABI encoding
//!
//! Head/tail layout per tuple and per array: static fields inline in the
//! head, dynamic fields behind a 32-byte offset word pointing into the
//! tail. Offsets are measured from the start of the enclosing encoding
//! region; at the top level that is byte 0 of the output.

use coda_primitives::U256;

use crate::error::AbiError;
use crate::normalize::{normalize, DynValue};
use crate::types::{Type, WORD};
use crate::value::Value;

/// Encode a canonical value under a type.
///
/// The value is treated as a one-element argument list: a dynamic
/// top-level type (including a dynamic tuple) carries a leading offset
/// word, a static one encodes inline. This mirrors `abi.encode(x)` of a
/// single value; method calldata instead uses the bare argument frame
/// (see [`crate::Method`]).
pub fn encode(value: &Value, ty: &Type) -> Result<Vec<u8>, AbiError> {
    encode_frame(&[(ty, value)])
}

/// Normalize a loose input and encode it.
pub fn encode_any(input: &DynValue, ty: &Type) -> Result<Vec<u8>, AbiError> {
    let value = normalize(ty, input)?;
    encode(&value, ty)
}

/// Encode a tuple value as a bare argument frame, without the top-level
/// wrap. This is the calldata/return-data layout.
pub(crate) fn encode_tuple_frame(value: &Value, ty: &Type) -> Result<Vec<u8>, AbiError> {
    match (ty, value) {
        (Type::Tuple(fields), Value::Tuple(entries)) => {
            let items = pair_fields(fields, entries)?;
            encode_frame(&items)
        }
        _ => Err(AbiError::Encode(format!(
            "argument frame requires a tuple, got {}",
            ty
        ))),
    }
}

/// Resolve tuple entries against declared fields, in declared order.
fn pair_fields<'a>(
    fields: &'a [crate::types::TupleField],
    entries: &'a [(String, Value)],
) -> Result<Vec<(&'a Type, &'a Value)>, AbiError> {
    let mut items = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        let key = field.key(i);
        let value = entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| AbiError::Encode(format!("missing tuple field '{}'", key)))?;
        items.push((&field.ty, value));
    }
    Ok(items)
}

/// Encode one head/tail region from typed items.
fn encode_frame(items: &[(&Type, &Value)]) -> Result<Vec<u8>, AbiError> {
    let head_size: usize = items.iter().map(|(ty, _)| ty.head_size()).sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (ty, value) in items {
        if ty.is_dynamic() {
            head.extend_from_slice(&len_word(head_size + tail.len()));
            tail.extend(encode_value(ty, value)?);
        } else {
            head.extend(encode_value(ty, value)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Encode a single value; dynamic payloads come without their offset word.
fn encode_value(ty: &Type, value: &Value) -> Result<Vec<u8>, AbiError> {
    match (ty, value) {
        (Type::Address, Value::Address(addr)) => Ok(addr.into_word().to_vec()),
        (Type::Uint(bits), Value::Uint(v)) => {
            if v.bits() > *bits {
                return Err(AbiError::Encode(format!(
                    "value {} does not fit uint{}",
                    v, bits
                )));
            }
            let mut word = [0u8; 32];
            v.to_big_endian(&mut word);
            Ok(word.to_vec())
        }
        (Type::Int(bits), Value::Int(v)) => {
            if !v.fits(*bits) {
                return Err(AbiError::Encode(format!(
                    "value {} does not fit int{}",
                    v, bits
                )));
            }
            Ok(v.to_word().to_vec())
        }
        (Type::Bool, Value::Bool(b)) => {
            let mut word = [0u8; 32];
            word[31] = *b as u8;
            Ok(word.to_vec())
        }
        (Type::FixedBytes(size), Value::FixedBytes(data)) => {
            if data.len() != *size {
                return Err(AbiError::Encode(format!(
                    "expected {} bytes for bytes{}, got {}",
                    size,
                    size,
                    data.len()
                )));
            }
            let mut word = [0u8; 32];
            word[..data.len()].copy_from_slice(data);
            Ok(word.to_vec())
        }
        (Type::Function, Value::Function(blob)) => {
            let mut word = [0u8; 32];
            word[..24].copy_from_slice(blob);
            Ok(word.to_vec())
        }
        (Type::Bytes, Value::Bytes(data)) => Ok(encode_bytes(data)),
        (Type::String, Value::String(s)) => Ok(encode_bytes(s.as_bytes())),
        (Type::Array(elem), Value::Array(items)) => {
            let mut out = len_word(items.len()).to_vec();
            let typed: Vec<(&Type, &Value)> =
                items.iter().map(|item| (elem.as_ref(), item)).collect();
            out.extend(encode_frame(&typed)?);
            Ok(out)
        }
        (Type::FixedArray(elem, size), Value::Array(items)) => {
            if items.len() != *size {
                return Err(AbiError::Encode(format!(
                    "expected {} elements for {}, got {}",
                    size,
                    ty,
                    items.len()
                )));
            }
            let typed: Vec<(&Type, &Value)> =
                items.iter().map(|item| (elem.as_ref(), item)).collect();
            encode_frame(&typed)
        }
        (Type::Tuple(fields), Value::Tuple(entries)) => {
            let items = pair_fields(fields, entries)?;
            encode_frame(&items)
        }
        (ty, value) => Err(AbiError::Encode(format!(
            "cannot encode {} value as {}",
            value.kind_name(),
            ty
        ))),
    }
}

/// Length-prefixed, zero-right-padded byte payload.
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = len_word(data.len()).to_vec();
    out.extend_from_slice(data);
    let rem = data.len() % WORD;
    if rem != 0 {
        out.extend(std::iter::repeat(0u8).take(WORD - rem));
    }
    out
}

fn len_word(value: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    U256::from(value).to_big_endian(&mut word);
    word
}
