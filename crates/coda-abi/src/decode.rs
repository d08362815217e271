//! ABI decoding
//!
//! The dual of the encoder, written for hostile input: every read is
//! bounds-checked, wire offsets and lengths are validated as 256-bit
//! unsigned values before any slice math or allocation, and recursion is
//! capped. Decoding either returns a value or an [`AbiError::Decode`];
//! it never panics, whatever the bytes.

use coda_primitives::{Address, U256};

use crate::error::AbiError;
use crate::types::{Type, WORD};
use crate::value::{width_mask, I256, Value};

/// Maximum recursion depth while walking a type tree.
const MAX_DEPTH: usize = 1024;

/// Decode a byte stream under a type.
///
/// The dual of [`crate::encode`]: the input is read as a one-element
/// argument list, so a dynamic top-level type (including a dynamic tuple)
/// sits behind a leading offset word. Trailing bytes beyond the encoding
/// are ignored.
pub fn decode(ty: &Type, data: &[u8]) -> Result<Value, AbiError> {
    Ok(decode_head(ty, data, 0, MAX_DEPTH)?.0)
}

/// Decode a bare argument frame under a tuple type, without the top-level
/// wrap. This is the calldata/return-data layout.
pub(crate) fn decode_tuple_frame(ty: &Type, data: &[u8]) -> Result<Value, AbiError> {
    match ty {
        Type::Tuple(_) => decode_frame(ty, data, MAX_DEPTH),
        _ => Err(AbiError::Decode(format!(
            "argument frame requires a tuple, got {}",
            ty
        ))),
    }
}

/// Decode a value rooted in a frame's head region.
///
/// Returns the value and the number of head bytes consumed: the inline
/// footprint for static types, one offset word for dynamic ones.
fn decode_head(
    ty: &Type,
    region: &[u8],
    offset: usize,
    depth: usize,
) -> Result<(Value, usize), AbiError> {
    if depth == 0 {
        return Err(AbiError::Decode(format!(
            "type nesting exceeds {} levels",
            MAX_DEPTH
        )));
    }

    if ty.is_dynamic() {
        let payload_at = read_offset(region, offset)?;
        let value = decode_frame(ty, &region[payload_at..], depth - 1)?;
        Ok((value, WORD))
    } else {
        decode_static(ty, region, offset, depth)
    }
}

/// Decode a static value inline at `offset`.
fn decode_static(
    ty: &Type,
    region: &[u8],
    offset: usize,
    depth: usize,
) -> Result<(Value, usize), AbiError> {
    match ty {
        Type::Address => {
            let word = read_word(region, offset)?;
            Ok((Value::Address(Address::from_word(&word)), WORD))
        }
        Type::Uint(bits) => {
            let word = read_word(region, offset)?;
            // Bits above the declared width are discarded
            let value = U256::from_big_endian(&word) & width_mask(*bits);
            Ok((Value::Uint(value), WORD))
        }
        Type::Int(bits) => {
            let word = read_word(region, offset)?;
            Ok((Value::Int(I256::from_word(&word, *bits)), WORD))
        }
        Type::Bool => {
            let word = read_word(region, offset)?;
            Ok((Value::Bool(word[31] != 0), WORD))
        }
        Type::FixedBytes(size) => {
            let word = read_word(region, offset)?;
            Ok((Value::FixedBytes(word[..*size].to_vec()), WORD))
        }
        Type::Function => {
            let word = read_word(region, offset)?;
            let mut blob = [0u8; 24];
            blob.copy_from_slice(&word[..24]);
            Ok((Value::Function(blob), WORD))
        }
        Type::FixedArray(elem, size) => {
            check_frame_capacity(region, offset, *size, elem.head_size())?;
            let mut items = Vec::with_capacity(*size);
            let mut at = offset;
            for _ in 0..*size {
                let (value, consumed) = decode_head(elem, region, at, depth - 1)?;
                items.push(value);
                at += consumed;
            }
            Ok((Value::Array(items), at - offset))
        }
        Type::Tuple(fields) => {
            let mut entries = Vec::with_capacity(fields.len());
            let mut at = offset;
            for (i, field) in fields.iter().enumerate() {
                let (value, consumed) = decode_head(&field.ty, region, at, depth - 1)?;
                entries.push((field.key(i), value));
                at += consumed;
            }
            Ok((Value::Tuple(entries), at - offset))
        }
        // Dynamic kinds never reach here
        _ => Err(AbiError::Decode(format!("{} is not a static type", ty))),
    }
}

/// Decode a value whose encoding region starts at byte 0 of `region`.
///
/// Used for dynamic payloads behind an offset and for top-level tuples;
/// inner offsets are relative to the region start.
fn decode_frame(ty: &Type, region: &[u8], depth: usize) -> Result<Value, AbiError> {
    if depth == 0 {
        return Err(AbiError::Decode(format!(
            "type nesting exceeds {} levels",
            MAX_DEPTH
        )));
    }

    match ty {
        Type::Bytes => Ok(Value::Bytes(read_payload(region)?.to_vec())),
        Type::String => {
            // Strings decode without UTF-8 validation; invalid sequences
            // are replaced, never rejected.
            let bytes = read_payload(region)?;
            Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
        }
        Type::Array(elem) => {
            let len = read_length(region, 0)?;
            let frame = &region[WORD..];
            check_frame_capacity(frame, 0, len, elem.head_size())?;
            let mut items = Vec::with_capacity(len);
            let mut at = 0;
            for _ in 0..len {
                let (value, consumed) = decode_head(elem, frame, at, depth - 1)?;
                items.push(value);
                at += consumed;
            }
            Ok(Value::Array(items))
        }
        Type::FixedArray(elem, size) => {
            check_frame_capacity(region, 0, *size, elem.head_size())?;
            let mut items = Vec::with_capacity(*size);
            let mut at = 0;
            for _ in 0..*size {
                let (value, consumed) = decode_head(elem, region, at, depth - 1)?;
                items.push(value);
                at += consumed;
            }
            Ok(Value::Array(items))
        }
        Type::Tuple(fields) => {
            let mut entries = Vec::with_capacity(fields.len());
            let mut at = 0;
            for (i, field) in fields.iter().enumerate() {
                let (value, consumed) = decode_head(&field.ty, region, at, depth - 1)?;
                entries.push((field.key(i), value));
                at += consumed;
            }
            Ok(Value::Tuple(entries))
        }
        _ => Err(AbiError::Decode(format!("{} is not a dynamic type", ty))),
    }
}

/// Read a 32-byte word, bounds-checked.
fn read_word(region: &[u8], offset: usize) -> Result<[u8; 32], AbiError> {
    let end = offset.checked_add(WORD).ok_or_else(offset_overflow)?;
    let slice = region.get(offset..end).ok_or_else(|| {
        AbiError::Decode(format!(
            "truncated input: need {} bytes, have {}",
            end,
            region.len()
        ))
    })?;
    let mut word = [0u8; 32];
    word.copy_from_slice(slice);
    Ok(word)
}

/// Read a word as an offset into `region`, rejecting anything past the end.
fn read_offset(region: &[u8], at: usize) -> Result<usize, AbiError> {
    let word = read_word(region, at)?;
    let value = U256::from_big_endian(&word);
    if value > U256::from(region.len() as u64) {
        return Err(AbiError::Decode(format!(
            "offset {} exceeds region of {} bytes",
            value,
            region.len()
        )));
    }
    Ok(value.low_u64() as usize)
}

/// Read a word as an element count, rejecting anything past the end.
fn read_length(region: &[u8], at: usize) -> Result<usize, AbiError> {
    let word = read_word(region, at)?;
    let value = U256::from_big_endian(&word);
    if value > U256::from(region.len() as u64) {
        return Err(AbiError::Decode(format!(
            "length {} exceeds region of {} bytes",
            value,
            region.len()
        )));
    }
    Ok(value.low_u64() as usize)
}

/// Read a length-prefixed byte payload at the start of `region`.
fn read_payload(region: &[u8]) -> Result<&[u8], AbiError> {
    let len = read_length(region, 0)?;
    let end = WORD.checked_add(len).ok_or_else(offset_overflow)?;
    region.get(WORD..end).ok_or_else(|| {
        AbiError::Decode(format!(
            "payload of {} bytes exceeds remaining {}",
            len,
            region.len().saturating_sub(WORD)
        ))
    })
}

/// Reject element counts whose head region cannot possibly fit, before
/// allocating for them.
fn check_frame_capacity(
    region: &[u8],
    offset: usize,
    count: usize,
    head_size: usize,
) -> Result<(), AbiError> {
    let need = count
        .checked_mul(head_size)
        .and_then(|n| n.checked_add(offset))
        .ok_or_else(offset_overflow)?;
    if need > region.len() {
        return Err(AbiError::Decode(format!(
            "{} elements need {} bytes, have {}",
            count,
            need,
            region.len()
        )));
    }
    Ok(())
}

fn offset_overflow() -> AbiError {
    AbiError::Decode("offset arithmetic overflow".into())
}
