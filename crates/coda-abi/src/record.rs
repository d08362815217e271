//! Struct projection
//!
//! Maps decoded tuples to and from named host records. A record declares
//! its field table out of band: each host field may carry an ABI name tag;
//! untagged fields fall back to their identifier with the first character
//! lowercased. The [`abi_record!`] macro generates the table and the
//! accessor plumbing for plain structs.

use coda_primitives::{Address, H256, U256};

use crate::decode::decode;
use crate::encode::encode_any;
use crate::error::AbiError;
use crate::normalize::DynValue;
use crate::types::Type;
use crate::value::{I256, Value};

/// One entry of a record's field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Host field identifier
    pub host: &'static str,
    /// Declared ABI name, if tagged
    pub tag: Option<&'static str>,
}

impl FieldSpec {
    /// ABI name this field binds to: the tag, or the host identifier with
    /// its first character lowercased.
    pub fn abi_name(&self) -> String {
        match self.tag {
            Some(tag) => tag.to_string(),
            None => lowercase_first(self.host),
        }
    }
}

/// Lowercase the first character of an identifier.
pub fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A host record projectable onto an ABI tuple.
pub trait Record: Default {
    /// Field table in declaration order.
    fn fields() -> &'static [FieldSpec];

    /// Read a field as a loose value by host identifier.
    fn get(&self, host: &str) -> Option<DynValue>;

    /// Write a decoded value into a field by host identifier.
    fn set(&mut self, host: &str, value: Value) -> Result<(), AbiError>;
}

/// Encode a record under a tuple type.
///
/// Every tuple field must map onto a host field; the reverse is not
/// required.
pub fn encode_record<R: Record>(ty: &Type, record: &R) -> Result<Vec<u8>, AbiError> {
    let fields = match ty {
        Type::Tuple(fields) => fields,
        other => {
            return Err(AbiError::Projection(format!(
                "record projection requires a tuple type, got {}",
                other
            )));
        }
    };

    let mut entries = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        let key = field.key(i);
        let spec = R::fields()
            .iter()
            .find(|s| s.abi_name() == key)
            .ok_or_else(|| {
                AbiError::Projection(format!("no host field maps to ABI field '{}'", key))
            })?;
        let value = record.get(spec.host).ok_or_else(|| {
            AbiError::Projection(format!("host field '{}' is not readable", spec.host))
        })?;
        entries.push((key, value));
    }

    encode_any(&DynValue::Mapping(entries), ty)
}

/// Decode bytes under a tuple type into a fresh record.
///
/// Tuple fields with no matching host field are discarded; host fields
/// with no matching tuple field keep their default value.
pub fn decode_record<R: Record>(ty: &Type, data: &[u8]) -> Result<R, AbiError> {
    if !matches!(ty, Type::Tuple(_)) {
        return Err(AbiError::Projection(format!(
            "record projection requires a tuple type, got {}",
            ty
        )));
    }

    let decoded = decode(ty, data)?;
    let entries = match decoded {
        Value::Tuple(entries) => entries,
        _ => unreachable!("tuple types decode to tuple values"),
    };

    let mut record = R::default();
    for (key, value) in entries {
        if let Some(spec) = R::fields().iter().find(|s| s.abi_name() == key) {
            record.set(spec.host, value)?;
        }
    }
    Ok(record)
}

/// Conversion between host field types and ABI values.
///
/// `from_value` enforces assignment compatibility: a decoded integer that
/// does not fit the host width is a projection error.
pub trait FieldValue: Sized {
    /// Loose value for encoding.
    fn to_dyn(&self) -> DynValue;
    /// Convert a decoded value, checking widths and kinds.
    fn from_value(value: Value) -> Result<Self, AbiError>;
}

fn kind_error(expected: &str, value: &Value) -> AbiError {
    AbiError::Projection(format!(
        "expected {} value, got {}",
        expected,
        value.kind_name()
    ))
}

impl FieldValue for Address {
    fn to_dyn(&self) -> DynValue {
        DynValue::Value(Value::Address(*self))
    }

    fn from_value(value: Value) -> Result<Self, AbiError> {
        match value {
            Value::Address(addr) => Ok(addr),
            other => Err(kind_error("address", &other)),
        }
    }
}

impl FieldValue for U256 {
    fn to_dyn(&self) -> DynValue {
        DynValue::Value(Value::Uint(*self))
    }

    fn from_value(value: Value) -> Result<Self, AbiError> {
        match value {
            Value::Uint(v) => Ok(v),
            other => Err(kind_error("uint", &other)),
        }
    }
}

impl FieldValue for I256 {
    fn to_dyn(&self) -> DynValue {
        DynValue::Value(Value::Int(*self))
    }

    fn from_value(value: Value) -> Result<Self, AbiError> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(kind_error("int", &other)),
        }
    }
}

impl FieldValue for bool {
    fn to_dyn(&self) -> DynValue {
        DynValue::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, AbiError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(kind_error("bool", &other)),
        }
    }
}

impl FieldValue for String {
    fn to_dyn(&self) -> DynValue {
        DynValue::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, AbiError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(kind_error("string", &other)),
        }
    }
}

impl FieldValue for Vec<u8> {
    fn to_dyn(&self) -> DynValue {
        DynValue::Bytes(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, AbiError> {
        match value {
            Value::Bytes(b) | Value::FixedBytes(b) => Ok(b),
            other => Err(kind_error("bytes", &other)),
        }
    }
}

impl<const N: usize> FieldValue for [u8; N] {
    fn to_dyn(&self) -> DynValue {
        DynValue::Bytes(self.to_vec())
    }

    fn from_value(value: Value) -> Result<Self, AbiError> {
        let bytes = match value {
            Value::Bytes(b) | Value::FixedBytes(b) => b,
            other => return Err(kind_error("bytes", &other)),
        };
        let len = bytes.len();
        bytes.try_into().map_err(|_| {
            AbiError::Projection(format!("expected {} bytes, got {}", N, len))
        })
    }
}

impl FieldValue for H256 {
    fn to_dyn(&self) -> DynValue {
        DynValue::Bytes(self.as_bytes().to_vec())
    }

    fn from_value(value: Value) -> Result<Self, AbiError> {
        let bytes = <[u8; 32]>::from_value(value)?;
        Ok(H256::from_bytes(bytes))
    }
}

macro_rules! uint_field_impls {
    ($($t:ty),*) => {
        $(impl FieldValue for $t {
            fn to_dyn(&self) -> DynValue {
                DynValue::Uint(*self as u128)
            }

            fn from_value(value: Value) -> Result<Self, AbiError> {
                let v = match value {
                    Value::Uint(v) => v,
                    other => return Err(kind_error("uint", &other)),
                };
                if v.bits() > 128 || v.low_u128() > <$t>::MAX as u128 {
                    return Err(AbiError::Projection(format!(
                        "value {} does not fit {}",
                        v,
                        stringify!($t)
                    )));
                }
                Ok(v.low_u128() as $t)
            }
        })*
    };
}

macro_rules! int_field_impls {
    ($($t:ty),*) => {
        $(impl FieldValue for $t {
            fn to_dyn(&self) -> DynValue {
                DynValue::Int(*self as i128)
            }

            fn from_value(value: Value) -> Result<Self, AbiError> {
                let v = match value {
                    Value::Int(v) => v,
                    other => return Err(kind_error("int", &other)),
                };
                let out_of_range = || {
                    AbiError::Projection(format!("value {} does not fit {}", v, stringify!($t)))
                };
                if v.abs().bits() > 128 {
                    return Err(out_of_range());
                }
                let magnitude = v.abs().low_u128();
                let signed: i128 = if v.is_negative() {
                    if magnitude > (1u128 << 127) {
                        return Err(out_of_range());
                    }
                    magnitude.wrapping_neg() as i128
                } else {
                    i128::try_from(magnitude).map_err(|_| out_of_range())?
                };
                <$t>::try_from(signed).map_err(|_| out_of_range())
            }
        })*
    };
}

uint_field_impls!(u8, u16, u32, u64, u128);
int_field_impls!(i8, i16, i32, i64, i128);

macro_rules! vec_field_impls {
    ($($t:ty),*) => {
        $(impl FieldValue for Vec<$t> {
            fn to_dyn(&self) -> DynValue {
                DynValue::Sequence(self.iter().map(FieldValue::to_dyn).collect())
            }

            fn from_value(value: Value) -> Result<Self, AbiError> {
                match value {
                    Value::Array(items) => {
                        items.into_iter().map(FieldValue::from_value).collect()
                    }
                    other => Err(kind_error("array", &other)),
                }
            }
        })*
    };
}

vec_field_impls!(
    Address,
    U256,
    I256,
    H256,
    String,
    bool,
    u16,
    u32,
    u64,
    u128,
    i16,
    i32,
    i64,
    i128,
    Vec<u8>
);

/// Declare a struct together with its [`Record`] implementation.
///
/// Each field may carry an ABI name tag in brackets; untagged fields bind
/// by the lowercase-first-character convention.
///
/// ```
/// use coda_abi::{abi_record, decode_record, encode_record, Type};
/// use coda_primitives::{Address, U256};
///
/// abi_record! {
///     pub struct Transfer {
///         pub to ["dst"]: Address,
///         pub amount: U256,
///     }
/// }
///
/// let ty = Type::must("tuple(address dst, uint256 amount)");
/// let original = Transfer { to: Address::ZERO, amount: U256::from(7) };
/// let encoded = encode_record(&ty, &original).unwrap();
/// let decoded: Transfer = decode_record(&ty, &encoded).unwrap();
/// assert_eq!(original, decoded);
/// ```
#[macro_export]
macro_rules! abi_record {
    (@tag) => {
        None
    };
    (@tag $tag:literal) => {
        Some($tag)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $fvis:vis $field:ident $([$tag:literal])? : $fty:ty ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( $fvis $field: $fty, )+
        }

        impl $crate::Record for $name {
            fn fields() -> &'static [$crate::FieldSpec] {
                const FIELDS: &[$crate::FieldSpec] = &[
                    $( $crate::FieldSpec {
                        host: stringify!($field),
                        tag: $crate::abi_record!(@tag $($tag)?),
                    }, )+
                ];
                FIELDS
            }

            fn get(&self, host: &str) -> Option<$crate::DynValue> {
                match host {
                    $( stringify!($field) => {
                        Some($crate::FieldValue::to_dyn(&self.$field))
                    } )+
                    _ => None,
                }
            }

            fn set(&mut self, host: &str, value: $crate::Value) -> Result<(), $crate::AbiError> {
                match host {
                    $( stringify!($field) => {
                        self.$field = $crate::FieldValue::from_value(value)?;
                        Ok(())
                    } )+
                    other => Err($crate::AbiError::Projection(format!(
                        "unknown host field '{}'",
                        other
                    ))),
                }
            }
        }
    };
}
