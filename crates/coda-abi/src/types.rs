//! ABI type tree

use std::fmt;
use std::str::FromStr;

use crate::error::AbiError;
use crate::parser;

/// Size of an ABI word in bytes.
pub(crate) const WORD: usize = 32;

/// A parsed ABI type.
///
/// The tree is immutable after construction and acyclic by construction:
/// the parser and the argument builder only ever produce finite trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// 20-byte address, right-aligned in a word
    Address,
    /// Unsigned integer with bit width (8, 16, ..., 256)
    Uint(usize),
    /// Signed two's-complement integer with bit width
    Int(usize),
    /// Boolean, one byte right-aligned in a word
    Bool,
    /// Fixed-size byte blob (1-32), right-padded in a word
    FixedBytes(usize),
    /// Dynamic byte sequence
    Bytes,
    /// Dynamic UTF-8 text; semantically a byte blob
    String,
    /// Fixed-length array
    FixedArray(Box<Type>, usize),
    /// Dynamic-length array
    Array(Box<Type>),
    /// Ordered, optionally named fields
    Tuple(Vec<TupleField>),
    /// 24-byte address+selector blob, right-padded in a word
    Function,
}

/// A named tuple field.
///
/// `name` may be empty; such fields are addressed by their ordinal index
/// rendered in decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    /// Field name, possibly empty
    pub name: String,
    /// Field type
    pub ty: Type,
}

impl TupleField {
    /// Create a field. An empty name leaves the field positional.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Key this field is addressed by at position `index`.
    pub fn key(&self, index: usize) -> String {
        if self.name.is_empty() {
            index.to_string()
        } else {
            self.name.clone()
        }
    }
}

impl Type {
    /// Parse a type expression, panicking on failure.
    ///
    /// Intended for static tables and tests; use `FromStr` elsewhere.
    pub fn must(s: &str) -> Self {
        s.parse().expect("invalid type expression")
    }

    /// Check if this type is dynamic (encoded size depends on the value).
    pub fn is_dynamic(&self) -> bool {
        match self {
            Type::Bytes | Type::String | Type::Array(_) => true,
            Type::FixedArray(elem, _) => elem.is_dynamic(),
            Type::Tuple(fields) => fields.iter().any(|f| f.ty.is_dynamic()),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in its enclosing head region.
    ///
    /// Dynamic types occupy exactly one offset word.
    pub fn head_size(&self) -> usize {
        match self {
            Type::FixedArray(elem, size) if !elem.is_dynamic() => elem.head_size() * size,
            Type::Tuple(fields) if !self.is_dynamic() => {
                fields.iter().map(|f| f.ty.head_size()).sum()
            }
            _ => WORD,
        }
    }

    /// Total encoded byte footprint for a static type, `None` if dynamic.
    pub fn fixed_size(&self) -> Option<usize> {
        if self.is_dynamic() {
            None
        } else {
            Some(self.head_size())
        }
    }

    /// Direct child types of this node.
    pub fn children(&self) -> Vec<&Type> {
        match self {
            Type::FixedArray(elem, _) | Type::Array(elem) => vec![elem],
            Type::Tuple(fields) => fields.iter().map(|f| &f.ty).collect(),
            _ => Vec::new(),
        }
    }

    /// Canonical signature form: tuples inlined as `(…)`, no field names.
    ///
    /// This is the rendering used for selector computation.
    pub fn signature(&self) -> String {
        match self {
            Type::FixedArray(elem, size) => format!("{}[{}]", elem.signature(), size),
            Type::Array(elem) => format!("{}[]", elem.signature()),
            Type::Tuple(fields) => {
                let inner: Vec<String> = fields.iter().map(|f| f.ty.signature()).collect();
                format!("({})", inner.join(","))
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Address => write!(f, "address"),
            Type::Uint(bits) => write!(f, "uint{}", bits),
            Type::Int(bits) => write!(f, "int{}", bits),
            Type::Bool => write!(f, "bool"),
            Type::FixedBytes(size) => write!(f, "bytes{}", size),
            Type::Bytes => write!(f, "bytes"),
            Type::String => write!(f, "string"),
            Type::FixedArray(elem, size) => write!(f, "{}[{}]", elem, size),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Tuple(fields) => {
                write!(f, "tuple(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if field.name.is_empty() {
                        write!(f, "{}", field.ty)?;
                    } else {
                        write!(f, "{} {}", field.ty, field.name)?;
                    }
                }
                write!(f, ")")
            }
            Type::Function => write!(f, "function"),
        }
    }
}

impl FromStr for Type {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}
