//! JSON ABI argument records
//!
//! Consumes the structured `{name, type, components}` shape produced by
//! Solidity's JSON ABI output. Only the record shape is ingested here; the
//! surrounding descriptor format is an external concern.

use serde::{Deserialize, Serialize};

use crate::error::AbiError;
use crate::parser;
use crate::types::{TupleField, Type};

/// One argument record from a JSON ABI descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Argument name, possibly empty
    #[serde(default)]
    pub name: String,

    /// Textual type, e.g. `uint256` or `tuple[2][]`
    #[serde(rename = "type")]
    pub kind: String,

    /// Tuple component records; present iff the type base is `tuple`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Argument>,
}

impl Argument {
    /// Record with just a type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            kind: kind.into(),
            components: Vec::new(),
        }
    }

    /// Record with a name and a type.
    pub fn named(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            components: Vec::new(),
        }
    }

    /// Attach tuple components.
    pub fn with_components(mut self, components: Vec<Argument>) -> Self {
        self.components = components;
        self
    }

    /// Build the type tree this record describes.
    ///
    /// Equivalent to parsing the flattened textual form: a `tuple[…]` kind
    /// builds the tuple from `components` and then wraps it in the array
    /// nodes named by the trailing suffix chain.
    pub fn to_type(&self) -> Result<Type, AbiError> {
        if let Some(suffix) = self.kind.strip_prefix("tuple") {
            let tuple = tuple_type(&self.components)?;
            return parser::parse_suffixes(tuple, suffix);
        }

        if !self.components.is_empty() {
            return Err(AbiError::Parse(format!(
                "components are only valid for tuple types, found on '{}'",
                self.kind
            )));
        }
        self.kind.parse()
    }
}

/// Build a tuple type from an ordered list of argument records.
///
/// This is the shape of a method's `inputs`/`outputs` list.
pub fn tuple_type(args: &[Argument]) -> Result<Type, AbiError> {
    let mut fields = Vec::with_capacity(args.len());
    for arg in args {
        if !arg.name.is_empty() && fields.iter().any(|f: &TupleField| f.name == arg.name) {
            return Err(AbiError::Parse(format!(
                "duplicate argument name '{}'",
                arg.name
            )));
        }
        fields.push(TupleField::new(arg.name.clone(), arg.to_type()?));
    }
    Ok(Type::Tuple(fields))
}
