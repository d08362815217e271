//! ABI error types

use thiserror::Error;

/// Error produced by the ABI codec.
///
/// Each variant corresponds to one stage of the pipeline, so callers can
/// distinguish a malformed type expression from a hostile byte stream.
#[derive(Debug, Error)]
pub enum AbiError {
    /// Malformed type expression or argument record
    #[error("type parse error: {0}")]
    Parse(String),

    /// Input value cannot be coerced to the declared type
    #[error("cannot normalize value: {0}")]
    Normalize(String),

    /// Value rejected by the encoder
    #[error("encode error: {0}")]
    Encode(String),

    /// Byte stream rejected by the decoder
    #[error("decode error: {0}")]
    Decode(String),

    /// Host record does not line up with the ABI tuple
    #[error("struct projection error: {0}")]
    Projection(String),
}

impl From<hex::FromHexError> for AbiError {
    fn from(e: hex::FromHexError) -> Self {
        AbiError::Normalize(format!("invalid hex: {}", e))
    }
}
