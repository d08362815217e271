//! Umbrella error type for primitive parsing

use thiserror::Error;

use crate::address::AddressError;
use crate::hash::HashError;

/// Error produced while constructing primitive values
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Address parsing failed
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Hash parsing failed
    #[error(transparent)]
    Hash(#[from] HashError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, H256};

    #[test]
    fn test_error_conversions() {
        let err: PrimitiveError = Address::from_hex("0x00").unwrap_err().into();
        assert!(matches!(err, PrimitiveError::Address(_)));

        let err: PrimitiveError = H256::from_hex("0x00").unwrap_err().into();
        assert!(matches!(err, PrimitiveError::Hash(_)));
    }
}
