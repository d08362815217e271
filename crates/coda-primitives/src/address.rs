//! Ethereum-compatible address type (20 bytes)

use std::fmt;
use thiserror::Error;

use crate::WORD;

/// Address parsing error
#[derive(Debug, Error)]
pub enum AddressError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// Ethereum-compatible 20-byte address
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 20;

    /// Zero address (0x0000...0000)
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create address from bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Create address from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        if slice.len() != Self::LEN {
            return Err(AddressError::InvalidLength(slice.len()));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(slice);
        Ok(Address(bytes))
    }

    /// Parse address from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get as byte slice
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Right-align the address into a 32-byte ABI word.
    pub fn into_word(self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[WORD - Self::LEN..].copy_from_slice(&self.0);
        word
    }

    /// Extract an address from the low 20 bytes of a 32-byte ABI word.
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[WORD - Self::LEN..]);
        Address(bytes)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_hex() {
        let addr = Address::from_hex("0xdbb881a51CD4023E4400CEF3ef73046743f08da3").unwrap();
        assert!(!addr.is_zero());

        let bare = Address::from_hex("dbb881a51CD4023E4400CEF3ef73046743f08da3").unwrap();
        assert_eq!(addr, bare);
    }

    #[test]
    fn test_address_hex_case_insensitive() {
        let lower = Address::from_hex("0xdbb881a51cd4023e4400cef3ef73046743f08da3").unwrap();
        let upper = Address::from_hex("0xDBB881A51CD4023E4400CEF3EF73046743F08DA3").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_address_from_hex_rejects_bad_input() {
        assert!(matches!(
            Address::from_hex("0xzzb881a51cd4023e4400cef3ef73046743f08da3"),
            Err(AddressError::InvalidHex(_))
        ));
        assert!(matches!(
            Address::from_hex("0xdbb881"),
            Err(AddressError::InvalidLength(3))
        ));
        assert!(matches!(
            Address::from_hex("0x"),
            Err(AddressError::InvalidLength(0))
        ));
    }

    #[test]
    fn test_address_from_slice_length() {
        assert!(Address::from_slice(&[0u8; 19]).is_err());
        assert!(Address::from_slice(&[0u8; 21]).is_err());
        assert!(Address::from_slice(&[0u8; 20]).is_ok());
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let original = "0xdbb881a51cd4023e4400cef3ef73046743f08da3";
        let addr = Address::from_hex(original).unwrap();
        assert_eq!(addr.to_hex(), original);
    }

    #[test]
    fn test_address_word_roundtrip() {
        let addr = Address::from_hex("0xa16e02e87b7454126e5e10d957a927a7f5b5d2be").unwrap();
        let word = addr.into_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], addr.as_bytes());
        assert_eq!(Address::from_word(&word), addr);
    }

    #[test]
    fn test_address_word_ignores_high_bytes() {
        // Decoding tolerates garbage above the low 20 bytes.
        let addr = Address::from_hex("0xa16e02e87b7454126e5e10d957a927a7f5b5d2be").unwrap();
        let mut word = addr.into_word();
        word[0] = 0xff;
        assert_eq!(Address::from_word(&word), addr);
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(
            Address::ZERO.to_hex(),
            "0x0000000000000000000000000000000000000000"
        );
        assert_eq!(Address::default(), Address::ZERO);
    }

    #[test]
    fn test_address_display() {
        let addr = Address::from_hex("0xdbb881a51CD4023E4400CEF3ef73046743f08da3").unwrap();
        assert_eq!(
            format!("{}", addr),
            "0xdbb881a51cd4023e4400cef3ef73046743f08da3"
        );
        assert!(format!("{:?}", addr).starts_with("Address(0x"));
    }
}
