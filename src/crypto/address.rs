//! Solana address representation.

use std::fmt;

/// Base58 alphabet used for Solana addresses (Bitcoin alphabet).
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Longest base58 rendering of a 32-byte public key.
pub const MAX_ADDRESS_LEN: usize = 44;

/// A base58-encoded Solana address.
///
/// Raw-bytes encoding: no version byte, no checksum.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Encodes a 32-byte Ed25519 public key.
    #[inline]
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        Self(bs58::encode(public_key).into_string())
    }

    /// Wraps an already encoded address without checking it.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the address as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the address and returns the encoded string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
