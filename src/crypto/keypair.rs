//! Ed25519 keypair generation.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;

use super::Address;

/// Length of a Solana secret key: 32-byte seed followed by the 32-byte public key.
pub const SECRET_KEY_LEN: usize = 64;

/// Errors raised while producing or restoring a keypair.
#[derive(Debug, thiserror::Error)]
pub enum KeygenError {
    #[error("entropy source unavailable: {0}")]
    Entropy(#[from] rand::Error),

    #[error("invalid secret key length: {0} bytes")]
    InvalidKeyLength(usize),

    #[error("public half of secret key does not match its seed")]
    InvalidSecretKey,
}

/// Represents a Solana keypair (secret key + encoded address).
#[derive(Debug, Clone)]
pub struct Keypair {
    /// Seed followed by public key (64 bytes)
    secret_key: [u8; SECRET_KEY_LEN],
    /// The base58 address of the public key
    address: Address,
}

impl Keypair {
    /// Generates a new random keypair.
    ///
    /// Every call draws a fresh seed from the operating system, so concurrent
    /// workers never derive keys from a shared state.
    #[inline]
    pub fn generate() -> Result<Self, KeygenError> {
        let mut seed = [0u8; 32];
        OsRng.try_fill_bytes(&mut seed)?;
        Ok(Self::from_seed(&seed))
    }

    /// Expands a 32-byte Ed25519 seed into a keypair.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let address = Address::from_public_key(signing_key.verifying_key().as_bytes());

        Self {
            secret_key: signing_key.to_keypair_bytes(),
            address,
        }
    }

    /// Restores a keypair from its 64-byte secret key.
    ///
    /// The public half is checked against the seed.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, KeygenError> {
        let bytes: &[u8; SECRET_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| KeygenError::InvalidKeyLength(bytes.len()))?;
        let signing_key =
            SigningKey::from_keypair_bytes(bytes).map_err(|_| KeygenError::InvalidSecretKey)?;
        let address = Address::from_public_key(signing_key.verifying_key().as_bytes());

        Ok(Self {
            secret_key: *bytes,
            address,
        })
    }

    /// Restores a keypair from a 32-byte seed or a 64-byte secret key.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeygenError> {
        match <&[u8; 32]>::try_from(bytes) {
            Ok(seed) => Ok(Self::from_seed(seed)),
            Err(_) => Self::from_keypair_bytes(bytes),
        }
    }

    /// Builds a keypair from parts produced elsewhere. Nothing is validated.
    pub fn from_parts(address: Address, secret_key: [u8; SECRET_KEY_LEN]) -> Self {
        Self {
            secret_key,
            address,
        }
    }

    /// Returns the secret key bytes.
    pub fn secret_key_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.secret_key
    }

    /// Returns the public key bytes.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(&self.secret_key[32..]);
        public_key
    }

    /// Returns a reference to the encoded address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Splits the keypair into its address and secret key.
    pub fn into_parts(self) -> (Address, [u8; SECRET_KEY_LEN]) {
        (self.address, self.secret_key)
    }
}

/// Source of candidate keypairs for a worker.
///
/// Each worker owns its generator exclusively.
pub trait KeyGenerator: Send {
    fn generate(&mut self) -> Result<Keypair, KeygenError>;
}

/// Generates keypairs from the operating system entropy source.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsKeyGenerator;

impl KeyGenerator for OsKeyGenerator {
    #[inline]
    fn generate(&mut self) -> Result<Keypair, KeygenError> {
        Keypair::generate()
    }
}
