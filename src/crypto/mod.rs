//! Cryptographic operations for Solana key and address generation.
//!
//! This module provides:
//! - Ed25519 keypair generation from the OS entropy source
//! - Base58 address encoding of public keys
//! - The `KeyGenerator` seam used by workers

mod address;
mod keypair;

pub use address::{Address, BASE58_ALPHABET, MAX_ADDRESS_LEN};
pub use keypair::{KeyGenerator, Keypair, KeygenError, OsKeyGenerator, SECRET_KEY_LEN};
