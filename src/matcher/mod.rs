//! Suffix matching for Solana addresses.
//!
//! Matching is a case-insensitive "ends with" test against the base58 address.

mod pattern;

pub use pattern::{matches, SuffixPattern};
