//! Match records sent from workers to the coordinator.

use std::time::Duration;

use crate::crypto::Keypair;

/// A keypair whose address satisfied the suffix, plus the work it took.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    /// The base58 mint address
    pub mint_address: String,
    /// The 64-byte secret key (seed followed by public key)
    pub secret_key: Vec<u8>,
    /// The ID of the worker that found this match
    pub worker_id: usize,
    /// Attempts since the worker's previous match, including this one
    pub attempts_since_last_match: u64,
    /// Seconds since the worker's previous match (or worker start)
    pub elapsed_secs: f64,
    /// Attempts per second over that span
    pub attempt_rate: f64,
}

impl MatchRecord {
    /// Packages a matching keypair.
    pub fn new(worker_id: usize, keypair: Keypair, attempts: u64, elapsed: Duration) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let (address, secret_key) = keypair.into_parts();

        Self {
            mint_address: address.into_string(),
            secret_key: secret_key.to_vec(),
            worker_id,
            attempts_since_last_match: attempts,
            elapsed_secs,
            attempt_rate: rate(attempts, elapsed_secs),
        }
    }
}

/// Attempts per second, zero when no time has elapsed.
pub(crate) fn rate(attempts: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        attempts as f64 / elapsed_secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Address;

    #[test]
    fn test_record_from_keypair() {
        let keypair = Keypair::from_parts(Address::from_encoded("abcxy"), [7u8; 64]);
        let record = MatchRecord::new(3, keypair, 500, Duration::from_secs(2));

        assert_eq!(record.mint_address, "abcxy");
        assert_eq!(record.secret_key, vec![7u8; 64]);
        assert_eq!(record.worker_id, 3);
        assert_eq!(record.attempts_since_last_match, 500);
        assert_eq!(record.elapsed_secs, 2.0);
        assert_eq!(record.attempt_rate, 250.0);
    }

    #[test]
    fn test_zero_elapsed_has_zero_rate() {
        let keypair = Keypair::from_parts(Address::from_encoded("xy"), [0u8; 64]);
        let record = MatchRecord::new(0, keypair, 1, Duration::ZERO);
        assert_eq!(record.attempt_rate, 0.0);
    }
}
