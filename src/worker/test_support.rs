//! Deterministic key generators for tests.

use crate::crypto::{Address, KeyGenerator, Keypair, KeygenError};

/// Replays a fixed list of addresses.
///
/// Once the list is exhausted it either starts over or repeats `filler`.
pub(crate) struct Scripted {
    script: Vec<&'static str>,
    filler: Option<&'static str>,
    next: usize,
}

impl Scripted {
    /// Repeats `script` forever.
    pub(crate) fn cycle(script: &[&'static str]) -> Self {
        Self {
            script: script.to_vec(),
            filler: None,
            next: 0,
        }
    }

    /// Plays `script` once, then yields `filler` forever.
    pub(crate) fn then(script: &[&'static str], filler: &'static str) -> Self {
        Self {
            script: script.to_vec(),
            filler: Some(filler),
            next: 0,
        }
    }
}

impl KeyGenerator for Scripted {
    fn generate(&mut self) -> Result<Keypair, KeygenError> {
        let address = match (self.script.get(self.next), self.filler) {
            (Some(address), _) => *address,
            (None, Some(filler)) => filler,
            (None, None) => self.script[self.next % self.script.len()],
        };
        let secret = [(self.next % 256) as u8; 64];
        self.next += 1;
        Ok(Keypair::from_parts(Address::from_encoded(address), secret))
    }
}

/// Fails on every call.
pub(crate) struct Failing;

impl KeyGenerator for Failing {
    fn generate(&mut self) -> Result<Keypair, KeygenError> {
        Err(KeygenError::Entropy(rand::Error::new("entropy source closed")))
    }
}
