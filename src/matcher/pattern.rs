//! Suffix pattern implementation.

use crate::crypto::BASE58_ALPHABET;

/// Returns true if `address` ends with `suffix`, ignoring case.
///
/// An empty suffix matches every address.
#[inline]
pub fn matches(address: &str, suffix: &str) -> bool {
    ends_with_ignore_case(address, &suffix.to_lowercase())
}

#[inline]
fn ends_with_ignore_case(address: &str, lowered_suffix: &str) -> bool {
    if !address.is_ascii() || !lowered_suffix.is_ascii() {
        return address.to_lowercase().ends_with(lowered_suffix);
    }

    let (address, lowered_suffix) = (address.as_bytes(), lowered_suffix.as_bytes());
    address.len() >= lowered_suffix.len()
        && address[address.len() - lowered_suffix.len()..]
            .iter()
            .zip(lowered_suffix)
            .all(|(a, s)| a.to_ascii_lowercase() == *s)
}

/// A compiled suffix for efficient matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixPattern {
    /// The suffix as configured
    original: String,
    /// Lower-cased suffix used on the hot path
    lowered: String,
}

impl SuffixPattern {
    /// Creates a new suffix pattern.
    pub fn new(suffix: impl Into<String>) -> Self {
        let original = suffix.into();
        let lowered = original.to_lowercase();
        Self { original, lowered }
    }

    /// Returns the suffix as configured.
    pub fn suffix(&self) -> &str {
        &self.original
    }

    /// Returns the lower-cased suffix.
    pub fn normalized(&self) -> &str {
        &self.lowered
    }

    /// Matches an encoded address against this suffix.
    #[inline]
    pub fn matches(&self, address: &str) -> bool {
        ends_with_ignore_case(address, &self.lowered)
    }

    /// Returns true if every suffix character can appear in a base58 address
    /// under case folding.
    pub fn is_reachable(&self) -> bool {
        self.lowered.chars().all(|c| case_variants(c) > 0)
    }

    /// Returns the expected number of attempts per match.
    ///
    /// Each position of a random address is treated as uniform over the
    /// 58-symbol alphabet; a suffix character matches every symbol that
    /// folds to it. Unreachable suffixes yield infinity.
    pub fn estimated_attempts(&self) -> f64 {
        self.lowered
            .chars()
            .map(|c| match case_variants(c) {
                0 => f64::INFINITY,
                n => BASE58_ALPHABET.len() as f64 / n as f64,
            })
            .product()
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let attempts = self.estimated_attempts();
        if attempts.is_infinite() {
            "Impossible (suffix contains characters outside base58)".into()
        } else if attempts <= 1_000.0 {
            "Very Easy (< 1 second)".into()
        } else if attempts <= 1_000_000.0 {
            "Easy (seconds)".into()
        } else if attempts <= 100_000_000.0 {
            "Medium (minutes)".into()
        } else if attempts <= 10_000_000_000.0 {
            "Hard (hours)".into()
        } else {
            "Very Hard (days or more)".into()
        }
    }
}

/// Number of base58 symbols that fold to `c` when lower-cased.
fn case_variants(c: char) -> usize {
    BASE58_ALPHABET
        .chars()
        .filter(|a| a.to_ascii_lowercase() == c)
        .count()
}
