//! The mint pool artifact.
//!
//! A run is persisted as one pretty-printed JSON object:
//!
//! ```json
//! {
//!   "generatedAt": "2024-05-01T12:00:00",
//!   "suffix": "ponk",
//!   "count": 1,
//!   "totalAttempts": 171234,
//!   "totalTime": 12.5,
//!   "averageAttempts": 171234,
//!   "gpuUsed": false,
//!   "gpuName": null,
//!   "workers": 128,
//!   "mints": [{ "mintAddress": "...ponk", "secretKey": [12, 250, ...] }]
//! }
//! ```
//!
//! `secretKey` holds the 64 secret key bytes (seed followed by public key).

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::crypto::Keypair;
use crate::matcher::matches;
use crate::stats::{average_attempts, RunStatistics};
use crate::worker::MatchRecord;

/// Format of `generatedAt` and `lastUpdated` (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid mint pool in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("mint {0} does not end with the pool suffix")]
    SuffixViolation(String),

    #[error("cannot merge a pool for suffix {existing:?} with mints for suffix {new:?}")]
    SuffixMismatch { existing: String, new: String },
}

/// One generated mint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintEntry {
    pub mint_address: String,
    pub secret_key: Vec<u8>,
}

impl From<&MatchRecord> for MintEntry {
    fn from(record: &MatchRecord) -> Self {
        Self {
            mint_address: record.mint_address.clone(),
            secret_key: record.secret_key.clone(),
        }
    }
}

/// The persisted result of one or more runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintPool {
    pub generated_at: String,
    pub suffix: String,
    pub count: usize,
    #[serde(default)]
    pub total_attempts: u64,
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub average_attempts: u64,
    #[serde(default)]
    pub gpu_used: bool,
    #[serde(default)]
    pub gpu_name: Option<String>,
    #[serde(default)]
    pub workers: usize,
    /// Set when mints were merged into an existing pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub mints: Vec<MintEntry>,
}

impl MintPool {
    /// Builds a pool from a finished run.
    pub fn new(stats: &RunStatistics, matches: &[MatchRecord]) -> Self {
        Self {
            generated_at: stats.generated_at.format(TIMESTAMP_FORMAT).to_string(),
            suffix: stats.suffix.clone(),
            count: matches.len(),
            total_attempts: stats.total_attempts,
            total_time: stats.total_elapsed.as_secs_f64(),
            average_attempts: stats.average_attempts,
            gpu_used: stats.gpu_used,
            gpu_name: stats.gpu_name.clone(),
            workers: stats.workers,
            last_updated: None,
            mints: matches.iter().map(MintEntry::from).collect(),
        }
    }

    /// Reads a pool from disk.
    pub fn load(path: &Path) -> Result<Self, OutputError> {
        let content = fs::read_to_string(path).map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| OutputError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the pool as pretty JSON.
    ///
    /// The file is written next to `path` first and then renamed over it.
    /// Every mint is checked against the suffix before anything is written.
    pub fn save(&self, path: &Path) -> Result<(), OutputError> {
        self.check_suffix()?;

        let io_err = |source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let file = File::create(&tmp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| OutputError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        drop(writer);

        fs::rename(&tmp_path, path).map_err(io_err)
    }

    /// Checks that every mint ends with the pool suffix.
    pub fn check_suffix(&self) -> Result<(), OutputError> {
        match self
            .mints
            .iter()
            .find(|mint| !matches(&mint.mint_address, &self.suffix))
        {
            Some(mint) => Err(OutputError::SuffixViolation(mint.mint_address.clone())),
            None => Ok(()),
        }
    }

    /// Merges an existing pool into this one.
    ///
    /// Existing mints come first; new mints already present are dropped.
    /// Attempts and time are summed, the original `generatedAt` is kept and
    /// `lastUpdated` is set to this pool's timestamp. Returns the number of
    /// new mints added.
    pub fn merge(&mut self, previous: MintPool) -> Result<usize, OutputError> {
        if previous.suffix.to_lowercase() != self.suffix.to_lowercase() {
            return Err(OutputError::SuffixMismatch {
                existing: previous.suffix,
                new: self.suffix.clone(),
            });
        }

        let mut seen: HashSet<String> = previous
            .mints
            .iter()
            .map(|mint| mint.mint_address.clone())
            .collect();
        let fresh: Vec<MintEntry> = std::mem::take(&mut self.mints)
            .into_iter()
            .filter(|mint| seen.insert(mint.mint_address.clone()))
            .collect();
        let added = fresh.len();

        self.mints = previous.mints;
        self.mints.extend(fresh);
        self.count = self.mints.len();
        self.total_attempts += previous.total_attempts;
        self.total_time += previous.total_time;
        self.average_attempts = average_attempts(self.total_attempts, self.count).unwrap_or(0);
        self.last_updated = Some(std::mem::replace(
            &mut self.generated_at,
            previous.generated_at,
        ));
        self.suffix = previous.suffix;

        Ok(added)
    }

    /// Re-derives every mint from its secret key.
    pub fn verify(&self) -> VerifyReport {
        let mut report = VerifyReport {
            checked: self.mints.len(),
            count_matches: self.count == self.mints.len(),
            failures: Vec::new(),
        };

        for mint in &self.mints {
            let reason = match Keypair::from_secret_bytes(&mint.secret_key) {
                Err(e) => Some(e.to_string()),
                Ok(keypair) if keypair.address().as_str() != mint.mint_address => Some(format!(
                    "secret key belongs to {}",
                    keypair.address()
                )),
                Ok(_) if !matches(&mint.mint_address, &self.suffix) => {
                    Some(format!("address does not end with {:?}", self.suffix))
                }
                Ok(_) => None,
            };

            if let Some(reason) = reason {
                report.failures.push(VerifyFailure {
                    mint_address: mint.mint_address.clone(),
                    reason,
                });
            }
        }

        report
    }
}

/// A mint that failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyFailure {
    pub mint_address: String,
    pub reason: String,
}

/// Result of [`MintPool::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Number of mints checked
    pub checked: usize,
    /// Whether `count` equals the number of mints
    pub count_matches: bool,
    pub failures: Vec<VerifyFailure>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.count_matches && self.failures.is_empty()
    }
}

/// Persists a finished run to `path`.
///
/// With `append`, an existing pool at `path` is merged in first.
pub fn write_pool(
    path: &Path,
    stats: &RunStatistics,
    matches: &[MatchRecord],
    append: bool,
) -> Result<MintPool, OutputError> {
    let mut pool = MintPool::new(stats, matches);

    if append && path.exists() {
        let previous = MintPool::load(path)?;
        let added = pool.merge(previous)?;
        info!(
            "Merged {} new mint(s) into {} ({} total)",
            added,
            path.display(),
            pool.count
        );
    }

    pool.save(path)?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::time::Duration;

    fn keypair_ending_with(suffix: &str) -> Keypair {
        (0u8..=255)
            .flat_map(|a| (0u8..=255).map(move |b| [a, b]))
            .map(|[a, b]| {
                let mut seed = [0u8; 32];
                seed[0] = a;
                seed[1] = b;
                Keypair::from_seed(&seed)
            })
            .find(|keypair| matches(keypair.address().as_str(), suffix))
            .unwrap()
    }

    fn record(keypair: &Keypair, attempts: u64) -> MatchRecord {
        MatchRecord {
            mint_address: keypair.address().to_string(),
            secret_key: keypair.secret_key_bytes().to_vec(),
            worker_id: 0,
            attempts_since_last_match: attempts,
            elapsed_secs: 1.0,
            attempt_rate: attempts as f64,
        }
    }

    fn stats(suffix: &str, matches: &[MatchRecord]) -> RunStatistics {
        let total: u64 = matches.iter().map(|r| r.attempts_since_last_match).sum();
        RunStatistics {
            generated_at: Local::now(),
            suffix: suffix.to_string(),
            match_count: matches.len(),
            total_attempts: total,
            total_elapsed: Duration::from_millis(1500),
            average_attempts: average_attempts(total, matches.len()).unwrap_or(0),
            workers: 4,
            gpu_used: false,
            gpu_name: None,
        }
    }

    fn sample(suffix: &str, n: usize) -> (RunStatistics, Vec<MatchRecord>) {
        let mut records = Vec::new();
        let mut seed = 0u8;
        while records.len() < n {
            let keypair = Keypair::from_seed(&[seed; 32]);
            seed += 1;
            if matches(keypair.address().as_str(), suffix) {
                records.push(record(&keypair, 10 + records.len() as u64));
            }
        }
        (stats(suffix, &records), records)
    }

    #[test]
    fn test_round_trip_preserves_mints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.json");
        let (stats, records) = sample("", 3);

        let written = write_pool(&path, &stats, &records, false).unwrap();
        let loaded = MintPool::load(&path).unwrap();

        assert_eq!(loaded, written);
        let expected: HashSet<MintEntry> = records.iter().map(MintEntry::from).collect();
        let actual: HashSet<MintEntry> = loaded.mints.into_iter().collect();
        assert_eq!(actual, expected);
        assert_eq!(loaded.count, 3);
        assert_eq!(loaded.total_attempts, 33);
        assert_eq!(loaded.average_attempts, 11);
        assert_eq!(loaded.total_time, 1.5);
    }

    #[test]
    fn test_json_shape() {
        let (stats, records) = sample("", 1);
        let pool = MintPool::new(&stats, &records);
        let value = serde_json::to_value(&pool).unwrap();

        for key in [
            "generatedAt",
            "suffix",
            "count",
            "totalAttempts",
            "totalTime",
            "averageAttempts",
            "gpuUsed",
            "gpuName",
            "workers",
            "mints",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value.get("lastUpdated").is_none());
        assert!(value["gpuName"].is_null());
        assert_eq!(value["gpuUsed"], false);
        assert_eq!(value["mints"][0]["secretKey"].as_array().unwrap().len(), 64);
        assert_eq!(value["generatedAt"].as_str().unwrap().len(), 19);
    }

    #[test]
    fn test_save_rejects_foreign_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.json");
        let (stats, records) = sample("", 2);
        let mut pool = MintPool::new(&stats, &records);
        pool.suffix = "0".into();

        assert!(matches!(
            pool.save(&path),
            Err(OutputError::SuffixViolation(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_append_merges_and_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.json");
        let (stats, records) = sample("", 3);

        let first = write_pool(&path, &stats, &records[..2], false).unwrap();
        let merged = write_pool(&path, &stats, &records[1..], true).unwrap();

        assert_eq!(merged.count, 3);
        assert_eq!(merged.mints.len(), 3);
        assert_eq!(merged.generated_at, first.generated_at);
        assert!(merged.last_updated.is_some());
        assert_eq!(merged.total_attempts, stats.total_attempts * 2);
        assert_eq!(MintPool::load(&path).unwrap(), merged);
    }

    #[test]
    fn test_merge_refuses_other_suffix() {
        let keypair = keypair_ending_with("a");
        let records = vec![record(&keypair, 1)];
        let mut pool = MintPool::new(&stats("a", &records), &records);
        let other = MintPool::new(&stats("b", &[]), &[]);

        assert!(matches!(
            pool.merge(other),
            Err(OutputError::SuffixMismatch { .. })
        ));
    }

    #[test]
    fn test_verify() {
        let (stats, records) = sample("", 2);
        let mut pool = MintPool::new(&stats, &records);
        assert!(pool.verify().is_ok());

        pool.mints[1].secret_key[0] ^= 0xff;
        let report = pool.verify();
        assert!(!report.is_ok());
        assert_eq!(report.checked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].mint_address, pool.mints[1].mint_address);
    }

    #[test]
    fn test_verify_accepts_seed_only_keys() {
        let keypair = Keypair::from_seed(&[9u8; 32]);
        let pool = MintPool {
            generated_at: "2024-01-01T00:00:00".into(),
            suffix: String::new(),
            count: 1,
            total_attempts: 0,
            total_time: 0.0,
            average_attempts: 0,
            gpu_used: false,
            gpu_name: None,
            workers: 0,
            last_updated: None,
            mints: vec![MintEntry {
                mint_address: keypair.address().to_string(),
                secret_key: vec![9u8; 32],
            }],
        };
        assert!(pool.verify().is_ok());
    }

    #[test]
    fn test_load_minimal_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.json");
        fs::write(
            &path,
            r#"{
                "generatedAt": "2024-01-01T00:00:00.000Z",
                "suffix": "bonk",
                "count": 0,
                "mints": [],
                "lastUpdated": "2024-01-02T00:00:00.000Z"
            }"#,
        )
        .unwrap();

        let pool = MintPool::load(&path).unwrap();
        assert_eq!(pool.suffix, "bonk");
        assert_eq!(pool.total_attempts, 0);
        assert_eq!(pool.gpu_name, None);
        assert!(pool.last_updated.is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MintPool::load(&dir.path().join("missing.json")),
            Err(OutputError::Io { .. })
        ));
    }
}
