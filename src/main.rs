//! Solana Vanity Mint Generator CLI
//!
//! Usage:
//!   sol_vanity                       # Collect 100 mints ending with "ponk"
//!   sol_vanity -s bonk -n 10         # Collect 10 mints ending with "bonk"
//!   sol_vanity -s bonk -n 10 --append
//!   sol_vanity -o pool.json --verify # Check an existing pool

use std::process;
use std::sync::atomic::Ordering;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info, warn};

use sol_vanity::output::write_pool;
use sol_vanity::progress::format_number;
use sol_vanity::{Config, Coordinator, MintPool, Termination};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    let result = run(&config);
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    process::exit(exit_code(&result));
}

/// 0 when mints were saved or verified, 1 on any error.
fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn run(config: &Config) -> Result<()> {
    config.validate().context("Configuration error")?;

    if config.verify {
        return verify(config);
    }

    let settings = config.search_settings();
    if settings.pattern.suffix().is_empty() {
        warn!("Empty suffix: every generated address will match");
    }

    info!("Solana Vanity Mint Generator");
    info!("============================");
    info!("Suffix:     {}", settings.pattern.suffix());
    info!(
        "Difficulty: {} (~{} attempts per mint)",
        settings.pattern.difficulty_description(),
        format_number(settings.pattern.estimated_attempts() as u64)
    );
    info!("Workers:    {}", settings.workers);
    info!("Target:     {} mint(s)", settings.target);
    info!("Output:     {}", config.output.display());

    let coordinator = Coordinator::new(settings);
    let interrupt = coordinator.interrupt_handle();
    ctrlc::set_handler(move || {
        interrupt.store(true, Ordering::Relaxed);
    })
    .context("Error setting Ctrl-C handler")?;

    info!("Searching... (Press Ctrl+C to stop)");

    let outcome = coordinator.run()?;
    match outcome.termination {
        Termination::TargetReached => {
            info!("Target reached! Found {} mint(s).", outcome.matches.len())
        }
        Termination::Interrupted => info!(
            "Stopped by user. Saving {} mint(s) collected so far.",
            outcome.matches.len()
        ),
        Termination::WorkersExhausted => warn!(
            "All workers exited early. Saving {} mint(s).",
            outcome.matches.len()
        ),
    }

    let pool = write_pool(&config.output, &outcome.stats, &outcome.matches, config.append)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    let stats = &outcome.stats;
    info!("--- Final Statistics ---");
    info!("Mints saved:       {} -> {}", pool.count, config.output.display());
    info!("Mints this run:    {}", stats.match_count);
    info!("Total attempts:    {}", format_number(stats.total_attempts));
    info!("Average attempts:  {}", format_number(stats.average_attempts));
    info!("Time elapsed:      {:.2}s", stats.total_elapsed.as_secs_f64());
    info!(
        "Average speed:     {}/s",
        format_number(stats.attempts_per_second() as u64)
    );

    Ok(())
}

fn verify(config: &Config) -> Result<()> {
    let pool = MintPool::load(&config.output)?;
    let report = pool.verify();

    for failure in &report.failures {
        error!("{}: {}", failure.mint_address, failure.reason);
    }
    if !report.count_matches {
        error!(
            "count field is {} but the pool holds {} mint(s)",
            pool.count, report.checked
        );
    }
    if !report.is_ok() {
        bail!(
            "{} of {} mint(s) in {} failed verification",
            report.failures.len(),
            report.checked,
            config.output.display()
        );
    }

    info!(
        "All {} mint(s) in {} verified (suffix {:?})",
        report.checked,
        config.output.display(),
        pool.suffix
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use sol_vanity::SearchError;

    fn make_config(output: &Path) -> Config {
        Config {
            suffix: String::new(),
            count: 3,
            output: output.to_path_buf(),
            workers: Some(2),
            grace_period_ms: 1000,
            report_interval: 5,
            append: false,
            verify: false,
        }
    }

    #[test]
    fn test_invalid_config_exits_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = make_config(&dir.path().join("pool.json"));
        config.suffix = "p0nk".into();

        let result = run(&config);
        assert_eq!(exit_code(&result), 1);
        assert!(!config.output.exists());
    }

    #[test]
    fn test_zero_workers_exits_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = make_config(&dir.path().join("pool.json"));
        config.workers = Some(0);

        // `run` installs the process-wide Ctrl-C handler, so drive the search directly.
        let result = Coordinator::new(config.search_settings()).run();
        assert!(matches!(result, Err(SearchError::NoWorkers)));
        let result: Result<()> = result.map(|_| ()).map_err(Into::into);
        assert_eq!(exit_code(&result), 1);
    }

    #[test]
    fn test_search_then_verify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.json");
        let mut config = make_config(&path);

        let result = run(&config);
        assert_eq!(exit_code(&result), 0);
        let pool = MintPool::load(&path).unwrap();
        assert_eq!(pool.count, 3);

        config.verify = true;
        assert_eq!(exit_code(&run(&config)), 0);

        let mut tampered = pool;
        tampered.mints[0].secret_key[0] ^= 0xff;
        tampered.save(&path).unwrap();
        assert_eq!(exit_code(&run(&config)), 1);
    }

    #[test]
    fn test_verify_missing_file_exits_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = make_config(&dir.path().join("missing.json"));
        config.verify = true;

        assert_eq!(exit_code(&run(&config)), 1);
    }
}
