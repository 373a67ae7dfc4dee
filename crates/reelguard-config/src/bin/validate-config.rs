//! Config validation CLI tool
//!
//! Validates a reelguard configuration file and reports any errors.

use reelguard_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a reelguard configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match reelguard_config::load_config(&config_path) {
        Ok(policy) => {
            let tracker = &policy.tracker;
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", reelguard_config::CURRENT_CONFIG_VERSION);
            println!("  Budget: {} min", tracker.budget_minutes);
            println!("  Check every: {}s", tracker.poll_interval.as_secs());
            println!(
                "  Warn at most every: {} min",
                tracker
                    .warning_interval_cap_minutes
                    .min(tracker.budget_minutes / 3.0)
            );
            println!("  Monitored section: {}", tracker.section_markers.join(", "));
            println!("  Hard stop sends to: {}", tracker.home_location);
            println!("  Storage key: {}", tracker.storage_key);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                reelguard_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                reelguard_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                reelguard_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                reelguard_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        reelguard_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
