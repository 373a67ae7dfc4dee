//! Default paths for reelguard components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/reelguard/config.toml` or `~/.config/reelguard/config.toml`
//! - Data: `$XDG_DATA_HOME/reelguard` or `~/.local/share/reelguard`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const REELGUARD_DATA_DIR_ENV: &str = "REELGUARD_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "reelguard";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Session database filename within the data directory
pub const SESSION_DB_FILENAME: &str = "sessions.db";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/reelguard/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/reelguard/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$REELGUARD_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/reelguard` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/reelguard` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(REELGUARD_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Data directory from XDG/HOME, ignoring REELGUARD_DATA_DIR
fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_contains_reelguard() {
        let path = default_config_path();
        assert!(path.to_string_lossy().contains("reelguard"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn data_dir_contains_reelguard() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("reelguard"));
    }
}
