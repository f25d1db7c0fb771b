//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the working directory if present
    ///
    /// Returns whether a file was loaded. Variables already set in the
    /// process environment win over the file.
    pub fn load_env_file(debug: bool) -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<bool> {
        if !path.exists() {
            if debug {
                eprintln!("No {} file found, using defaults and CLI arguments", path.display());
            }
            return Ok(false);
        }

        dotenv::from_path(path)?;

        if debug {
            eprintln!("Loaded configuration from {}", path.display());
        }
        Ok(true)
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "PORTPING_TIMEOUT_MS" | "PORTPING_DELAY_MS" => {
                let millis: u64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if millis == 0 {
                    return Err(AppError::config(format!("{} must be at least 1, got: {}", key, millis)));
                }
            }
            "PORTPING_COUNT" => {
                value
                    .parse::<u32>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "PORTPING_ENABLE_COLOR" | "PORTPING_ALLOW_IPV6" => {
                value
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Supported variables with description and example value
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("PORTPING_TIMEOUT_MS", "Per-attempt timeout in milliseconds", "1000"),
            ("PORTPING_DELAY_MS", "Delay between round starts in milliseconds", "1000"),
            ("PORTPING_COUNT", "Number of rounds, 0 for nonstop", "10"),
            ("PORTPING_ENABLE_COLOR", "Enable colored output", "true"),
            ("PORTPING_ALLOW_IPV6", "Also probe IPv6 addresses", "false"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<22} {}\n", var, description));
            help.push_str(&format!("  {:<22} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Check every supported variable that is currently set
    pub fn validate_current_env() -> Vec<AppError> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value).err()
            })
            .collect()
    }
}
