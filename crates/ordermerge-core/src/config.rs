use std::path::PathBuf;

use crate::app_config::{AppConfig, DEFAULT_API_VERSION};
use crate::ConfigError;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if the Shopify credentials are missing or a value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if the Shopify credentials are missing or a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Log filter directive from `ORDERMERGE_LOG_LEVEL`, defaulting to `info`.
///
/// Read separately from [`load_app_config`] so logging can be initialised
/// for commands that need no Shopify credentials.
#[must_use]
pub fn log_level_from_env() -> String {
    log_level(|key| std::env::var(key))
}

fn log_level<F>(lookup: F) -> String
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    lookup("ORDERMERGE_LOG_LEVEL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    // A blank credential counts as missing.
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_optional_u32 = |var: &str| -> Result<Option<u32>, ConfigError> {
        match lookup(var) {
            Ok(raw) if !raw.trim().is_empty() => {
                raw.trim()
                    .parse::<u32>()
                    .map(Some)
                    .map_err(|e| ConfigError::InvalidEnvVar {
                        var: var.to_string(),
                        reason: e.to_string(),
                    })
            }
            _ => Ok(None),
        }
    };

    let shop_name = require("SHOPIFY_SHOP_NAME")?;
    let access_token = require("SHOPIFY_ACCESS_TOKEN")?;
    let api_version = or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION);

    let poll_interval_secs = parse_u64("ORDERMERGE_POLL_INTERVAL_SECS", "10")?;
    let poll_max_attempts = parse_optional_u32("ORDERMERGE_POLL_MAX_ATTEMPTS")?;
    if poll_max_attempts == Some(0) {
        return Err(ConfigError::InvalidEnvVar {
            var: "ORDERMERGE_POLL_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1 when set".to_string(),
        });
    }
    let request_timeout_secs = parse_u64("ORDERMERGE_REQUEST_TIMEOUT_SECS", "30")?;
    let download_dir = PathBuf::from(or_default("ORDERMERGE_DOWNLOAD_DIR", "./downloads"));
    let accept_invalid_certs = parse_bool(
        "ORDERMERGE_ACCEPT_INVALID_CERTS",
        &or_default("ORDERMERGE_ACCEPT_INVALID_CERTS", "false"),
    )?;

    Ok(AppConfig {
        shop_name,
        access_token,
        api_version,
        poll_interval_secs,
        poll_max_attempts,
        request_timeout_secs,
        download_dir,
        accept_invalid_certs,
    })
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no` (case-insensitive).
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
