//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{DEFAULT_CACHE_PREFIX, DEFAULT_TTL_MS};

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Fallback TTL in milliseconds for data types missing from the TTL table
    pub default_ttl_ms: u64,
    /// Storage key prefix for cache entries
    pub cache_prefix: String,
    /// Directory for file-backed storage; in-memory storage when unset
    pub storage_dir: Option<PathBuf>,
    /// Expired-entry sweep interval in seconds
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Delay between remote readiness checks in milliseconds
    pub listener_poll_interval_ms: u64,
    /// Readiness checks before live invalidation gives up
    pub listener_max_polls: u32,
    /// Subscribe attempts per data type
    pub listener_attach_attempts: u32,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Fallback TTL in ms (default: 300000)
    /// - `CACHE_PREFIX` - Storage key prefix (default: `erp_cache_`)
    /// - `STORAGE_DIR` - Directory for file storage (default: unset, in-memory)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `LISTENER_POLL_INTERVAL_MS` - Readiness poll delay (default: 500)
    /// - `LISTENER_MAX_POLLS` - Readiness polls (default: 30)
    /// - `LISTENER_ATTACH_ATTEMPTS` - Subscribe attempts (default: 3)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            cache_prefix: env::var("CACHE_PREFIX")
                .ok()
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.cache_prefix),
            storage_dir: env::var("STORAGE_DIR")
                .ok()
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            listener_poll_interval_ms: env_or(
                "LISTENER_POLL_INTERVAL_MS",
                defaults.listener_poll_interval_ms,
            ),
            listener_max_polls: env_or("LISTENER_MAX_POLLS", defaults.listener_max_polls),
            listener_attach_attempts: env_or(
                "LISTENER_ATTACH_ATTEMPTS",
                defaults.listener_attach_attempts,
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            storage_dir: None,
            sweep_interval: 600,
            server_port: 3000,
            listener_poll_interval_ms: 500,
            listener_max_polls: 30,
            listener_attach_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl_ms, 300_000);
        assert_eq!(config.cache_prefix, "erp_cache_");
        assert!(config.storage_dir.is_none());
        assert_eq!(config.sweep_interval, 600);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.listener_max_polls, 30);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DEFAULT_TTL_MS");
        env::remove_var("CACHE_PREFIX");
        env::remove_var("STORAGE_DIR");
        env::remove_var("SWEEP_INTERVAL");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.default_ttl_ms, 300_000);
        assert_eq!(config.cache_prefix, "erp_cache_");
        assert!(config.storage_dir.is_none());
        assert_eq!(config.sweep_interval, 600);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_env_or_ignores_unparseable_values() {
        env::set_var("FLEET_CACHE_TEST_BAD_NUMBER", "ten");
        assert_eq!(env_or("FLEET_CACHE_TEST_BAD_NUMBER", 10u32), 10);
        env::remove_var("FLEET_CACHE_TEST_BAD_NUMBER");
    }
}
