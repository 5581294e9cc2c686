//! Harvester configuration from environment variables

use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(&'static str),
}

/// Runtime configuration for the harvest loop.
///
/// Loaded from environment variables with sensible defaults; only the
/// Steam API key is mandatory.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Steam Web API key.
    pub steam_key: String,

    /// Base URL of the Steam Web API.
    pub api_base: String,

    /// Path to the sled match store.
    pub match_db_path: String,

    /// Path to the SQLite workflow ledger.
    pub workflow_db_path: String,

    /// Stored matches per hero/skill partition before moving on.
    pub matches_per_partition: u64,

    /// Storage attempts per match before dead-lettering.
    pub store_retry_limit: u32,

    /// Delay between storage attempts in milliseconds.
    pub store_retry_delay_ms: u64,

    /// Abort the partition on a data integrity error instead of
    /// skipping the offending match.
    pub halt_on_integrity: bool,
}

impl HarvestConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STEAM_KEY` (required)
    /// - `STEAM_API_BASE` (default: https://api.steampowered.com)
    /// - `DOTA_MATCH_DB` (default: harvest/matches.sled)
    /// - `WORKFLOW_DB` (default: harvest/workflow.db)
    /// - `MATCHES_PER_PARTITION` (default: 10)
    /// - `STORE_RETRY_LIMIT` (default: 3)
    /// - `STORE_RETRY_DELAY_MS` (default: 500)
    /// - `HALT_ON_INTEGRITY` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let steam_key =
            env::var("STEAM_KEY").map_err(|_| ConfigError::MissingVariable("STEAM_KEY"))?;

        Ok(Self {
            steam_key,

            api_base: env::var("STEAM_API_BASE")
                .unwrap_or_else(|_| "https://api.steampowered.com".to_string()),

            match_db_path: env::var("DOTA_MATCH_DB")
                .unwrap_or_else(|_| "harvest/matches.sled".to_string()),

            workflow_db_path: env::var("WORKFLOW_DB")
                .unwrap_or_else(|_| "harvest/workflow.db".to_string()),

            matches_per_partition: env::var("MATCHES_PER_PARTITION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            store_retry_limit: env::var("STORE_RETRY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),

            store_retry_delay_ms: env::var("STORE_RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(500),

            halt_on_integrity: env::var("HALT_ON_INTEGRITY")
                .ok()
                .and_then(|s| s.to_lowercase().parse().ok())
                .unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: env vars are process-global, so the missing-key,
    // default, and override cases run in sequence here.
    #[test]
    fn test_config_from_env() {
        env::remove_var("STEAM_KEY");
        env::remove_var("STEAM_API_BASE");
        env::remove_var("DOTA_MATCH_DB");
        env::remove_var("WORKFLOW_DB");
        env::remove_var("MATCHES_PER_PARTITION");
        env::remove_var("STORE_RETRY_LIMIT");
        env::remove_var("STORE_RETRY_DELAY_MS");
        env::remove_var("HALT_ON_INTEGRITY");

        assert!(matches!(
            HarvestConfig::from_env(),
            Err(ConfigError::MissingVariable("STEAM_KEY"))
        ));

        env::set_var("STEAM_KEY", "ABC123");
        let config = HarvestConfig::from_env().unwrap();
        assert_eq!(config.steam_key, "ABC123");
        assert_eq!(config.api_base, "https://api.steampowered.com");
        assert_eq!(config.match_db_path, "harvest/matches.sled");
        assert_eq!(config.workflow_db_path, "harvest/workflow.db");
        assert_eq!(config.matches_per_partition, 10);
        assert_eq!(config.store_retry_limit, 3);
        assert_eq!(config.store_retry_delay_ms, 500);
        assert_eq!(config.halt_on_integrity, true);

        env::set_var("STEAM_API_BASE", "http://127.0.0.1:9100");
        env::set_var("MATCHES_PER_PARTITION", "25");
        env::set_var("STORE_RETRY_LIMIT", "5");
        env::set_var("HALT_ON_INTEGRITY", "false");
        let config = HarvestConfig::from_env().unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:9100");
        assert_eq!(config.matches_per_partition, 25);
        assert_eq!(config.store_retry_limit, 5);
        assert_eq!(config.halt_on_integrity, false);

        // Unparseable numbers fall back to defaults
        env::set_var("MATCHES_PER_PARTITION", "lots");
        let config = HarvestConfig::from_env().unwrap();
        assert_eq!(config.matches_per_partition, 10);

        env::remove_var("STEAM_KEY");
        env::remove_var("STEAM_API_BASE");
        env::remove_var("MATCHES_PER_PARTITION");
        env::remove_var("STORE_RETRY_LIMIT");
        env::remove_var("HALT_ON_INTEGRITY");
    }
}
