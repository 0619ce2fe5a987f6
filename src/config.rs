use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::BadgeError;
use crate::tiers::{ThresholdTable, DEFAULT_THRESHOLDS, THRESHOLD_COUNT};

/// Configuration for the activity badge service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Leaderboard configuration
    pub leaderboard: LeaderboardConfig,
    /// Tier threshold configuration
    pub tiers: TierConfig,
    /// Administrative surface configuration
    pub admin: AdminConfig,
    /// State file configuration
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Enable request span logging
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Maximum number of ranked accounts
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    /// Bronze through Legendary cutoffs
    pub thresholds: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Key required by administrative endpoints; admin calls are refused when unset
    pub api_key: Option<String>,
    /// Fee per action (stored and reported only)
    pub fee: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Snapshot file; memory only when unset
    pub state_path: Option<PathBuf>,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8787,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: false,
            },
            leaderboard: LeaderboardConfig { capacity: 10 },
            tiers: TierConfig {
                thresholds: DEFAULT_THRESHOLDS.to_vec(),
            },
            admin: AdminConfig {
                api_key: None,
                fee: 0,
            },
            persistence: PersistenceConfig::default(),
        }
    }
}

impl BadgeConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Server configuration
        if let Ok(host) = env::var("BADGES_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = env::var("BADGES_PORT") {
            config.server.port = port.parse().context("Invalid BADGES_PORT value")?;
        }

        // Logging configuration
        if let Ok(level) = env::var("BADGES_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(log_requests) = env::var("BADGES_LOG_REQUESTS") {
            config.logging.log_requests = log_requests
                .parse()
                .context("Invalid BADGES_LOG_REQUESTS value")?;
        }

        // Leaderboard configuration
        if let Ok(capacity) = env::var("BADGES_LEADERBOARD_CAPACITY") {
            config.leaderboard.capacity = capacity
                .parse()
                .context("Invalid BADGES_LEADERBOARD_CAPACITY value")?;
        }

        // Tier thresholds
        if let Ok(thresholds) = env::var("BADGES_THRESHOLDS") {
            config.tiers.thresholds = parse_thresholds(&thresholds)?;
        }

        // Admin configuration
        config.admin.api_key = env::var("BADGES_ADMIN_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        if let Ok(fee) = env::var("BADGES_FEE") {
            config.admin.fee = fee.parse().context("Invalid BADGES_FEE value")?;
        }

        // Persistence
        if let Ok(path) = env::var("BADGES_STATE_PATH") {
            if !path.is_empty() {
                config.persistence.state_path = Some(PathBuf::from(path));
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.leaderboard.capacity == 0 {
            return Err(BadgeError::CapacityMisconfigured.into());
        }

        self.threshold_table()?;

        if let Some(ref key) = self.admin.api_key {
            if key.len() < 16 {
                return Err(anyhow::anyhow!(
                    "Admin API key is too short (minimum 16 characters)"
                ));
            }
        }

        Ok(())
    }

    /// Threshold table built from the configured cutoffs
    pub fn threshold_table(&self) -> Result<ThresholdTable> {
        ThresholdTable::from_slice(&self.tiers.thresholds).context("Invalid tier thresholds")
    }
}

/// Parse a comma-separated list of exactly seven cutoffs
pub fn parse_thresholds(raw: &str) -> Result<Vec<u64>> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<u64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Invalid BADGES_THRESHOLDS value")?;

    if values.len() != THRESHOLD_COUNT {
        return Err(BadgeError::InvalidThresholdCount(values.len()).into());
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BadgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold_table().unwrap(), ThresholdTable::default());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = BadgeConfig::default();
        config.leaderboard.capacity = 0;

        let err = config.validate().unwrap_err();
        assert_eq!(
            err.downcast_ref::<BadgeError>(),
            Some(&BadgeError::CapacityMisconfigured)
        );
    }

    #[test]
    fn test_descending_thresholds_rejected() {
        let mut config = BadgeConfig::default();
        config.tiers.thresholds = vec![10, 25, 50, 40, 250, 500, 1000];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_admin_key_rejected() {
        let mut config = BadgeConfig::default();
        config.admin.api_key = Some("short".to_string());
        assert!(config.validate().is_err());

        config.admin.api_key = Some("adminKey1234567890".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_thresholds() {
        assert_eq!(
            parse_thresholds("1, 2,3,4,5,6 ,7").unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7]
        );
        assert!(parse_thresholds("1,2,3").is_err());
        assert!(parse_thresholds("1,2,x,4,5,6,7").is_err());
    }
}
