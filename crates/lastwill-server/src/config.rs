//! Server configuration — parsed from TOML file + environment variable overrides.
//!
//! Priority: environment variables > config file > defaults.

use anyhow::{Context, Result};
use lastwill_ledger::{AccountId, HeartbeatConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// General server settings
    #[serde(default)]
    pub server: ServerSection,

    /// The custody arrangement being hosted
    pub will: WillSection,

    /// Heartbeat thresholds for the watch daemon
    #[serde(default)]
    pub heartbeat: HeartbeatSection,
}

/// General server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Data directory (ledger state file)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Check interval in seconds (default: 6 hours)
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            check_interval_secs: default_check_interval(),
            log_level: default_log_level(),
        }
    }
}

/// The custody arrangement being hosted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WillSection {
    /// Owner account id. Fixed at first start; the state file keeps the
    /// authoritative copy thereafter.
    pub owner: String,

    /// Human-readable label for this arrangement
    #[serde(default = "default_will_label")]
    pub label: String,
}

/// Heartbeat thresholds for the watch daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatSection {
    /// Fraction of timeout elapsed before recommending a ping
    #[serde(default = "default_ping_threshold")]
    pub ping_threshold: f64,

    /// Fraction of timeout elapsed before a ping is critical
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,
}

impl Default for HeartbeatSection {
    fn default() -> Self {
        Self {
            ping_threshold: default_ping_threshold(),
            critical_threshold: default_critical_threshold(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("/data")
}

fn default_check_interval() -> u64 {
    21600 // 6 hours
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_will_label() -> String {
    "inheritance".to_string()
}

fn default_ping_threshold() -> f64 {
    0.5
}

fn default_critical_threshold() -> f64 {
    0.9
}

// ============================================================================
// Loading & environment override
// ============================================================================

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ServerConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LASTWILL_DATA_DIR`
    /// - `LASTWILL_CHECK_INTERVAL`
    /// - `LASTWILL_LOG_LEVEL`
    /// - `LASTWILL_OWNER`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LASTWILL_DATA_DIR") {
            self.server.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("LASTWILL_CHECK_INTERVAL") {
            if let Ok(secs) = v.parse::<u64>() {
                self.server.check_interval_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("LASTWILL_LOG_LEVEL") {
            self.server.log_level = v;
        }
        if let Ok(v) = std::env::var("LASTWILL_OWNER") {
            self.will.owner = v;
        }
    }

    /// The configured owner as a validated account id.
    pub fn owner(&self) -> Result<AccountId> {
        self.will
            .owner
            .parse()
            .with_context(|| "will.owner is not a valid account id")
    }

    /// Heartbeat thresholds as a ledger-side config.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig {
            ping_threshold: self.heartbeat.ping_threshold,
            critical_threshold: self.heartbeat.critical_threshold,
            poll_interval_secs: self.server.check_interval_secs,
        }
    }

    /// Path of the persisted ledger state file.
    pub fn state_path(&self) -> PathBuf {
        self.server.data_dir.join("ledger_state.json")
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        // Owner must parse
        self.owner()?;

        // Check interval must be at least 60 seconds
        anyhow::ensure!(
            self.server.check_interval_secs >= 60,
            "server.check_interval_secs must be >= 60"
        );

        // Heartbeat thresholds must be ordered and in range
        self.heartbeat_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("heartbeat config invalid: {}", e))?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
            [will]
            owner = "alice"
        "#
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServerConfig = toml::from_str(minimal_toml()).unwrap();

        assert_eq!(config.will.owner, "alice");
        assert_eq!(config.will.label, "inheritance");
        assert_eq!(config.server.check_interval_secs, 21600);
        assert_eq!(config.server.log_level, "info");
        assert!((config.heartbeat.ping_threshold - 0.5).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config_roundtrip() {
        let toml_str = r#"
            [server]
            data_dir = "/var/lib/lastwill"
            check_interval_secs = 600
            log_level = "debug"

            [will]
            owner = "alice"
            label = "family vault"

            [heartbeat]
            ping_threshold = 0.4
            critical_threshold = 0.8
        "#;
        let config: ServerConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.server.data_dir, PathBuf::from("/var/lib/lastwill"));
        assert_eq!(config.server.check_interval_secs, 600);
        assert_eq!(config.will.label, "family vault");
        assert_eq!(
            config.state_path(),
            PathBuf::from("/var/lib/lastwill/ledger_state.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_owner() {
        let toml_str = r#"
            [will]
            owner = ""
        "#;
        let config: ServerConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_interval() {
        let mut config: ServerConfig = toml::from_str(minimal_toml()).unwrap();
        config.server.check_interval_secs = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut config: ServerConfig = toml::from_str(minimal_toml()).unwrap();
        config.heartbeat.critical_threshold = 0.2; // below ping_threshold
        assert!(config.validate().is_err());
    }
}
