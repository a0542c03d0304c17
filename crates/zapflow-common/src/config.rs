//! Configuration for Zapflow

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Outbound gateway configuration
    pub gateway: GatewayConfig,

    /// Campaign execution configuration
    #[serde(default)]
    pub campaigns: CampaignConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

/// Outbound gateway (WhatsApp send API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway base URL
    pub base_url: String,

    /// API key sent on every request
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

fn default_gateway_timeout() -> u64 {
    30
}

/// Campaign execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Seconds between coordinator ticks
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Default seconds between recipients when a campaign does not set one
    #[serde(default = "default_message_interval")]
    pub default_message_interval_secs: u32,

    /// Milliseconds between consecutive templates sent to the same recipient
    #[serde(default = "default_template_gap")]
    pub template_gap_ms: u64,

    /// Maximum templates allowed per campaign (launch-side limit)
    #[serde(default = "default_max_messages")]
    pub max_messages_per_campaign: u32,

    /// Maximum contacts allowed per campaign (launch-side limit)
    #[serde(default = "default_max_contacts")]
    pub max_contacts_per_campaign: u32,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            default_message_interval_secs: default_message_interval(),
            template_gap_ms: default_template_gap(),
            max_messages_per_campaign: default_max_messages(),
            max_contacts_per_campaign: default_max_contacts(),
        }
    }
}

fn default_check_interval() -> u64 {
    30
}

fn default_message_interval() -> u32 {
    30
}

fn default_template_gap() -> u64 {
    1000
}

fn default_max_messages() -> u32 {
    5
}

fn default_max_contacts() -> u32 {
    5000
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "json" or "text"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> crate::Result<Self> {
        let paths = [
            std::path::PathBuf::from("./config.toml"),
            std::path::PathBuf::from("/etc/zapflow/config.toml"),
        ];

        for path in paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(crate::Error::Config(
            "No configuration file found".to_string(),
        ))
    }
}
