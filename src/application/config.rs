use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::view_models::ViewLimits;
use crate::domain::errors::ConfigError;
use crate::domain::logging::LogLevel;

/// Runtime configuration, read from the object handed to `start_dashboard`.
///
/// Every field is optional in the input; absent fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    #[serde(alias = "baseUrl")]
    pub base_url: String,
    #[serde(alias = "fullResyncIntervalMs")]
    pub full_resync_interval_ms: u32,
    #[serde(alias = "tickerIntervalMs")]
    pub ticker_interval_ms: u32,
    #[serde(alias = "realTimeIntervalMs")]
    pub real_time_interval_ms: u32,
    #[serde(alias = "maxListEntries")]
    pub max_list_entries: usize,
    #[serde(alias = "maxTickerSymbols")]
    pub max_ticker_symbols: usize,
    #[serde(alias = "notificationTtlMs")]
    pub notification_ttl_ms: u32,
    #[serde(alias = "terminalPath")]
    pub terminal_path: String,
    #[serde(alias = "logLevel")]
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            full_resync_interval_ms: 30_000,
            ticker_interval_ms: 15_000,
            real_time_interval_ms: 5_000,
            max_list_entries: 10,
            max_ticker_symbols: 5,
            notification_ttl_ms: 4_000,
            terminal_path: "/terminal".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.full_resync_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval("full_resync_interval_ms"));
        }
        if self.ticker_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval("ticker_interval_ms"));
        }
        if self.real_time_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval("real_time_interval_ms"));
        }
        if self.max_list_entries == 0 {
            return Err(ConfigError::InvalidLimit("max_list_entries"));
        }
        if self.max_ticker_symbols == 0 {
            return Err(ConfigError::InvalidLimit("max_ticker_symbols"));
        }
        self.log_level
            .parse::<LogLevel>()
            .map_err(ConfigError::Malformed)?;
        Ok(())
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or(LogLevel::Info)
    }

    pub fn full_resync_interval(&self) -> Duration {
        Duration::from_millis(self.full_resync_interval_ms as u64)
    }

    pub fn ticker_interval(&self) -> Duration {
        Duration::from_millis(self.ticker_interval_ms as u64)
    }

    pub fn real_time_interval(&self) -> Duration {
        Duration::from_millis(self.real_time_interval_ms as u64)
    }

    pub fn view_limits(&self) -> ViewLimits {
        ViewLimits {
            max_list_entries: self.max_list_entries,
            max_ticker_symbols: self.max_ticker_symbols,
        }
    }
}
