use std::path::Path;
use thiserror::Error;

use super::types::RunnerConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Load runner configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<RunnerConfig, ConfigError> {
    let config: RunnerConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<RunnerConfig, ConfigError> {
    let default_config = include_str!("runner_config.json");
    load_config_from_str(default_config)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl RunnerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let indicators = &self.indicators;
        if indicators.atr_period == 0 {
            return Err(invalid("indicators.atr_period", "must be positive"));
        }
        // ATR needs one bar more than its period
        if indicators.window_size <= indicators.atr_period {
            return Err(invalid(
                "indicators.window_size",
                format!("must exceed atr_period ({})", indicators.atr_period),
            ));
        }

        let risk = &self.risk;
        let percentage = risk.scaling_out_percentage;
        if percentage.is_nan() || percentage <= 0.0 || percentage > 100.0 {
            return Err(invalid(
                "risk.scaling_out_percentage",
                "must be in (0, 100]",
            ));
        }
        for (field, scale) in [
            ("risk.scaling_out_scale", risk.scaling_out_scale),
            ("risk.trailing_stop_scale", risk.trailing_stop_scale),
            ("risk.trailing_activation_scale", risk.trailing_activation_scale),
        ] {
            if scale.is_nan() || scale <= 0.0 {
                return Err(invalid(field, "must be positive"));
            }
        }

        // Sockets reject a zero read timeout
        if self.transport.read_timeout_ms == Some(0) {
            return Err(invalid("transport.read_timeout_ms", "must be positive"));
        }

        if self.store.enabled && self.store.name.is_empty() {
            return Err(invalid("store.name", "must not be empty"));
        }
        Ok(())
    }
}
