use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use hermes_gateway::PipeConfig;
use hermes_strategy::{MarketParams, RiskParams};

use crate::orchestrator::DispatchPolicy;

/// Built-in strategy served by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Record bars to the store, manage nothing
    Downloader,
    /// Manage open positions: scale out, break-even, trailing stop
    #[default]
    Guardian,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Downloader => write!(f, "downloader"),
            StrategyKind::Guardian => write!(f, "guardian"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Extra connection attempts after the first; 0 disables retrying
    #[serde(default)]
    pub attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    1000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            attempts: 0,
            delay_ms: default_delay_ms(),
        }
    }
}

impl ReconnectConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Bar history persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// File stem under `{root}/{symbol}/{timeframe}/`
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_enabled() -> bool {
    true
}

fn default_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_name() -> String {
    "ohlcv".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            root: default_root(),
            name: default_name(),
        }
    }
}

/// Runner configuration file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Identifies this engine instance in logs; generated when absent
    #[serde(default)]
    pub instance_id: Option<Uuid>,
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub transport: PipeConfig,
    #[serde(default)]
    pub dispatch: DispatchPolicy,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub indicators: MarketParams,
    #[serde(default)]
    pub risk: RiskParams,
}
