//! Transport configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::Endpoint;

/// Settings for the OS pipe transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeConfig {
    /// Directory holding the platform's sockets (Unix only)
    #[serde(default = "default_pipe_dir")]
    pub pipe_dir: PathBuf,

    /// Fail a blocking read after this many milliseconds; `None` waits forever
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
}

fn default_pipe_dir() -> PathBuf {
    std::env::temp_dir().join("hermes")
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            pipe_dir: default_pipe_dir(),
            read_timeout_ms: None,
        }
    }
}

impl PipeConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    /// Address of the platform pipe serving `endpoint`
    ///
    /// Windows: `\\.\pipe\{symbol}\{timeframe}`.
    /// Elsewhere: `{pipe_dir}/{symbol}/{timeframe}`.
    pub fn path(&self, endpoint: &Endpoint) -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(format!(
                r"\\.\pipe\{}\{}",
                endpoint.symbol, endpoint.timeframe
            ))
        } else {
            self.pipe_dir.join(&endpoint.symbol).join(&endpoint.timeframe)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: PipeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipeConfig::default());
        assert_eq!(config.read_timeout(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_path_layout() {
        let config = PipeConfig {
            pipe_dir: PathBuf::from("/run/platform"),
            read_timeout_ms: Some(250),
        };
        let path = config.path(&Endpoint::new("EURUSD", "H1"));
        assert_eq!(path, PathBuf::from("/run/platform/EURUSD/H1"));
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(250)));
    }
}
