//! Session
//!
//! One engine instance serving one symbol/timeframe. Each connection
//! attempt builds a fresh strategy from the configuration and hands it to
//! a [`StrategyOrchestrator`]. Only connection failures are retried.

use thiserror::Error;
use uuid::Uuid;

use hermes_gateway::{Endpoint, PipeTransport, Transport};
use hermes_stats::StatsError;
use hermes_store::{OhlcvStore, StoreError};
use hermes_strategy::{Downloader, Guardian, MachineError, Strategy};

use crate::config::{RunnerConfig, StrategyKind};
use crate::orchestrator::{RunError, RunOutcome, StrategyOrchestrator};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("Invalid strategy machine: {0}")]
    Machine(#[from] MachineError),

    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Indicator setup failed: {0}")]
    Stats(#[from] StatsError),
}

/// Upper-case symbol, capitalized timeframe (`eurusd`, `h1` -> `EURUSD H1`)
pub fn normalize_endpoint(symbol: &str, timeframe: &str) -> Endpoint {
    let mut chars = timeframe.chars();
    let timeframe = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    };
    Endpoint::new(symbol.to_uppercase(), timeframe)
}

pub struct Session {
    config: RunnerConfig,
    endpoint: Endpoint,
    instance_id: Uuid,
}

impl Session {
    pub fn new(config: RunnerConfig, endpoint: Endpoint) -> Self {
        let instance_id = config.instance_id.unwrap_or_else(Uuid::new_v4);
        Self {
            config,
            endpoint,
            instance_id,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// OS pipe transport for this session's endpoint
    pub fn transport(&self) -> PipeTransport {
        PipeTransport::new(self.endpoint.clone(), self.config.transport.clone())
    }

    /// Serve the platform, reconnecting after connection failures
    pub fn run<T: Transport>(&self, transport: &T) -> Result<RunOutcome, SessionError> {
        let reconnect = &self.config.reconnect;
        let mut attempt = 0;
        loop {
            match self.run_once(transport) {
                Err(SessionError::Run(RunError::Connect(e))) if attempt < reconnect.attempts => {
                    attempt += 1;
                    log::warn!(
                        "[{}] {}: {}; retry {}/{} in {}ms",
                        self.instance_id,
                        self.endpoint,
                        e,
                        attempt,
                        reconnect.attempts,
                        reconnect.delay_ms
                    );
                    std::thread::sleep(reconnect.delay());
                }
                result => return result,
            }
        }
    }

    fn run_once<T: Transport>(&self, transport: &T) -> Result<RunOutcome, SessionError> {
        let store = self.open_store()?;
        match self.config.strategy {
            StrategyKind::Downloader => self.drive(Downloader::new(store), transport),
            StrategyKind::Guardian => {
                let guardian =
                    Guardian::new(&self.config.indicators, self.config.risk.clone(), store)?;
                self.drive(guardian, transport)
            }
        }
    }

    fn drive<S: Strategy, T: Transport>(
        &self,
        strategy: S,
        transport: &T,
    ) -> Result<RunOutcome, SessionError> {
        log::info!(
            "[{}] {}: starting {}",
            self.instance_id,
            self.endpoint,
            strategy.name()
        );
        let mut orchestrator =
            StrategyOrchestrator::new(strategy)?.with_policy(self.config.dispatch);
        Ok(orchestrator.run(transport)?)
    }

    fn open_store(&self) -> Result<Option<OhlcvStore>, StoreError> {
        let store = &self.config.store;
        if !store.enabled {
            return Ok(None);
        }
        OhlcvStore::open(
            &store.root,
            &store.name,
            &self.endpoint.symbol,
            &self.endpoint.timeframe,
        )
        .map(Some)
    }
}
