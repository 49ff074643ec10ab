//! Hermes Runner
//!
//! Runs one strategy against one platform endpoint:
//!
//! - **Orchestrator**: dispatches each event to the signal and risk
//!   machines and answers with exactly one command
//! - **Config**: JSON configuration with embedded defaults
//! - **Session**: strategy selection, stores and reconnects
//!
//! ## Architecture
//!
//! ```text
//!   Trading platform  (\\.\pipe\{symbol}\{timeframe})
//!          │ events ▲ commands
//!          ▼        │
//! ┌─────────────────┴───────────────┐
//! │       StrategyOrchestrator      │
//! │  ┌──────────────┐ ┌───────────┐ │
//! │  │Signal Machine│ │Risk Machine│ │
//! │  └──────────────┘ └───────────┘ │
//! │        shared strategy context  │
//! └─────────────────────────────────┘
//!          ▲
//!      Session (config, store, reconnect)
//! ```

pub mod config;
pub mod orchestrator;
pub mod session;

// Re-export main types
pub use config::{
    ConfigError, ReconnectConfig, RunnerConfig, StoreConfig, StrategyKind, load_config,
    load_config_from_str, load_default_config,
};
pub use orchestrator::{
    DispatchPolicy, Precedence, RunError, RunOutcome, Step, StrategyOrchestrator,
};
pub use session::{Session, SessionError, normalize_endpoint};
