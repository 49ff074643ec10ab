//! Built-in strategies
//!
//! Neither ships entry signals; they demonstrate how data collection and
//! position management are wired into machines.

pub mod downloader;
pub mod guardian;

pub use downloader::{Downloader, Recording};
pub use guardian::{Guardian, GuardianContext, OpenPosition, RiskParams, RiskState};
