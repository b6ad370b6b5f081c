//! MindPulse Core - On-device stress scoring engine for wellness biometrics
//!
//! The crate turns asynchronously-arriving biometric readings (heart rate,
//! HRV, respiratory rate, blood oxygen, sleep duration) into a normalized
//! 0-100 stress score through a deterministic pipeline: channel updates →
//! aggregation → settled snapshot → score computation → once-per-day
//! persistence.
//!
//! ## Modules
//!
//! - **aggregator**: latest known value per biometric channel
//! - **engine**: pure snapshot → score computation
//! - **gate**: at most one persisted score per calendar day
//! - **store**: SQLite-backed scores and journal entries
//! - **companion**: watch companion wire messages
//! - **monitor**: debounced event loop driving the pipeline

pub mod aggregator;
pub mod companion;
pub mod engine;
pub mod error;
pub mod gate;
pub mod monitor;
pub mod store;
pub mod types;

pub use aggregator::ReadingAggregator;
pub use companion::CompanionMessage;
pub use engine::StressScoreEngine;
pub use error::CoreError;
pub use gate::ScorePersistenceGate;
pub use monitor::{MonitorConfig, MonitorEvent, MonitorHandle, StressMonitor};
pub use store::Store;
pub use types::{Channel, DailyScore, JournalEntry, ReadingSnapshot, StressScore};

/// Crate version, reported by the CLI.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
