//! Reading aggregation
//!
//! This module holds the most recently observed value for each biometric
//! channel. Updates arrive from independent, asynchronous origins (local
//! health-data queries and watch companion messages) with no ordering
//! guarantee between channels.

use crate::types::{Channel, ReadingSnapshot};

/// Latest-known-value store for the five biometric channels.
///
/// The aggregator exclusively owns the live snapshot. It is not internally
/// synchronized: all mutation must happen on a single serialized context
/// (the monitor's consumer loop), which also treats every `update` as the
/// "channel changed" notification that re-arms the settling timer.
#[derive(Debug, Default)]
pub struct ReadingAggregator {
    current: ReadingSnapshot,
}

impl ReadingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored value for `channel` unconditionally.
    ///
    /// No timestamp comparison is performed; a later overwrite with an
    /// older sample is not detected (accepted simplification). `None`
    /// records that the source currently has no sample for the channel.
    pub fn update(&mut self, channel: Channel, value: Option<f64>) {
        self.current.set(channel, value);
    }

    /// Point-in-time copy of all five channel values. Pure read.
    pub fn snapshot(&self) -> ReadingSnapshot {
        self.current.clone()
    }
}
