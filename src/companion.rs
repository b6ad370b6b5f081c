//! Watch companion wire messages
//!
//! The paired watch relays live readings to the phone as an opaque
//! key-value message. The key names below are the wire contract and must
//! be preserved byte-for-byte, including `streesScore`, which shipped
//! watch builds emit misspelled. Unknown keys are ignored.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Channel, StressScore};

/// One key-value message from the watch companion.
///
/// Every field is optional: a message may carry a single fresh reading, a
/// full set, a mood tag on its own, or any mix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanionMessage {
    /// Heart rate (beats per minute)
    #[serde(rename = "heartRate", skip_serializing_if = "Option::is_none", default)]
    pub heart_rate: Option<f64>,

    /// Heart rate variability (milliseconds)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hrv: Option<f64>,

    /// Score precomputed on the watch. Misspelled on the wire; kept for
    /// compatibility with deployed watch builds.
    #[serde(rename = "streesScore", skip_serializing_if = "Option::is_none", default)]
    pub stress_score: Option<i32>,

    /// Blood oxygen saturation (percentage, 0-100)
    #[serde(rename = "oxygen", skip_serializing_if = "Option::is_none", default)]
    pub blood_oxygen: Option<f64>,

    /// Respiratory rate (breaths per minute)
    #[serde(
        rename = "respiratoryRate",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub respiratory_rate: Option<f64>,

    /// Sleep duration (hours)
    #[serde(
        rename = "sleepDuration",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub sleep_hours: Option<f64>,

    /// Mood tag picked on the watch, saved as a mood-only journal entry.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mood: Option<String>,
}

impl CompanionMessage {
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The channel readings this message carries, ready to feed into the
    /// aggregator. Absent keys produce no update (they do not clear the
    /// channel).
    pub fn channel_updates(&self) -> Vec<(Channel, f64)> {
        let mut updates = Vec::new();
        if let Some(v) = self.heart_rate {
            updates.push((Channel::HeartRate, v));
        }
        if let Some(v) = self.hrv {
            updates.push((Channel::Hrv, v));
        }
        if let Some(v) = self.respiratory_rate {
            updates.push((Channel::RespiratoryRate, v));
        }
        if let Some(v) = self.blood_oxygen {
            updates.push((Channel::BloodOxygen, v));
        }
        if let Some(v) = self.sleep_hours {
            updates.push((Channel::SleepDuration, v));
        }
        updates
    }

    /// The watch-computed score, if present and in range. Out-of-range
    /// values (including the watch's own insufficient-data sentinel) are
    /// not worth displaying and yield `None`.
    pub fn precomputed_score(&self) -> Option<StressScore> {
        self.stress_score.and_then(StressScore::new)
    }
}
