//! Core types for the MindPulse scoring pipeline
//!
//! This module defines the data that flows through the pipeline: biometric
//! channels, point-in-time snapshots, the stress score itself, persisted
//! daily records, and journal entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One biometric measurement stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Heart rate (beats per minute)
    HeartRate,
    /// Heart rate variability (milliseconds)
    Hrv,
    /// Respiratory rate (breaths per minute)
    RespiratoryRate,
    /// Blood oxygen saturation (percentage, 0-100)
    BloodOxygen,
    /// Sleep duration (hours)
    SleepDuration,
}

impl Channel {
    /// All channels, in snapshot field order.
    pub const ALL: [Channel; 5] = [
        Channel::HeartRate,
        Channel::Hrv,
        Channel::RespiratoryRate,
        Channel::BloodOxygen,
        Channel::SleepDuration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::HeartRate => "heart_rate",
            Channel::Hrv => "hrv",
            Channel::RespiratoryRate => "respiratory_rate",
            Channel::BloodOxygen => "blood_oxygen",
            Channel::SleepDuration => "sleep_duration",
        }
    }
}

/// Immutable capture of all five channel values at one instant.
///
/// Channels not yet observed are `None`, meaning "no data available yet", never
/// zero and never an error. A snapshot may be empty, partial, or full, and
/// may legitimately mix values observed at different moments; the only
/// consistency promise is that it is a whole copy, not a live view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingSnapshot {
    /// Heart rate (beats per minute)
    pub heart_rate: Option<f64>,
    /// Heart rate variability (milliseconds)
    pub hrv: Option<f64>,
    /// Respiratory rate (breaths per minute)
    pub respiratory_rate: Option<f64>,
    /// Blood oxygen saturation (percentage, 0-100)
    pub blood_oxygen: Option<f64>,
    /// Sleep duration (hours)
    pub sleep_hours: Option<f64>,
}

impl ReadingSnapshot {
    pub fn get(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::HeartRate => self.heart_rate,
            Channel::Hrv => self.hrv,
            Channel::RespiratoryRate => self.respiratory_rate,
            Channel::BloodOxygen => self.blood_oxygen,
            Channel::SleepDuration => self.sleep_hours,
        }
    }

    pub fn set(&mut self, channel: Channel, value: Option<f64>) {
        match channel {
            Channel::HeartRate => self.heart_rate = value,
            Channel::Hrv => self.hrv = value,
            Channel::RespiratoryRate => self.respiratory_rate = value,
            Channel::BloodOxygen => self.blood_oxygen = value,
            Channel::SleepDuration => self.sleep_hours = value,
        }
    }

    /// True when no channel has been observed yet.
    pub fn is_empty(&self) -> bool {
        Channel::ALL.iter().all(|c| self.get(*c).is_none())
    }
}

/// A stress score: an integer in [0, 100], or the −1 sentinel meaning the
/// score could not be computed from the available readings.
///
/// Consumers must treat the sentinel as "no score to display", never as
/// zero. Everywhere else in the pipeline absence is an `Option`; the
/// sentinel exists only at this final boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StressScore(i32);

impl StressScore {
    /// Sentinel for "could not be computed" (mandatory inputs missing).
    pub const INSUFFICIENT: StressScore = StressScore(-1);

    /// Wrap a validated score. Returns `None` outside [0, 100].
    pub fn new(value: i32) -> Option<Self> {
        (0..=100).contains(&value).then_some(Self(value))
    }

    /// Round a raw floating-point score half-away-from-zero, then clamp to
    /// [0, 100]. Clamping happens here and nowhere earlier.
    pub(crate) fn from_raw(raw: f64) -> Self {
        Self((raw.round() as i32).clamp(0, 100))
    }

    /// The score value, or `None` for the insufficient-data sentinel.
    pub fn value(&self) -> Option<i32> {
        (self.0 >= 0).then_some(self.0)
    }

    pub fn is_insufficient(&self) -> bool {
        self.0 < 0
    }

    /// Raw integer, sentinel included.
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for StressScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One persisted score for one calendar day.
///
/// At most one record exists per day; the date is normalized to the local
/// calendar day. Records are written once (first writer wins) and removed
/// only by an explicit bulk reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyScore {
    pub date: NaiveDate,
    pub score: StressScore,
}

/// A free-text journal entry with a mood tag.
///
/// Mood-only entries (relayed from the watch) carry an empty body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub body: String,
    pub mood: String,
}

impl JournalEntry {
    pub fn new(body: impl Into<String>, mood: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            body: body.into(),
            mood: mood.into(),
        }
    }

    /// Entry carrying only a mood tag, as relayed by the watch companion.
    pub fn mood_only(mood: impl Into<String>) -> Self {
        Self::new("", mood)
    }
}
