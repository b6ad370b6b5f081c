//! Stress score computation
//!
//! This module maps a [`ReadingSnapshot`] to a [`StressScore`]. The mapping
//! is a pure function: no state, no I/O, and identical output for identical
//! input.
//!
//! Algorithm:
//! 1. HRV and heart rate are mandatory; if either is absent the score is
//!    the insufficient-data sentinel.
//! 2. Normalize HRV and heart rate to 0-1 stress contributions.
//! 3. Weighted base over HRV (0.4), heart rate (0.4), and, only when
//!    present, sleep (0.2), renormalized by the weights actually used so
//!    missing sleep never dilutes the base.
//! 4. Elevated respiration adds up to 10 bonus points; blood oxygen below
//!    95% adds a penalty of 1.5 points per percent, capped at 7.5.
//! 5. Round half-away-from-zero, then clamp to [0, 100] as the single
//!    final clamping step.

use crate::types::{ReadingSnapshot, StressScore};

/// Weight of the HRV contribution to the base score.
pub const HRV_WEIGHT: f64 = 0.4;
/// Weight of the heart-rate contribution to the base score.
pub const HEART_RATE_WEIGHT: f64 = 0.4;
/// Weight of the sleep contribution, applied only when sleep is present.
pub const SLEEP_WEIGHT: f64 = 0.2;

/// Maximum bonus from elevated respiratory rate (at 20+ breaths/min).
const RESPIRATORY_BONUS_MAX: f64 = 10.0;
/// Blood-oxygen threshold below which the penalty applies (percent).
const OXYGEN_PENALTY_THRESHOLD: f64 = 95.0;
/// Penalty points per percentage point below the threshold.
const OXYGEN_PENALTY_PER_PCT: f64 = 1.5;
/// Upper bound on the blood-oxygen penalty (reached at 90% saturation).
const OXYGEN_PENALTY_CAP: f64 = 7.5;

/// Deterministic mapping from a reading snapshot to a stress score.
pub struct StressScoreEngine;

impl StressScoreEngine {
    /// Compute the score for one snapshot.
    ///
    /// Returns [`StressScore::INSUFFICIENT`] when HRV or heart rate is
    /// absent. This is the single hard failure condition, and a valid domain
    /// value rather than an error.
    pub fn compute(snapshot: &ReadingSnapshot) -> StressScore {
        let (Some(hrv), Some(heart_rate)) = (snapshot.hrv, snapshot.heart_rate) else {
            return StressScore::INSUFFICIENT;
        };

        // Higher HRV means less stress; higher resting HR means more.
        let norm_hrv = 1.0 - (hrv / 100.0).clamp(0.0, 1.0);
        let norm_hr = ((heart_rate - 50.0) / 70.0).clamp(0.0, 1.0);

        let mut weighted_sum = HRV_WEIGHT * norm_hrv + HEART_RATE_WEIGHT * norm_hr;
        let mut weight_sum = HRV_WEIGHT + HEART_RATE_WEIGHT;

        if let Some(sleep_hours) = snapshot.sleep_hours {
            let norm_sleep = 1.0 - (sleep_hours / 8.0).clamp(0.0, 1.0);
            weighted_sum += SLEEP_WEIGHT * norm_sleep;
            weight_sum += SLEEP_WEIGHT;
        }

        let mut score = (weighted_sum / weight_sum) * 100.0;

        if let Some(rr) = snapshot.respiratory_rate {
            let rr_factor = ((rr - 12.0) / 8.0).clamp(0.0, 1.0);
            score += rr_factor * RESPIRATORY_BONUS_MAX;
        }

        if let Some(oxygen) = snapshot.blood_oxygen {
            if oxygen < OXYGEN_PENALTY_THRESHOLD {
                let penalty = (OXYGEN_PENALTY_THRESHOLD - oxygen) * OXYGEN_PENALTY_PER_PCT;
                score += penalty.min(OXYGEN_PENALTY_CAP);
            }
        }

        StressScore::from_raw(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot(hrv: Option<f64>, hr: Option<f64>) -> ReadingSnapshot {
        ReadingSnapshot {
            hrv,
            heart_rate: hr,
            ..Default::default()
        }
    }

    #[test]
    fn missing_hrv_or_heart_rate_is_insufficient() {
        assert_eq!(
            StressScoreEngine::compute(&ReadingSnapshot::default()),
            StressScore::INSUFFICIENT
        );
        assert_eq!(
            StressScoreEngine::compute(&snapshot(Some(60.0), None)),
            StressScore::INSUFFICIENT
        );
        assert_eq!(
            StressScoreEngine::compute(&snapshot(None, Some(70.0))),
            StressScore::INSUFFICIENT
        );

        // Other channels cannot rescue a snapshot missing a mandatory input.
        let full_except_hrv = ReadingSnapshot {
            heart_rate: Some(70.0),
            respiratory_rate: Some(18.0),
            blood_oxygen: Some(92.0),
            sleep_hours: Some(6.0),
            ..Default::default()
        };
        assert_eq!(
            StressScoreEngine::compute(&full_except_hrv),
            StressScore::INSUFFICIENT
        );
    }

    #[test]
    fn deterministic_for_fixed_snapshot() {
        let snap = ReadingSnapshot {
            hrv: Some(42.5),
            heart_rate: Some(77.0),
            respiratory_rate: Some(15.0),
            blood_oxygen: Some(93.0),
            sleep_hours: Some(6.5),
        };
        let first = StressScoreEngine::compute(&snap);
        for _ in 0..10 {
            assert_eq!(StressScoreEngine::compute(&snap), first);
        }
    }

    #[test]
    fn extreme_inputs_clamp_the_base() {
        // HRV 0 + HR 200: both contributions saturate at 1.0.
        assert_eq!(
            StressScoreEngine::compute(&snapshot(Some(0.0), Some(200.0))).as_i32(),
            100
        );
        // HRV 200 + HR 50: both contributions floor at 0.0.
        assert_eq!(
            StressScoreEngine::compute(&snapshot(Some(200.0), Some(50.0))).as_i32(),
            0
        );
    }

    #[test]
    fn missing_sleep_renormalizes_the_weights() {
        // HRV 60 / HR 70, no sleep: the base must be averaged over the 0.8
        // weight actually used, not the full 1.0 including sleep's 0.2.
        let score = StressScoreEngine::compute(&snapshot(Some(60.0), Some(70.0)));

        let norm_hrv = 1.0 - 0.6;
        let norm_hr = (70.0 - 50.0) / 70.0;
        let expected =
            (HRV_WEIGHT * norm_hrv + HEART_RATE_WEIGHT * norm_hr) / (HRV_WEIGHT + HEART_RATE_WEIGHT);
        assert_eq!(score.as_i32(), (expected * 100.0).round() as i32);
        assert_eq!(score.as_i32(), 34);
    }

    #[test]
    fn present_sleep_uses_the_full_weight_sum() {
        let mut snap = snapshot(Some(60.0), Some(70.0));
        snap.sleep_hours = Some(4.0);
        // norm_sleep = 0.5: (0.16 + 0.114286 + 0.1) / 1.0 = 0.374286
        assert_eq!(StressScoreEngine::compute(&snap).as_i32(), 37);
    }

    #[test]
    fn respiratory_bonus_is_monotonic_and_capped() {
        let base = StressScoreEngine::compute(&snapshot(Some(60.0), Some(70.0)));

        let score_at = |rr: f64| {
            let mut snap = snapshot(Some(60.0), Some(70.0));
            snap.respiratory_rate = Some(rr);
            StressScoreEngine::compute(&snap).as_i32()
        };

        // At or below 12 breaths/min the bonus contributes nothing.
        assert_eq!(score_at(12.0), base.as_i32());
        assert_eq!(score_at(8.0), base.as_i32());

        // Rising respiration raises the score monotonically, up to +10.
        let mut previous = score_at(12.0);
        for rr in [14.0, 16.0, 18.0, 20.0] {
            let current = score_at(rr);
            assert!(current >= previous, "score dropped at rr={rr}");
            previous = current;
        }
        assert_eq!(score_at(20.0), base.as_i32() + 10);
        assert_eq!(score_at(30.0), base.as_i32() + 10);
    }

    #[test]
    fn oxygen_penalty_applies_below_threshold_and_is_capped() {
        let base = StressScoreEngine::compute(&snapshot(Some(60.0), Some(70.0)));

        let score_at = |oxygen: f64| {
            let mut snap = snapshot(Some(60.0), Some(70.0));
            snap.blood_oxygen = Some(oxygen);
            StressScoreEngine::compute(&snap).as_i32()
        };

        assert_eq!(score_at(98.0), base.as_i32());
        assert_eq!(score_at(95.0), base.as_i32());
        // 94% -> +1.5 points on a base of 34.29.
        assert_eq!(score_at(94.0), 36);
        // 90% -> the 7.5-point cap; lower saturations add nothing more.
        assert_eq!(score_at(90.0), 42);
        assert_eq!(score_at(80.0), 42);
    }

    #[test]
    fn bonuses_cannot_push_past_the_final_clamp() {
        let snap = ReadingSnapshot {
            hrv: Some(0.0),
            heart_rate: Some(200.0),
            respiratory_rate: Some(25.0),
            blood_oxygen: Some(50.0),
            sleep_hours: None,
        };
        assert_eq!(StressScoreEngine::compute(&snap).as_i32(), 100);
    }

    #[test]
    fn partial_data_end_to_end() {
        // HR 90 / HRV 30, nothing else: 0.4*0.70 + 0.4*0.5714 over weight
        // 0.8 gives 63.57, which rounds to 64.
        let score = StressScoreEngine::compute(&snapshot(Some(30.0), Some(90.0)));
        assert_eq!(score.as_i32(), 64);
        assert_eq!(score.value(), Some(64));
    }
}
