//! Daily score persistence gate
//!
//! Enforces "at most one score record per calendar day". The lifecycle per
//! day is `NoRecord -> Recorded` on the first successful write; `Recorded`
//! is terminal until the next day starts over. First writer wins: a later,
//! possibly noisier score never overwrites the one already recorded
//! earlier in the day.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::store::Store;
use crate::types::StressScore;

/// Write gate in front of the daily-score table.
#[derive(Clone)]
pub struct ScorePersistenceGate {
    store: Store,
}

impl ScorePersistenceGate {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persist `score` for `today` unless a record already exists.
    ///
    /// Insufficient-data scores are never persisted. Safe to call any
    /// number of times per day: every call after the first successful
    /// write is a no-op, and the store's unique date key turns a lost
    /// two-writer race into a silent no-op as well. Returns whether a
    /// record was written.
    pub async fn record_if_new(
        &self,
        score: StressScore,
        today: NaiveDate,
    ) -> Result<bool, CoreError> {
        let Some(value) = score.value() else {
            return Ok(false);
        };

        if self.store.find_score(today).await?.is_some() {
            return Ok(false);
        }

        self.store.insert_score(today, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn score(v: i32) -> StressScore {
        StressScore::new(v).unwrap()
    }

    #[tokio::test]
    async fn first_write_wins_for_the_day() {
        let store = Store::open_in_memory().unwrap();
        let gate = ScorePersistenceGate::new(store.clone());
        let today = day("2025-07-14");

        assert!(gate.record_if_new(score(55), today).await.unwrap());
        assert!(!gate.record_if_new(score(80), today).await.unwrap());

        let record = store.find_score(today).await.unwrap().unwrap();
        assert_eq!(record.score.value(), Some(55));
    }

    #[tokio::test]
    async fn next_day_starts_from_no_record() {
        let store = Store::open_in_memory().unwrap();
        let gate = ScorePersistenceGate::new(store.clone());

        assert!(gate.record_if_new(score(55), day("2025-07-14")).await.unwrap());
        assert!(gate.record_if_new(score(80), day("2025-07-15")).await.unwrap());

        let record = store.find_score(day("2025-07-15")).await.unwrap().unwrap();
        assert_eq!(record.score.value(), Some(80));
    }

    #[tokio::test]
    async fn insufficient_scores_are_never_persisted() {
        let store = Store::open_in_memory().unwrap();
        let gate = ScorePersistenceGate::new(store.clone());
        let today = day("2025-07-14");

        assert!(!gate
            .record_if_new(StressScore::INSUFFICIENT, today)
            .await
            .unwrap());
        assert_eq!(store.find_score(today).await.unwrap(), None);

        // A real score arriving later the same day still gets through.
        assert!(gate.record_if_new(score(42), today).await.unwrap());
    }

    #[tokio::test]
    async fn repeated_calls_are_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let gate = ScorePersistenceGate::new(store.clone());
        let today = day("2025-07-14");

        for _ in 0..5 {
            gate.record_if_new(score(63), today).await.unwrap();
        }

        assert_eq!(store.daily_scores().await.unwrap().len(), 1);
    }
}
