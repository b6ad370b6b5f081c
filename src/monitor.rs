//! Monitor event loop
//!
//! A single consumer loop applies channel updates from both origins (local
//! health-data queries and watch companion messages) to the aggregator.
//! Each applied event re-arms a settling timer; when the timer fires, the
//! loop snapshots the aggregator, computes a score, offers it to the
//! persistence gate, and publishes it to subscribers.
//!
//! The settling delay is a debounce, not a guarantee: if updates keep
//! arriving, several scores may be computed and offered in one day; all
//! but the first reach the gate as no-ops.

use std::time::Duration;

use chrono::Local;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::aggregator::ReadingAggregator;
use crate::companion::CompanionMessage;
use crate::engine::StressScoreEngine;
use crate::gate::ScorePersistenceGate;
use crate::store::Store;
use crate::types::{Channel, JournalEntry, StressScore};

/// Default settling delay between the last observed update and the score
/// computation, letting near-simultaneous updates coalesce into one
/// snapshot.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub settle_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// One unit of input to the monitor loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// Latest observation for one channel from the local biometric source.
    /// `None` records that the source currently has no sample.
    Sample {
        channel: Channel,
        #[serde(default)]
        value: Option<f64>,
    },
    /// Key-value message relayed from the watch companion.
    Companion { message: CompanionMessage },
}

/// Cloneable sender half for feeding events into the loop.
#[derive(Clone)]
pub struct MonitorHandle {
    events: mpsc::UnboundedSender<MonitorEvent>,
}

impl MonitorHandle {
    /// Enqueue an event. Returns false once the loop has shut down.
    pub fn send(&self, event: MonitorEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn update(&self, channel: Channel, value: Option<f64>) -> bool {
        self.send(MonitorEvent::Sample { channel, value })
    }

    pub fn companion(&self, message: CompanionMessage) -> bool {
        self.send(MonitorEvent::Companion { message })
    }
}

/// Owner of the running monitor loop.
///
/// Constructed explicitly and passed wherever needed; there is no shared
/// global instance. The loop ends when every [`MonitorHandle`] clone has
/// been dropped; [`StressMonitor::shutdown`] drops its own and waits,
/// flushing a pending computation first.
pub struct StressMonitor {
    handle: MonitorHandle,
    scores: watch::Receiver<StressScore>,
    task: JoinHandle<()>,
}

impl StressMonitor {
    pub fn spawn(store: Store, config: MonitorConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (score_tx, score_rx) = watch::channel(StressScore::INSUFFICIENT);

        let worker = MonitorWorker {
            aggregator: ReadingAggregator::new(),
            gate: ScorePersistenceGate::new(store.clone()),
            store,
            score_tx,
            settle: config.settle_delay,
        };
        let task = tokio::spawn(worker.run(event_rx));

        Self {
            handle: MonitorHandle { events: event_tx },
            scores: score_rx,
            task,
        }
    }

    pub fn handle(&self) -> MonitorHandle {
        self.handle.clone()
    }

    /// Subscribe to the current score. Starts at the insufficient-data
    /// sentinel, which consumers render as "no score to display".
    pub fn scores(&self) -> watch::Receiver<StressScore> {
        self.scores.clone()
    }

    pub fn current_score(&self) -> StressScore {
        *self.scores.borrow()
    }

    /// Stop accepting events, flush a pending computation, and wait for
    /// the loop to finish.
    pub async fn shutdown(self) {
        let Self { handle, task, scores } = self;
        drop(handle);
        drop(scores);
        if let Err(err) = task.await {
            warn!("monitor task ended abnormally: {err}");
        }
    }
}

struct MonitorWorker {
    aggregator: ReadingAggregator,
    gate: ScorePersistenceGate,
    store: Store,
    score_tx: watch::Sender<StressScore>,
    settle: Duration,
}

impl MonitorWorker {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<MonitorEvent>) {
        let sleep = time::sleep(self.settle);
        tokio::pin!(sleep);
        let mut pending = false;

        loop {
            tokio::select! {
                maybe = events.recv() => match maybe {
                    Some(event) => {
                        self.apply(event).await;
                        sleep.as_mut().reset(Instant::now() + self.settle);
                        pending = true;
                    }
                    None => break,
                },
                () = &mut sleep, if pending => {
                    pending = false;
                    self.commit().await;
                }
            }
        }

        if pending {
            self.commit().await;
        }
    }

    async fn apply(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Sample { channel, value } => {
                self.aggregator.update(channel, value);
            }
            MonitorEvent::Companion { message } => {
                for (channel, value) in message.channel_updates() {
                    self.aggregator.update(channel, Some(value));
                }

                // Show the watch-computed score right away as a provisional
                // current value; the local recompute after the settling
                // delay supersedes it. It is never persisted directly.
                if let Some(provisional) = message.precomputed_score() {
                    self.score_tx.send_replace(provisional);
                }

                if let Some(mood) = message.mood {
                    let entry = JournalEntry::mood_only(mood);
                    if let Err(err) = self.store.insert_journal_entry(entry).await {
                        warn!("dropping companion mood entry: {err}");
                    }
                }
            }
        }
    }

    async fn commit(&mut self) {
        let score = StressScoreEngine::compute(&self.aggregator.snapshot());
        let today = Local::now().date_naive();

        // A failed store access skips this attempt; the next settled
        // computation retries naturally. Never surfaced to consumers.
        match self.gate.record_if_new(score, today).await {
            Ok(true) => debug!("recorded daily score {score} for {today}"),
            Ok(false) => {}
            Err(err) => warn!("skipping score persistence attempt: {err}"),
        }

        self.score_tx.send_replace(score);
    }
}
