//! Persistent store
//!
//! SQLite-backed storage for daily stress scores and journal entries. A
//! dedicated worker thread owns the connection; callers submit closures
//! over a channel and await the reply, so all writes are serialized through
//! one place. The `stress_scores` table keys on the calendar date, which
//! makes the one-record-per-day invariant a constraint the database itself
//! enforces.

use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{DailyScore, JournalEntry, StressScore};

const CURRENT_SCHEMA_VERSION: i32 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS stress_scores (
    date  TEXT PRIMARY KEY,
    score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 100)
);

CREATE TABLE IF NOT EXISTS journal_entries (
    id          TEXT PRIMARY KEY,
    recorded_at TEXT NOT NULL,
    body        TEXT NOT NULL,
    mood        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_journal_entries_recorded_at
    ON journal_entries (recorded_at);
";

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct StoreInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("failed to send shutdown to store thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("failed to join store thread: {join_err:?}");
            }
        }
    }
}

/// Handle to the store worker. Cheap to clone; the underlying connection
/// is closed when the last clone drops.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Open (or create) the store at `db_path`.
    pub fn open(db_path: PathBuf) -> Result<Self, CoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let display = db_path.display().to_string();
        let store = Self::spawn_worker(move || Connection::open(&db_path))?;
        info!("store initialized at {display}");
        Ok(store)
    }

    /// Open a private in-memory store. Used by tests and the `score`
    /// one-shot CLI path.
    pub fn open_in_memory() -> Result<Self, CoreError> {
        Self::spawn_worker(Connection::open_in_memory)
    }

    fn spawn_worker(
        open: impl FnOnce() -> rusqlite::Result<Connection> + Send + 'static,
    ) -> Result<Self, CoreError> {
        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("mindpulse-store".into())
            .spawn(move || {
                let mut conn = match open() {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(CoreError::Store(err)));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("failed to enable WAL mode: {err}");
                }

                let init_result = run_migrations(&mut conn);
                if ready_tx.send(init_result).is_err() {
                    error!("store initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => task(&mut conn),
                        StoreCommand::Shutdown => break,
                    }
                }
            })
            .map_err(CoreError::Io)?;

        ready_rx.recv().map_err(|_| CoreError::StoreUnavailable)??;

        Ok(Self {
            inner: Arc::new(StoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    async fn execute<F, T>(&self, task: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, CoreError> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |conn| {
            if reply_tx.send(task(conn)).is_err() {
                error!("store caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|_| CoreError::StoreUnavailable)?;

        reply_rx.await.map_err(|_| CoreError::StoreUnavailable)?
    }

    /// Look up the persisted score for one calendar day.
    pub async fn find_score(&self, date: NaiveDate) -> Result<Option<DailyScore>, CoreError> {
        self.execute(move |conn| {
            let row = conn
                .query_row(
                    "SELECT score FROM stress_scores WHERE date = ?1",
                    params![date.to_string()],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;

            row.map(|raw| Ok(DailyScore { date, score: score_from_row(raw)? }))
                .transpose()
        })
        .await
    }

    /// Insert a score for `date` unless one already exists. Returns whether
    /// a row was written; losing the insert race is a silent no-op.
    pub async fn insert_score(&self, date: NaiveDate, score: i32) -> Result<bool, CoreError> {
        self.execute(move |conn| {
            let rows = conn.execute(
                "INSERT INTO stress_scores (date, score) VALUES (?1, ?2)
                 ON CONFLICT(date) DO NOTHING",
                params![date.to_string(), score],
            )?;
            Ok(rows > 0)
        })
        .await
    }

    /// All persisted daily scores, ascending by date, the ordering the
    /// trend display depends on.
    pub async fn daily_scores(&self) -> Result<Vec<DailyScore>, CoreError> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT date, score FROM stress_scores ORDER BY date ASC")?;

            let mut rows = stmt.query([])?;
            let mut scores = Vec::new();
            while let Some(row) = rows.next()? {
                scores.push(DailyScore {
                    date: parse_date(&row.get::<_, String>(0)?)?,
                    score: score_from_row(row.get::<_, i64>(1)?)?,
                });
            }
            Ok(scores)
        })
        .await
    }

    pub async fn insert_journal_entry(&self, entry: JournalEntry) -> Result<(), CoreError> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO journal_entries (id, recorded_at, body, mood)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    entry.id.to_string(),
                    entry.recorded_at.to_rfc3339(),
                    entry.body,
                    entry.mood,
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// All journal entries, most recent first.
    pub async fn journal_entries(&self) -> Result<Vec<JournalEntry>, CoreError> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, recorded_at, body, mood FROM journal_entries
                 ORDER BY recorded_at DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(JournalEntry {
                    id: parse_id(&row.get::<_, String>(0)?)?,
                    recorded_at: parse_datetime(&row.get::<_, String>(1)?)?,
                    body: row.get(2)?,
                    mood: row.get(3)?,
                });
            }
            Ok(entries)
        })
        .await
    }

    /// Delete one journal entry. Returns whether a row was removed.
    pub async fn delete_journal_entry(&self, id: Uuid) -> Result<bool, CoreError> {
        self.execute(move |conn| {
            let rows = conn.execute(
                "DELETE FROM journal_entries WHERE id = ?1",
                params![id.to_string()],
            )?;
            Ok(rows > 0)
        })
        .await
    }

    /// Bulk reset: remove every score record and journal entry. This is the
    /// only path that deletes daily score rows.
    pub async fn reset_all(&self) -> Result<(), CoreError> {
        self.execute(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM stress_scores", [])?;
            tx.execute("DELETE FROM journal_entries", [])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }
}

fn run_migrations(conn: &mut Connection) -> Result<(), CoreError> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version >= CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_V1)?;
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}

fn score_from_row(raw: i64) -> Result<StressScore, CoreError> {
    i32::try_from(raw)
        .ok()
        .and_then(StressScore::new)
        .ok_or(CoreError::ScoreOutOfRange(raw))
}

fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    value
        .parse::<NaiveDate>()
        .map_err(|_| CoreError::DateParseError(value.to_string()))
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CoreError::DateParseError(value.to_string()))
}

fn parse_id(value: &str) -> Result<Uuid, CoreError> {
    value
        .parse::<Uuid>()
        .map_err(|_| CoreError::IdParseError(value.to_string()))
}
