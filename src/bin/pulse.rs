//! Pulse CLI - Command-line interface for MindPulse Core
//!
//! Commands:
//! - score: compute one stress score from supplied readings
//! - run: drive the monitor pipeline from NDJSON events on stdin
//! - history: print stored daily scores (trend feed, ascending)
//! - reset: delete every stored score and journal entry

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use mindpulse_core::{
    CoreError, MonitorConfig, MonitorEvent, ReadingSnapshot, Store, StressMonitor,
    StressScoreEngine, CORE_VERSION,
};

/// Pulse - on-device stress scoring for wellness biometrics
#[derive(Parser)]
#[command(name = "pulse")]
#[command(author = "MindPulse")]
#[command(version = CORE_VERSION)]
#[command(about = "Compute and track stress scores from biometric readings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a single score from supplied readings
    Score {
        /// Heart rate variability (ms)
        #[arg(long)]
        hrv: Option<f64>,

        /// Heart rate (bpm)
        #[arg(long)]
        heart_rate: Option<f64>,

        /// Respiratory rate (breaths/min)
        #[arg(long)]
        respiratory_rate: Option<f64>,

        /// Blood oxygen saturation (percent)
        #[arg(long)]
        blood_oxygen: Option<f64>,

        /// Sleep duration (hours)
        #[arg(long)]
        sleep_hours: Option<f64>,

        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Read NDJSON monitor events from stdin and stream committed scores
    Run {
        /// SQLite database path
        #[arg(long, default_value = "mindpulse.db")]
        db: PathBuf,

        /// Settling delay in milliseconds
        #[arg(long, default_value = "1500")]
        settle_ms: u64,
    },

    /// Print stored daily scores, ascending by date
    History {
        /// SQLite database path
        #[arg(long, default_value = "mindpulse.db")]
        db: PathBuf,

        /// Emit NDJSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Delete every stored score and journal entry
    Reset {
        /// SQLite database path
        #[arg(long, default_value = "mindpulse.db")]
        db: PathBuf,

        /// Confirm the bulk reset
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            hrv,
            heart_rate,
            respiratory_rate,
            blood_oxygen,
            sleep_hours,
            json,
        } => cmd_score(
            ReadingSnapshot {
                hrv,
                heart_rate,
                respiratory_rate,
                blood_oxygen,
                sleep_hours,
            },
            json,
        ),
        Commands::Run { db, settle_ms } => report(cmd_run(db, settle_ms)),
        Commands::History { db, json } => report(cmd_history(db, json)),
        Commands::Reset { db, yes } => cmd_reset(db, yes),
    }
}

fn report(result: Result<(), CoreError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_score(snapshot: ReadingSnapshot, json: bool) -> ExitCode {
    let score = StressScoreEngine::compute(&snapshot);

    if json {
        println!("{}", serde_json::json!({ "score": score.as_i32() }));
        return ExitCode::SUCCESS;
    }

    match score.value() {
        Some(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("insufficient data: --hrv and --heart-rate are required");
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(db: PathBuf, settle_ms: u64) -> Result<(), CoreError> {
    let runtime = runtime()?;
    runtime.block_on(async move {
        let store = Store::open(db)?;
        let monitor = StressMonitor::spawn(
            store,
            MonitorConfig {
                settle_delay: Duration::from_millis(settle_ms),
            },
        );

        let mut scores = monitor.scores();
        let printer = tokio::spawn(async move {
            while scores.changed().await.is_ok() {
                let score = *scores.borrow_and_update();
                println!("{}", serde_json::json!({ "score": score.as_i32() }));
                let _ = io::stdout().flush();
            }
        });

        let handle = monitor.handle();
        let reader = tokio::task::spawn_blocking(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(_) => break,
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<MonitorEvent>(trimmed) {
                    Ok(event) => {
                        if !handle.send(event) {
                            break;
                        }
                    }
                    Err(err) => eprintln!("skipping malformed event: {err}"),
                }
            }
        });

        let _ = reader.await;
        monitor.shutdown().await;
        let _ = printer.await;
        Ok(())
    })
}

fn cmd_history(db: PathBuf, json: bool) -> Result<(), CoreError> {
    let runtime = runtime()?;
    runtime.block_on(async move {
        let store = Store::open(db)?;
        for record in store.daily_scores().await? {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "date": record.date.to_string(),
                        "score": record.score.as_i32(),
                    })
                );
            } else {
                println!("{}  {}", record.date, record.score);
            }
        }
        Ok(())
    })
}

fn cmd_reset(db: PathBuf, yes: bool) -> ExitCode {
    if !yes {
        eprintln!("refusing to reset without --yes");
        return ExitCode::FAILURE;
    }

    report(runtime().and_then(|runtime| {
        runtime.block_on(async move {
            let store = Store::open(db)?;
            store.reset_all().await?;
            println!("store reset");
            Ok(())
        })
    }))
}

fn runtime() -> Result<tokio::runtime::Runtime, CoreError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
