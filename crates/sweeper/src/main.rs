#![forbid(unsafe_code)]

use clap::Parser;
use kb_core::config::{DEFAULT_SWEEP_BATCH_LIMIT, format_timestamp, timestamp_from_ms};
use kb_storage::{SqliteStore, StoreError};
use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Deletes trashed articles whose grace period has expired.
#[derive(Parser, Debug)]
#[command(name = "kb_sweeper", version)]
struct Args {
    /// Directory holding the knowledge database.
    #[arg(long, env = "KB_STORAGE_DIR")]
    storage_dir: PathBuf,

    /// Maximum number of trashed articles claimed per sweep.
    #[arg(long, env = "KB_SWEEP_BATCH", default_value_t = DEFAULT_SWEEP_BATCH_LIMIT)]
    batch_limit: usize,

    /// Pause between sweeps.
    #[arg(long, env = "KB_SWEEP_INTERVAL_S", default_value_t = 3600)]
    interval_s: u64,

    /// Grace period in days; stored in the database when given.
    #[arg(long, env = "KB_TRASH_LIMIT_DAYS")]
    trash_limit_days: Option<u32>,

    /// Run a single sweep pass and exit.
    #[arg(long)]
    once: bool,
}

fn main() -> Result<(), StoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.batch_limit == 0 {
        return Err(StoreError::InvalidInput("batch limit must be at least one"));
    }
    let mut store = SqliteStore::open(&args.storage_dir)?;
    store.set_sweep_batch_limit(args.batch_limit);
    if let Some(days) = args.trash_limit_days {
        store.set_trash_limit_days(days)?;
    }
    tracing::info!(
        storage_dir = %args.storage_dir.display(),
        batch_limit = args.batch_limit,
        interval_s = args.interval_s,
        trash_limit_days = store.config().trash_limit_days,
        "sweeper started"
    );

    loop {
        match drain(&mut store, None) {
            Ok(deleted) => tracing::info!(deleted, "sweep pass finished"),
            Err(err) if err.is_transient() && !args.once => {
                tracing::warn!(error = %err, "database busy; retrying on the next pass");
            }
            Err(err) => return Err(err),
        }
        if args.once {
            return Ok(());
        }
        sleep(Duration::from_secs(args.interval_s));
    }
}

/// Sweeps until a batch comes back short of the configured limit. `at_ms`
/// replaces the wall clock.
fn drain(store: &mut SqliteStore, at_ms: Option<i64>) -> Result<usize, StoreError> {
    let batch_limit = store.config().sweep_batch_limit;
    let mut total = 0;
    loop {
        let report = match at_ms {
            Some(now_ms) => store.sweep_expired_trash_at(now_ms, batch_limit)?,
            None => store.sweep_expired_trash()?,
        };
        tracing::debug!(
            cutoff = timestamp_from_ms(report.cutoff_ms).map(format_timestamp).as_deref(),
            deleted = report.deleted.len(),
            rescued = report.rescued.len(),
            "sweep batch"
        );
        total += report.deleted.len();
        if report.deleted.len() < batch_limit {
            return Ok(total);
        }
    }
}
