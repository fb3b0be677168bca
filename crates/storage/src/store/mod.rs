#![forbid(unsafe_code)]

mod articles;
mod error;
mod favorites;
mod likes;
mod members;
mod navigation;
mod permissions;
mod rebuild;
mod requests;
mod stages;
mod support;
mod trash;
mod types;
mod versions;

pub use error::StoreError;
pub use requests::*;
pub use types::*;

use kb_core::config::{TRASH_LIMIT_DAYS_KEY, parse_trash_limit};
use kb_core::notify::{Notifier, TracingNotifier};
use kb_core::resolver::PermissionResolver;
use kb_core::EngineConfig;
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;
use support::*;

const DB_FILE_NAME: &str = "knowledge.db";

pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
    config: EngineConfig,
    resolver: PermissionResolver,
    notifier: Box<dyn Notifier>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("storage_dir", &self.storage_dir)
            .field("config", &self.config)
            .field("grant_sources", &self.resolver.kinds())
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let conn = Connection::open(storage_dir.join(DB_FILE_NAME))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        migrate_sqlite_schema(&conn)?;

        let stored_days = meta_get(&conn, TRASH_LIMIT_DAYS_KEY)?;
        let config =
            EngineConfig::default().with_trash_limit_days(parse_trash_limit(stored_days.as_deref()));

        Ok(Self {
            conn,
            storage_dir,
            config,
            resolver: PermissionResolver::default(),
            notifier: Box::new(TracingNotifier),
        })
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_sweep_batch_limit(&mut self, limit: usize) {
        self.config.sweep_batch_limit = limit;
    }

    /// Persists the trash grace period; it applies to every later sweep and
    /// deletion date.
    pub fn set_trash_limit_days(&mut self, days: u32) -> Result<(), StoreError> {
        if days == 0 {
            return Err(StoreError::InvalidInput("trash limit must be at least one day"));
        }
        meta_set(&self.conn, TRASH_LIMIT_DAYS_KEY, &days.to_string())?;
        self.config.trash_limit_days = days;
        Ok(())
    }
}

/// Structural writes take the database write lock up front so cycle checks
/// and derived-state writes see a stable tree.
fn begin_write(conn: &mut Connection) -> Result<Transaction<'_>, StoreError> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("CHECK constraint failed")
                })
        }
        _ => false,
    }
}

fn map_insert_conflict(err: rusqlite::Error, message: &'static str) -> StoreError {
    if is_constraint_violation(&err) {
        return StoreError::InvalidInput(message);
    }
    StoreError::Sql(err)
}

fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
}
