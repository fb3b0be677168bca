#![forbid(unsafe_code)]

use super::super::super::super::StoreError;
use super::ensure_column;
use rusqlite::Connection;

/// Columns added after the first schema revision.
pub(super) fn apply(conn: &Connection) -> Result<(), StoreError> {
    ensure_column(conn, "articles", "cover_url", "TEXT")?;
    ensure_column(
        conn,
        "articles",
        "cover_position",
        "REAL NOT NULL DEFAULT 50",
    )?;
    ensure_column(
        conn,
        "articles",
        "full_width",
        "INTEGER NOT NULL DEFAULT 0",
    )?;
    ensure_column(
        conn,
        "articles",
        "stage_id",
        "INTEGER REFERENCES article_stages(id) ON DELETE SET NULL",
    )?;
    ensure_column(conn, "articles", "last_editor_user_id", "INTEGER")?;
    ensure_column(conn, "articles", "last_edited_at_ms", "INTEGER")?;
    Ok(())
}
