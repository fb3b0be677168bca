#![forbid(unsafe_code)]

mod articles;

use super::super::super::StoreError;
use rusqlite::{Connection, params};

pub(super) fn apply(conn: &Connection) -> Result<(), StoreError> {
    articles::apply(conn)?;
    Ok(())
}

/// Adds `column` to `table` unless an earlier run already did.
fn ensure_column(
    conn: &Connection,
    table: &str,
    column: &str,
    decl: &str,
) -> Result<(), StoreError> {
    let present: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM pragma_table_info(?1) WHERE name=?2)",
        params![table, column],
        |row| row.get(0),
    )?;
    if !present {
        conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl};"))?;
        tracing::debug!(table, column, "schema column added");
    }
    Ok(())
}
