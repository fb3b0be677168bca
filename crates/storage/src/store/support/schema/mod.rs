#![forbid(unsafe_code)]

mod migrations;
mod sql;

use super::super::StoreError;
use rusqlite::{Connection, params};

/// First knowledge schema: articles with their closure table, member and
/// unit/user grants, favorites, likes, versions and stages. Later columns
/// arrive through `migrations` without changing this marker.
const SCHEMA_VERSION: &str = "kb1";

pub(in crate::store) fn migrate_sqlite_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(&sql::full_schema_sql())?;

    migrations::apply(conn)?;

    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION],
    )?;

    Ok(())
}
