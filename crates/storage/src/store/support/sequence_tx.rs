#![forbid(unsafe_code)]

use super::super::StoreError;
use kb_core::ids::ArticleId;
use kb_core::sequence::{SiblingSlot, append_sequences, next_sequence, resequence};
use rusqlite::{Connection, Transaction, params};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

fn max_sibling_sequence(conn: &Connection, parent: Option<ArticleId>) -> Result<Option<i64>, StoreError> {
    Ok(conn.query_row(
        "SELECT MAX(sequence) FROM articles WHERE parent_id IS ?1",
        params![parent.map(ArticleId::get)],
        |row| row.get(0),
    )?)
}

pub(in crate::store) fn next_sibling_sequence(
    conn: &Connection,
    parent: Option<ArticleId>,
) -> Result<i64, StoreError> {
    Ok(next_sequence(max_sibling_sequence(conn, parent)?))
}

/// Append positions for a batch of new articles, one per entry of `parents`
/// and in the same order; each parent is read once.
pub(in crate::store) fn batch_append_sequences(
    conn: &Connection,
    parents: &[Option<ArticleId>],
) -> Result<Vec<i64>, StoreError> {
    let mut queues: HashMap<Option<ArticleId>, VecDeque<i64>> = HashMap::new();
    for parent in parents {
        if queues.contains_key(parent) {
            continue;
        }
        let count = parents.iter().filter(|other| *other == parent).count();
        let max = max_sibling_sequence(conn, *parent)?;
        queues.insert(*parent, append_sequences(max, count).into());
    }
    Ok(parents
        .iter()
        .map(|parent| {
            queues
                .get_mut(parent)
                .and_then(VecDeque::pop_front)
                .unwrap_or_default()
        })
        .collect())
}

#[derive(Serialize)]
struct SequenceRow {
    id: i64,
    sequence: i64,
}

/// Renumbers the children of `parent` when `written` introduced a duplicate
/// sequence. Returns the number of siblings that moved.
pub(in crate::store) fn resequence_siblings_tx(
    tx: &Transaction<'_>,
    parent: Option<ArticleId>,
    written: &[ArticleId],
) -> Result<usize, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT id, sequence, updated_at_ms FROM articles WHERE parent_id IS ?1",
    )?;
    let slots = stmt
        .query_map(params![parent.map(ArticleId::get)], |row| {
            let id = ArticleId::new(row.get(0)?);
            Ok(SiblingSlot {
                id,
                sequence: row.get(1)?,
                just_written: written.contains(&id),
                updated_at_ms: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let changes = resequence(slots);
    if changes.is_empty() {
        return Ok(0);
    }
    let rows: Vec<SequenceRow> = changes
        .iter()
        .map(|(id, sequence)| SequenceRow {
            id: id.get(),
            sequence: *sequence,
        })
        .collect();
    tx.execute(
        r#"
        UPDATE articles SET sequence = d.sequence
        FROM (
          SELECT json_extract(value, '$.id') AS id,
                 json_extract(value, '$.sequence') AS sequence
          FROM json_each(?1)
        ) AS d
        WHERE articles.id = d.id
        "#,
        params![serde_json::to_string(&rows)?],
    )?;
    tracing::debug!(
        parent = parent.map(ArticleId::get),
        moved = changes.len(),
        "siblings resequenced"
    );
    Ok(changes.len())
}
