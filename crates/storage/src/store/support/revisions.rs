#![forbid(unsafe_code)]

use super::super::StoreError;
use kb_core::ids::ArticleId;
use rusqlite::{OptionalExtension, Transaction, params};

pub(in crate::store) fn bump_article_revision_tx(
    tx: &Transaction<'_>,
    article: ArticleId,
    expected_revision: Option<i64>,
    now_ms: i64,
) -> Result<i64, StoreError> {
    let current: i64 = tx
        .query_row(
            "SELECT revision FROM articles WHERE id=?1",
            params![article.get()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(StoreError::UnknownArticle(article))?;

    if let Some(expected) = expected_revision
        && expected != current
    {
        return Err(StoreError::RevisionMismatch {
            expected,
            actual: current,
        });
    }

    let next = current + 1;
    tx.execute(
        "UPDATE articles SET revision=?2, updated_at_ms=?3 WHERE id=?1",
        params![article.get(), next, now_ms],
    )?;
    Ok(next)
}
