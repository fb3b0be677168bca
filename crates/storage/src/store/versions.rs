#![forbid(unsafe_code)]

use super::articles::write_article_tx;
use super::*;
use kb_core::ids::{ArticleId, UserId};
use kb_core::{AccessLevel, Actor};
use rusqlite::{OptionalExtension, Row, params};

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<Version> {
    Ok(Version {
        article_id: ArticleId::new(row.get(0)?),
        version_number: row.get(1)?,
        body: row.get(2)?,
        author_user_id: row.get::<_, Option<i64>>(3)?.map(UserId::new),
        created_at_ms: row.get(4)?,
    })
}

impl SqliteStore {
    /// Body snapshots, newest first.
    pub fn list_versions(&self, actor: &Actor, article: ArticleId) -> Result<Vec<Version>, StoreError> {
        load_article(&self.conn, article)?;
        ensure_access_tx(
            &self.conn,
            &self.resolver,
            actor,
            article,
            AccessLevel::Read,
            "reading requires read access",
        )?;
        let mut stmt = self.conn.prepare(
            "SELECT article_id, version_number, body, author_user_id, created_at_ms \
             FROM article_versions WHERE article_id=?1 ORDER BY version_number DESC",
        )?;
        let versions = stmt
            .query_map(params![article.get()], version_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(versions)
    }

    /// Writes a snapshot back as the body; the body it replaces is itself
    /// kept as a new snapshot.
    pub fn restore_version(
        &mut self,
        actor: &Actor,
        article: ArticleId,
        version_number: i64,
    ) -> Result<Article, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let body: String = tx
            .query_row(
                "SELECT body FROM article_versions WHERE article_id=?1 AND version_number=?2",
                params![article.get(), version_number],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::UnknownVersion {
                article,
                version: version_number,
            })?;
        write_article_tx(
            &tx,
            &self.resolver,
            actor,
            &WriteArticleRequest::new(article).body(body),
            now_ms,
        )?;
        tx.commit()?;
        tracing::info!(article = article.get(), version = version_number, "version restored");
        load_article(&self.conn, article)
    }
}
