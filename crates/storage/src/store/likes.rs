#![forbid(unsafe_code)]

use super::*;
use kb_core::ids::ArticleId;
use kb_core::{AccessLevel, Actor};
use rusqlite::params;

impl SqliteStore {
    /// Likes are per partner.
    pub fn toggle_like(&mut self, actor: &Actor, article: ArticleId) -> Result<LikeState, StoreError> {
        let tx = begin_write(&mut self.conn)?;
        load_article(&tx, article)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            article,
            AccessLevel::Read,
            "liking requires read access",
        )?;
        let removed = tx.execute(
            "DELETE FROM article_likes WHERE article_id=?1 AND partner_id=?2",
            params![article.get(), actor.partner_id.get()],
        )?;
        if removed == 0 {
            tx.execute(
                "INSERT INTO article_likes(article_id, partner_id, created_at_ms) VALUES (?1, ?2, ?3)",
                params![article.get(), actor.partner_id.get(), now_ms()],
            )?;
        }
        let count: i64 = tx.query_row(
            "SELECT COUNT(1) FROM article_likes WHERE article_id=?1",
            params![article.get()],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(LikeState {
            liked: removed == 0,
            count,
        })
    }
}
