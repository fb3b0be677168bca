#![forbid(unsafe_code)]

use super::*;
use kb_core::ids::{ArticleId, FavoriteId, UserId};
use kb_core::{AccessLevel, Actor, KnowledgeError};
use rusqlite::{Connection, OptionalExtension, Row, params};

const FAVORITE_COLUMNS: &str = "id, article_id, user_id, sequence, is_article_active";

fn favorite_from_row(row: &Row<'_>) -> rusqlite::Result<Favorite> {
    Ok(Favorite {
        id: FavoriteId::new(row.get(0)?),
        article_id: ArticleId::new(row.get(1)?),
        user_id: UserId::new(row.get(2)?),
        sequence: row.get(3)?,
        is_article_active: row.get(4)?,
    })
}

fn load_favorite(conn: &Connection, id: FavoriteId) -> Result<Favorite, StoreError> {
    let sql = format!("SELECT {FAVORITE_COLUMNS} FROM article_favorites WHERE id=?1");
    conn.query_row(&sql, params![id.get()], favorite_from_row)
        .optional()?
        .ok_or(StoreError::UnknownFavorite(id))
}

impl SqliteStore {
    /// Adds or removes the article from the actor's favorites. Returns the
    /// new favorite, or `None` when it was removed.
    pub fn toggle_favorite(
        &mut self,
        actor: &Actor,
        article: ArticleId,
    ) -> Result<Option<Favorite>, StoreError> {
        let tx = begin_write(&mut self.conn)?;
        let stored = load_article(&tx, article)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            article,
            AccessLevel::Read,
            "favoriting requires read access",
        )?;
        let removed = tx.execute(
            "DELETE FROM article_favorites WHERE article_id=?1 AND user_id=?2",
            params![article.get(), actor.user_id.get()],
        )?;
        if removed > 0 {
            tx.commit()?;
            return Ok(None);
        }

        let max: Option<i64> = tx.query_row(
            "SELECT MAX(sequence) FROM article_favorites WHERE user_id=?1",
            params![actor.user_id.get()],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO article_favorites(article_id, user_id, sequence, is_article_active, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                article.get(),
                actor.user_id.get(),
                max.unwrap_or(0) + 1,
                stored.active,
                now_ms(),
            ],
        )?;
        let favorite = load_favorite(&tx, FavoriteId::new(tx.last_insert_rowid()))?;
        tx.commit()?;
        Ok(Some(favorite))
    }

    /// The actor's favorites on active articles they can still read, in
    /// favorite order.
    pub fn list_favorites(&self, actor: &Actor) -> Result<Vec<Favorite>, StoreError> {
        let sql = format!(
            "SELECT {FAVORITE_COLUMNS} FROM article_favorites \
             WHERE user_id = :user AND is_article_active = 1 AND article_id IN ({}) \
             ORDER BY sequence ASC, id ASC",
            accessible_ids_sql(AccessLevel::Read)
        );
        let scope = AccessScope::of(actor);
        let mut stmt = self.conn.prepare(&sql)?;
        let favorites = stmt
            .query_map(scope.params().as_slice(), favorite_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(favorites)
    }

    /// Renumbers the actor's favorites to follow `article_ids` (0-based).
    /// Articles that are not favorites are skipped.
    pub fn reorder_favorites(
        &mut self,
        actor: &Actor,
        article_ids: &[ArticleId],
    ) -> Result<(), StoreError> {
        let tx = begin_write(&mut self.conn)?;
        {
            let mut stmt = tx.prepare(
                "UPDATE article_favorites SET sequence=?3 WHERE user_id=?1 AND article_id=?2",
            )?;
            for (index, article) in article_ids.iter().enumerate() {
                stmt.execute(params![
                    actor.user_id.get(),
                    article.get(),
                    to_sqlite_i64(index)?
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Updates a favorite. Its article and user are fixed unless the actor
    /// is a superuser; only the owner (or a superuser) may touch it.
    pub fn patch_favorite(
        &mut self,
        actor: &Actor,
        patch: FavoritePatch,
    ) -> Result<Favorite, StoreError> {
        let tx = begin_write(&mut self.conn)?;
        let favorite = load_favorite(&tx, patch.favorite_id)?;
        let article = patch.article_id.unwrap_or(favorite.article_id);
        let user = patch.user_id.unwrap_or(favorite.user_id);
        if (article != favorite.article_id || user != favorite.user_id) && !actor.is_superuser {
            return Err(KnowledgeError::MembershipConflict {
                article: favorite.article_id,
                partner: None,
                reason: "the article and user of a favorite cannot change",
            }
            .into());
        }
        if favorite.user_id != actor.user_id && !actor.is_superuser {
            return Err(StoreError::UnknownFavorite(favorite.id));
        }
        let target = load_article(&tx, article)?;
        let updated = tx.execute(
            "UPDATE article_favorites SET article_id=?2, user_id=?3, sequence=?4, is_article_active=?5 \
             WHERE id=?1",
            params![
                favorite.id.get(),
                article.get(),
                user.get(),
                patch.sequence.unwrap_or(favorite.sequence),
                target.active,
            ],
        );
        if let Err(err) = updated {
            return Err(map_insert_conflict(err, "the article is already a favorite of the user"));
        }
        let favorite = load_favorite(&tx, favorite.id)?;
        tx.commit()?;
        Ok(favorite)
    }
}
