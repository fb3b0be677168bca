#![forbid(unsafe_code)]

use super::super::*;
use kb_core::ids::ArticleId;
use kb_core::permission::AccessFlags;
use kb_core::{AccessLevel, Actor};
use rusqlite::params;
use rusqlite::types::ToSql;

impl SqliteStore {
    /// Article with the actor's permission, favorite state and, for trashed
    /// articles, the date the sweep will remove it.
    pub fn get_article(&self, actor: &Actor, id: ArticleId) -> Result<ArticleView, StoreError> {
        let article = load_article(&self.conn, id)?;
        let permission = ensure_access_tx(
            &self.conn,
            &self.resolver,
            actor,
            id,
            AccessLevel::Read,
            "reading requires read access",
        )?;
        let (favorite_count, is_favorite, like_count): (i64, bool, i64) = self.conn.query_row(
            "SELECT \
               (SELECT COUNT(1) FROM article_favorites WHERE article_id=?1), \
               EXISTS(SELECT 1 FROM article_favorites WHERE article_id=?1 AND user_id=?2), \
               (SELECT COUNT(1) FROM article_likes WHERE article_id=?1)",
            params![id.get(), actor.user_id.get()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let deletion_date = if article.to_delete {
            self.config.deletion_date(article.updated_at_ms)
        } else {
            None
        };
        Ok(ArticleView {
            article,
            permission,
            flags: AccessFlags::from(permission),
            is_favorite,
            favorite_count,
            like_count,
            deletion_date,
        })
    }

    /// Ancestors of `id`, root first, walked over the live parent links.
    /// Fails with a hierarchy cycle error instead of looping.
    pub fn resolve_ancestors(&self, id: ArticleId) -> Result<Vec<ArticleId>, StoreError> {
        load_article(&self.conn, id)?;
        let index = load_tree_tx(&self.conn, &[id])?;
        Ok(index.ancestors(id)?)
    }

    /// Ancestors of `id` as recorded in the materialized path.
    pub fn materialized_path(&self, id: ArticleId) -> Result<Vec<ArticleId>, StoreError> {
        load_article(&self.conn, id)?;
        path_ancestors(&self.conn, id)
    }

    /// Active children the actor can read, in sibling order.
    pub fn list_children(
        &self,
        actor: &Actor,
        parent: Option<ArticleId>,
    ) -> Result<Vec<Article>, StoreError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             WHERE parent_id IS :parent AND active = 1 AND id IN ({}) \
             ORDER BY sequence ASC, id ASC",
            accessible_ids_sql(AccessLevel::Read)
        );
        let scope = AccessScope::of(actor);
        let parent = parent.map(ArticleId::get);
        let mut bindings = scope.params();
        bindings.push((":parent", &parent as &dyn ToSql));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(bindings.as_slice(), article_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
