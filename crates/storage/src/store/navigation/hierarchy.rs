#![forbid(unsafe_code)]

use super::super::*;
use kb_core::ids::ArticleId;
use kb_core::{AccessLevel, Actor};

impl SqliteStore {
    /// Ancestor chain of `id` (root first, the article itself excluded) with
    /// whether the actor may open each entry.
    pub fn hierarchy(&self, actor: &Actor, id: ArticleId) -> Result<Vec<HierarchyEntry>, StoreError> {
        load_article(&self.conn, id)?;
        ensure_access_tx(
            &self.conn,
            &self.resolver,
            actor,
            id,
            AccessLevel::Read,
            "reading requires read access",
        )?;
        let ancestors = path_ancestors(&self.conn, id)?;
        let permissions = effective_permissions_tx(&self.conn, &self.resolver, actor, &ancestors)?;
        let mut entries = Vec::with_capacity(ancestors.len());
        for ancestor in ancestors {
            let article = load_article(&self.conn, ancestor)?;
            entries.push(HierarchyEntry {
                article_id: ancestor,
                title: article.title,
                icon: article.icon,
                can_read: permissions
                    .get(&ancestor)
                    .is_some_and(|permission| permission.can_view()),
            });
        }
        Ok(entries)
    }
}
