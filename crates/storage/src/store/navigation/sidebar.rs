#![forbid(unsafe_code)]

use super::super::*;
use kb_core::ids::ArticleId;
use kb_core::{AccessLevel, Actor, Category};
use rusqlite::Row;
use rusqlite::types::ToSql;
use std::collections::BTreeSet;

const ENTRY_COLUMNS: &str = "a.id, a.parent_id, a.title, a.icon, a.category, a.sequence, a.is_locked, \
     EXISTS(SELECT 1 FROM articles c WHERE c.parent_id = a.id AND c.active = 1 AND c.is_article_item = 0)";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<SidebarEntry> {
    let raw_category: Option<String> = row.get(4)?;
    Ok(SidebarEntry {
        article_id: ArticleId::new(row.get(0)?),
        parent_id: row.get::<_, Option<i64>>(1)?.map(ArticleId::new),
        title: row.get(2)?,
        icon: row.get(3)?,
        category: raw_category
            .as_deref()
            .and_then(Category::parse)
            .unwrap_or(Category::Workspace),
        sequence: row.get(5)?,
        is_locked: row.get(6)?,
        has_children: row.get(7)?,
    })
}

impl SqliteStore {
    /// Navigation tree of one actor: readable active roots per category,
    /// favorites, and the non-item children of every unfolded article and of
    /// the active article's ancestors.
    pub fn sidebar(&self, actor: &Actor, request: SidebarRequest) -> Result<Sidebar, StoreError> {
        let access = accessible_ids_sql(AccessLevel::Read);
        let scope = AccessScope::of(actor);

        let roots = self.sidebar_entries(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM articles a \
                 WHERE a.parent_id IS NULL AND a.active = 1 AND a.id IN ({access}) \
                 ORDER BY a.sequence ASC, a.id ASC"
            ),
            scope.params(),
        )?;
        let mut sidebar = Sidebar::default();
        for entry in roots {
            match entry.category {
                Category::Workspace => sidebar.workspace.push(entry),
                Category::Shared => sidebar.shared.push(entry),
                Category::Private => sidebar.private.push(entry),
            }
        }

        sidebar.favorites = self.sidebar_entries(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM article_favorites f \
                 JOIN articles a ON a.id = f.article_id \
                 WHERE f.user_id = :user AND a.active = 1 AND a.id IN ({access}) \
                 ORDER BY f.sequence ASC, f.id ASC"
            ),
            scope.params(),
        )?;

        let mut unfolded: BTreeSet<ArticleId> = request.unfolded_ids.iter().copied().collect();
        if let Some(active) = request.active_article_id {
            load_article(&self.conn, active)?;
            unfolded.extend(path_ancestors(&self.conn, active)?);
        }
        if !unfolded.is_empty() {
            let parents: Vec<ArticleId> = unfolded.into_iter().collect();
            let payload = ids_json(&parents)?;
            let mut bindings = scope.params();
            bindings.push((":parents", &payload as &dyn ToSql));
            sidebar.children = self.sidebar_entries(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM articles a \
                     WHERE a.parent_id IN (SELECT value FROM json_each(:parents)) \
                       AND a.is_article_item = 0 AND a.active = 1 AND a.id IN ({access}) \
                     ORDER BY a.parent_id ASC, a.sequence ASC, a.id ASC"
                ),
                bindings,
            )?;
        }
        Ok(sidebar)
    }

    fn sidebar_entries(
        &self,
        sql: &str,
        bindings: Vec<(&str, &dyn ToSql)>,
    ) -> Result<Vec<SidebarEntry>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(bindings.as_slice(), entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
