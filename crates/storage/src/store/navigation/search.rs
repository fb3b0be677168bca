#![forbid(unsafe_code)]

use super::super::*;
use kb_core::content::snippet;
use kb_core::ids::ArticleId;
use kb_core::{AccessLevel, Actor};
use rusqlite::types::ToSql;

const HIT_COLUMNS: &str = "a.id, a.title, a.icon, a.root_id, a.body, \
     (SELECT COUNT(1) FROM article_favorites f WHERE f.article_id = a.id), \
     EXISTS(SELECT 1 FROM article_favorites f WHERE f.article_id = a.id AND f.user_id = :user), \
     a.updated_at_ms";

/// `LIKE` pattern matching `term` literally anywhere; `\` escapes.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl SqliteStore {
    /// Case-insensitive substring search over titles and bodies of active
    /// articles the actor can read, most favorited first. An empty term
    /// lists the actor's favorites instead.
    pub fn search_articles(
        &self,
        actor: &Actor,
        term: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let term = term.trim();
        let access = accessible_ids_sql(AccessLevel::Read);
        let scope = AccessScope::of(actor);
        let limit = to_sqlite_i64(limit)?;
        let pattern = like_pattern(term);
        let mut bindings = scope.params();
        bindings.push((":limit", &limit as &dyn ToSql));

        let sql = if term.is_empty() {
            format!(
                "SELECT {HIT_COLUMNS} FROM article_favorites fav \
                 JOIN articles a ON a.id = fav.article_id \
                 WHERE fav.user_id = :user AND a.active = 1 AND a.id IN ({access}) \
                 ORDER BY fav.sequence ASC, fav.id ASC LIMIT :limit"
            )
        } else {
            bindings.push((":pattern", &pattern as &dyn ToSql));
            format!(
                "SELECT {HIT_COLUMNS} FROM articles a \
                 WHERE a.active = 1 AND a.id IN ({access}) \
                   AND (a.title LIKE :pattern ESCAPE '\\' OR a.body LIKE :pattern ESCAPE '\\') \
                 ORDER BY 6 DESC, a.updated_at_ms DESC, a.id DESC LIMIT :limit"
            )
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let hits = stmt
            .query_map(bindings.as_slice(), |row| {
                let article_id = ArticleId::new(row.get(0)?);
                let body: String = row.get(4)?;
                Ok(SearchHit {
                    article_id,
                    title: row.get(1)?,
                    icon: row.get(2)?,
                    root_id: row
                        .get::<_, Option<i64>>(3)?
                        .map_or(article_id, ArticleId::new),
                    snippet: if term.is_empty() {
                        String::new()
                    } else {
                        snippet(&body, term)
                    },
                    favorite_count: row.get(5)?,
                    is_favorite: row.get(6)?,
                    updated_at_ms: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hits)
    }
}
