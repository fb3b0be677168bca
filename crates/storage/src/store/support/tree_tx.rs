#![forbid(unsafe_code)]

use super::super::StoreError;
use super::json::ids_json;
use super::rows::optional_permission_at;
use kb_core::ids::ArticleId;
use kb_core::tree::{DerivedNode, TreeIndex, TreeNode};
use kb_core::{Category, Permission, categorize};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use serde::Serialize;

const NODE_COLUMNS: &str = "id, parent_id, internal_permission, is_desynchronized";

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<TreeNode> {
    Ok(TreeNode {
        id: ArticleId::new(row.get(0)?),
        parent: row.get::<_, Option<i64>>(1)?.map(ArticleId::new),
        own_permission: optional_permission_at(row, 2)?,
        desynchronized: row.get(3)?,
    })
}

/// Loads every node a structural change around `seeds` can touch: the seeds,
/// their ancestor chains and their subtrees. Both recursions use UNION so a
/// corrupted (cyclic) parent chain still terminates; the cycle then surfaces
/// from [`TreeIndex`].
pub(in crate::store) fn load_tree_tx(
    conn: &Connection,
    seeds: &[ArticleId],
) -> Result<TreeIndex, StoreError> {
    let sql = format!(
        r#"
        WITH RECURSIVE
          up(id) AS (
            SELECT value FROM json_each(?1)
            UNION
            SELECT a.parent_id FROM articles a JOIN up ON a.id = up.id
            WHERE a.parent_id IS NOT NULL
          ),
          down(id) AS (
            SELECT value FROM json_each(?1)
            UNION
            SELECT a.id FROM articles a JOIN down ON a.parent_id = down.id
          )
        SELECT {NODE_COLUMNS} FROM articles
        WHERE id IN (SELECT id FROM up UNION SELECT id FROM down)
        "#
    );
    let mut stmt = conn.prepare(&sql)?;
    let nodes = stmt
        .query_map(params![ids_json(seeds)?], node_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TreeIndex::from_nodes(nodes))
}

pub(in crate::store) fn load_full_tree_tx(conn: &Connection) -> Result<TreeIndex, StoreError> {
    let sql = format!("SELECT {NODE_COLUMNS} FROM articles");
    let mut stmt = conn.prepare(&sql)?;
    let nodes = stmt
        .query_map([], node_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TreeIndex::from_nodes(nodes))
}

#[derive(Serialize)]
struct DerivedRow {
    id: i64,
    root: i64,
    inherited: &'static str,
    source: Option<i64>,
    path: Vec<i64>,
}

/// Writes paths, roots and inherited defaults for `derived` with three
/// statements regardless of how many articles are involved.
pub(in crate::store) fn apply_derived_tx(
    tx: &Transaction<'_>,
    derived: &[DerivedNode],
) -> Result<(), StoreError> {
    if derived.is_empty() {
        return Ok(());
    }
    let rows: Vec<DerivedRow> = derived
        .iter()
        .map(|node| DerivedRow {
            id: node.id.get(),
            root: node.root.get(),
            inherited: node.inherited.permission.as_str(),
            source: node.inherited.source.map(ArticleId::get),
            path: node.path_with_self().into_iter().map(ArticleId::get).collect(),
        })
        .collect();
    let payload = serde_json::to_string(&rows)?;

    tx.execute(
        "DELETE FROM article_paths \
         WHERE article_id IN (SELECT json_extract(value, '$.id') FROM json_each(?1))",
        params![payload],
    )?;
    tx.execute(
        r#"
        INSERT INTO article_paths(article_id, ancestor_id, depth)
        SELECT json_extract(n.value, '$.id'), p.value, p.key
        FROM json_each(?1) AS n, json_each(n.value, '$.path') AS p
        "#,
        params![payload],
    )?;
    tx.execute(
        r#"
        UPDATE articles
        SET root_id = d.root,
            inherited_permission = d.inherited,
            inherited_permission_source = d.source
        FROM (
          SELECT json_extract(value, '$.id') AS id,
                 json_extract(value, '$.root') AS root,
                 json_extract(value, '$.inherited') AS inherited,
                 json_extract(value, '$.source') AS source
          FROM json_each(?1)
        ) AS d
        WHERE articles.id = d.id
        "#,
        params![payload],
    )?;
    Ok(())
}

/// Recomputes the derived state of `top` and everything below it, then the
/// category of the tree it now belongs to. Returns the refreshed ids.
pub(in crate::store) fn refresh_subtree_tx(
    tx: &Transaction<'_>,
    top: ArticleId,
) -> Result<Vec<ArticleId>, StoreError> {
    let index = load_tree_tx(tx, &[top])?;
    let mut targets = vec![top];
    targets.extend(index.descendants(top));
    let derived = index.derive(&targets)?;
    apply_derived_tx(tx, &derived)?;

    let root = derived
        .first()
        .map(|node| node.root)
        .ok_or(StoreError::UnknownArticle(top))?;
    let category = refresh_category_tx(tx, root)?;
    tracing::debug!(
        top = top.get(),
        root = root.get(),
        articles = targets.len(),
        category = category.as_str(),
        "derived state refreshed"
    );
    Ok(targets)
}

/// Category of the tree rooted at `root`, written to every article of it.
pub(in crate::store) fn refresh_category_tx(
    tx: &Transaction<'_>,
    root: ArticleId,
) -> Result<Category, StoreError> {
    let root_default: Option<Permission> = tx
        .query_row(
            "SELECT internal_permission FROM articles WHERE id=?1",
            params![root.get()],
            |row| optional_permission_at(row, 0),
        )
        .optional()?
        .ok_or(StoreError::UnknownArticle(root))?;
    let members_with_access: i64 = tx.query_row(
        "SELECT COUNT(1) FROM article_members WHERE article_id=?1 AND permission <> 'none'",
        params![root.get()],
        |row| row.get(0),
    )?;
    let category = categorize(root_default, usize::try_from(members_with_access).unwrap_or(0));
    tx.execute(
        "UPDATE articles SET category=?2 WHERE root_id=?1 AND category IS NOT ?2",
        params![root.get(), category.as_str()],
    )?;
    Ok(category)
}

/// Refreshes the category when `article` is a root; member changes anywhere
/// else never affect it.
pub(in crate::store) fn refresh_category_if_root_tx(
    tx: &Transaction<'_>,
    article: ArticleId,
) -> Result<(), StoreError> {
    let is_root: bool = tx
        .query_row(
            "SELECT parent_id IS NULL FROM articles WHERE id=?1",
            params![article.get()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(StoreError::UnknownArticle(article))?;
    if is_root {
        refresh_category_tx(tx, article)?;
    }
    Ok(())
}

/// Ancestors of `article` (root first) from the materialized path.
pub(in crate::store) fn path_ancestors(
    conn: &Connection,
    article: ArticleId,
) -> Result<Vec<ArticleId>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT ancestor_id FROM article_paths \
         WHERE article_id=?1 AND ancestor_id<>?1 ORDER BY depth ASC",
    )?;
    let ids = stmt
        .query_map(params![article.get()], |row| row.get::<_, i64>(0))?
        .map(|id| id.map(ArticleId::new))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Descendants of `article` from the materialized path, shallowest first.
pub(in crate::store) fn path_descendants(
    conn: &Connection,
    article: ArticleId,
) -> Result<Vec<ArticleId>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT p.article_id FROM article_paths p \
         JOIN article_paths d ON d.article_id = p.article_id AND d.ancestor_id = d.article_id \
         WHERE p.ancestor_id=?1 AND p.article_id<>?1 \
         ORDER BY d.depth ASC, p.article_id ASC",
    )?;
    let ids = stmt
        .query_map(params![article.get()], |row| row.get::<_, i64>(0))?
        .map(|id| id.map(ArticleId::new))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}
