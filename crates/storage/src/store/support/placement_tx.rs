#![forbid(unsafe_code)]

use super::super::{Article, StoreError};
use super::sequence_tx::{next_sibling_sequence, resequence_siblings_tx};
use super::tree_tx::{load_tree_tx, refresh_subtree_tx};
use kb_core::Permission;
use kb_core::ids::ArticleId;
use kb_core::tree::{ArticleShape, check_invariants};
use rusqlite::{Transaction, params};

/// Structural state an article is moved into.
#[derive(Clone, Copy, Debug)]
pub(in crate::store) struct Placement {
    pub parent: Option<ArticleId>,
    /// Explicit sibling position; a collision resequences the siblings.
    pub sequence: Option<i64>,
    pub own_permission: Option<Permission>,
    pub desynchronized: bool,
}

impl Placement {
    pub(in crate::store) fn current(article: &Article) -> Self {
        Self {
            parent: article.parent_id,
            sequence: None,
            own_permission: article.internal_permission,
            desynchronized: article.is_desynchronized,
        }
    }
}

/// Applies a parent/default-permission change and recomputes everything
/// derived from it. Callers check access first.
pub(in crate::store) fn place_article_tx(
    tx: &Transaction<'_>,
    current: &Article,
    placement: Placement,
    now_ms: i64,
) -> Result<(), StoreError> {
    let parent_changed = placement.parent != current.parent_id;
    if parent_changed {
        let mut seeds = vec![current.id];
        seeds.extend(placement.parent);
        let index = load_tree_tx(tx, &seeds)?;
        if let Err(err) = index.ensure_can_reparent(current.id, placement.parent) {
            tracing::warn!(
                article = current.id.get(),
                parent = placement.parent.map(ArticleId::get),
                "reparent rejected: {err}"
            );
            return Err(err.into());
        }
    }

    let is_item = current.is_article_item && placement.parent.is_some();
    let stage = if parent_changed { None } else { current.stage_id };
    check_invariants(&ArticleShape {
        id: Some(current.id),
        parent: placement.parent,
        own_permission: placement.own_permission,
        desynchronized: placement.desynchronized,
        is_item,
        active: current.active,
        trashed: current.to_delete,
    })?;

    let sequence = match placement.sequence {
        Some(sequence) => sequence,
        None if parent_changed => next_sibling_sequence(tx, placement.parent)?,
        None => current.sequence,
    };

    tx.execute(
        "UPDATE articles SET parent_id=?2, sequence=?3, internal_permission=?4, \
         is_desynchronized=?5, is_article_item=?6, stage_id=?7, updated_at_ms=?8 WHERE id=?1",
        params![
            current.id.get(),
            placement.parent.map(ArticleId::get),
            sequence,
            placement.own_permission.map(Permission::as_str),
            placement.desynchronized,
            is_item,
            stage.map(|stage| stage.get()),
            now_ms,
        ],
    )?;

    refresh_subtree_tx(tx, current.id)?;
    if placement.sequence.is_some() {
        resequence_siblings_tx(tx, placement.parent, &[current.id])?;
    }
    Ok(())
}
