#![forbid(unsafe_code)]

use super::super::*;
use kb_core::ids::ArticleId;
use kb_core::{AccessLevel, Actor, Category, KnowledgeError, Permission};
use rusqlite::params;

impl SqliteStore {
    /// Moves an article under `parent_id` (or to the root level), optionally
    /// before a sibling, into the requested category.
    ///
    /// The category falls back to the destination parent's, then the
    /// reference sibling's; with none of them the placement is ambiguous.
    pub fn move_article(
        &mut self,
        actor: &Actor,
        request: MoveArticleRequest,
    ) -> Result<Article, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let current = load_article(&tx, request.article_id)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            current.id,
            AccessLevel::Write,
            "moving requires write access",
        )?;

        let parent = request
            .parent_id
            .map(|id| load_article(&tx, id))
            .transpose()?;
        let before = request
            .before_article_id
            .map(|id| load_article(&tx, id))
            .transpose()?;
        let category = request
            .category
            .or(parent.as_ref().map(|parent| parent.category))
            .or(before.as_ref().map(|before| before.category))
            .ok_or(KnowledgeError::AmbiguousPlacement {
                article: current.id,
            })?;

        if let Some(before) = &before
            && before.parent_id != request.parent_id
        {
            return Err(StoreError::InvalidInput(
                "the reference article must be a sibling at the destination",
            ));
        }
        if let Some(parent) = &parent {
            ensure_access_tx(
                &tx,
                &self.resolver,
                actor,
                parent.id,
                AccessLevel::Write,
                "moving requires write access on the destination",
            )?;
        }

        let mut placement = Placement {
            parent: request.parent_id,
            sequence: before.as_ref().map(|before| before.sequence),
            ..Placement::current(&current)
        };
        match (request.parent_id, category) {
            (None, Category::Private) => {
                make_private_tx(&tx, current.id, actor, now_ms)?;
                placement.own_permission = Some(Permission::None);
                placement.desynchronized = false;
            }
            (None, Category::Workspace) => {
                placement.own_permission = Some(Permission::Write);
                placement.desynchronized = false;
            }
            (None, Category::Shared) => {
                placement.own_permission = Some(current.pinned_default());
                placement.desynchronized = false;
            }
            (Some(_), _) if current.is_root() => {
                placement.own_permission = None;
                placement.desynchronized = false;
            }
            (Some(_), _) => {}
        }

        bump_article_revision_tx(&tx, current.id, None, now_ms)?;
        place_article_tx(&tx, &current, placement, now_ms)?;
        ensure_writer_tx(&tx, current.id)?;
        tx.commit()?;

        tracing::info!(
            article = current.id.get(),
            parent = request.parent_id.map(ArticleId::get),
            category = category.as_str(),
            "article moved"
        );
        load_article(&self.conn, current.id)
    }
}

/// Leaves the actor as the only (write) member and drops direct grants.
fn make_private_tx(
    tx: &rusqlite::Transaction<'_>,
    article: ArticleId,
    actor: &Actor,
    now_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "DELETE FROM article_members WHERE article_id=?1 AND partner_id<>?2",
        params![article.get(), actor.partner_id.get()],
    )?;
    put_member_tx(tx, article, actor.partner_id, Permission::Write, now_ms)?;
    tx.execute(
        "DELETE FROM article_unit_grants WHERE article_id=?1",
        params![article.get()],
    )?;
    tx.execute(
        "DELETE FROM article_user_grants WHERE article_id=?1",
        params![article.get()],
    )?;
    Ok(())
}
