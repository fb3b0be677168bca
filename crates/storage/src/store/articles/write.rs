#![forbid(unsafe_code)]

use super::super::stages::ensure_stage_fits_tx;
use super::super::*;
use kb_core::resolver::PermissionResolver;
use kb_core::{AccessLevel, Actor, KnowledgeError};
use rusqlite::{Transaction, params};

impl SqliteStore {
    pub fn write_article(
        &mut self,
        actor: &Actor,
        request: WriteArticleRequest,
    ) -> Result<Article, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        write_article_tx(&tx, &self.resolver, actor, &request, now_ms)?;
        tx.commit()?;
        load_article(&self.conn, request.article_id)
    }
}

pub(in crate::store) fn write_article_tx(
    tx: &Transaction<'_>,
    resolver: &PermissionResolver,
    actor: &Actor,
    request: &WriteArticleRequest,
    now_ms: i64,
) -> Result<(), StoreError> {
    let current = load_article(tx, request.article_id)?;
    ensure_access_tx(
        tx,
        resolver,
        actor,
        current.id,
        AccessLevel::Write,
        "editing requires write access",
    )?;

    let touches_content = request.title.is_some() || request.body.is_some();
    if current.is_locked && request.is_locked != Some(false) && touches_content {
        return Err(KnowledgeError::AccessDenied {
            article: current.id,
            user: actor.user_id,
            required: AccessLevel::Write,
            reason: "the article is locked",
        }
        .into());
    }
    bump_article_revision_tx(tx, current.id, request.expected_revision, now_ms)?;

    let target_parent = request.parent_id.unwrap_or(current.parent_id);
    let parent_changed = target_parent != current.parent_id;
    if parent_changed || request.sequence.is_some() {
        if parent_changed && let Some(parent) = target_parent {
            load_article(tx, parent)?;
            ensure_access_tx(
                tx,
                resolver,
                actor,
                parent,
                AccessLevel::Write,
                "moving requires write access on the destination",
            )?;
        }
        let mut placement = Placement {
            parent: target_parent,
            sequence: request.sequence,
            ..Placement::current(&current)
        };
        if target_parent.is_none() && current.parent_id.is_some() {
            placement.own_permission = Some(current.pinned_default());
            placement.desynchronized = false;
        }
        place_article_tx(tx, &current, placement, now_ms)?;
        if parent_changed {
            ensure_writer_tx(tx, current.id)?;
        }
    }

    let is_item = request
        .is_article_item
        .unwrap_or(current.is_article_item && target_parent.is_some());
    if is_item && target_parent.is_none() {
        return Err(KnowledgeError::invariant(current.id, "article items must have a parent").into());
    }
    let stage = match request.stage_id {
        Some(stage) => stage,
        None if parent_changed => None,
        None => current.stage_id,
    };
    if let Some(stage) = stage {
        ensure_stage_fits_tx(tx, stage, target_parent, is_item)?;
    }

    let body_changed = request
        .body
        .as_ref()
        .is_some_and(|body| *body != current.body);
    let version = if body_changed {
        tx.execute(
            "INSERT INTO article_versions(article_id, version_number, body, author_user_id, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                current.id.get(),
                current.version,
                current.body,
                current.last_editor_user_id.map(|user| user.get()),
                now_ms,
            ],
        )?;
        current.version + 1
    } else {
        current.version
    };

    let (last_editor, last_edited_at_ms) = if touches_content {
        (Some(actor.user_id), Some(now_ms))
    } else {
        (current.last_editor_user_id, current.last_edited_at_ms)
    };
    let (cover_ref, cover_url, cover_position) = match &request.cover {
        Some(cover) => (
            cover.cover_ref.clone(),
            cover.cover_url.clone(),
            cover.position.unwrap_or(current.cover_position),
        ),
        None => (
            current.cover_ref.clone(),
            current.cover_url.clone(),
            current.cover_position,
        ),
    };
    tx.execute(
        "UPDATE articles SET title=?2, body=?3, icon=?4, cover_ref=?5, cover_url=?6, \
         cover_position=?7, is_locked=?8, full_width=?9, is_published=?10, is_article_item=?11, \
         stage_id=?12, version=?13, last_editor_user_id=?14, last_edited_at_ms=?15 WHERE id=?1",
        params![
            current.id.get(),
            request.title.as_ref().or(current.title.as_ref()),
            request.body.as_ref().unwrap_or(&current.body),
            request.icon.as_ref().unwrap_or(&current.icon),
            cover_ref,
            cover_url,
            cover_position,
            request.is_locked.unwrap_or(current.is_locked),
            request.full_width.unwrap_or(current.full_width),
            request.is_published.unwrap_or(current.is_published),
            is_item,
            stage.map(|stage| stage.get()),
            version,
            last_editor.map(|user| user.get()),
            last_edited_at_ms,
        ],
    )?;

    tracing::debug!(
        article = current.id.get(),
        body_changed,
        parent_changed,
        version,
        "article written"
    );
    Ok(())
}
