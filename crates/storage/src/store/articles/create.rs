#![forbid(unsafe_code)]

use super::super::stages::ensure_stage_fits_tx;
use super::super::*;
use kb_core::content::default_body;
use kb_core::ids::{ArticleId, ShareToken};
use kb_core::resolver::PermissionResolver;
use kb_core::tree::{ArticleShape, check_invariants};
use kb_core::{AccessLevel, Actor, Permission};
use rusqlite::{Transaction, params};

impl SqliteStore {
    pub fn create_article(
        &mut self,
        actor: &Actor,
        request: CreateArticleRequest,
    ) -> Result<Article, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let id = create_article_tx(&tx, &self.resolver, actor, request, None, now_ms)?;
        tx.commit()?;
        load_article(&self.conn, id)
    }

    /// Creates all articles in one transaction, in order; later requests may
    /// not reference earlier ones since ids are assigned on insert. Without
    /// explicit sequences the batch is appended after the existing siblings
    /// of each parent, in request order.
    pub fn create_articles(
        &mut self,
        actor: &Actor,
        requests: Vec<CreateArticleRequest>,
    ) -> Result<Vec<Article>, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let appended = if requests.iter().all(|request| request.sequence.is_none()) {
            let parents: Vec<Option<ArticleId>> =
                requests.iter().map(|request| request.parent_id).collect();
            batch_append_sequences(&tx, &parents)?
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; requests.len()]
        };
        let mut ids = Vec::with_capacity(requests.len());
        for (request, append_at) in requests.into_iter().zip(appended) {
            ids.push(create_article_tx(&tx, &self.resolver, actor, request, append_at, now_ms)?);
        }
        tx.commit()?;
        ids.into_iter()
            .map(|id| load_article(&self.conn, id))
            .collect()
    }
}

pub(in crate::store) fn create_article_tx(
    tx: &Transaction<'_>,
    resolver: &PermissionResolver,
    actor: &Actor,
    request: CreateArticleRequest,
    append_at: Option<i64>,
    now_ms: i64,
) -> Result<ArticleId, StoreError> {
    if request.is_private && request.parent_id.is_some() {
        return Err(StoreError::InvalidInput(
            "private articles are created at the root",
        ));
    }
    if let Some(parent) = request.parent_id {
        load_article(tx, parent)?;
        ensure_access_tx(
            tx,
            resolver,
            actor,
            parent,
            AccessLevel::Write,
            "creating a child article requires write access on the parent",
        )?;
    }

    let own_permission = match (request.parent_id, request.is_private) {
        (None, true) => Some(Permission::None),
        (None, false) => Some(request.internal_permission.unwrap_or(Permission::Write)),
        (Some(_), _) => request.internal_permission,
    };
    let desynchronized = request.parent_id.is_some() && own_permission.is_some();
    check_invariants(&ArticleShape {
        id: None,
        parent: request.parent_id,
        own_permission,
        desynchronized,
        is_item: request.is_article_item,
        active: true,
        trashed: false,
    })?;
    if let Some(stage) = request.stage_id {
        ensure_stage_fits_tx(tx, stage, request.parent_id, request.is_article_item)?;
    }

    let sequence = match request.sequence {
        Some(sequence) => sequence,
        None => match append_at {
            Some(sequence) => sequence,
            None => next_sibling_sequence(tx, request.parent_id)?,
        },
    };
    let body = request
        .body
        .clone()
        .unwrap_or_else(|| default_body(request.title.as_deref()));

    let insert = tx.execute(
        "INSERT INTO articles(title, body, icon, share_token, parent_id, sequence, \
         is_article_item, stage_id, internal_permission, is_desynchronized, \
         last_editor_user_id, last_edited_at_ms, created_at_ms, updated_at_ms) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12, ?12)",
        params![
            request.title,
            body,
            request.icon,
            ShareToken::generate().into_string(),
            request.parent_id.map(ArticleId::get),
            sequence,
            request.is_article_item,
            request.stage_id.map(|stage| stage.get()),
            own_permission.map(Permission::as_str),
            desynchronized,
            actor.user_id.get(),
            now_ms,
        ],
    );
    if let Err(err) = insert {
        return Err(map_insert_conflict(err, "article violates a uniqueness or shape constraint"));
    }
    let id = ArticleId::new(tx.last_insert_rowid());

    if request.is_private {
        put_member_tx(tx, id, actor.partner_id, Permission::Write, now_ms)?;
    }
    refresh_subtree_tx(tx, id)?;
    if request.sequence.is_some() {
        resequence_siblings_tx(tx, request.parent_id, &[id])?;
    }
    if own_permission.is_some() {
        ensure_writer_tx(tx, id)?;
    }

    tracing::debug!(
        article = id.get(),
        parent = request.parent_id.map(ArticleId::get),
        sequence,
        "article created"
    );
    Ok(id)
}
