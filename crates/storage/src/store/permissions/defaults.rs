#![forbid(unsafe_code)]

use super::super::*;
use kb_core::ids::ArticleId;
use kb_core::{AccessLevel, Actor, Permission};
use rusqlite::Transaction;

impl SqliteStore {
    /// Sets the article's own default. On a child this pins the value and
    /// stops inheritance from the ancestors.
    pub fn set_default_permission(
        &mut self,
        actor: &Actor,
        article: ArticleId,
        permission: Permission,
    ) -> Result<Article, StoreError> {
        self.change_default(actor, article, |current| Placement {
            own_permission: Some(permission),
            desynchronized: !current.is_root(),
            ..Placement::current(current)
        })
    }

    /// Pins the currently inherited default on a child article.
    pub fn desynchronize(&mut self, actor: &Actor, article: ArticleId) -> Result<Article, StoreError> {
        self.change_default(actor, article, |current| Placement {
            own_permission: Some(current.inherited_permission),
            desynchronized: !current.is_root(),
            ..Placement::current(current)
        })
    }

    /// Drops the own default of a child so it inherits again.
    pub fn resynchronize(&mut self, actor: &Actor, article: ArticleId) -> Result<Article, StoreError> {
        self.change_default(actor, article, |current| Placement {
            own_permission: None,
            desynchronized: false,
            ..Placement::current(current)
        })
    }

    fn change_default(
        &mut self,
        actor: &Actor,
        article: ArticleId,
        placement: impl FnOnce(&Article) -> Placement,
    ) -> Result<Article, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let current = load_article(&tx, article)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            article,
            AccessLevel::Write,
            "changing the default permission requires write access",
        )?;
        let placement = placement(&current);
        apply_default_tx(&tx, &current, placement, now_ms)?;
        tx.commit()?;
        tracing::info!(
            article = article.get(),
            permission = placement.own_permission.map(Permission::as_str),
            desynchronized = placement.desynchronized,
            "default permission changed"
        );
        load_article(&self.conn, article)
    }
}

fn apply_default_tx(
    tx: &Transaction<'_>,
    current: &Article,
    placement: Placement,
    now_ms: i64,
) -> Result<(), StoreError> {
    bump_article_revision_tx(tx, current.id, None, now_ms)?;
    place_article_tx(tx, current, placement, now_ms)?;
    ensure_writer_tx(tx, current.id)
}
