#![forbid(unsafe_code)]

use super::super::*;
use super::create::create_article_tx;
use kb_core::content::copy_title;
use kb_core::ids::ArticleId;
use kb_core::{AccessLevel, Actor, Permission};

impl SqliteStore {
    /// Copies an article next to the original when the actor may write there;
    /// otherwise the copy becomes a private root of the actor. Children are
    /// not copied.
    pub fn copy_article(&mut self, actor: &Actor, id: ArticleId) -> Result<Article, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let source = load_article(&tx, id)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            id,
            AccessLevel::Read,
            "copying requires read access",
        )?;

        let in_place = match source.parent_id {
            Some(parent) => {
                effective_permission_tx(&tx, &self.resolver, actor, parent)?.can_edit()
            }
            None => actor.is_internal() && source.internal_permission == Some(Permission::Write),
        };
        let request = CreateArticleRequest {
            title: Some(copy_title(source.title.as_deref())),
            body: Some(source.body.clone()),
            icon: source.icon.clone(),
            ..CreateArticleRequest::default()
        };
        let request = if in_place {
            CreateArticleRequest {
                parent_id: source.parent_id,
                internal_permission: source.parent_id.is_none().then_some(Permission::Write),
                is_article_item: source.is_article_item,
                stage_id: source.stage_id,
                ..request
            }
        } else {
            CreateArticleRequest {
                is_private: true,
                ..request
            }
        };

        let copy = create_article_tx(&tx, &self.resolver, actor, request, None, now_ms)?;
        tx.commit()?;
        tracing::info!(
            source = id.get(),
            copy = copy.get(),
            in_place,
            "article copied"
        );
        load_article(&self.conn, copy)
    }
}
