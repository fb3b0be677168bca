#![forbid(unsafe_code)]

use super::super::*;
use kb_core::ids::ArticleId;
use kb_core::permission::AccessFlags;
use kb_core::resolver::Explanation;
use kb_core::{AccessLevel, Actor, Permission};
use std::collections::HashMap;

impl SqliteStore {
    pub fn effective_permission(
        &self,
        actor: &Actor,
        article: ArticleId,
    ) -> Result<Permission, StoreError> {
        effective_permission_tx(&self.conn, &self.resolver, actor, article)
    }

    /// Effective permissions for many articles with one query per grant
    /// source. Unknown ids are left out.
    pub fn effective_permissions(
        &self,
        actor: &Actor,
        articles: &[ArticleId],
    ) -> Result<HashMap<ArticleId, Permission>, StoreError> {
        effective_permissions_tx(&self.conn, &self.resolver, actor, articles)
    }

    pub fn access_flags(&self, actor: &Actor, article: ArticleId) -> Result<AccessFlags, StoreError> {
        Ok(AccessFlags::from(self.effective_permission(actor, article)?))
    }

    /// Per-source contributions behind the effective permission.
    pub fn explain_permission(
        &self,
        actor: &Actor,
        article: ArticleId,
    ) -> Result<Explanation, StoreError> {
        let facts = grant_facts_tx(&self.conn, actor, &[article])?
            .remove(&article)
            .ok_or(StoreError::UnknownArticle(article))?;
        Ok(self.resolver.explain(actor, &facts))
    }

    /// Every article id the actor reaches at `level`, ascending. Computed as
    /// one set query; trashed articles are included.
    pub fn accessible_article_ids(
        &self,
        actor: &Actor,
        level: AccessLevel,
    ) -> Result<Vec<ArticleId>, StoreError> {
        accessible_ids_tx(&self.conn, actor, level)
    }
}
