#![forbid(unsafe_code)]

use kb_core::ids::{ArticleId, StageId, UserId};
use kb_core::permission::AccessFlags;
use kb_core::{Category, Permission};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq)]
pub struct Article {
    pub id: ArticleId,
    pub revision: i64,
    pub title: Option<String>,
    pub body: String,
    pub icon: Option<String>,
    pub cover_ref: Option<String>,
    pub cover_url: Option<String>,
    pub cover_position: f64,
    pub is_locked: bool,
    pub full_width: bool,
    pub is_published: bool,
    pub share_token: String,
    pub active: bool,
    pub to_delete: bool,
    pub parent_id: Option<ArticleId>,
    pub root_id: ArticleId,
    pub sequence: i64,
    pub is_article_item: bool,
    pub stage_id: Option<StageId>,
    pub internal_permission: Option<Permission>,
    pub is_desynchronized: bool,
    pub inherited_permission: Permission,
    /// `None` when the article defines its own default.
    pub inherited_permission_source: Option<ArticleId>,
    pub category: Category,
    pub version: i64,
    pub last_editor_user_id: Option<UserId>,
    pub last_edited_at_ms: Option<i64>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl Article {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Own default, or the inherited one when the article has none.
    pub fn pinned_default(&self) -> Permission {
        self.internal_permission.unwrap_or(self.inherited_permission)
    }
}

/// Article as seen by one actor.
#[derive(Clone, Debug, PartialEq)]
pub struct ArticleView {
    pub article: Article,
    pub permission: Permission,
    pub flags: AccessFlags,
    pub is_favorite: bool,
    pub favorite_count: i64,
    pub like_count: i64,
    /// Set for trashed articles.
    pub deletion_date: Option<OffsetDateTime>,
}
