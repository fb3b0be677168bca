#![forbid(unsafe_code)]

use kb_core::ids::{ArticleId, FavoriteId, MemberId, PartnerId, StageId, UnitId, UserId};
use kb_core::{Category, Permission};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    /// Defaults to a heading with the title.
    pub body: Option<String>,
    pub parent_id: Option<ArticleId>,
    /// Roots default to write.
    pub internal_permission: Option<Permission>,
    /// Private root: default none and the creator as the only (write) member.
    pub is_private: bool,
    pub is_article_item: bool,
    pub sequence: Option<i64>,
    pub icon: Option<String>,
    pub stage_id: Option<StageId>,
}

impl CreateArticleRequest {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn under(mut self, parent: ArticleId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.internal_permission = Some(permission);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoverPatch {
    pub cover_ref: Option<String>,
    pub cover_url: Option<String>,
    pub position: Option<f64>,
}

/// Partial update; `None` leaves a field untouched. Doubly optional fields
/// use `Some(None)` to clear.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteArticleRequest {
    pub article_id: ArticleId,
    pub expected_revision: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<Option<String>>,
    pub cover: Option<CoverPatch>,
    pub is_locked: Option<bool>,
    pub full_width: Option<bool>,
    pub is_published: Option<bool>,
    pub parent_id: Option<Option<ArticleId>>,
    pub sequence: Option<i64>,
    pub is_article_item: Option<bool>,
    pub stage_id: Option<Option<StageId>>,
}

impl WriteArticleRequest {
    pub fn new(article_id: ArticleId) -> Self {
        Self {
            article_id,
            expected_revision: None,
            title: None,
            body: None,
            icon: None,
            cover: None,
            is_locked: None,
            full_width: None,
            is_published: None,
            parent_id: None,
            sequence: None,
            is_article_item: None,
            stage_id: None,
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn parent(mut self, parent: Option<ArticleId>) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn sequence(mut self, sequence: i64) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveArticleRequest {
    pub article_id: ArticleId,
    /// `None` moves the article to the root level.
    pub parent_id: Option<ArticleId>,
    pub before_article_id: Option<ArticleId>,
    pub category: Option<Category>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InviteMembersRequest {
    pub article_id: ArticleId,
    pub partner_ids: Vec<PartnerId>,
    pub permission: Permission,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberPatch {
    pub member_id: MemberId,
    pub article_id: Option<ArticleId>,
    pub partner_id: Option<PartnerId>,
    pub permission: Option<Permission>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FavoritePatch {
    pub favorite_id: FavoriteId,
    pub article_id: Option<ArticleId>,
    pub user_id: Option<UserId>,
    pub sequence: Option<i64>,
}

/// Replacement for the four direct grant sets of one article.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectGrants {
    pub view_units: Vec<UnitId>,
    pub edit_units: Vec<UnitId>,
    pub view_users: Vec<UserId>,
    pub edit_users: Vec<UserId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateStageRequest {
    pub parent_id: ArticleId,
    pub name: String,
    /// Defaults to 10.
    pub sequence: Option<i64>,
    pub fold: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SidebarRequest {
    pub active_article_id: Option<ArticleId>,
    pub unfolded_ids: Vec<ArticleId>,
}
