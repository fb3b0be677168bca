#![forbid(unsafe_code)]

use kb_core::Permission;
use kb_core::ids::{ArticleId, FavoriteId, MemberId, PartnerId, UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub article_id: ArticleId,
    pub partner_id: PartnerId,
    pub permission: Permission,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InviteOutcome {
    /// Created or upgraded memberships.
    pub changed: Vec<Member>,
    /// Partners whose existing grant was already at or above the level.
    pub unchanged: Vec<PartnerId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Favorite {
    pub id: FavoriteId,
    pub article_id: ArticleId,
    pub user_id: UserId,
    pub sequence: i64,
    pub is_article_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub count: i64,
}
