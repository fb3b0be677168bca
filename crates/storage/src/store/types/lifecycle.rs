#![forbid(unsafe_code)]

use kb_core::ids::{ArticleId, StageId, UserId};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Version {
    pub article_id: ArticleId,
    pub version_number: i64,
    pub body: String,
    pub author_user_id: Option<UserId>,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stage {
    pub id: StageId,
    pub parent_id: ArticleId,
    pub name: String,
    pub sequence: i64,
    pub fold: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrashEntry {
    pub article_id: ArticleId,
    pub title: Option<String>,
    pub updated_at_ms: i64,
    pub deletion_at_ms: i64,
    pub deletion_date: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepReport {
    pub cutoff_ms: i64,
    /// Claimed articles; their trashed descendants go with them.
    pub deleted: Vec<ArticleId>,
    /// Active descendants of claimed articles, lifted to the root level
    /// before the delete.
    pub rescued: Vec<ArticleId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebuildReport {
    pub articles: usize,
    pub roots: usize,
}
