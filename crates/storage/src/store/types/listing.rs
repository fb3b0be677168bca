#![forbid(unsafe_code)]

use kb_core::Category;
use kb_core::ids::ArticleId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub article_id: ArticleId,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub root_id: ArticleId,
    pub snippet: String,
    pub favorite_count: i64,
    pub is_favorite: bool,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarEntry {
    pub article_id: ArticleId,
    pub parent_id: Option<ArticleId>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub category: Category,
    pub sequence: i64,
    pub is_locked: bool,
    pub has_children: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sidebar {
    pub workspace: Vec<SidebarEntry>,
    pub shared: Vec<SidebarEntry>,
    pub private: Vec<SidebarEntry>,
    pub favorites: Vec<SidebarEntry>,
    /// Children of unfolded articles and of the active article's ancestors.
    pub children: Vec<SidebarEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub article_id: ArticleId,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub can_read: bool,
}
