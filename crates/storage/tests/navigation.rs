#![forbid(unsafe_code)]

mod common;

use common::*;
use kb_core::Permission;
use kb_core::ids::ArticleId;
use kb_storage::{CreateArticleRequest, InviteMembersRequest, SidebarRequest, SqliteStore};

fn with_body(store: &mut SqliteStore, title: &str, body: &str) -> ArticleId {
    store
        .create_article(
            &alice(),
            CreateArticleRequest {
                body: Some(body.to_string()),
                ..CreateArticleRequest::titled(title)
            },
        )
        .expect("create")
        .id
}

#[test]
fn search_matches_title_and_body_case_insensitively() {
    let (_dir, mut store) = open_store();
    let roadmap = with_body(
        &mut store,
        "Roadmap",
        "<p>The quarterly plan covers storage, sync and the new permission engine.</p>",
    );
    let notes = with_body(&mut store, "Notes", "<p>Nothing about the ROADMAP here</p>");
    let secret = private_root(&mut store, &alice(), "Roadmap secrets");
    store.toggle_favorite(&bob(), notes).expect("favorite notes");

    let hits = store.search_articles(&bob(), "roadmap", 10).expect("search");
    let ids: Vec<ArticleId> = hits.iter().map(|hit| hit.article_id).collect();
    assert_eq!(ids, vec![notes, roadmap]);
    assert!(!ids.contains(&secret.id));
    assert!(hits[0].is_favorite);
    assert_eq!(hits[0].favorite_count, 1);
    assert!(hits[0].snippet.contains("ROADMAP"));

    let hits = store
        .search_articles(&alice(), "permission", 10)
        .expect("search body");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].article_id, roadmap);
    assert!(hits[0].snippet.contains("permission engine"));
    assert!(!hits[0].snippet.contains('<'));

    assert!(store.search_articles(&guest(), "roadmap", 10).expect("guest").is_empty());
    assert!(store.search_articles(&bob(), "100%", 10).expect("literal").is_empty());
}

#[test]
fn empty_search_lists_favorites() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    root(&mut store, &alice(), "B");
    store.toggle_favorite(&alice(), a.id).expect("favorite");
    let hits = store.search_articles(&alice(), "  ", 10).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].article_id, a.id);
    assert!(hits[0].snippet.is_empty());
}

#[test]
fn sidebar_splits_roots_by_category() {
    let (_dir, mut store) = open_store();
    let w = root(&mut store, &alice(), "W");
    let section = child(&mut store, &alice(), w.id, "section");
    let deep = child(&mut store, &alice(), section.id, "deep");
    store
        .create_article(
            &alice(),
            CreateArticleRequest {
                is_article_item: true,
                ..CreateArticleRequest::titled("item").under(w.id)
            },
        )
        .expect("item");
    let p = private_root(&mut store, &alice(), "P");
    let s = private_root(&mut store, &alice(), "S");
    store
        .invite_members(
            &alice(),
            InviteMembersRequest {
                article_id: s.id,
                partner_ids: vec![bob().partner_id],
                permission: Permission::Read,
            },
        )
        .expect("share");
    store.toggle_favorite(&alice(), s.id).expect("favorite");

    let sidebar = store
        .sidebar(&alice(), SidebarRequest::default())
        .expect("sidebar");
    let ids = |entries: &[kb_storage::SidebarEntry]| {
        entries.iter().map(|entry| entry.article_id).collect::<Vec<_>>()
    };
    assert_eq!(ids(&sidebar.workspace), vec![w.id]);
    assert_eq!(ids(&sidebar.shared), vec![s.id]);
    assert_eq!(ids(&sidebar.private), vec![p.id]);
    assert_eq!(ids(&sidebar.favorites), vec![s.id]);
    assert!(sidebar.children.is_empty());
    assert!(sidebar.workspace[0].has_children);

    let sidebar = store
        .sidebar(
            &alice(),
            SidebarRequest {
                active_article_id: Some(deep.id),
                unfolded_ids: Vec::new(),
            },
        )
        .expect("sidebar with active article");
    assert_eq!(ids(&sidebar.children), vec![section.id, deep.id]);

    let bob_view = store
        .sidebar(&bob(), SidebarRequest::default())
        .expect("bob sidebar");
    assert_eq!(ids(&bob_view.workspace), vec![w.id]);
    assert_eq!(ids(&bob_view.shared), vec![s.id]);
    assert!(bob_view.private.is_empty());
}

#[test]
fn hierarchy_flags_unreadable_ancestors() {
    let (_dir, mut store) = open_store();
    let c = private_root(&mut store, &alice(), "C");
    let b = child(&mut store, &alice(), c.id, "B");
    let leaf = child(&mut store, &alice(), b.id, "leaf");
    store
        .invite_members(
            &alice(),
            InviteMembersRequest {
                article_id: b.id,
                partner_ids: vec![bob().partner_id],
                permission: Permission::Read,
            },
        )
        .expect("invite on B");

    let chain = store.hierarchy(&bob(), leaf.id).expect("hierarchy");
    let flags: Vec<(ArticleId, bool)> = chain
        .iter()
        .map(|entry| (entry.article_id, entry.can_read))
        .collect();
    assert_eq!(flags, vec![(c.id, false), (b.id, true)]);
    assert_eq!(chain[1].title.as_deref(), Some("B"));
}

#[test]
fn children_list_only_readable_active_articles() {
    let (_dir, mut store) = open_store();
    let w = root(&mut store, &alice(), "W");
    let visible = child(&mut store, &alice(), w.id, "visible");
    let hidden = child(&mut store, &alice(), w.id, "hidden");
    let gone = child(&mut store, &alice(), w.id, "gone");
    store
        .invite_members(
            &alice(),
            InviteMembersRequest {
                article_id: hidden.id,
                partner_ids: vec![bob().partner_id],
                permission: Permission::None,
            },
        )
        .expect("hide from bob");
    store.trash_article(&alice(), gone.id).expect("trash");

    let children: Vec<ArticleId> = store
        .list_children(&bob(), Some(w.id))
        .expect("children")
        .into_iter()
        .map(|article| article.id)
        .collect();
    assert_eq!(children, vec![visible.id]);
}
