#![forbid(unsafe_code)]

mod common;

use common::*;
use kb_core::ids::ArticleId;
use kb_core::{Category, KnowledgeError, Permission};
use kb_storage::{CreateArticleRequest, MoveArticleRequest, StoreError, WriteArticleRequest};
use rusqlite::{Connection, params};

fn move_request(article: ArticleId, parent: Option<ArticleId>) -> MoveArticleRequest {
    MoveArticleRequest {
        article_id: article,
        parent_id: parent,
        before_article_id: None,
        category: None,
    }
}

fn sibling_order(store: &kb_storage::SqliteStore, parent: ArticleId) -> Vec<(ArticleId, i64)> {
    store
        .list_children(&alice(), Some(parent))
        .expect("children")
        .into_iter()
        .map(|article| (article.id, article.sequence))
        .collect()
}

#[test]
fn ancestors_are_root_first_and_exclude_the_article() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = child(&mut store, &alice(), a.id, "B");
    let c = child(&mut store, &alice(), b.id, "C");

    let ancestors = store.resolve_ancestors(c.id).expect("ancestors");
    assert_eq!(ancestors, vec![a.id, b.id]);
    assert!(!ancestors.contains(&c.id));
    assert_eq!(store.materialized_path(c.id).expect("path"), ancestors);
    assert!(store.resolve_ancestors(a.id).expect("root").is_empty());

    assert_eq!(c.root_id, a.id);
    assert_eq!(reload(&store, c.root_id).root_id, a.id);
}

#[test]
fn moving_under_a_descendant_is_a_cycle() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = child(&mut store, &alice(), a.id, "B");
    let c = child(&mut store, &alice(), b.id, "C");

    let err = store
        .move_article(&alice(), move_request(a.id, Some(c.id)))
        .expect_err("cycle");
    match err {
        StoreError::Knowledge(KnowledgeError::HierarchyCycle { article, .. }) => {
            assert_eq!(article, a.id);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = store
        .write_article(&alice(), WriteArticleRequest::new(b.id).parent(Some(b.id)))
        .expect_err("self parent");
    assert!(matches!(
        err.knowledge(),
        Some(KnowledgeError::HierarchyCycle { .. })
    ));

    let a = reload(&store, a.id);
    assert_eq!(a.parent_id, None);
    assert_eq!(a.internal_permission, Some(Permission::Write));
    assert_eq!(store.resolve_ancestors(c.id).expect("ancestors"), vec![a.id, b.id]);
}

#[test]
fn corrupted_parent_links_fail_instead_of_looping() {
    let (dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = child(&mut store, &alice(), a.id, "B");

    let raw = Connection::open(dir.path().join("knowledge.db")).expect("raw connection");
    raw.execute(
        "UPDATE articles SET parent_id=?2 WHERE id=?1",
        params![a.id.get(), b.id.get()],
    )
    .expect("corrupt");

    let err = store.resolve_ancestors(b.id).expect_err("cycle");
    assert!(matches!(
        err.knowledge(),
        Some(KnowledgeError::HierarchyCycle { .. })
    ));
    let err = store.rebuild_derived_state().expect_err("rebuild sees the cycle");
    assert!(matches!(
        err.knowledge(),
        Some(KnowledgeError::HierarchyCycle { .. })
    ));
}

#[test]
fn appended_siblings_are_numbered_from_zero() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let ids: Vec<ArticleId> = (0..4)
        .map(|n| child(&mut store, &alice(), a.id, &format!("s{n}")).id)
        .collect();

    assert_eq!(
        sibling_order(&store, a.id),
        ids.iter().copied().zip(0_i64..).collect::<Vec<_>>()
    );
}

#[test]
fn batch_creation_appends_per_parent() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = root(&mut store, &alice(), "B");
    let first = child(&mut store, &alice(), a.id, "a0");

    let created = store
        .create_articles(
            &alice(),
            vec![
                CreateArticleRequest::titled("a1").under(a.id),
                CreateArticleRequest::titled("b0").under(b.id),
                CreateArticleRequest::titled("a2").under(a.id),
            ],
        )
        .expect("batch");
    let sequences: Vec<i64> = created.iter().map(|article| article.sequence).collect();
    assert_eq!(sequences, vec![1, 0, 2]);
    assert_eq!(
        sibling_order(&store, a.id),
        vec![(first.id, 0), (created[0].id, 1), (created[2].id, 2)]
    );
}

#[test]
fn explicit_sequence_resequences_the_tail() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let s: Vec<ArticleId> = (0..4)
        .map(|n| child(&mut store, &alice(), a.id, &format!("s{n}")).id)
        .collect();

    let inserted = store
        .create_article(
            &alice(),
            CreateArticleRequest {
                sequence: Some(1),
                ..CreateArticleRequest::titled("inserted").under(a.id)
            },
        )
        .expect("insert at 1");

    assert_eq!(
        sibling_order(&store, a.id),
        vec![
            (s[0], 0),
            (inserted.id, 1),
            (s[1], 2),
            (s[2], 3),
            (s[3], 4)
        ]
    );
}

#[test]
fn move_before_a_sibling_takes_its_place() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let s: Vec<ArticleId> = (0..4)
        .map(|n| child(&mut store, &alice(), a.id, &format!("s{n}")).id)
        .collect();

    store
        .move_article(
            &alice(),
            MoveArticleRequest {
                before_article_id: Some(s[1]),
                ..move_request(s[3], Some(a.id))
            },
        )
        .expect("move before s1");

    assert_eq!(
        sibling_order(&store, a.id),
        vec![(s[0], 0), (s[3], 1), (s[1], 2), (s[2], 3)]
    );
}

#[test]
fn reparent_appends_and_refreshes_the_subtree() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let target = private_root(&mut store, &alice(), "Target");
    let existing = child(&mut store, &alice(), target.id, "existing");
    let b = child(&mut store, &alice(), a.id, "B");
    let leaf = child(&mut store, &alice(), b.id, "leaf");

    let moved = store
        .move_article(&alice(), move_request(b.id, Some(target.id)))
        .expect("move");
    assert_eq!(moved.parent_id, Some(target.id));
    assert_eq!(moved.sequence, existing.sequence + 1);

    let leaf = reload(&store, leaf.id);
    assert_eq!(leaf.root_id, target.id);
    assert_eq!(leaf.category, Category::Private);
    assert_eq!(leaf.inherited_permission, Permission::None);
    assert_eq!(leaf.inherited_permission_source, Some(target.id));
    assert_eq!(
        store.resolve_ancestors(leaf.id).expect("ancestors"),
        vec![target.id, b.id]
    );
    assert_eq!(
        store.effective_permission(&bob(), leaf.id).expect("bob"),
        Permission::None
    );
}

#[test]
fn moving_a_root_under_a_parent_drops_its_default() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let other = root(&mut store, &alice(), "Other");
    let moved = store
        .move_article(&alice(), move_request(other.id, Some(a.id)))
        .expect("move root");
    assert_eq!(moved.internal_permission, None);
    assert!(!moved.is_desynchronized);
    assert_eq!(moved.inherited_permission_source, Some(a.id));
}

#[test]
fn move_to_private_root_keeps_only_the_actor() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = child(&mut store, &alice(), a.id, "B");
    store
        .invite_members(
            &alice(),
            kb_storage::InviteMembersRequest {
                article_id: b.id,
                partner_ids: vec![bob().partner_id],
                permission: Permission::Write,
            },
        )
        .expect("invite bob");

    let moved = store
        .move_article(
            &alice(),
            MoveArticleRequest {
                category: Some(Category::Private),
                ..move_request(b.id, None)
            },
        )
        .expect("make private");
    assert_eq!(moved.parent_id, None);
    assert_eq!(moved.internal_permission, Some(Permission::None));
    assert_eq!(moved.category, Category::Private);

    let members = store.list_members(&alice(), b.id).expect("members");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].partner_id, alice().partner_id);
    assert_eq!(members[0].permission, Permission::Write);
    assert_eq!(
        store.effective_permission(&bob(), b.id).expect("bob"),
        Permission::None
    );
}

#[test]
fn move_to_root_as_shared_pins_the_inherited_default() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = child(&mut store, &alice(), a.id, "B");
    let moved = store
        .move_article(
            &alice(),
            MoveArticleRequest {
                category: Some(Category::Shared),
                ..move_request(b.id, None)
            },
        )
        .expect("move to root");
    assert_eq!(moved.internal_permission, Some(Permission::Write));
    assert!(!moved.is_desynchronized);
    assert_eq!(moved.root_id, b.id);
}

#[test]
fn move_without_category_is_ambiguous() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = child(&mut store, &alice(), a.id, "B");
    let err = store
        .move_article(&alice(), move_request(b.id, None))
        .expect_err("ambiguous");
    match err {
        StoreError::Knowledge(KnowledgeError::AmbiguousPlacement { article }) => {
            assert_eq!(article, b.id);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rebuild_repairs_derived_columns() {
    let (dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = child(&mut store, &alice(), a.id, "B");
    let c = child(&mut store, &alice(), b.id, "C");
    let p = private_root(&mut store, &alice(), "P");

    let raw = Connection::open(dir.path().join("knowledge.db")).expect("raw connection");
    raw.execute_batch(
        "DELETE FROM article_paths; \
         UPDATE articles SET root_id = id, inherited_permission = 'none', category = 'private';",
    )
    .expect("damage derived state");

    let report = store.rebuild_derived_state().expect("rebuild");
    assert_eq!(report.articles, 4);
    assert_eq!(report.roots, 2);

    let c = reload(&store, c.id);
    assert_eq!(c.root_id, a.id);
    assert_eq!(c.inherited_permission, Permission::Write);
    assert_eq!(c.inherited_permission_source, Some(a.id));
    assert_eq!(c.category, Category::Workspace);
    assert_eq!(store.materialized_path(c.id).expect("path"), vec![a.id, b.id]);
    assert_eq!(reload(&store, p.id).category, Category::Private);
}

#[test]
fn article_items_need_a_parent() {
    let (_dir, mut store) = open_store();
    let err = store
        .create_article(
            &alice(),
            CreateArticleRequest {
                is_article_item: true,
                ..CreateArticleRequest::titled("loose item")
            },
        )
        .expect_err("item without parent");
    assert!(matches!(
        err.knowledge(),
        Some(KnowledgeError::InvariantViolation { .. })
    ));
}
