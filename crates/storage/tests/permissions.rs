#![forbid(unsafe_code)]

mod common;

use common::*;
use kb_core::ids::{ArticleId, PartnerId, UnitId};
use kb_core::resolver::{GrantKind, Resolution};
use kb_core::{AccessLevel, Category, KnowledgeError, Permission};
use kb_storage::{CreateArticleRequest, DirectGrants, InviteMembersRequest, StoreError};

fn invite(
    store: &mut kb_storage::SqliteStore,
    article: ArticleId,
    partner: PartnerId,
    permission: Permission,
) {
    store
        .invite_members(
            &alice(),
            InviteMembersRequest {
                article_id: article,
                partner_ids: vec![partner],
                permission,
            },
        )
        .expect("invite");
}

#[test]
fn workspace_child_inherits_the_root_default() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = child(&mut store, &alice(), a.id, "B");

    assert_eq!(a.internal_permission, Some(Permission::Write));
    assert_eq!(b.internal_permission, None);
    assert_eq!(b.inherited_permission, Permission::Write);
    assert_eq!(b.inherited_permission_source, Some(a.id));
    assert_eq!(b.root_id, a.id);
    assert_eq!(a.category, Category::Workspace);
    assert_eq!(b.category, Category::Workspace);
    assert_eq!(
        store.effective_permission(&bob(), b.id).expect("bob on B"),
        Permission::Write
    );
}

#[test]
fn root_without_default_needs_a_writer() {
    let (_dir, mut store) = open_store();
    let err = store
        .create_article(
            &alice(),
            CreateArticleRequest::titled("Locked out").with_permission(Permission::None),
        )
        .expect_err("no writer");
    match err {
        StoreError::Knowledge(KnowledgeError::InvariantViolation { .. }) => {}
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(
        store
            .accessible_article_ids(&admin(), AccessLevel::Read)
            .expect("ids")
            .is_empty()
    );
}

#[test]
fn private_root_becomes_shared_with_a_second_member() {
    let (_dir, mut store) = open_store();
    let c = private_root(&mut store, &alice(), "C");
    let nested = child(&mut store, &alice(), c.id, "notes");
    assert_eq!(c.category, Category::Private);
    assert_eq!(
        store.effective_permission(&bob(), c.id).expect("bob on C"),
        Permission::None
    );

    invite(&mut store, c.id, bob().partner_id, Permission::Read);

    assert_eq!(reload(&store, c.id).category, Category::Shared);
    assert_eq!(reload(&store, nested.id).category, Category::Shared);
    assert_eq!(
        store.effective_permission(&alice(), c.id).expect("alice on C"),
        Permission::Write
    );
    assert_eq!(
        store.effective_permission(&bob(), nested.id).expect("bob on child"),
        Permission::Read
    );
    assert_eq!(
        store.effective_permission(&carol(), nested.id).expect("carol on child"),
        Permission::None
    );
}

#[test]
fn desynchronized_child_keeps_its_default() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let b = child(&mut store, &alice(), a.id, "B");
    let d = child(&mut store, &alice(), a.id, "D");
    let d = store.desynchronize(&alice(), d.id).expect("desynchronize");
    assert!(d.is_desynchronized);
    assert_eq!(d.internal_permission, Some(Permission::Write));

    invite(&mut store, a.id, alice().partner_id, Permission::Write);
    store
        .set_default_permission(&alice(), a.id, Permission::Read)
        .expect("downgrade root");

    let b = reload(&store, b.id);
    let d = reload(&store, d.id);
    assert_eq!(b.inherited_permission, Permission::Read);
    assert_eq!(d.inherited_permission, Permission::Write);
    assert_eq!(d.inherited_permission_source, None);
    assert_eq!(
        store.effective_permission(&bob(), b.id).expect("bob on B"),
        Permission::Read
    );
    assert_eq!(
        store.effective_permission(&bob(), d.id).expect("bob on D"),
        Permission::Write
    );

    let d = store.resynchronize(&alice(), d.id).expect("resynchronize");
    assert!(!d.is_desynchronized);
    assert_eq!(d.inherited_permission, Permission::Read);
}

#[test]
fn grandchild_stops_at_the_desynchronized_ancestor() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let d = child(&mut store, &alice(), a.id, "D");
    invite(&mut store, a.id, alice().partner_id, Permission::Write);
    store
        .set_default_permission(&alice(), d.id, Permission::Read)
        .expect("pin D");
    let leaf = child(&mut store, &alice(), d.id, "leaf");
    assert_eq!(leaf.inherited_permission, Permission::Read);
    assert_eq!(leaf.inherited_permission_source, Some(d.id));
}

#[test]
fn closest_member_grant_wins() {
    let (_dir, mut store) = open_store();
    let r = private_root(&mut store, &alice(), "R");
    let k = child(&mut store, &alice(), r.id, "K");
    invite(&mut store, r.id, bob().partner_id, Permission::Read);
    invite(&mut store, k.id, bob().partner_id, Permission::Write);

    assert_eq!(
        store.effective_permission(&bob(), r.id).expect("bob on R"),
        Permission::Read
    );
    assert_eq!(
        store.effective_permission(&bob(), k.id).expect("bob on K"),
        Permission::Write
    );

    let explanation = store.explain_permission(&bob(), k.id).expect("explain");
    assert_eq!(explanation.permission, Permission::Write);
    match explanation.resolution {
        Resolution::Sources { contributions } => {
            assert!(contributions.contains(&(GrantKind::Member, Permission::Write)));
            assert!(contributions.contains(&(GrantKind::InheritedDefault, Permission::None)));
        }
        other => panic!("unexpected resolution: {other:?}"),
    }
}

#[test]
fn member_none_only_suppresses_the_inherited_default() {
    let (_dir, mut store) = open_store();
    let w = root(&mut store, &alice(), "W");
    let hidden = child(&mut store, &alice(), w.id, "hidden");
    invite(&mut store, hidden.id, bob().partner_id, Permission::None);

    assert_eq!(
        store.effective_permission(&bob(), w.id).expect("bob on W"),
        Permission::Write
    );
    assert_eq!(
        store.effective_permission(&bob(), hidden.id).expect("bob on hidden"),
        Permission::None
    );
    let readable = store
        .accessible_article_ids(&bob(), AccessLevel::Read)
        .expect("bob read set");
    assert!(readable.contains(&w.id));
    assert!(!readable.contains(&hidden.id));

    store
        .set_direct_grants(
            &alice(),
            hidden.id,
            DirectGrants {
                edit_units: vec![UnitId::new(7)],
                ..DirectGrants::default()
            },
        )
        .expect("unit grant");
    assert_eq!(
        store
            .effective_permission(&bob_in_unit(7), hidden.id)
            .expect("bob in unit"),
        Permission::Write
    );
    assert_eq!(
        store
            .effective_permission(&bob_in_unit(8), hidden.id)
            .expect("bob in other unit"),
        Permission::None
    );
    let writable = store
        .accessible_article_ids(&bob_in_unit(7), AccessLevel::Write)
        .expect("write set");
    assert!(writable.contains(&hidden.id));
}

#[test]
fn user_grants_are_direct_only() {
    let (_dir, mut store) = open_store();
    let c = private_root(&mut store, &alice(), "C");
    let below = child(&mut store, &alice(), c.id, "below");
    let grants = store
        .set_direct_grants(
            &alice(),
            c.id,
            DirectGrants {
                view_users: vec![bob().user_id],
                ..DirectGrants::default()
            },
        )
        .expect("user grant");
    assert_eq!(grants.view_users, vec![bob().user_id]);
    assert_eq!(
        store.effective_permission(&bob(), c.id).expect("bob on C"),
        Permission::Read
    );
    assert_eq!(
        store.effective_permission(&bob(), below.id).expect("bob below"),
        Permission::None
    );
}

#[test]
fn external_actors_never_fall_back_to_the_default() {
    let (_dir, mut store) = open_store();
    let w = root(&mut store, &alice(), "W");
    assert_eq!(
        store.effective_permission(&guest(), w.id).expect("guest on W"),
        Permission::None
    );
    invite(&mut store, w.id, guest().partner_id, Permission::Read);
    assert_eq!(
        store.effective_permission(&guest(), w.id).expect("guest on W"),
        Permission::Read
    );
    let flags = store.access_flags(&guest(), w.id).expect("flags");
    assert!(flags.can_view);
    assert!(!flags.can_edit);
}

#[test]
fn superuser_bypasses_every_grant() {
    let (_dir, mut store) = open_store();
    let p = private_root(&mut store, &alice(), "P");
    assert_eq!(
        store.effective_permission(&admin(), p.id).expect("admin on P"),
        Permission::Write
    );
    let explanation = store.explain_permission(&admin(), p.id).expect("explain");
    assert_eq!(explanation.resolution, Resolution::Superuser);
}

#[test]
fn access_set_matches_the_resolver() {
    let (_dir, mut store) = open_store();
    let w = root(&mut store, &alice(), "W");
    let w1 = child(&mut store, &alice(), w.id, "W1");
    let w2 = child(&mut store, &alice(), w1.id, "W2");
    let p = private_root(&mut store, &alice(), "P");
    let p1 = child(&mut store, &alice(), p.id, "P1");
    let s = private_root(&mut store, &alice(), "S");
    invite(&mut store, s.id, bob().partner_id, Permission::Read);
    invite(&mut store, w1.id, bob().partner_id, Permission::None);
    invite(&mut store, p1.id, carol().partner_id, Permission::Write);
    invite(&mut store, w.id, alice().partner_id, Permission::Write);
    store
        .set_default_permission(&alice(), w2.id, Permission::Read)
        .expect("pin W2");
    store
        .set_direct_grants(
            &alice(),
            p.id,
            DirectGrants {
                view_units: vec![UnitId::new(7)],
                ..DirectGrants::default()
            },
        )
        .expect("unit grant");
    let all = [w.id, w1.id, w2.id, p.id, p1.id, s.id];

    for actor in [alice(), bob(), bob_in_unit(7), carol(), guest(), admin()] {
        let permissions = store.effective_permissions(&actor, &all).expect("batch");
        for level in [AccessLevel::Read, AccessLevel::Write] {
            let mut expected: Vec<ArticleId> = all
                .iter()
                .copied()
                .filter(|id| permissions[id].allows(level))
                .collect();
            expected.sort();
            let actual = store
                .accessible_article_ids(&actor, level)
                .expect("access set");
            assert_eq!(actual, expected, "actor {actor:?} at {level}");
        }
    }
}

#[test]
fn pinning_a_default_without_any_writer_is_rejected() {
    let (_dir, mut store) = open_store();
    let a = root(&mut store, &alice(), "A");
    let d = child(&mut store, &alice(), a.id, "D");
    let err = store
        .set_default_permission(&alice(), d.id, Permission::Read)
        .expect_err("nobody could write D");
    match err {
        StoreError::Knowledge(KnowledgeError::InvariantViolation { article, .. }) => {
            assert_eq!(article, Some(d.id));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let d = reload(&store, d.id);
    assert!(!d.is_desynchronized);
    assert_eq!(d.inherited_permission, Permission::Write);
}

#[test]
fn adding_a_grant_never_lowers_a_permission() {
    let (_dir, mut store) = open_store();
    let w = root(&mut store, &alice(), "W");
    let before = store.effective_permission(&bob(), w.id).expect("before");
    invite(&mut store, w.id, bob().partner_id, Permission::Read);
    let after = store.effective_permission(&bob(), w.id).expect("after");
    assert!(after >= before);
    assert_eq!(after, Permission::Write);
}

#[test]
fn writing_needs_write_access() {
    let (_dir, mut store) = open_store();
    let c = private_root(&mut store, &alice(), "C");
    invite(&mut store, c.id, bob().partner_id, Permission::Read);
    let err = store
        .create_article(&bob(), CreateArticleRequest::titled("sneaky").under(c.id))
        .expect_err("bob only reads");
    match err {
        StoreError::Knowledge(KnowledgeError::AccessDenied {
            article, required, ..
        }) => {
            assert_eq!(article, c.id);
            assert_eq!(required, AccessLevel::Write);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
