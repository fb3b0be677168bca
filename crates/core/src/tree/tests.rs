use super::*;

fn id(value: i64) -> ArticleId {
    ArticleId::new(value)
}

fn node(value: i64, parent: Option<i64>, own: Option<Permission>) -> TreeNode {
    TreeNode {
        id: id(value),
        parent: parent.map(id),
        own_permission: own,
        desynchronized: false,
    }
}

fn desync(value: i64, parent: i64, own: Permission) -> TreeNode {
    TreeNode {
        desynchronized: true,
        ..node(value, Some(parent), Some(own))
    }
}

/// 1 (write) -> 2 -> 3 -> 4, plus 5 under 1.
fn chain() -> TreeIndex {
    TreeIndex::from_nodes([
        node(1, None, Some(Permission::Write)),
        node(2, Some(1), None),
        node(3, Some(2), None),
        node(4, Some(3), None),
        node(5, Some(1), None),
    ])
}

#[test]
fn ancestors_are_root_first_and_exclude_self() {
    let tree = chain();
    assert_eq!(tree.ancestors(id(4)).unwrap(), vec![id(1), id(2), id(3)]);
    assert!(tree.ancestors(id(1)).unwrap().is_empty());
    assert!(!tree.ancestors(id(4)).unwrap().contains(&id(4)));
}

#[test]
fn root_is_idempotent() {
    let tree = chain();
    for article in [1, 2, 3, 4, 5] {
        let root = tree.root(id(article)).unwrap();
        assert_eq!(root, id(1));
        assert_eq!(tree.root(root).unwrap(), root);
    }
}

#[test]
fn walks_fail_on_cycles_instead_of_looping() {
    let tree = TreeIndex::from_nodes([
        node(1, Some(3), Some(Permission::Write)),
        node(2, Some(1), None),
        node(3, Some(2), None),
    ]);
    match tree.ancestors(id(2)).unwrap_err() {
        KnowledgeError::HierarchyCycle { article, .. } => assert_eq!(article, id(2)),
        other => panic!("expected cycle, got {other:?}"),
    }
    assert!(matches!(
        tree.inherited_permission(id(2)),
        Err(KnowledgeError::HierarchyCycle { .. })
    ));
    assert!(matches!(
        tree.derive(&[id(2)]),
        Err(KnowledgeError::HierarchyCycle { .. })
    ));
}

#[test]
fn reparent_under_self_or_descendant_is_rejected() {
    let tree = chain();
    for target in [2, 3, 4] {
        match tree.ensure_can_reparent(id(2), Some(id(target))).unwrap_err() {
            KnowledgeError::HierarchyCycle { article, ancestor } => {
                assert_eq!(article, id(2));
                assert_eq!(ancestor, id(target));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }
    tree.ensure_can_reparent(id(4), Some(id(5))).unwrap();
    tree.ensure_can_reparent(id(2), None).unwrap();
}

#[test]
fn inherited_permission_records_its_source() {
    let tree = chain();
    assert_eq!(
        tree.inherited_permission(id(4)).unwrap(),
        InheritedPermission {
            permission: Permission::Write,
            source: Some(id(1)),
        }
    );
    assert_eq!(
        tree.inherited_permission(id(1)).unwrap(),
        InheritedPermission::own(Permission::Write)
    );
}

#[test]
fn desynchronized_ancestor_stops_the_walk() {
    let tree = TreeIndex::from_nodes([
        node(1, None, Some(Permission::Read)),
        desync(2, 1, Permission::Write),
        node(3, Some(2), None),
    ]);
    let inherited = tree.inherited_permission(id(3)).unwrap();
    assert_eq!(inherited.permission, Permission::Write);
    assert_eq!(inherited.source, Some(id(2)));
}

#[test]
fn derive_agrees_with_the_walk_for_every_node() {
    let tree = TreeIndex::from_nodes([
        node(1, None, Some(Permission::Read)),
        node(2, Some(1), None),
        desync(3, 2, Permission::None),
        node(4, Some(3), None),
        node(5, Some(4), None),
        node(6, Some(1), Some(Permission::Write)),
        node(7, Some(6), None),
        node(10, None, Some(Permission::Write)),
        node(11, Some(10), None),
    ]);
    let targets: Vec<ArticleId> = [5, 4, 3, 2, 1, 7, 6, 11, 10].map(id).to_vec();
    let derived = tree.derive(&targets).unwrap();
    assert_eq!(derived.len(), targets.len());
    for item in derived {
        assert_eq!(item.ancestors, tree.ancestors(item.id).unwrap());
        assert_eq!(item.root, tree.root(item.id).unwrap());
        assert_eq!(item.inherited, tree.inherited_permission(item.id).unwrap());
        assert_eq!(item.path_with_self().last(), Some(&item.id));
    }
}

#[test]
fn parentless_node_without_default_is_an_invariant_violation() {
    let tree = TreeIndex::from_nodes([node(1, None, None), node(2, Some(1), None)]);
    assert!(matches!(
        tree.inherited_permission(id(2)),
        Err(KnowledgeError::InvariantViolation { .. })
    ));
    assert!(matches!(
        tree.derive(&[id(2)]),
        Err(KnowledgeError::InvariantViolation { .. })
    ));
}

#[test]
fn descendants_are_breadth_first() {
    let tree = chain();
    assert_eq!(tree.descendants(id(1)), vec![id(2), id(5), id(3), id(4)]);
    assert!(tree.descendants(id(4)).is_empty());
}

#[test]
fn shape_checks_cover_structural_invariants() {
    let base = ArticleShape {
        id: Some(id(1)),
        parent: None,
        own_permission: Some(Permission::Write),
        desynchronized: false,
        is_item: false,
        active: true,
        trashed: false,
    };
    check_invariants(&base).unwrap();

    let cases = [
        ArticleShape {
            own_permission: None,
            ..base
        },
        ArticleShape {
            desynchronized: true,
            ..base
        },
        ArticleShape {
            is_item: true,
            ..base
        },
        ArticleShape {
            trashed: true,
            ..base
        },
        ArticleShape {
            parent: Some(id(1)),
            ..base
        },
        ArticleShape {
            parent: Some(id(2)),
            own_permission: None,
            desynchronized: true,
            ..base
        },
    ];
    for shape in cases {
        assert!(
            matches!(
                check_invariants(&shape),
                Err(KnowledgeError::InvariantViolation { .. })
            ),
            "{shape:?} should be rejected"
        );
    }

    check_invariants(&ArticleShape {
        parent: Some(id(2)),
        own_permission: None,
        is_item: true,
        active: false,
        trashed: true,
        ..base
    })
    .unwrap();
}
