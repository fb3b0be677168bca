#![forbid(unsafe_code)]

//! Tree invariant engine: parent links, cycle detection, roots, materialized
//! ancestor paths and the inherited default permission.
//!
//! Everything here is pure. The storage layer loads the nodes a mutation can
//! affect, asks [`TreeIndex::derive`] for their derived state and writes the
//! result back in bulk.

use crate::error::KnowledgeError;
use crate::ids::ArticleId;
use crate::permission::Permission;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Structural slice of an article that the derived fields depend on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode {
    pub id: ArticleId,
    pub parent: Option<ArticleId>,
    pub own_permission: Option<Permission>,
    pub desynchronized: bool,
}

/// Inherited default permission and the article it was taken from. `source`
/// is `None` when the article defines its own default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InheritedPermission {
    pub permission: Permission,
    pub source: Option<ArticleId>,
}

impl InheritedPermission {
    pub fn own(permission: Permission) -> Self {
        Self {
            permission,
            source: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedNode {
    pub id: ArticleId,
    /// Root first, excluding the article itself.
    pub ancestors: Vec<ArticleId>,
    pub root: ArticleId,
    pub inherited: InheritedPermission,
}

impl DerivedNode {
    /// Ancestor path with the article appended; index is the depth.
    pub fn path_with_self(&self) -> Vec<ArticleId> {
        let mut path = self.ancestors.clone();
        path.push(self.id);
        path
    }
}

#[derive(Clone, Debug)]
struct Resolved {
    ancestors: Vec<ArticleId>,
    root: ArticleId,
    inherited: InheritedPermission,
}

#[derive(Clone, Debug, Default)]
pub struct TreeIndex {
    nodes: HashMap<ArticleId, TreeNode>,
}

impl TreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = TreeNode>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|node| (node.id, node)).collect(),
        }
    }

    pub fn insert(&mut self, node: TreeNode) -> Option<TreeNode> {
        self.nodes.insert(node.id, node)
    }

    pub fn get(&self, id: ArticleId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ArticleId> + '_ {
        self.nodes.keys().copied()
    }

    fn node(&self, id: ArticleId) -> Result<&TreeNode, KnowledgeError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| KnowledgeError::invariant(id, "article is missing from the hierarchy"))
    }

    /// Ancestors of `id`, root first, excluding `id`. Fails instead of looping
    /// when the parent links contain a cycle.
    pub fn ancestors(&self, id: ArticleId) -> Result<Vec<ArticleId>, KnowledgeError> {
        let mut seen = HashSet::from([id]);
        let mut out = Vec::new();
        let mut cursor = self.node(id)?.parent;
        while let Some(ancestor) = cursor {
            if !seen.insert(ancestor) {
                return Err(KnowledgeError::HierarchyCycle {
                    article: id,
                    ancestor,
                });
            }
            out.push(ancestor);
            cursor = self.node(ancestor)?.parent;
        }
        out.reverse();
        Ok(out)
    }

    pub fn root(&self, id: ArticleId) -> Result<ArticleId, KnowledgeError> {
        Ok(self.ancestors(id)?.first().copied().unwrap_or(id))
    }

    /// Rejects a parent change that would make `article` its own ancestor.
    pub fn ensure_can_reparent(
        &self,
        article: ArticleId,
        new_parent: Option<ArticleId>,
    ) -> Result<(), KnowledgeError> {
        let Some(parent) = new_parent else {
            return Ok(());
        };
        if parent == article {
            return Err(KnowledgeError::HierarchyCycle {
                article,
                ancestor: parent,
            });
        }
        if self.ancestors(parent)?.contains(&article) {
            return Err(KnowledgeError::HierarchyCycle {
                article,
                ancestor: parent,
            });
        }
        Ok(())
    }

    /// Walks up from `id` until an article with its own default permission or
    /// a desynchronized article is found.
    pub fn inherited_permission(
        &self,
        id: ArticleId,
    ) -> Result<InheritedPermission, KnowledgeError> {
        let node = self.node(id)?;
        if let Some(permission) = node.own_permission {
            return Ok(InheritedPermission::own(permission));
        }

        let mut seen = HashSet::from([id]);
        let mut cursor = node.parent;
        while let Some(ancestor_id) = cursor {
            if !seen.insert(ancestor_id) {
                return Err(KnowledgeError::HierarchyCycle {
                    article: id,
                    ancestor: ancestor_id,
                });
            }
            let ancestor = self.node(ancestor_id)?;
            if ancestor.own_permission.is_some() || ancestor.desynchronized {
                return stop_at(ancestor);
            }
            cursor = ancestor.parent;
        }
        Err(KnowledgeError::invariant(
            id,
            "no ancestor defines a default permission",
        ))
    }

    /// Derived state (path, root, inherited default) for every target.
    ///
    /// Targets are grouped by parent and each distinct parent chain is walked
    /// once; intermediate results are memoized so siblings and nested targets
    /// share the work.
    pub fn derive(&self, targets: &[ArticleId]) -> Result<Vec<DerivedNode>, KnowledgeError> {
        let mut groups: BTreeMap<Option<ArticleId>, Vec<ArticleId>> = BTreeMap::new();
        for &id in targets {
            groups.entry(self.node(id)?.parent).or_default().push(id);
        }

        let mut memo: HashMap<ArticleId, Resolved> = HashMap::new();
        let mut out = Vec::with_capacity(targets.len());
        for (parent, members) in groups {
            let parent_state = match parent {
                Some(parent_id) => Some((parent_id, self.resolve(parent_id, &mut memo)?)),
                None => None,
            };
            for id in members {
                let resolved = match memo.get(&id) {
                    Some(done) => done.clone(),
                    None => {
                        let resolved = self.resolve_child(self.node(id)?, parent_state.as_ref())?;
                        memo.insert(id, resolved.clone());
                        resolved
                    }
                };
                out.push(DerivedNode {
                    id,
                    ancestors: resolved.ancestors,
                    root: resolved.root,
                    inherited: resolved.inherited,
                });
            }
        }
        Ok(out)
    }

    fn resolve(
        &self,
        id: ArticleId,
        memo: &mut HashMap<ArticleId, Resolved>,
    ) -> Result<Resolved, KnowledgeError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = id;
        let base = loop {
            if let Some(done) = memo.get(&cursor) {
                break Some((cursor, done.clone()));
            }
            if !seen.insert(cursor) {
                return Err(KnowledgeError::HierarchyCycle {
                    article: id,
                    ancestor: cursor,
                });
            }
            chain.push(cursor);
            match self.node(cursor)?.parent {
                Some(parent) => cursor = parent,
                None => break None,
            }
        };

        let mut parent_state = base;
        for node_id in chain.into_iter().rev() {
            let resolved = self.resolve_child(self.node(node_id)?, parent_state.as_ref())?;
            memo.insert(node_id, resolved.clone());
            parent_state = Some((node_id, resolved));
        }
        match parent_state {
            Some((_, resolved)) => Ok(resolved),
            None => Err(KnowledgeError::invariant(id, "empty ancestor chain")),
        }
    }

    fn resolve_child(
        &self,
        node: &TreeNode,
        parent: Option<&(ArticleId, Resolved)>,
    ) -> Result<Resolved, KnowledgeError> {
        let Some((parent_id, parent_resolved)) = parent else {
            let permission = node.own_permission.ok_or_else(|| {
                KnowledgeError::invariant(node.id, "root article has no default permission")
            })?;
            return Ok(Resolved {
                ancestors: Vec::new(),
                root: node.id,
                inherited: InheritedPermission::own(permission),
            });
        };

        let inherited = match node.own_permission {
            Some(permission) => InheritedPermission::own(permission),
            None => {
                let parent_node = self.node(*parent_id)?;
                if parent_node.own_permission.is_some() || parent_node.desynchronized {
                    stop_at(parent_node)?
                } else {
                    parent_resolved.inherited
                }
            }
        };

        let mut ancestors = Vec::with_capacity(parent_resolved.ancestors.len() + 1);
        ancestors.extend_from_slice(&parent_resolved.ancestors);
        ancestors.push(*parent_id);
        Ok(Resolved {
            ancestors,
            root: parent_resolved.root,
            inherited,
        })
    }

    /// Every article below `id` reachable through the loaded parent links,
    /// breadth first.
    pub fn descendants(&self, id: ArticleId) -> Vec<ArticleId> {
        let mut children: HashMap<ArticleId, Vec<ArticleId>> = HashMap::new();
        for node in self.nodes.values() {
            if let Some(parent) = node.parent {
                children.entry(parent).or_default().push(node.id);
            }
        }
        for list in children.values_mut() {
            list.sort();
        }

        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);
        let mut out = Vec::new();
        while let Some(current) = queue.pop_front() {
            for &child in children.get(&current).map(Vec::as_slice).unwrap_or_default() {
                if seen.insert(child) {
                    out.push(child);
                    queue.push_back(child);
                }
            }
        }
        out
    }
}

fn stop_at(ancestor: &TreeNode) -> Result<InheritedPermission, KnowledgeError> {
    let permission = ancestor.own_permission.ok_or_else(|| {
        KnowledgeError::invariant(
            ancestor.id,
            "desynchronized article has no default permission",
        )
    })?;
    Ok(InheritedPermission {
        permission,
        source: Some(ancestor.id),
    })
}

/// Flags checked against the structural invariants before any row is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArticleShape {
    pub id: Option<ArticleId>,
    pub parent: Option<ArticleId>,
    pub own_permission: Option<Permission>,
    pub desynchronized: bool,
    pub is_item: bool,
    pub active: bool,
    pub trashed: bool,
}

pub fn check_invariants(shape: &ArticleShape) -> Result<(), KnowledgeError> {
    let violation = |reason| KnowledgeError::InvariantViolation {
        article: shape.id,
        reason,
    };
    if shape.parent.is_none() && shape.own_permission.is_none() {
        return Err(violation("root articles must have a default permission"));
    }
    if shape.desynchronized && shape.own_permission.is_none() {
        return Err(violation(
            "desynchronized articles must have a default permission",
        ));
    }
    if shape.parent.is_none() && shape.desynchronized {
        return Err(violation("root articles cannot be desynchronized"));
    }
    if shape.is_item && shape.parent.is_none() {
        return Err(violation("article items must have a parent"));
    }
    if shape.trashed && shape.active {
        return Err(violation("trashed articles must be inactive"));
    }
    if shape.id.is_some() && shape.id == shape.parent {
        return Err(violation("an article cannot be its own parent"));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
