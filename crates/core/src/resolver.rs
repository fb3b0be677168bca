#![forbid(unsafe_code)]

//! Effective permission of one (article, actor) pair.
//!
//! Grant sources are an ordered list of evaluators and the resolver keeps the
//! highest result. Storage gathers the facts each source needs in one read
//! and hands them over as [`GrantFacts`]; evaluation itself is pure.

use crate::actor::Actor;
use crate::permission::Permission;
use serde::Serialize;

/// Direct (non-inherited) presence of the actor in a view/edit pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectGrant {
    pub edit: bool,
    pub view: bool,
}

impl DirectGrant {
    pub fn permission(self) -> Permission {
        if self.edit {
            Permission::Write
        } else if self.view {
            Permission::Read
        } else {
            Permission::None
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrantFacts {
    /// False for an article that has not been stored yet.
    pub persisted: bool,
    /// Closest ancestor-or-self member grant for the actor's partner.
    pub member: Option<Permission>,
    pub unit: DirectGrant,
    pub user: DirectGrant,
    /// Cached inherited default permission.
    pub inherited: Option<Permission>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    Member,
    OrgUnit,
    User,
    InheritedDefault,
}

impl GrantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::OrgUnit => "org_unit",
            Self::User => "user",
            Self::InheritedDefault => "inherited_default",
        }
    }
}

pub trait GrantSource: Send + Sync {
    fn kind(&self) -> GrantKind;
    fn evaluate(&self, actor: &Actor, facts: &GrantFacts) -> Permission;
}

pub struct MemberGrants;

impl GrantSource for MemberGrants {
    fn kind(&self) -> GrantKind {
        GrantKind::Member
    }

    fn evaluate(&self, _actor: &Actor, facts: &GrantFacts) -> Permission {
        facts.member.unwrap_or(Permission::None)
    }
}

pub struct OrgUnitGrants;

impl GrantSource for OrgUnitGrants {
    fn kind(&self) -> GrantKind {
        GrantKind::OrgUnit
    }

    fn evaluate(&self, actor: &Actor, facts: &GrantFacts) -> Permission {
        if actor.unit_id.is_none() {
            return Permission::None;
        }
        facts.unit.permission()
    }
}

pub struct UserGrants;

impl GrantSource for UserGrants {
    fn kind(&self) -> GrantKind {
        GrantKind::User
    }

    fn evaluate(&self, _actor: &Actor, facts: &GrantFacts) -> Permission {
        facts.user.permission()
    }
}

/// Skipped for external actors. A closest member grant of `none` suppresses
/// this fallback (and only this one).
pub struct InheritedDefault;

impl GrantSource for InheritedDefault {
    fn kind(&self) -> GrantKind {
        GrantKind::InheritedDefault
    }

    fn evaluate(&self, actor: &Actor, facts: &GrantFacts) -> Permission {
        if actor.is_external || facts.member == Some(Permission::None) {
            return Permission::None;
        }
        facts.inherited.unwrap_or(Permission::None)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum Resolution {
    Superuser,
    Transient,
    Sources {
        contributions: Vec<(GrantKind, Permission)>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub permission: Permission,
    pub resolution: Resolution,
}

pub struct PermissionResolver {
    sources: Vec<Box<dyn GrantSource>>,
}

impl Default for PermissionResolver {
    fn default() -> Self {
        Self::with_sources(vec![
            Box::new(MemberGrants),
            Box::new(OrgUnitGrants),
            Box::new(UserGrants),
            Box::new(InheritedDefault),
        ])
    }
}

impl PermissionResolver {
    pub fn with_sources(sources: Vec<Box<dyn GrantSource>>) -> Self {
        Self { sources }
    }

    pub fn kinds(&self) -> Vec<GrantKind> {
        self.sources.iter().map(|source| source.kind()).collect()
    }

    pub fn resolve(&self, actor: &Actor, facts: &GrantFacts) -> Permission {
        self.explain(actor, facts).permission
    }

    pub fn explain(&self, actor: &Actor, facts: &GrantFacts) -> Explanation {
        if actor.is_superuser {
            return Explanation {
                permission: Permission::Write,
                resolution: Resolution::Superuser,
            };
        }
        if !facts.persisted {
            return Explanation {
                permission: Permission::Write,
                resolution: Resolution::Transient,
            };
        }

        let contributions: Vec<(GrantKind, Permission)> = self
            .sources
            .iter()
            .map(|source| (source.kind(), source.evaluate(actor, facts)))
            .collect();
        let permission = contributions
            .iter()
            .map(|(_, permission)| *permission)
            .max()
            .unwrap_or(Permission::None);
        Explanation {
            permission,
            resolution: Resolution::Sources { contributions },
        }
    }
}

/// An article keeps a path to write when its inherited default is write or a
/// direct write member exists.
pub fn has_writer(inherited: Option<Permission>, write_members: usize) -> bool {
    inherited == Some(Permission::Write) || write_members > 0
}
