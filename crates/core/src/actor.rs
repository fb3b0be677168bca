#![forbid(unsafe_code)]

use crate::ids::{PartnerId, UnitId, UserId};

/// Identity a permission is evaluated for, as supplied by the identity
/// provider. The superuser bypass travels here as an explicit capability; no
/// operation consults ambient state for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub partner_id: PartnerId,
    pub unit_id: Option<UnitId>,
    pub is_superuser: bool,
    pub is_external: bool,
}

impl Actor {
    pub fn internal(user_id: UserId, partner_id: PartnerId) -> Self {
        Self {
            user_id,
            partner_id,
            unit_id: None,
            is_superuser: false,
            is_external: false,
        }
    }

    /// Portal/guest identity: never receives the inherited-default fallback.
    pub fn external(user_id: UserId, partner_id: PartnerId) -> Self {
        Self {
            is_external: true,
            ..Self::internal(user_id, partner_id)
        }
    }

    pub fn superuser(user_id: UserId, partner_id: PartnerId) -> Self {
        Self {
            is_superuser: true,
            ..Self::internal(user_id, partner_id)
        }
    }

    pub fn with_unit(mut self, unit_id: UnitId) -> Self {
        self.unit_id = Some(unit_id);
        self
    }

    pub fn is_internal(&self) -> bool {
        !self.is_external
    }
}
