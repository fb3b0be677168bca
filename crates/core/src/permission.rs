#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access level granted on an article. Variant order is the ordinal used by
/// "highest wins" merging: `None < Read < Write`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    None,
    Read,
    Write,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "none" => Some(Self::None),
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Read => 1,
            Self::Write => 2,
        }
    }

    pub fn highest(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn allows(self, required: AccessLevel) -> bool {
        self >= required.as_permission()
    }

    pub fn can_view(self) -> bool {
        self.allows(AccessLevel::Read)
    }

    pub fn can_edit(self) -> bool {
        self.allows(AccessLevel::Write)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level an operation or a list query requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Read,
    Write,
}

impl AccessLevel {
    pub fn as_permission(self) -> Permission {
        match self {
            Self::Read => Permission::Read,
            Self::Write => Permission::Write,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.as_permission().as_str()
    }

    /// Stored permission values that satisfy this level.
    pub fn satisfying(self) -> &'static [Permission] {
        match self {
            Self::Read => &[Permission::Read, Permission::Write],
            Self::Write => &[Permission::Write],
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean projection of an effective permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AccessFlags {
    pub can_view: bool,
    pub can_edit: bool,
}

impl From<Permission> for AccessFlags {
    fn from(value: Permission) -> Self {
        Self {
            can_view: value.can_view(),
            can_edit: value.can_edit(),
        }
    }
}
