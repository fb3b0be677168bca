#![forbid(unsafe_code)]

use crate::permission::Permission;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Workspace,
    Shared,
    Private,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Shared => "shared",
            Self::Private => "private",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "workspace" => Some(Self::Workspace),
            "shared" => Some(Self::Shared),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a tree from its root: workspace when the root default grants
/// anything, otherwise shared when more than one root member has access.
///
/// `root_members_with_access` counts root member grants other than `none`.
pub fn categorize(root_default: Option<Permission>, root_members_with_access: usize) -> Category {
    if root_default != Some(Permission::None) {
        Category::Workspace
    } else if root_members_with_access > 1 {
        Category::Shared
    } else {
        Category::Private
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_default_decides_workspace() {
        assert_eq!(categorize(Some(Permission::Write), 0), Category::Workspace);
        assert_eq!(categorize(Some(Permission::Read), 5), Category::Workspace);
    }

    #[test]
    fn member_cardinality_splits_shared_and_private() {
        assert_eq!(categorize(Some(Permission::None), 2), Category::Shared);
        assert_eq!(categorize(Some(Permission::None), 1), Category::Private);
        assert_eq!(categorize(Some(Permission::None), 0), Category::Private);
    }

    #[test]
    fn parse_round_trips() {
        for category in [Category::Workspace, Category::Shared, Category::Private] {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("public"), None);
    }
}
