#![forbid(unsafe_code)]

use crate::ids::{ArticleId, PartnerId, UserId};
use crate::permission::AccessLevel;
use thiserror::Error;

/// Local validation failures. Each one is detected before commit and aborts
/// the surrounding transaction; none of them is transient.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KnowledgeError {
    #[error("article {article} cannot be placed under {ancestor}: this would create a recursive hierarchy")]
    HierarchyCycle {
        article: ArticleId,
        ancestor: ArticleId,
    },

    #[error("user {user} lacks {required} access on article {article}: {reason}")]
    AccessDenied {
        article: ArticleId,
        user: UserId,
        required: AccessLevel,
        reason: &'static str,
    },

    #[error("article {article:?} violates an invariant: {reason}")]
    InvariantViolation {
        article: Option<ArticleId>,
        reason: &'static str,
    },

    #[error("destination placement of article {article} is ambiguous; specify the category")]
    AmbiguousPlacement { article: ArticleId },

    #[error("membership conflict on article {article} (partner={partner:?}): {reason}")]
    MembershipConflict {
        article: ArticleId,
        partner: Option<PartnerId>,
        reason: &'static str,
    },
}

impl KnowledgeError {
    pub fn invariant(article: ArticleId, reason: &'static str) -> Self {
        Self::InvariantViolation {
            article: Some(article),
            reason,
        }
    }
}
