#![forbid(unsafe_code)]

use kb_core::KnowledgeError;
use kb_core::ids::{ArticleId, FavoriteId, MemberId, StageId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("revision mismatch (expected={expected}, actual={actual})")]
    RevisionMismatch { expected: i64, actual: i64 },
    #[error("unknown article {0}")]
    UnknownArticle(ArticleId),
    #[error("unknown member {0}")]
    UnknownMember(MemberId),
    #[error("unknown favorite {0}")]
    UnknownFavorite(FavoriteId),
    #[error("unknown stage {0}")]
    UnknownStage(StageId),
    #[error("unknown version {version} of article {article}")]
    UnknownVersion { article: ArticleId, version: i64 },
}

impl StoreError {
    /// Domain error behind this failure, if any.
    pub fn knowledge(&self) -> Option<&KnowledgeError> {
        match self {
            Self::Knowledge(err) => Some(err),
            _ => None,
        }
    }

    /// Busy/locked database; the caller may retry the whole operation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Sql(rusqlite::Error::SqliteFailure(code, _))
                if matches!(
                    code.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}
