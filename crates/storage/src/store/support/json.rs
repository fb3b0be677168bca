#![forbid(unsafe_code)]

use super::super::StoreError;
use kb_core::ids::ArticleId;

/// JSON array parameter for `json_each` set queries.
pub(in crate::store) fn ids_json(ids: &[ArticleId]) -> Result<String, StoreError> {
    let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
    Ok(serde_json::to_string(&raw)?)
}
