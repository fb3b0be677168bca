#![forbid(unsafe_code)]

mod access_tx;
mod clock;
mod json;
mod members_tx;
mod meta;
mod placement_tx;
mod revisions;
mod rows;
mod schema;
mod sequence_tx;
mod tree_tx;

pub(super) use access_tx::*;
pub(super) use clock::now_ms;
pub(super) use json::*;
pub(super) use members_tx::*;
pub(super) use meta::*;
pub(super) use placement_tx::*;
pub(super) use revisions::*;
pub(super) use rows::*;
pub(super) use schema::migrate_sqlite_schema;
pub(super) use sequence_tx::*;
pub(super) use tree_tx::*;
