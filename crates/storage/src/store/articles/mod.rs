#![forbid(unsafe_code)]

mod copy;
mod create;
mod get;
mod move_to;
mod write;

pub(super) use write::write_article_tx;
