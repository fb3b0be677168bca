#![forbid(unsafe_code)]

//! SQLite persistence for the knowledge base: articles, grants and the
//! derived hierarchy/permission columns kept consistent on every write.

mod store;

pub use store::*;
