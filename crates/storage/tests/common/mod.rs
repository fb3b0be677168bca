#![forbid(unsafe_code)]
#![allow(dead_code)]

use kb_core::Actor;
use kb_core::ids::{ArticleId, PartnerId, UnitId, UserId};
use kb_storage::{Article, CreateArticleRequest, SqliteStore};
use tempfile::TempDir;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Store in a fresh directory; the directory lives as long as the guard.
pub fn open_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    (dir, store)
}

pub fn alice() -> Actor {
    Actor::internal(UserId::new(1), PartnerId::new(101))
}

pub fn bob() -> Actor {
    Actor::internal(UserId::new(2), PartnerId::new(102))
}

pub fn carol() -> Actor {
    Actor::internal(UserId::new(3), PartnerId::new(103))
}

pub fn bob_in_unit(unit: i64) -> Actor {
    bob().with_unit(UnitId::new(unit))
}

pub fn guest() -> Actor {
    Actor::external(UserId::new(9), PartnerId::new(109))
}

pub fn admin() -> Actor {
    Actor::superuser(UserId::new(99), PartnerId::new(199))
}

pub fn now_ms() -> i64 {
    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).expect("timestamp fits in i64")
}

pub fn root(store: &mut SqliteStore, actor: &Actor, title: &str) -> Article {
    store
        .create_article(actor, CreateArticleRequest::titled(title))
        .expect("create root")
}

pub fn child(store: &mut SqliteStore, actor: &Actor, parent: ArticleId, title: &str) -> Article {
    store
        .create_article(actor, CreateArticleRequest::titled(title).under(parent))
        .expect("create child")
}

pub fn private_root(store: &mut SqliteStore, actor: &Actor, title: &str) -> Article {
    store
        .create_article(
            actor,
            CreateArticleRequest {
                is_private: true,
                ..CreateArticleRequest::titled(title)
            },
        )
        .expect("create private root")
}

pub fn reload(store: &SqliteStore, id: ArticleId) -> Article {
    store.get_article(&admin(), id).expect("load article").article
}
