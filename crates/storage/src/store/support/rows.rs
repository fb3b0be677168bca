#![forbid(unsafe_code)]

use super::super::{Article, Member, StoreError};
use kb_core::ids::{ArticleId, MemberId, PartnerId, StageId, UserId};
use kb_core::{Category, Permission};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub(in crate::store) const ARTICLE_COLUMNS: &str = "id, revision, title, body, icon, cover_ref, \
     cover_url, cover_position, is_locked, full_width, is_published, share_token, active, \
     to_delete, parent_id, root_id, sequence, is_article_item, stage_id, internal_permission, \
     is_desynchronized, inherited_permission, inherited_permission_source, category, version, \
     last_editor_user_id, last_edited_at_ms, created_at_ms, updated_at_ms";

fn conversion_error(index: usize, message: &'static str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
}

pub(in crate::store) fn permission_at(row: &Row<'_>, index: usize) -> rusqlite::Result<Permission> {
    let raw: String = row.get(index)?;
    Permission::parse(&raw).ok_or_else(|| conversion_error(index, "invalid permission"))
}

pub(in crate::store) fn optional_permission_at(
    row: &Row<'_>,
    index: usize,
) -> rusqlite::Result<Option<Permission>> {
    match row.get::<_, Option<String>>(index)? {
        Some(raw) => Permission::parse(&raw)
            .map(Some)
            .ok_or_else(|| conversion_error(index, "invalid permission")),
        None => Ok(None),
    }
}

fn category_at(row: &Row<'_>, index: usize) -> rusqlite::Result<Category> {
    // Rows inserted inside the current transaction may not be categorized yet.
    match row.get::<_, Option<String>>(index)? {
        Some(raw) => Category::parse(&raw).ok_or_else(|| conversion_error(index, "invalid category")),
        None => Ok(Category::Workspace),
    }
}

pub(in crate::store) fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    let id = ArticleId::new(row.get(0)?);
    Ok(Article {
        id,
        revision: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        icon: row.get(4)?,
        cover_ref: row.get(5)?,
        cover_url: row.get(6)?,
        cover_position: row.get(7)?,
        is_locked: row.get(8)?,
        full_width: row.get(9)?,
        is_published: row.get(10)?,
        share_token: row.get(11)?,
        active: row.get(12)?,
        to_delete: row.get(13)?,
        parent_id: row.get::<_, Option<i64>>(14)?.map(ArticleId::new),
        root_id: row.get::<_, Option<i64>>(15)?.map_or(id, ArticleId::new),
        sequence: row.get(16)?,
        is_article_item: row.get(17)?,
        stage_id: row.get::<_, Option<i64>>(18)?.map(StageId::new),
        internal_permission: optional_permission_at(row, 19)?,
        is_desynchronized: row.get(20)?,
        inherited_permission: optional_permission_at(row, 21)?.unwrap_or(Permission::None),
        inherited_permission_source: row.get::<_, Option<i64>>(22)?.map(ArticleId::new),
        category: category_at(row, 23)?,
        version: row.get(24)?,
        last_editor_user_id: row.get::<_, Option<i64>>(25)?.map(UserId::new),
        last_edited_at_ms: row.get(26)?,
        created_at_ms: row.get(27)?,
        updated_at_ms: row.get(28)?,
    })
}

pub(in crate::store) fn find_article(
    conn: &Connection,
    id: ArticleId,
) -> Result<Option<Article>, StoreError> {
    let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id=?1");
    Ok(conn
        .query_row(&sql, params![id.get()], article_from_row)
        .optional()?)
}

pub(in crate::store) fn load_article(conn: &Connection, id: ArticleId) -> Result<Article, StoreError> {
    find_article(conn, id)?.ok_or(StoreError::UnknownArticle(id))
}

pub(in crate::store) const MEMBER_COLUMNS: &str =
    "id, article_id, partner_id, permission, created_at_ms, updated_at_ms";

pub(in crate::store) fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: MemberId::new(row.get(0)?),
        article_id: ArticleId::new(row.get(1)?),
        partner_id: PartnerId::new(row.get(2)?),
        permission: permission_at(row, 3)?,
        created_at_ms: row.get(4)?,
        updated_at_ms: row.get(5)?,
    })
}

pub(in crate::store) fn load_member(conn: &Connection, id: MemberId) -> Result<Member, StoreError> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM article_members WHERE id=?1");
    conn.query_row(&sql, params![id.get()], member_from_row)
        .optional()?
        .ok_or(StoreError::UnknownMember(id))
}
