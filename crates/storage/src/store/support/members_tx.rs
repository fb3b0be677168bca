#![forbid(unsafe_code)]

use super::super::{Member, StoreError};
use super::rows::{MEMBER_COLUMNS, member_from_row, optional_permission_at};
use kb_core::ids::{ArticleId, MemberId, PartnerId};
use kb_core::resolver::has_writer;
use kb_core::{KnowledgeError, Permission};
use rusqlite::{Connection, OptionalExtension, Transaction, params};

/// Partners whose closest member grant on `article` (ancestors included) is
/// write, leaving `excluding` out as if it were already gone.
pub(in crate::store) fn write_member_count(
    conn: &Connection,
    article: ArticleId,
    excluding: Option<MemberId>,
) -> Result<usize, StoreError> {
    let count: i64 = conn.query_row(
        r#"
        SELECT COUNT(1) FROM (
          SELECT m.permission,
                 ROW_NUMBER() OVER (PARTITION BY m.partner_id ORDER BY p.depth DESC) AS rn
          FROM article_paths p
          JOIN article_members m ON m.article_id = p.ancestor_id
          WHERE p.article_id = ?1 AND m.id IS NOT ?2
        ) WHERE rn = 1 AND permission = 'write'
        "#,
        params![article.get(), excluding.map(MemberId::get)],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or(0))
}

fn inherited_permission(conn: &Connection, article: ArticleId) -> Result<Option<Permission>, StoreError> {
    conn.query_row(
        "SELECT inherited_permission FROM articles WHERE id=?1",
        params![article.get()],
        |row| optional_permission_at(row, 0),
    )
    .optional()?
    .ok_or(StoreError::UnknownArticle(article))
}

/// First article in the subtree of `top` (itself included) that neither
/// inherits write nor has a partner whose closest member grant is write.
pub(in crate::store) fn writerless_article_tx(
    conn: &Connection,
    top: ArticleId,
) -> Result<Option<ArticleId>, StoreError> {
    let id: Option<i64> = conn
        .query_row(
            r#"
            WITH subtree AS (
              SELECT article_id FROM article_paths WHERE ancestor_id = ?1
            ),
            closest AS (
              SELECT p.article_id, m.permission,
                     ROW_NUMBER() OVER (
                       PARTITION BY p.article_id, m.partner_id ORDER BY p.depth DESC
                     ) AS rn
              FROM article_paths p
              JOIN article_members m ON m.article_id = p.ancestor_id
              WHERE p.article_id IN (SELECT article_id FROM subtree)
            )
            SELECT a.id FROM articles a
            WHERE a.id IN (SELECT article_id FROM subtree)
              AND a.inherited_permission IS NOT 'write'
              AND a.id NOT IN (
                SELECT article_id FROM closest WHERE rn = 1 AND permission = 'write'
              )
            ORDER BY a.id
            LIMIT 1
            "#,
            params![top.get()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id.map(ArticleId::new))
}

/// Rejects a structural or default-permission change that leaves `top` or
/// any article below it without a path to write.
pub(in crate::store) fn ensure_writer_tx(
    conn: &Connection,
    top: ArticleId,
) -> Result<(), StoreError> {
    let Some(article) = writerless_article_tx(conn, top)? else {
        return Ok(());
    };
    tracing::warn!(top = top.get(), article = article.get(), "write rejected: no writer left");
    Err(KnowledgeError::invariant(article, "the article needs at least one member with write access").into())
}

/// Membership flavour of [`ensure_writer_tx`]: a grant written on `article`
/// must not hide the only writer of it or of anything below it.
pub(in crate::store) fn ensure_membership_keeps_writer_tx(
    conn: &Connection,
    article: ArticleId,
    partner: Option<PartnerId>,
) -> Result<(), StoreError> {
    let Some(stranded) = writerless_article_tx(conn, article)? else {
        return Ok(());
    };
    tracing::warn!(
        article = article.get(),
        stranded = stranded.get(),
        partner = partner.map(PartnerId::get),
        "membership change rejected: no writer left"
    );
    Err(KnowledgeError::MembershipConflict {
        article: stranded,
        partner,
        reason: "the change leaves an article without a writer",
    }
    .into())
}

/// Copies the closest member grant of every partner reachable through the
/// ancestors of `article` onto `article` itself, so it keeps the same member
/// permissions once detached from them.
pub(in crate::store) fn pin_inherited_members_tx(
    tx: &Transaction<'_>,
    article: ArticleId,
    now_ms: i64,
) -> Result<usize, StoreError> {
    let copied = tx.execute(
        r#"
        INSERT INTO article_members(article_id, partner_id, permission, created_at_ms, updated_at_ms)
        SELECT ?1, partner_id, permission, ?2, ?2 FROM (
          SELECT m.partner_id, m.permission, m.article_id AS source,
                 ROW_NUMBER() OVER (PARTITION BY m.partner_id ORDER BY p.depth DESC) AS rn
          FROM article_paths p
          JOIN article_members m ON m.article_id = p.ancestor_id
          WHERE p.article_id = ?1
        ) WHERE rn = 1 AND source <> ?1
        "#,
        params![article.get(), now_ms],
    )?;
    Ok(copied)
}

/// Rejects removing or downgrading `member` when it is the last writer and
/// nothing is inherited as write.
pub(in crate::store) fn ensure_not_last_writer(
    conn: &Connection,
    member: &Member,
) -> Result<(), StoreError> {
    if member.permission != Permission::Write {
        return Ok(());
    }
    let inherited = inherited_permission(conn, member.article_id)?;
    let others = write_member_count(conn, member.article_id, Some(member.id))?;
    if has_writer(inherited, others) {
        return Ok(());
    }
    tracing::warn!(
        article = member.article_id.get(),
        partner = member.partner_id.get(),
        "membership change rejected: last writer"
    );
    Err(KnowledgeError::MembershipConflict {
        article: member.article_id,
        partner: Some(member.partner_id),
        reason: "cannot remove the last writer",
    }
    .into())
}

pub(in crate::store) fn find_member_tx(
    conn: &Connection,
    article: ArticleId,
    partner: PartnerId,
) -> Result<Option<Member>, StoreError> {
    let sql = format!(
        "SELECT {MEMBER_COLUMNS} FROM article_members WHERE article_id=?1 AND partner_id=?2"
    );
    Ok(conn
        .query_row(&sql, params![article.get(), partner.get()], member_from_row)
        .optional()?)
}

/// Creates the membership or overwrites its permission.
pub(in crate::store) fn put_member_tx(
    tx: &Transaction<'_>,
    article: ArticleId,
    partner: PartnerId,
    permission: Permission,
    now_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO article_members(article_id, partner_id, permission, created_at_ms, updated_at_ms) \
         VALUES (?1, ?2, ?3, ?4, ?4) \
         ON CONFLICT(article_id, partner_id) DO UPDATE SET \
           permission=excluded.permission, updated_at_ms=excluded.updated_at_ms",
        params![article.get(), partner.get(), permission.as_str(), now_ms],
    )?;
    Ok(())
}
