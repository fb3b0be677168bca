#![forbid(unsafe_code)]

use super::super::StoreError;
use super::json::ids_json;
use super::rows::{optional_permission_at, permission_at};
use kb_core::ids::ArticleId;
use kb_core::resolver::{DirectGrant, GrantFacts, PermissionResolver};
use kb_core::{AccessLevel, Actor, KnowledgeError, Permission};
use rusqlite::types::ToSql;
use rusqlite::{Connection, params};
use std::collections::HashMap;

/// Closest member grant per article for the partner bound to `?2`, restricted
/// to the articles in the JSON array bound to `?1`.
const CLOSEST_MEMBER_SQL: &str = r#"
    SELECT article_id, permission FROM (
      SELECT p.article_id, m.permission,
             ROW_NUMBER() OVER (PARTITION BY p.article_id ORDER BY p.depth DESC) AS rn
      FROM article_paths p
      JOIN article_members m ON m.article_id = p.ancestor_id
      WHERE p.article_id IN (SELECT value FROM json_each(?1)) AND m.partner_id = ?2
    ) WHERE rn = 1
"#;

fn unit_grant(facts: &mut GrantFacts) -> &mut DirectGrant {
    &mut facts.unit
}

fn user_grant(facts: &mut GrantFacts) -> &mut DirectGrant {
    &mut facts.user
}

fn collect_grants(
    conn: &Connection,
    sql: &str,
    ids_payload: &str,
    principal: i64,
    facts: &mut HashMap<ArticleId, GrantFacts>,
    pick: fn(&mut GrantFacts) -> &mut DirectGrant,
) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params![ids_payload, principal])?;
    while let Some(row) = rows.next()? {
        let article = ArticleId::new(row.get(0)?);
        let access: String = row.get(1)?;
        if let Some(entry) = facts.get_mut(&article) {
            let grant = pick(entry);
            match access.as_str() {
                "edit" => grant.edit = true,
                _ => grant.view = true,
            }
        }
    }
    Ok(())
}

/// Facts for every stored article in `ids`, gathered with one query per
/// grant source. Unknown ids are absent from the result.
pub(in crate::store) fn grant_facts_tx(
    conn: &Connection,
    actor: &Actor,
    ids: &[ArticleId],
) -> Result<HashMap<ArticleId, GrantFacts>, StoreError> {
    let payload = ids_json(ids)?;
    let mut facts = HashMap::with_capacity(ids.len());

    let mut stmt = conn.prepare(
        "SELECT id, inherited_permission FROM articles \
         WHERE id IN (SELECT value FROM json_each(?1))",
    )?;
    let mut rows = stmt.query(params![payload])?;
    while let Some(row) = rows.next()? {
        facts.insert(
            ArticleId::new(row.get(0)?),
            GrantFacts {
                persisted: true,
                inherited: optional_permission_at(row, 1)?,
                ..GrantFacts::default()
            },
        );
    }
    if facts.is_empty() || actor.is_superuser {
        return Ok(facts);
    }

    let mut stmt = conn.prepare(CLOSEST_MEMBER_SQL)?;
    let mut rows = stmt.query(params![payload, actor.partner_id.get()])?;
    while let Some(row) = rows.next()? {
        let article = ArticleId::new(row.get(0)?);
        if let Some(entry) = facts.get_mut(&article) {
            entry.member = Some(permission_at(row, 1)?);
        }
    }

    if let Some(unit) = actor.unit_id {
        collect_grants(
            conn,
            "SELECT article_id, access FROM article_unit_grants \
             WHERE article_id IN (SELECT value FROM json_each(?1)) AND unit_id = ?2",
            &payload,
            unit.get(),
            &mut facts,
            unit_grant,
        )?;
    }
    collect_grants(
        conn,
        "SELECT article_id, access FROM article_user_grants \
         WHERE article_id IN (SELECT value FROM json_each(?1)) AND user_id = ?2",
        &payload,
        actor.user_id.get(),
        &mut facts,
        user_grant,
    )?;
    Ok(facts)
}

pub(in crate::store) fn effective_permissions_tx(
    conn: &Connection,
    resolver: &PermissionResolver,
    actor: &Actor,
    ids: &[ArticleId],
) -> Result<HashMap<ArticleId, Permission>, StoreError> {
    Ok(grant_facts_tx(conn, actor, ids)?
        .into_iter()
        .map(|(id, facts)| (id, resolver.resolve(actor, &facts)))
        .collect())
}

pub(in crate::store) fn effective_permission_tx(
    conn: &Connection,
    resolver: &PermissionResolver,
    actor: &Actor,
    article: ArticleId,
) -> Result<Permission, StoreError> {
    effective_permissions_tx(conn, resolver, actor, &[article])?
        .remove(&article)
        .ok_or(StoreError::UnknownArticle(article))
}

pub(in crate::store) fn ensure_access_tx(
    conn: &Connection,
    resolver: &PermissionResolver,
    actor: &Actor,
    article: ArticleId,
    required: AccessLevel,
    reason: &'static str,
) -> Result<Permission, StoreError> {
    let permission = effective_permission_tx(conn, resolver, actor, article)?;
    if !permission.allows(required) {
        tracing::warn!(
            article = article.get(),
            user = actor.user_id.get(),
            required = required.as_str(),
            reason,
            "access denied"
        );
        return Err(KnowledgeError::AccessDenied {
            article,
            user: actor.user_id,
            required,
            reason,
        }
        .into());
    }
    Ok(permission)
}

fn quoted(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| format!("'{value}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Set-algebra query selecting every article id the actor reaches at
/// `level`. Binds `:partner`, `:unit`, `:user`, `:internal` and
/// `:superuser` (see [`AccessScope`]).
pub(in crate::store) fn accessible_ids_sql(level: AccessLevel) -> String {
    let permissions: Vec<&str> = level.satisfying().iter().map(|p| p.as_str()).collect();
    let permissions = quoted(&permissions);
    let grant_access = match level {
        AccessLevel::Read => quoted(&["view", "edit"]),
        AccessLevel::Write => quoted(&["edit"]),
    };
    format!(
        r#"
        SELECT c.article_id FROM (
          SELECT p.article_id, m.permission,
                 ROW_NUMBER() OVER (PARTITION BY p.article_id ORDER BY p.depth DESC) AS rn
          FROM article_members m
          JOIN article_paths p ON p.ancestor_id = m.article_id
          WHERE m.partner_id = :partner
        ) AS c
        WHERE c.rn = 1 AND c.permission IN ({permissions})
        UNION
        SELECT article_id FROM article_unit_grants
        WHERE unit_id = :unit AND access IN ({grant_access})
        UNION
        SELECT article_id FROM article_user_grants
        WHERE user_id = :user AND access IN ({grant_access})
        UNION
        SELECT a.id FROM articles a
        WHERE :internal = 1
          AND a.inherited_permission IN ({permissions})
          AND a.id NOT IN (
            SELECT s.article_id FROM (
              SELECT p.article_id, m.permission,
                     ROW_NUMBER() OVER (PARTITION BY p.article_id ORDER BY p.depth DESC) AS rn
              FROM article_members m
              JOIN article_paths p ON p.ancestor_id = m.article_id
              WHERE m.partner_id = :partner
            ) AS s
            WHERE s.rn = 1 AND s.permission = 'none'
          )
        UNION
        SELECT id FROM articles WHERE :superuser = 1
        "#
    )
}

/// Named parameters of [`accessible_ids_sql`].
#[derive(Clone, Copy, Debug)]
pub(in crate::store) struct AccessScope {
    pub partner: i64,
    pub unit: Option<i64>,
    pub user: i64,
    pub internal: bool,
    pub superuser: bool,
}

impl AccessScope {
    pub(in crate::store) fn of(actor: &Actor) -> Self {
        Self {
            partner: actor.partner_id.get(),
            unit: actor.unit_id.map(|unit| unit.get()),
            user: actor.user_id.get(),
            internal: actor.is_internal(),
            superuser: actor.is_superuser,
        }
    }

    /// Bindings for [`accessible_ids_sql`]; callers append their own.
    pub(in crate::store) fn params(&self) -> Vec<(&'static str, &dyn ToSql)> {
        vec![
            (":partner", &self.partner as &dyn ToSql),
            (":unit", &self.unit as &dyn ToSql),
            (":user", &self.user as &dyn ToSql),
            (":internal", &self.internal as &dyn ToSql),
            (":superuser", &self.superuser as &dyn ToSql),
        ]
    }
}

pub(in crate::store) fn accessible_ids_tx(
    conn: &Connection,
    actor: &Actor,
    level: AccessLevel,
) -> Result<Vec<ArticleId>, StoreError> {
    let sql = format!(
        "SELECT id FROM articles WHERE id IN ({}) ORDER BY id",
        accessible_ids_sql(level)
    );
    let scope = AccessScope::of(actor);
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(scope.params().as_slice(), |row| row.get::<_, i64>(0))?
        .map(|id| id.map(ArticleId::new))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}
