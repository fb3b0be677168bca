#![forbid(unsafe_code)]

use super::*;
use kb_core::ids::ArticleId;
use kb_core::{AccessLevel, Actor};
use rusqlite::{OptionalExtension, Transaction, params};

impl SqliteStore {
    /// Moves the article and every descendant the actor can write to the
    /// trash. Returns the trashed ids, the article first.
    pub fn trash_article(&mut self, actor: &Actor, id: ArticleId) -> Result<Vec<ArticleId>, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let article = load_article(&tx, id)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            id,
            AccessLevel::Write,
            "trashing requires write access",
        )?;
        if article.to_delete {
            return Err(StoreError::InvalidInput("the article is already in the trash"));
        }

        let targets = writable_subtree_tx(&tx, &self.resolver, actor, id)?;
        set_trashed_tx(&tx, &targets, true, now_ms)?;
        tx.commit()?;
        tracing::info!(article = id.get(), articles = targets.len(), "article trashed");
        Ok(targets)
    }

    /// Brings a trashed article back together with its trashed descendants
    /// the actor can write.
    pub fn restore_article(&mut self, actor: &Actor, id: ArticleId) -> Result<Vec<ArticleId>, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let article = load_article(&tx, id)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            id,
            AccessLevel::Write,
            "restoring requires write access",
        )?;
        if !article.to_delete {
            return Err(StoreError::InvalidInput("the article is not in the trash"));
        }
        if let Some(parent) = article.parent_id
            && load_article(&tx, parent)?.to_delete
        {
            return Err(StoreError::InvalidInput("restore the parent article first"));
        }

        let mut targets = vec![id];
        for candidate in writable_subtree_tx(&tx, &self.resolver, actor, id)?
            .into_iter()
            .skip(1)
        {
            if load_article(&tx, candidate)?.to_delete {
                targets.push(candidate);
            }
        }
        set_trashed_tx(&tx, &targets, false, now_ms)?;
        tx.commit()?;
        tracing::info!(article = id.get(), articles = targets.len(), "article restored");
        Ok(targets)
    }

    /// Trashed articles the actor can read, most recently trashed first,
    /// with the date the sweep removes them.
    pub fn list_trash(&self, actor: &Actor) -> Result<Vec<TrashEntry>, StoreError> {
        let sql = format!(
            "SELECT id, title, updated_at_ms FROM articles \
             WHERE to_delete = 1 AND id IN ({}) \
             ORDER BY updated_at_ms DESC, id DESC",
            accessible_ids_sql(AccessLevel::Read)
        );
        let scope = AccessScope::of(actor);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(scope.params().as_slice(), |row| {
                Ok((
                    ArticleId::new(row.get(0)?),
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .map(|(article_id, title, updated_at_ms)| TrashEntry {
                article_id,
                title,
                updated_at_ms,
                deletion_at_ms: self.config.deletion_at_ms(updated_at_ms),
                deletion_date: self.config.deletion_date(updated_at_ms),
            })
            .collect())
    }

    /// Hard-deletes up to `limit` articles whose trash grace period ended
    /// before `now_ms`. Claim and delete share one write transaction, so
    /// concurrent sweeps never delete the same row twice. Trashed descendants
    /// go with their parent; active ones are first lifted to the root level.
    pub fn sweep_expired_trash_at(&mut self, now_ms: i64, limit: usize) -> Result<SweepReport, StoreError> {
        let cutoff_ms = self.config.expiry_cutoff_ms(now_ms);
        let tx = begin_write(&mut self.conn)?;
        let claimed = {
            let mut stmt = tx.prepare(
                "SELECT id FROM articles \
                 WHERE to_delete = 1 AND updated_at_ms < ?1 \
                 ORDER BY updated_at_ms ASC, id ASC LIMIT ?2",
            )?;
            stmt.query_map(params![cutoff_ms, to_sqlite_i64(limit)?], |row| {
                row.get::<_, i64>(0)
            })?
            .map(|id| id.map(ArticleId::new))
            .collect::<Result<Vec<_>, _>>()?
        };
        let mut rescued = Vec::new();
        if !claimed.is_empty() {
            let payload = ids_json(&claimed)?;
            while let Some(survivor) = next_survivor_tx(&tx, &payload)? {
                lift_to_root_tx(&tx, survivor, now_ms)?;
                rescued.push(survivor);
            }
            tx.execute(
                "DELETE FROM articles WHERE id IN (SELECT value FROM json_each(?1))",
                params![payload],
            )?;
        }
        tx.commit()?;
        if !claimed.is_empty() {
            tracing::info!(
                cutoff_ms,
                deleted = claimed.len(),
                rescued = rescued.len(),
                "expired trash swept"
            );
        }
        Ok(SweepReport {
            cutoff_ms,
            deleted: claimed,
            rescued,
        })
    }

    pub fn sweep_expired_trash(&mut self) -> Result<SweepReport, StoreError> {
        let limit = self.config.sweep_batch_limit;
        self.sweep_expired_trash_at(now_ms(), limit)
    }
}

/// Shallowest active article that deleting the claimed ids (JSON array)
/// would cascade away, found directly below a trashed parent.
fn next_survivor_tx(tx: &Transaction<'_>, claimed: &str) -> Result<Option<ArticleId>, StoreError> {
    let id: Option<i64> = tx
        .query_row(
            r#"
            SELECT a.id FROM articles a
            JOIN articles parent ON parent.id = a.parent_id
            JOIN article_paths own ON own.article_id = a.id AND own.ancestor_id = a.id
            WHERE a.to_delete = 0 AND parent.to_delete = 1
              AND a.id IN (
                SELECT article_id FROM article_paths
                WHERE ancestor_id IN (SELECT value FROM json_each(?1))
              )
            ORDER BY own.depth ASC, a.id ASC
            LIMIT 1
            "#,
            params![claimed],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id.map(ArticleId::new))
}

/// Detaches `article` from its ancestors as a root that pins its inherited
/// default and keeps the member grants it saw through them.
fn lift_to_root_tx(tx: &Transaction<'_>, article: ArticleId, now_ms: i64) -> Result<(), StoreError> {
    let current = load_article(tx, article)?;
    let pinned = pin_inherited_members_tx(tx, article, now_ms)?;
    bump_article_revision_tx(tx, article, None, now_ms)?;
    let placement = Placement {
        parent: None,
        sequence: None,
        own_permission: Some(current.pinned_default()),
        desynchronized: false,
    };
    place_article_tx(tx, &current, placement, now_ms)?;
    tracing::info!(
        article = article.get(),
        former_parent = current.parent_id.map(ArticleId::get),
        pinned_members = pinned,
        "active article lifted out of expired trash"
    );
    Ok(())
}

/// `top` followed by the descendants the actor can write, shallowest first.
fn writable_subtree_tx(
    tx: &Transaction<'_>,
    resolver: &kb_core::resolver::PermissionResolver,
    actor: &Actor,
    top: ArticleId,
) -> Result<Vec<ArticleId>, StoreError> {
    let descendants = path_descendants(tx, top)?;
    let permissions = effective_permissions_tx(tx, resolver, actor, &descendants)?;
    let mut targets = vec![top];
    targets.extend(descendants.into_iter().filter(|id| {
        permissions
            .get(id)
            .is_some_and(|permission| permission.can_edit())
    }));
    Ok(targets)
}

fn set_trashed_tx(
    tx: &Transaction<'_>,
    ids: &[ArticleId],
    trashed: bool,
    now_ms: i64,
) -> Result<(), StoreError> {
    let payload = ids_json(ids)?;
    tx.execute(
        "UPDATE articles SET active=?2, to_delete=?3, revision=revision+1, updated_at_ms=?4 \
         WHERE id IN (SELECT value FROM json_each(?1))",
        params![payload, !trashed, trashed, now_ms],
    )?;
    tx.execute(
        "UPDATE article_favorites SET is_article_active=?2 \
         WHERE article_id IN (SELECT value FROM json_each(?1))",
        params![payload, !trashed],
    )?;
    Ok(())
}
