#![forbid(unsafe_code)]

use super::super::*;
use kb_core::ids::{ArticleId, UnitId, UserId};
use kb_core::{AccessLevel, Actor};
use rusqlite::{Connection, params};

const VIEW: &str = "view";
const EDIT: &str = "edit";

impl SqliteStore {
    /// Replaces the org-unit and user view/edit sets of one article.
    pub fn set_direct_grants(
        &mut self,
        actor: &Actor,
        article: ArticleId,
        grants: DirectGrants,
    ) -> Result<DirectGrants, StoreError> {
        let tx = begin_write(&mut self.conn)?;
        load_article(&tx, article)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            article,
            AccessLevel::Write,
            "sharing requires write access",
        )?;
        tx.execute(
            "DELETE FROM article_unit_grants WHERE article_id=?1",
            params![article.get()],
        )?;
        tx.execute(
            "DELETE FROM article_user_grants WHERE article_id=?1",
            params![article.get()],
        )?;
        {
            let mut unit_stmt = tx.prepare(
                "INSERT OR IGNORE INTO article_unit_grants(article_id, unit_id, access) \
                 VALUES (?1, ?2, ?3)",
            )?;
            for (units, access) in [(&grants.view_units, VIEW), (&grants.edit_units, EDIT)] {
                for unit in units {
                    unit_stmt.execute(params![article.get(), unit.get(), access])?;
                }
            }
            let mut user_stmt = tx.prepare(
                "INSERT OR IGNORE INTO article_user_grants(article_id, user_id, access) \
                 VALUES (?1, ?2, ?3)",
            )?;
            for (users, access) in [(&grants.view_users, VIEW), (&grants.edit_users, EDIT)] {
                for user in users {
                    user_stmt.execute(params![article.get(), user.get(), access])?;
                }
            }
        }
        bump_article_revision_tx(&tx, article, None, now_ms())?;
        let stored = load_direct_grants(&tx, article)?;
        tx.commit()?;
        tracing::info!(
            article = article.get(),
            units = stored.view_units.len() + stored.edit_units.len(),
            users = stored.view_users.len() + stored.edit_users.len(),
            "direct grants replaced"
        );
        Ok(stored)
    }

    pub fn direct_grants(&self, actor: &Actor, article: ArticleId) -> Result<DirectGrants, StoreError> {
        load_article(&self.conn, article)?;
        ensure_access_tx(
            &self.conn,
            &self.resolver,
            actor,
            article,
            AccessLevel::Read,
            "reading requires read access",
        )?;
        load_direct_grants(&self.conn, article)
    }
}

fn load_direct_grants(conn: &Connection, article: ArticleId) -> Result<DirectGrants, StoreError> {
    let mut grants = DirectGrants::default();

    let mut stmt = conn.prepare(
        "SELECT unit_id, access FROM article_unit_grants WHERE article_id=?1 ORDER BY unit_id",
    )?;
    let mut rows = stmt.query(params![article.get()])?;
    while let Some(row) = rows.next()? {
        let unit = UnitId::new(row.get(0)?);
        let access: String = row.get(1)?;
        if access == EDIT {
            grants.edit_units.push(unit);
        } else {
            grants.view_units.push(unit);
        }
    }

    let mut stmt = conn.prepare(
        "SELECT user_id, access FROM article_user_grants WHERE article_id=?1 ORDER BY user_id",
    )?;
    let mut rows = stmt.query(params![article.get()])?;
    while let Some(row) = rows.next()? {
        let user = UserId::new(row.get(0)?);
        let access: String = row.get(1)?;
        if access == EDIT {
            grants.edit_users.push(user);
        } else {
            grants.view_users.push(user);
        }
    }
    Ok(grants)
}
