#![forbid(unsafe_code)]

use super::super::*;
use kb_core::ids::{ArticleId, MemberId};
use kb_core::{AccessLevel, Actor, KnowledgeError, Permission};
use rusqlite::params;

impl SqliteStore {
    pub fn list_members(&self, actor: &Actor, article: ArticleId) -> Result<Vec<Member>, StoreError> {
        load_article(&self.conn, article)?;
        ensure_access_tx(
            &self.conn,
            &self.resolver,
            actor,
            article,
            AccessLevel::Read,
            "reading requires read access",
        )?;
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM article_members WHERE article_id=?1 ORDER BY id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let members = stmt
            .query_map(params![article.get()], member_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    /// Overwrites the permission of one membership. Downgrading the last
    /// writer is rejected like removing it.
    pub fn set_member_permission(
        &mut self,
        actor: &Actor,
        member_id: MemberId,
        permission: Permission,
    ) -> Result<Member, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let member = load_member(&tx, member_id)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            member.article_id,
            AccessLevel::Write,
            "managing members requires write access",
        )?;
        if permission != Permission::Write {
            ensure_not_last_writer(&tx, &member)?;
        }
        put_member_tx(&tx, member.article_id, member.partner_id, permission, now_ms)?;
        if permission != Permission::Write {
            ensure_membership_keeps_writer_tx(&tx, member.article_id, Some(member.partner_id))?;
        }
        refresh_category_if_root_tx(&tx, member.article_id)?;
        let member = load_member(&tx, member_id)?;
        tx.commit()?;
        Ok(member)
    }

    /// Deletes a membership. Members may always leave on their own; removing
    /// someone else needs write access.
    pub fn remove_member(&mut self, actor: &Actor, member_id: MemberId) -> Result<(), StoreError> {
        let tx = begin_write(&mut self.conn)?;
        let member = load_member(&tx, member_id)?;
        if member.partner_id != actor.partner_id {
            ensure_access_tx(
                &tx,
                &self.resolver,
                actor,
                member.article_id,
                AccessLevel::Write,
                "managing members requires write access",
            )?;
        }
        ensure_not_last_writer(&tx, &member)?;
        tx.execute(
            "DELETE FROM article_members WHERE id=?1",
            params![member_id.get()],
        )?;
        if member.permission == Permission::Write {
            ensure_membership_keeps_writer_tx(&tx, member.article_id, Some(member.partner_id))?;
        }
        refresh_category_if_root_tx(&tx, member.article_id)?;
        tx.commit()?;
        tracing::info!(
            article = member.article_id.get(),
            partner = member.partner_id.get(),
            "member removed"
        );
        Ok(())
    }

    /// Generic membership update. The article and partner of a membership are
    /// fixed; only a superuser may rewrite them.
    pub fn patch_member(&mut self, actor: &Actor, patch: MemberPatch) -> Result<Member, StoreError> {
        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        let member = load_member(&tx, patch.member_id)?;
        let article = patch.article_id.unwrap_or(member.article_id);
        let partner = patch.partner_id.unwrap_or(member.partner_id);
        let moves_identity = article != member.article_id || partner != member.partner_id;
        if moves_identity && !actor.is_superuser {
            return Err(KnowledgeError::MembershipConflict {
                article: member.article_id,
                partner: Some(member.partner_id),
                reason: "the article and partner of a membership cannot change",
            }
            .into());
        }
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            member.article_id,
            AccessLevel::Write,
            "managing members requires write access",
        )?;

        let permission = patch.permission.unwrap_or(member.permission);
        if moves_identity || permission != Permission::Write {
            ensure_not_last_writer(&tx, &member)?;
        }
        if moves_identity {
            load_article(&tx, article)?;
        }
        let updated = tx.execute(
            "UPDATE article_members SET article_id=?2, partner_id=?3, permission=?4, updated_at_ms=?5 \
             WHERE id=?1",
            params![
                member.id.get(),
                article.get(),
                partner.get(),
                permission.as_str(),
                now_ms,
            ],
        );
        if let Err(err) = updated {
            return Err(map_insert_conflict(err, "the partner is already a member of the article"));
        }
        if moves_identity || permission != Permission::Write {
            ensure_membership_keeps_writer_tx(&tx, member.article_id, Some(member.partner_id))?;
        }
        if article != member.article_id && permission != Permission::Write {
            ensure_membership_keeps_writer_tx(&tx, article, Some(partner))?;
        }
        refresh_category_if_root_tx(&tx, member.article_id)?;
        if article != member.article_id {
            refresh_category_if_root_tx(&tx, article)?;
        }
        let member = load_member(&tx, member.id)?;
        tx.commit()?;
        Ok(member)
    }
}
