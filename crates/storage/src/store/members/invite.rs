#![forbid(unsafe_code)]

use super::super::*;
use kb_core::ids::PartnerId;
use kb_core::{AccessLevel, Actor, Permission};

impl SqliteStore {
    /// Adds the partners as members at `permission`. Existing memberships are
    /// only ever upgraded; a higher grant is left alone. A read or none grant
    /// that would hide the only writer of the article or of a descendant is
    /// rejected. The notifier hears
    /// about the created or upgraded partners once the transaction commits.
    pub fn invite_members(
        &mut self,
        actor: &Actor,
        request: InviteMembersRequest,
    ) -> Result<InviteOutcome, StoreError> {
        let InviteMembersRequest {
            article_id,
            partner_ids,
            permission,
        } = request;
        if partner_ids.is_empty() {
            return Err(StoreError::InvalidInput("partner_ids must not be empty"));
        }

        let now_ms = now_ms();
        let tx = begin_write(&mut self.conn)?;
        load_article(&tx, article_id)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            article_id,
            AccessLevel::Write,
            "inviting members requires write access",
        )?;

        let mut changed_partners: Vec<PartnerId> = Vec::new();
        let mut unchanged = Vec::new();
        for partner in partner_ids {
            if changed_partners.contains(&partner) || unchanged.contains(&partner) {
                continue;
            }
            match find_member_tx(&tx, article_id, partner)? {
                Some(member) if member.permission >= permission => unchanged.push(partner),
                _ => {
                    put_member_tx(&tx, article_id, partner, permission, now_ms)?;
                    changed_partners.push(partner);
                }
            }
        }
        let mut changed = Vec::with_capacity(changed_partners.len());
        for partner in &changed_partners {
            if let Some(member) = find_member_tx(&tx, article_id, *partner)? {
                changed.push(member);
            }
        }
        if !changed.is_empty() {
            if permission != Permission::Write {
                ensure_membership_keeps_writer_tx(
                    &tx,
                    article_id,
                    changed_partners.first().copied(),
                )?;
            }
            bump_article_revision_tx(&tx, article_id, None, now_ms)?;
            refresh_category_if_root_tx(&tx, article_id)?;
        }
        tx.commit()?;

        if !changed_partners.is_empty() {
            self.notifier
                .members_invited(article_id, &changed_partners, permission);
        }
        tracing::info!(
            article = article_id.get(),
            changed = changed.len(),
            unchanged = unchanged.len(),
            permission = permission.as_str(),
            "invite processed"
        );
        Ok(InviteOutcome { changed, unchanged })
    }
}
