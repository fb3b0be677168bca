#![forbid(unsafe_code)]

use crate::ids::{ArticleId, PartnerId};
use crate::permission::Permission;

/// Outbound seam for invitation messages. Delivery (mail, chat) lives outside
/// this workspace.
pub trait Notifier: Send + Sync {
    fn members_invited(&self, article: ArticleId, partners: &[PartnerId], permission: Permission);
}

/// Default notifier: records the invitation in the trace log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn members_invited(&self, article: ArticleId, partners: &[PartnerId], permission: Permission) {
        tracing::info!(
            article = article.get(),
            partners = partners.len(),
            permission = permission.as_str(),
            "members invited"
        );
    }
}
