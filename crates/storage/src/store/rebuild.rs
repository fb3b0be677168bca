#![forbid(unsafe_code)]

use super::*;
use kb_core::ids::ArticleId;
use std::collections::BTreeSet;

impl SqliteStore {
    /// Recomputes paths, roots, inherited defaults and categories of every
    /// article from the parent links and own defaults alone. Fails without
    /// writing anything when the stored links contain a cycle.
    pub fn rebuild_derived_state(&mut self) -> Result<RebuildReport, StoreError> {
        let tx = begin_write(&mut self.conn)?;
        let index = load_full_tree_tx(&tx)?;
        let mut ids: Vec<ArticleId> = index.ids().collect();
        ids.sort();
        let derived = index.derive(&ids)?;
        apply_derived_tx(&tx, &derived)?;

        let roots: BTreeSet<ArticleId> = derived.iter().map(|node| node.root).collect();
        for root in &roots {
            refresh_category_tx(&tx, *root)?;
        }
        tx.commit()?;

        let report = RebuildReport {
            articles: derived.len(),
            roots: roots.len(),
        };
        tracing::info!(
            articles = report.articles,
            roots = report.roots,
            "derived state rebuilt"
        );
        Ok(report)
    }
}
