#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE INDEX IF NOT EXISTS idx_articles_parent ON articles(parent_id, sequence);
        CREATE INDEX IF NOT EXISTS idx_articles_root ON articles(root_id);
        CREATE INDEX IF NOT EXISTS idx_articles_trash ON articles(to_delete, updated_at_ms);
        CREATE INDEX IF NOT EXISTS idx_article_paths_ancestor ON article_paths(ancestor_id, depth);
        CREATE INDEX IF NOT EXISTS idx_article_members_partner ON article_members(partner_id, article_id);
        CREATE INDEX IF NOT EXISTS idx_article_unit_grants_unit ON article_unit_grants(unit_id, access);
        CREATE INDEX IF NOT EXISTS idx_article_user_grants_user ON article_user_grants(user_id, access);
        CREATE INDEX IF NOT EXISTS idx_article_favorites_user ON article_favorites(user_id, sequence);
        CREATE INDEX IF NOT EXISTS idx_article_stages_parent ON article_stages(parent_id, sequence);
"#;
