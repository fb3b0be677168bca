#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS article_members (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
          partner_id INTEGER NOT NULL,
          permission TEXT NOT NULL CHECK(permission IN ('none', 'read', 'write')),
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          UNIQUE(article_id, partner_id)
        );

        -- Direct grants: 'edit' means write, 'view' means read.
        CREATE TABLE IF NOT EXISTS article_unit_grants (
          article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
          unit_id INTEGER NOT NULL,
          access TEXT NOT NULL CHECK(access IN ('view', 'edit')),
          PRIMARY KEY(article_id, unit_id, access)
        ) WITHOUT ROWID;

        CREATE TABLE IF NOT EXISTS article_user_grants (
          article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
          user_id INTEGER NOT NULL,
          access TEXT NOT NULL CHECK(access IN ('view', 'edit')),
          PRIMARY KEY(article_id, user_id, access)
        ) WITHOUT ROWID;
"#;
