#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS article_favorites (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
          user_id INTEGER NOT NULL,
          sequence INTEGER NOT NULL DEFAULT 0,
          is_article_active INTEGER NOT NULL DEFAULT 1 CHECK(is_article_active IN (0, 1)),
          created_at_ms INTEGER NOT NULL,
          UNIQUE(article_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS article_likes (
          article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
          partner_id INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          PRIMARY KEY(article_id, partner_id)
        ) WITHOUT ROWID;
"#;
