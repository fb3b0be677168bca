#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS article_versions (
          article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
          version_number INTEGER NOT NULL,
          body TEXT NOT NULL,
          author_user_id INTEGER,
          created_at_ms INTEGER NOT NULL,
          PRIMARY KEY(article_id, version_number)
        ) WITHOUT ROWID;
"#;
