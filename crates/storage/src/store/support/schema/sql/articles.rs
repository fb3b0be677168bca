#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        -- Kanban columns of one parent article.
        CREATE TABLE IF NOT EXISTS article_stages (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          parent_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
          name TEXT NOT NULL,
          sequence INTEGER NOT NULL DEFAULT 10,
          fold INTEGER NOT NULL DEFAULT 0 CHECK(fold IN (0, 1)),
          created_at_ms INTEGER NOT NULL
        );

        -- root_id, inherited_permission(_source) and category are derived and
        -- rewritten in bulk after every structural change.
        CREATE TABLE IF NOT EXISTS articles (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          revision INTEGER NOT NULL DEFAULT 0,
          title TEXT,
          body TEXT NOT NULL DEFAULT '',
          icon TEXT,
          cover_ref TEXT,
          share_token TEXT NOT NULL UNIQUE,
          is_locked INTEGER NOT NULL DEFAULT 0 CHECK(is_locked IN (0, 1)),
          is_published INTEGER NOT NULL DEFAULT 0 CHECK(is_published IN (0, 1)),
          active INTEGER NOT NULL DEFAULT 1 CHECK(active IN (0, 1)),
          to_delete INTEGER NOT NULL DEFAULT 0 CHECK(to_delete IN (0, 1)),
          parent_id INTEGER REFERENCES articles(id) ON DELETE CASCADE,
          root_id INTEGER,
          sequence INTEGER NOT NULL DEFAULT 0,
          is_article_item INTEGER NOT NULL DEFAULT 0 CHECK(is_article_item IN (0, 1)),
          internal_permission TEXT CHECK(internal_permission IN ('none', 'read', 'write')),
          is_desynchronized INTEGER NOT NULL DEFAULT 0 CHECK(is_desynchronized IN (0, 1)),
          inherited_permission TEXT CHECK(inherited_permission IN ('none', 'read', 'write')),
          inherited_permission_source INTEGER,
          category TEXT CHECK(category IN ('workspace', 'shared', 'private')),
          version INTEGER NOT NULL DEFAULT 1,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          CHECK(parent_id IS NOT NULL OR internal_permission IS NOT NULL),
          CHECK(is_desynchronized = 0 OR internal_permission IS NOT NULL),
          CHECK(parent_id IS NOT NULL OR is_desynchronized = 0),
          CHECK(is_article_item = 0 OR parent_id IS NOT NULL),
          CHECK(to_delete = 0 OR active = 0),
          CHECK(parent_id IS NULL OR parent_id <> id)
        );

        -- Materialized path: one row per (article, ancestor-or-self), depth 0 is
        -- the root.
        CREATE TABLE IF NOT EXISTS article_paths (
          article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
          ancestor_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
          depth INTEGER NOT NULL CHECK(depth >= 0),
          PRIMARY KEY(article_id, ancestor_id)
        ) WITHOUT ROWID;
"#;
