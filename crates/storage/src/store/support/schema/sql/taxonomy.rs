#![forbid(unsafe_code)]

// One table for every default-carrying collection; a collection is (scope, kind).
pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS taxonomy (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          scope TEXT NOT NULL REFERENCES scopes(scope) ON DELETE RESTRICT,
          kind TEXT NOT NULL,
          name TEXT NOT NULL,
          slug TEXT NOT NULL,
          ordering INTEGER NOT NULL DEFAULT 0,
          is_default INTEGER NOT NULL DEFAULT 0,
          is_closed INTEGER NOT NULL DEFAULT 0,
          permissions_json TEXT NOT NULL DEFAULT '[]',
          UNIQUE (scope, kind, slug),
          CHECK (kind IN ('role', 'status', 'priority', 'ticket_type'))
        );
"#;
