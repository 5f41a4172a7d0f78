#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS tickets (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          scope TEXT NOT NULL,
          project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
          ticket_type_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE RESTRICT,
          status_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE RESTRICT,
          priority_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE RESTRICT,
          component_id INTEGER REFERENCES components(id) ON DELETE SET NULL,
          assigned_to INTEGER REFERENCES users(id) ON DELETE SET NULL,
          reported_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
          subject TEXT NOT NULL,
          description TEXT NOT NULL DEFAULT '',
          keywords TEXT NOT NULL DEFAULT '',
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        -- Written once per mutation, never updated.
        CREATE TABLE IF NOT EXISTS ticket_logs (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          scope TEXT NOT NULL,
          ticket_id INTEGER NOT NULL REFERENCES tickets(id) ON DELETE CASCADE,
          note TEXT NOT NULL DEFAULT '',
          actor_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ticket_changes (
          log_id INTEGER NOT NULL REFERENCES ticket_logs(id) ON DELETE CASCADE,
          seq INTEGER NOT NULL,
          field TEXT NOT NULL,
          entity_kind TEXT NOT NULL,
          old_id INTEGER,
          new_id INTEGER,
          PRIMARY KEY (log_id, seq),
          CHECK (old_id IS NOT new_id)
        );
"#;
