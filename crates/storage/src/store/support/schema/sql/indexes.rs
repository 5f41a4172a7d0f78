#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_root_slug ON projects(scope, slug) WHERE parent_id IS NULL;
        CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_child_slug ON projects(parent_id, slug) WHERE parent_id IS NOT NULL;
        CREATE INDEX IF NOT EXISTS idx_projects_scope_parent ON projects(scope, parent_id, name);
        CREATE INDEX IF NOT EXISTS idx_memberships_user ON memberships(scope, user_id);
        CREATE INDEX IF NOT EXISTS idx_taxonomy_default ON taxonomy(scope, kind, is_default);
        CREATE INDEX IF NOT EXISTS idx_tickets_project_created ON tickets(scope, project_id, created_at_ms);
        CREATE INDEX IF NOT EXISTS idx_tickets_assigned ON tickets(scope, assigned_to);
        CREATE INDEX IF NOT EXISTS idx_ticket_logs_ticket ON ticket_logs(ticket_id, id);
"#;
