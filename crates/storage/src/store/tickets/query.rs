#![forbid(unsafe_code)]

use super::*;
use std::collections::BTreeMap;
use tk_core::{TicketTypeCount, TicketTypeId, is_visible};

impl SqliteStore {
    /// Tickets of inactive projects read as missing, like the projects themselves do
    /// during path resolution.
    pub fn ticket(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        id: TicketId,
    ) -> Result<Ticket, StoreError> {
        let tx = self.read_tx()?;
        let ticket = ticket_tx(&tx, scope, id)?;
        active_project_tx(&tx, scope, actor, ticket.project)?;
        Ok(ticket)
    }

    /// Tickets of one project, newest first.
    pub fn project_tickets(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        project: ProjectId,
    ) -> Result<Vec<Ticket>, StoreError> {
        let tx = self.read_tx()?;
        active_project_tx(&tx, scope, actor, project)?;
        let mut stmt = tx.prepare(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE scope = ?1 AND project_id = ?2 ORDER BY created_at_ms DESC, id DESC"
        ))?;
        let tickets = stmt
            .query_map(params![scope.as_str(), project.get()], ticket_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tickets)
    }

    /// Case-insensitive substring match on ticket keywords, limited to projects the
    /// actor can see.
    pub fn tickets_with_keyword(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        keyword: &str,
    ) -> Result<Vec<Ticket>, StoreError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(StoreError::InvalidInput("keyword must not be empty"));
        }
        let tx = self.read_tx()?;
        let tree = load_tree_tx(&tx, scope)?;
        let mut stmt = tx.prepare(&format!(
            r#"
            SELECT {TICKET_COLUMNS} FROM tickets
            WHERE scope = ?1 AND lower(keywords) LIKE ?2 ESCAPE '\'
            ORDER BY created_at_ms DESC, id DESC
            "#
        ))?;
        let tickets = stmt
            .query_map(
                params![scope.as_str(), like_pattern(&keyword.to_lowercase())],
                ticket_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tickets
            .into_iter()
            .filter(|ticket| {
                tree.get(ticket.project)
                    .is_some_and(|project| is_visible(project, actor))
            })
            .collect())
    }

    /// Open tickets assigned to the acting user across visible projects.
    pub fn open_tickets_assigned_to(
        &self,
        scope: &ScopeId,
        actor: &Actor,
    ) -> Result<Vec<Ticket>, StoreError> {
        let user = require_authenticated(actor)?;
        let tx = self.read_tx()?;
        let tree = load_tree_tx(&tx, scope)?;
        let mut stmt = tx.prepare(&format!(
            r#"
            SELECT {TICKET_COLUMNS} FROM tickets
            WHERE scope = ?1
              AND assigned_to = ?2
              AND status_id IN (SELECT id FROM taxonomy WHERE scope = ?1 AND kind = 'status' AND is_closed = 0)
            ORDER BY created_at_ms DESC, id DESC
            "#
        ))?;
        let tickets = stmt
            .query_map(params![scope.as_str(), user.get()], ticket_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tickets
            .into_iter()
            .filter(|ticket| {
                tree.get(ticket.project)
                    .is_some_and(|project| is_visible(project, actor))
            })
            .collect())
    }

    /// Open and total ticket counts per ticket type, in ticket type order. Types
    /// without tickets are reported with zero counts.
    pub fn project_summary(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        project: ProjectId,
    ) -> Result<Vec<TicketTypeCount>, StoreError> {
        let tx = self.read_tx()?;
        active_project_tx(&tx, scope, actor, project)?;

        let mut counts: BTreeMap<i64, (u64, u64)> = BTreeMap::new();
        {
            let mut stmt = tx.prepare(
                r#"
                SELECT t.ticket_type_id,
                       SUM(CASE WHEN s.is_closed = 0 THEN 1 ELSE 0 END),
                       COUNT(*)
                FROM tickets t JOIN taxonomy s ON s.id = t.status_id
                WHERE t.scope = ?1 AND t.project_id = ?2
                GROUP BY t.ticket_type_id
                "#,
            )?;
            let mut rows = stmt.query(params![scope.as_str(), project.get()])?;
            while let Some(row) = rows.next()? {
                let open = u64::try_from(row.get::<_, i64>(1)?).unwrap_or_default();
                let total = u64::try_from(row.get::<_, i64>(2)?).unwrap_or_default();
                counts.insert(row.get(0)?, (open, total));
            }
        }

        let types = list_taxonomy_tx(&tx, scope, TaxonomyKind::TicketType)?;
        Ok(types
            .into_iter()
            .map(|record| {
                let (open, total) = counts.get(&record.id).copied().unwrap_or_default();
                TicketTypeCount {
                    ticket_type: TicketTypeId(record.id),
                    name: record.name,
                    open,
                    total,
                }
            })
            .collect())
    }
}
