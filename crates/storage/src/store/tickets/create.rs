#![forbid(unsafe_code)]

use super::*;
use crate::store::audit::insert_log_tx;
use tk_core::TaxonomyRecord;

/// The caller's choice, else the collection default.
fn or_default<T>(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    kind: TaxonomyKind,
    given: Option<T>,
    pick: fn(&TaxonomyRecord) -> Option<T>,
    missing: &'static str,
) -> Result<T, StoreError> {
    if let Some(value) = given {
        return Ok(value);
    }
    default_tx(tx, scope, kind)?
        .as_ref()
        .and_then(pick)
        .ok_or(StoreError::InvalidInput(missing))
}

impl SqliteStore {
    /// Files a new ticket reported by `actor`.
    ///
    /// Writes one log with no field changes alongside the ticket.
    pub fn create_ticket(
        &mut self,
        scope: &ScopeId,
        actor: &Actor,
        request: TicketCreateRequest,
    ) -> Result<TicketWrite, StoreError> {
        let reporter = require_authenticated(actor)?;
        let TicketCreateRequest {
            project,
            ticket_type,
            status,
            priority,
            component,
            assigned_to,
            subject,
            description,
            keywords,
            note,
        } = request;

        let subject = subject.trim().to_string();
        if subject.is_empty() {
            return Err(StoreError::InvalidInput("subject must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.write_tx()?;
        active_project_tx(&tx, scope, actor, project)?;

        let mut ticket = Ticket {
            id: TicketId(0),
            project,
            ticket_type: or_default(
                &tx,
                scope,
                TaxonomyKind::TicketType,
                ticket_type,
                TaxonomyRecord::ticket_type_id,
                "no default ticket type",
            )?,
            status: or_default(
                &tx,
                scope,
                TaxonomyKind::Status,
                status,
                TaxonomyRecord::status_id,
                "no default status",
            )?,
            priority: or_default(
                &tx,
                scope,
                TaxonomyKind::Priority,
                priority,
                TaxonomyRecord::priority_id,
                "no default priority",
            )?,
            component,
            assigned_to,
            reported_by: Some(reporter),
            subject,
            description,
            keywords,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };
        check_refs_tx(&tx, scope, &ticket)?;

        tx.execute(
            r#"
            INSERT INTO tickets(scope, project_id, ticket_type_id, status_id, priority_id, component_id,
                                assigned_to, reported_by, subject, description, keywords, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            "#,
            params![
                scope.as_str(),
                ticket.project.get(),
                ticket.ticket_type.get(),
                ticket.status.get(),
                ticket.priority.get(),
                ticket.component.map(|id| id.get()),
                ticket.assigned_to.map(UserId::get),
                reporter.get(),
                ticket.subject,
                ticket.description,
                ticket.keywords,
                now_ms
            ],
        )?;
        ticket.id = TicketId(tx.last_insert_rowid());

        let log = insert_log_tx(&tx, scope, ticket.id, Some(reporter), &note, Vec::new(), now_ms)?;
        tx.commit()?;
        tracing::info!(scope = %scope, project = %project, ticket = %ticket.id, "ticket created");
        Ok(TicketWrite { ticket, log })
    }
}
