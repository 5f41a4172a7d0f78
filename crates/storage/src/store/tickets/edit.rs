#![forbid(unsafe_code)]

use super::*;
use crate::store::audit::insert_log_tx;
use tk_core::diff_tickets;

impl SqliteStore {
    /// Applies an edit and audits it against the row as it was inside the same
    /// transaction.
    pub fn update_ticket(
        &mut self,
        scope: &ScopeId,
        actor: &Actor,
        request: TicketEditRequest,
    ) -> Result<TicketWrite, StoreError> {
        if request.is_empty() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }
        let user = require_authenticated(actor)?;
        let TicketEditRequest {
            id,
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

        if subject.as_deref().is_some_and(|subject| subject.trim().is_empty()) {
            return Err(StoreError::InvalidInput("subject must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.write_tx()?;
        let old = ticket_tx(&tx, scope, id)?;
        active_project_tx(&tx, scope, actor, old.project)?;

        let mut new = old.clone();
        if let Some(project) = project
            && project != old.project
        {
            active_project_tx(&tx, scope, actor, project)?;
            new.project = project;
        }
        if let Some(ticket_type) = ticket_type {
            new.ticket_type = ticket_type;
        }
        if let Some(status) = status {
            new.status = status;
        }
        if let Some(priority) = priority {
            new.priority = priority;
        }
        if let Some(component) = component {
            new.component = component;
        }
        if let Some(assigned_to) = assigned_to {
            new.assigned_to = assigned_to;
        }
        if let Some(subject) = subject {
            new.subject = subject.trim().to_string();
        }
        if let Some(description) = description {
            new.description = description;
        }
        if let Some(keywords) = keywords {
            new.keywords = keywords;
        }
        new.updated_at_ms = now_ms;
        check_refs_tx(&tx, scope, &new)?;

        tx.execute(
            r#"
            UPDATE tickets
            SET project_id = ?3,
                ticket_type_id = ?4,
                status_id = ?5,
                priority_id = ?6,
                component_id = ?7,
                assigned_to = ?8,
                subject = ?9,
                description = ?10,
                keywords = ?11,
                updated_at_ms = ?12
            WHERE scope = ?1 AND id = ?2
            "#,
            params![
                scope.as_str(),
                id.get(),
                new.project.get(),
                new.ticket_type.get(),
                new.status.get(),
                new.priority.get(),
                new.component.map(|id| id.get()),
                new.assigned_to.map(UserId::get),
                new.subject,
                new.description,
                new.keywords,
                now_ms
            ],
        )?;

        let changes = diff_tickets(Some(&old), &new);
        let log = insert_log_tx(&tx, scope, id, Some(user), &note, changes, now_ms)?;
        tx.commit()?;
        Ok(TicketWrite { ticket: new, log })
    }
}
