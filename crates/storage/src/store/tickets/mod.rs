#![forbid(unsafe_code)]

mod create;
mod edit;
mod query;

use super::*;
use tk_core::{Actor, ProjectId, ScopeId, TaxonomyKind, Ticket, TicketId, UserId};

/// Every reference a ticket carries must exist in the scope, and its component must
/// belong to its project.
fn check_refs_tx(tx: &Transaction<'_>, scope: &ScopeId, ticket: &Ticket) -> Result<(), StoreError> {
    ensure_taxonomy_tx(
        tx,
        scope,
        TaxonomyKind::TicketType,
        ticket.ticket_type.get(),
        "unknown ticket type",
    )?;
    ensure_taxonomy_tx(tx, scope, TaxonomyKind::Status, ticket.status.get(), "unknown status")?;
    ensure_taxonomy_tx(
        tx,
        scope,
        TaxonomyKind::Priority,
        ticket.priority.get(),
        "unknown priority",
    )?;

    if let Some(component) = ticket.component {
        let owner = tx
            .query_row(
                "SELECT project_id FROM components WHERE scope = ?1 AND id = ?2",
                params![scope.as_str(), component.get()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if owner != Some(ticket.project.get()) {
            return Err(StoreError::InvalidInput("component does not belong to project"));
        }
    }
    if let Some(user) = ticket.assigned_to {
        ensure_active_user_tx(tx, user)?;
    }
    Ok(())
}

fn ensure_active_user_tx(tx: &Transaction<'_>, user: UserId) -> Result<(), StoreError> {
    let active = tx
        .query_row(
            "SELECT is_active FROM users WHERE id = ?1",
            params![user.get()],
            |row| row.get::<_, bool>(0),
        )
        .optional()?;
    match active {
        Some(true) => Ok(()),
        _ => Err(StoreError::InvalidInput("assignee must be an active user")),
    }
}
