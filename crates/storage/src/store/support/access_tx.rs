#![forbid(unsafe_code)]

use super::rows::{
    PROJECT_COLUMNS, TAXONOMY_COLUMNS, TICKET_COLUMNS, project_from_row, taxonomy_from_row,
    ticket_from_row,
};
use crate::store::StoreError;
use rusqlite::{OptionalExtension, Transaction, params};
use tk_core::{
    Actor, Project, ProjectId, ProjectTree, ScopeId, TaxonomyKind, TaxonomyRecord, Ticket,
    TicketId, UserId, check_access,
};

pub(in crate::store) fn ensure_scope_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    now_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT OR IGNORE INTO scopes(scope, created_at_ms) VALUES (?1, ?2)",
        params![scope.as_str(), now_ms],
    )?;
    Ok(())
}

pub(in crate::store) fn load_tree_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
) -> Result<ProjectTree, StoreError> {
    let mut stmt = tx.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE scope = ?1"
    ))?;
    let projects = stmt
        .query_map(params![scope.as_str()], project_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ProjectTree::from_projects(projects))
}

pub(in crate::store) fn project_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    id: ProjectId,
) -> Result<Project, StoreError> {
    tx.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE scope = ?1 AND id = ?2"),
        params![scope.as_str(), id.get()],
        project_from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound)
}

/// Loads the project and applies the access policy. Every entry point exposing a
/// project or its tickets goes through here.
pub(in crate::store) fn accessible_project_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    actor: &Actor,
    id: ProjectId,
) -> Result<Project, StoreError> {
    let project = project_tx(tx, scope, id)?;
    if let Err(err) = check_access(&project, actor) {
        tracing::warn!(
            scope = %scope,
            project = %id,
            user = ?actor.user_id(),
            "project access denied"
        );
        return Err(err.into());
    }
    Ok(project)
}

/// Tickets are read and written only through active projects the actor can access.
/// An inactive project reads as missing.
pub(in crate::store) fn active_project_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    actor: &Actor,
    id: ProjectId,
) -> Result<Project, StoreError> {
    let project = accessible_project_tx(tx, scope, actor, id)?;
    if !project.is_active {
        return Err(StoreError::NotFound);
    }
    Ok(project)
}

pub(in crate::store) fn ticket_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    id: TicketId,
) -> Result<Ticket, StoreError> {
    tx.query_row(
        &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE scope = ?1 AND id = ?2"),
        params![scope.as_str(), id.get()],
        ticket_from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound)
}

pub(in crate::store) fn require_authenticated(actor: &Actor) -> Result<UserId, StoreError> {
    actor
        .user_id()
        .ok_or(StoreError::Forbidden { project: None })
}

pub(in crate::store) fn taxonomy_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    kind: TaxonomyKind,
    id: i64,
) -> Result<Option<TaxonomyRecord>, StoreError> {
    Ok(tx
        .query_row(
            &format!(
                "SELECT {TAXONOMY_COLUMNS} FROM taxonomy WHERE scope = ?1 AND kind = ?2 AND id = ?3"
            ),
            params![scope.as_str(), kind.as_str(), id],
            taxonomy_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn ensure_taxonomy_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    kind: TaxonomyKind,
    id: i64,
    message: &'static str,
) -> Result<TaxonomyRecord, StoreError> {
    taxonomy_tx(tx, scope, kind, id)?.ok_or(StoreError::InvalidInput(message))
}

pub(in crate::store) fn user_exists_tx(
    tx: &Transaction<'_>,
    id: UserId,
) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM users WHERE id = ?1",
            params![id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}
