#![forbid(unsafe_code)]

use rusqlite::Row;
use rusqlite::types::Type;
use tk_core::{
    Component, ComponentId, PriorityId, Project, ProjectId, Slug, StatusId, TaxonomyKind,
    TaxonomyRecord, Ticket, TicketId, TicketTypeId, User, UserId,
};

pub(in crate::store) const PROJECT_COLUMNS: &str =
    "id, parent_id, name, slug, description, is_public, is_active, created_at_ms, updated_at_ms";

pub(in crate::store) const TICKET_COLUMNS: &str = "id, project_id, ticket_type_id, status_id, priority_id, component_id, \
     assigned_to, reported_by, subject, description, keywords, created_at_ms, updated_at_ms";

pub(in crate::store) const TAXONOMY_COLUMNS: &str =
    "id, kind, name, slug, ordering, is_default, is_closed, permissions_json";

pub(in crate::store) const USER_COLUMNS: &str = "id, username, is_superuser, is_active";

pub(in crate::store) fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn slug_at(row: &Row<'_>, index: usize) -> rusqlite::Result<Slug> {
    Slug::try_new(row.get::<_, String>(index)?).map_err(|err| conversion_error(index, err))
}

pub(in crate::store) fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: ProjectId(row.get(0)?),
        parent: row.get::<_, Option<i64>>(1)?.map(ProjectId),
        name: row.get(2)?,
        slug: slug_at(row, 3)?,
        description: row.get(4)?,
        is_public: row.get(5)?,
        is_active: row.get(6)?,
        created_at_ms: row.get(7)?,
        updated_at_ms: row.get(8)?,
    })
}

pub(in crate::store) fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: TicketId(row.get(0)?),
        project: ProjectId(row.get(1)?),
        ticket_type: TicketTypeId(row.get(2)?),
        status: StatusId(row.get(3)?),
        priority: PriorityId(row.get(4)?),
        component: row.get::<_, Option<i64>>(5)?.map(ComponentId),
        assigned_to: row.get::<_, Option<i64>>(6)?.map(UserId),
        reported_by: row.get::<_, Option<i64>>(7)?.map(UserId),
        subject: row.get(8)?,
        description: row.get(9)?,
        keywords: row.get(10)?,
        created_at_ms: row.get(11)?,
        updated_at_ms: row.get(12)?,
    })
}

#[derive(Debug, thiserror::Error)]
#[error("unknown taxonomy kind {0:?}")]
struct UnknownKind(String);

pub(in crate::store) fn taxonomy_from_row(row: &Row<'_>) -> rusqlite::Result<TaxonomyRecord> {
    let raw_kind = row.get::<_, String>(1)?;
    let kind = TaxonomyKind::parse(&raw_kind)
        .ok_or_else(|| conversion_error(1, UnknownKind(raw_kind)))?;
    let permissions_json = row.get::<_, String>(7)?;
    let permissions = serde_json::from_str::<Vec<String>>(&permissions_json)
        .map_err(|err| conversion_error(7, err))?;
    Ok(TaxonomyRecord {
        kind,
        id: row.get(0)?,
        name: row.get(2)?,
        slug: slug_at(row, 3)?,
        ordering: row.get(4)?,
        is_default: row.get(5)?,
        is_closed: row.get(6)?,
        permissions,
    })
}

pub(in crate::store) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        username: row.get(1)?,
        is_superuser: row.get(2)?,
        is_active: row.get(3)?,
    })
}

pub(in crate::store) fn component_from_row(row: &Row<'_>) -> rusqlite::Result<Component> {
    Ok(Component {
        id: ComponentId(row.get(0)?),
        project: ProjectId(row.get(1)?),
        name: row.get(2)?,
        slug: slug_at(row, 3)?,
    })
}
