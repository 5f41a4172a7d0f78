#![forbid(unsafe_code)]

use crate::ids::{
    ComponentId, PriorityId, ProjectId, RoleId, Slug, StatusId, TicketId, TicketTypeId, UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub parent: Option<ProjectId>,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub is_public: bool,
    pub is_active: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub project: ProjectId,
    pub user: UserId,
    pub role: RoleId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub is_superuser: bool,
    pub is_active: bool,
}

/// Per-project classification. Carries no default flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub project: ProjectId,
    pub name: String,
    pub slug: Slug,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub project: ProjectId,
    pub ticket_type: TicketTypeId,
    pub status: StatusId,
    pub priority: PriorityId,
    pub component: Option<ComponentId>,
    pub assigned_to: Option<UserId>,
    pub reported_by: Option<UserId>,
    pub subject: String,
    pub description: String,
    pub keywords: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Per ticket type: (open, total) ticket counts inside one project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTypeCount {
    pub ticket_type: TicketTypeId,
    pub name: String,
    pub open: u64,
    pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub role: RoleId,
    pub role_name: String,
    pub users: Vec<User>,
}
