#![forbid(unsafe_code)]

use tk_core::{
    ComponentId, LogEntry, PriorityId, ProjectId, RoleId, Slug, StatusId, TaxonomyKind, Ticket,
    TicketId, TicketTypeId, UserId,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectCreateRequest {
    pub parent: Option<ProjectId>,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub is_public: bool,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectEditRequest {
    pub id: ProjectId,
    pub parent: Option<Option<ProjectId>>,
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub is_active: Option<bool>,
}

impl ProjectEditRequest {
    pub fn new(id: ProjectId) -> Self {
        Self {
            id,
            parent: None,
            name: None,
            slug: None,
            description: None,
            is_public: None,
            is_active: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.parent.is_none()
            && self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MembershipInput {
    pub user: UserId,
    pub role: RoleId,
}

/// Insert when `id` is `None`, otherwise update that record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaxonomyWrite {
    pub kind: TaxonomyKind,
    pub id: Option<i64>,
    pub name: String,
    pub slug: Slug,
    pub ordering: i64,
    pub is_default: bool,
    pub is_closed: bool,
    pub permissions: Vec<String>,
}

impl TaxonomyWrite {
    pub fn new(kind: TaxonomyKind, name: impl Into<String>, slug: Slug) -> Self {
        Self {
            kind,
            id: None,
            name: name.into(),
            slug,
            ordering: 0,
            is_default: false,
            is_closed: false,
            permissions: Vec::new(),
        }
    }
}

/// Unset status, priority and ticket type fall back to the collection default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketCreateRequest {
    pub project: ProjectId,
    pub ticket_type: Option<TicketTypeId>,
    pub status: Option<StatusId>,
    pub priority: Option<PriorityId>,
    pub component: Option<ComponentId>,
    pub assigned_to: Option<UserId>,
    pub subject: String,
    pub description: String,
    pub keywords: String,
    pub note: String,
}

impl TicketCreateRequest {
    pub fn new(project: ProjectId, subject: impl Into<String>) -> Self {
        Self {
            project,
            ticket_type: None,
            status: None,
            priority: None,
            component: None,
            assigned_to: None,
            subject: subject.into(),
            description: String::new(),
            keywords: String::new(),
            note: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketEditRequest {
    pub id: TicketId,
    pub project: Option<ProjectId>,
    pub ticket_type: Option<TicketTypeId>,
    pub status: Option<StatusId>,
    pub priority: Option<PriorityId>,
    pub component: Option<Option<ComponentId>>,
    pub assigned_to: Option<Option<UserId>>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub note: String,
}

impl TicketEditRequest {
    pub fn new(id: TicketId) -> Self {
        Self {
            id,
            project: None,
            ticket_type: None,
            status: None,
            priority: None,
            component: None,
            assigned_to: None,
            subject: None,
            description: None,
            keywords: None,
            note: String::new(),
        }
    }

    fn touches_fields(&self) -> bool {
        self.project.is_some()
            || self.ticket_type.is_some()
            || self.status.is_some()
            || self.priority.is_some()
            || self.component.is_some()
            || self.assigned_to.is_some()
            || self.subject.is_some()
            || self.description.is_some()
            || self.keywords.is_some()
    }

    pub(crate) fn is_empty(&self) -> bool {
        !self.touches_fields() && self.note.trim().is_empty()
    }
}

/// Result of a ticket write: the persisted ticket and the log anchoring the change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketWrite {
    pub ticket: Ticket,
    pub log: LogEntry,
}
