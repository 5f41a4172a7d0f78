#![forbid(unsafe_code)]

//! Field-level diff of two ticket snapshots.

use crate::ids::{
    ComponentId, LogId, PriorityId, ProjectId, StatusId, TicketId, TicketTypeId, UserId,
};
use crate::model::Ticket;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedField {
    Project,
    TicketType,
    Component,
    AssignedTo,
    Status,
    Priority,
}

impl TrackedField {
    /// Comparison order; ChangeLog rows are emitted in this order.
    pub const ALL: [TrackedField; 6] = [
        TrackedField::Project,
        TrackedField::TicketType,
        TrackedField::Component,
        TrackedField::AssignedTo,
        TrackedField::Status,
        TrackedField::Priority,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TrackedField::Project => "project",
            TrackedField::TicketType => "ticket_type",
            TrackedField::Component => "component",
            TrackedField::AssignedTo => "assigned_to",
            TrackedField::Status => "status",
            TrackedField::Priority => "priority",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == value)
    }

    pub fn entity_kind(self) -> EntityKind {
        match self {
            TrackedField::Project => EntityKind::Project,
            TrackedField::TicketType => EntityKind::TicketType,
            TrackedField::Component => EntityKind::Component,
            TrackedField::AssignedTo => EntityKind::User,
            TrackedField::Status => EntityKind::Status,
            TrackedField::Priority => EntityKind::Priority,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    User,
    Status,
    Priority,
    Component,
    TicketType,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::User => "user",
            EntityKind::Status => "status",
            EntityKind::Priority => "priority",
            EntityKind::Component => "component",
            EntityKind::TicketType => "ticket_type",
        }
    }
}

/// One changed tracked field. Each variant carries its own id type; `None` means unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldChange {
    Project {
        old: Option<ProjectId>,
        new: Option<ProjectId>,
    },
    TicketType {
        old: Option<TicketTypeId>,
        new: Option<TicketTypeId>,
    },
    Component {
        old: Option<ComponentId>,
        new: Option<ComponentId>,
    },
    AssignedTo {
        old: Option<UserId>,
        new: Option<UserId>,
    },
    Status {
        old: Option<StatusId>,
        new: Option<StatusId>,
    },
    Priority {
        old: Option<PriorityId>,
        new: Option<PriorityId>,
    },
}

impl FieldChange {
    pub fn field(&self) -> TrackedField {
        match self {
            FieldChange::Project { .. } => TrackedField::Project,
            FieldChange::TicketType { .. } => TrackedField::TicketType,
            FieldChange::Component { .. } => TrackedField::Component,
            FieldChange::AssignedTo { .. } => TrackedField::AssignedTo,
            FieldChange::Status { .. } => TrackedField::Status,
            FieldChange::Priority { .. } => TrackedField::Priority,
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        self.field().entity_kind()
    }

    /// Untyped `(old, new)` ids for persistence.
    pub fn raw_ids(&self) -> (Option<i64>, Option<i64>) {
        match *self {
            FieldChange::Project { old, new } => (old.map(|id| id.0), new.map(|id| id.0)),
            FieldChange::TicketType { old, new } => (old.map(|id| id.0), new.map(|id| id.0)),
            FieldChange::Component { old, new } => (old.map(|id| id.0), new.map(|id| id.0)),
            FieldChange::AssignedTo { old, new } => (old.map(|id| id.0), new.map(|id| id.0)),
            FieldChange::Status { old, new } => (old.map(|id| id.0), new.map(|id| id.0)),
            FieldChange::Priority { old, new } => (old.map(|id| id.0), new.map(|id| id.0)),
        }
    }

    pub fn from_raw(field: TrackedField, old: Option<i64>, new: Option<i64>) -> Self {
        match field {
            TrackedField::Project => FieldChange::Project {
                old: old.map(ProjectId),
                new: new.map(ProjectId),
            },
            TrackedField::TicketType => FieldChange::TicketType {
                old: old.map(TicketTypeId),
                new: new.map(TicketTypeId),
            },
            TrackedField::Component => FieldChange::Component {
                old: old.map(ComponentId),
                new: new.map(ComponentId),
            },
            TrackedField::AssignedTo => FieldChange::AssignedTo {
                old: old.map(UserId),
                new: new.map(UserId),
            },
            TrackedField::Status => FieldChange::Status {
                old: old.map(StatusId),
                new: new.map(StatusId),
            },
            TrackedField::Priority => FieldChange::Priority {
                old: old.map(PriorityId),
                new: new.map(PriorityId),
            },
        }
    }
}

/// One audit record per ticket mutation. `changes` may be empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogId,
    pub ticket: TicketId,
    pub note: String,
    pub actor: Option<UserId>,
    pub created_at_ms: i64,
    pub changes: Vec<FieldChange>,
}

fn changed<T: PartialEq + Copy>(old: Option<T>, new: Option<T>) -> Option<(Option<T>, Option<T>)> {
    (old != new).then_some((old, new))
}

/// Compares the tracked fields of two snapshots of the same ticket.
///
/// Returns nothing when there is no prior snapshot or the snapshots name different
/// tickets. Subject, description and keywords are never compared.
pub fn diff_tickets(old: Option<&Ticket>, new: &Ticket) -> Vec<FieldChange> {
    let Some(old) = old else {
        return Vec::new();
    };
    if old.id != new.id {
        return Vec::new();
    }

    let mut out = Vec::new();
    for field in TrackedField::ALL {
        let change = match field {
            TrackedField::Project => changed(Some(old.project), Some(new.project))
                .map(|(old, new)| FieldChange::Project { old, new }),
            TrackedField::TicketType => changed(Some(old.ticket_type), Some(new.ticket_type))
                .map(|(old, new)| FieldChange::TicketType { old, new }),
            TrackedField::Component => changed(old.component, new.component)
                .map(|(old, new)| FieldChange::Component { old, new }),
            TrackedField::AssignedTo => changed(old.assigned_to, new.assigned_to)
                .map(|(old, new)| FieldChange::AssignedTo { old, new }),
            TrackedField::Status => changed(Some(old.status), Some(new.status))
                .map(|(old, new)| FieldChange::Status { old, new }),
            TrackedField::Priority => changed(Some(old.priority), Some(new.priority))
                .map(|(old, new)| FieldChange::Priority { old, new }),
        };
        out.extend(change);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: PriorityId = PriorityId(1);
    const HIGH: PriorityId = PriorityId(2);
    const OPEN: StatusId = StatusId(1);
    const ALICE: UserId = UserId(10);

    fn ticket() -> Ticket {
        Ticket {
            id: TicketId(1),
            project: ProjectId(1),
            ticket_type: TicketTypeId(1),
            status: OPEN,
            priority: LOW,
            component: None,
            assigned_to: None,
            reported_by: Some(UserId(2)),
            subject: "Crash".to_string(),
            description: "It crashes".to_string(),
            keywords: "crash".to_string(),
            created_at_ms: 1,
            updated_at_ms: 1,
        }
    }

    #[test]
    fn no_tracked_change_yields_nothing() {
        let old = ticket();
        let mut new = old.clone();
        new.updated_at_ms = 2;
        assert!(diff_tickets(Some(&old), &new).is_empty());
    }

    #[test]
    fn untracked_text_fields_are_ignored() {
        let old = ticket();
        let mut new = old.clone();
        new.subject = "Crash on save".to_string();
        new.description = "Details".to_string();
        new.keywords = "save".to_string();
        new.status = StatusId(2);
        assert_eq!(
            diff_tickets(Some(&old), &new),
            vec![FieldChange::Status {
                old: Some(OPEN),
                new: Some(StatusId(2))
            }]
        );
    }

    #[test]
    fn priority_and_assignee_change_in_field_order() {
        let old = ticket();
        let mut new = old.clone();
        new.priority = HIGH;
        new.assigned_to = Some(ALICE);
        assert_eq!(
            diff_tickets(Some(&old), &new),
            vec![
                FieldChange::AssignedTo {
                    old: None,
                    new: Some(ALICE)
                },
                FieldChange::Priority {
                    old: Some(LOW),
                    new: Some(HIGH)
                },
            ]
        );
    }

    #[test]
    fn unsetting_records_absent_new_id() {
        let mut old = ticket();
        old.component = Some(ComponentId(5));
        let mut new = old.clone();
        new.component = None;
        let changes = diff_tickets(Some(&old), &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].entity_kind(), EntityKind::Component);
        assert_eq!(changes[0].raw_ids(), (Some(5), None));
    }

    #[test]
    fn creation_and_identity_mismatch_yield_nothing() {
        let new = ticket();
        assert!(diff_tickets(None, &new).is_empty());
        let mut other = ticket();
        other.id = TicketId(2);
        other.priority = HIGH;
        assert!(diff_tickets(Some(&other), &new).is_empty());
    }

    #[test]
    fn raw_round_trip_keeps_kind() {
        let change = FieldChange::AssignedTo {
            old: Some(UserId(1)),
            new: None,
        };
        let (old, new) = change.raw_ids();
        assert_eq!(FieldChange::from_raw(change.field(), old, new), change);
        assert_eq!(change.entity_kind(), EntityKind::User);
        assert_eq!(TrackedField::parse("assigned_to"), Some(TrackedField::AssignedTo));
        assert_eq!(TrackedField::parse("subject"), None);
    }
}
