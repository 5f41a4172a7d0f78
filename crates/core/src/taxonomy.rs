#![forbid(unsafe_code)]

use crate::ids::{PriorityId, RoleId, Slug, StatusId, TicketTypeId};
use serde::{Deserialize, Serialize};

/// Collections that carry an `is_default` flag. At most one record per collection
/// (per scope) may hold it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Role,
    Status,
    Priority,
    TicketType,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 4] = [
        TaxonomyKind::Role,
        TaxonomyKind::Status,
        TaxonomyKind::Priority,
        TaxonomyKind::TicketType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaxonomyKind::Role => "role",
            TaxonomyKind::Status => "status",
            TaxonomyKind::Priority => "priority",
            TaxonomyKind::TicketType => "ticket_type",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl std::fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyRecord {
    pub kind: TaxonomyKind,
    pub id: i64,
    pub name: String,
    pub slug: Slug,
    pub ordering: i64,
    pub is_default: bool,
    /// Status only: tickets in a closed status are no longer open.
    pub is_closed: bool,
    /// Role only: permission codenames granted to members holding the role.
    pub permissions: Vec<String>,
}

impl TaxonomyRecord {
    pub fn role_id(&self) -> Option<RoleId> {
        (self.kind == TaxonomyKind::Role).then_some(RoleId(self.id))
    }

    pub fn status_id(&self) -> Option<StatusId> {
        (self.kind == TaxonomyKind::Status).then_some(StatusId(self.id))
    }

    pub fn priority_id(&self) -> Option<PriorityId> {
        (self.kind == TaxonomyKind::Priority).then_some(PriorityId(self.id))
    }

    pub fn ticket_type_id(&self) -> Option<TicketTypeId> {
        (self.kind == TaxonomyKind::TicketType).then_some(TicketTypeId(self.id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DefaultError {
    #[error("{kind} collection has {count} default records")]
    InvariantViolation { kind: TaxonomyKind, count: usize },
}

/// Picks the unique flagged record. More than one flag is a consistency fault, not a
/// tie to break.
pub fn select_default<'a>(
    kind: TaxonomyKind,
    records: impl IntoIterator<Item = &'a TaxonomyRecord>,
) -> Result<Option<&'a TaxonomyRecord>, DefaultError> {
    let flagged = records
        .into_iter()
        .filter(|record| record.kind == kind && record.is_default)
        .collect::<Vec<_>>();
    match flagged.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(*only)),
        many => Err(DefaultError::InvariantViolation {
            kind,
            count: many.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: TaxonomyKind, id: i64, is_default: bool) -> TaxonomyRecord {
        TaxonomyRecord {
            kind,
            id,
            name: format!("r{id}"),
            slug: Slug::try_new(format!("r{id}")).unwrap(),
            ordering: id,
            is_default,
            is_closed: false,
            permissions: Vec::new(),
        }
    }

    #[test]
    fn select_default_cases() {
        let none = [record(TaxonomyKind::Status, 1, false)];
        assert_eq!(select_default(TaxonomyKind::Status, &none).unwrap(), None);

        let one = [
            record(TaxonomyKind::Status, 1, false),
            record(TaxonomyKind::Status, 2, true),
            record(TaxonomyKind::Priority, 3, true),
        ];
        let picked = select_default(TaxonomyKind::Status, &one).unwrap();
        assert_eq!(picked.map(|r| r.id), Some(2));

        let two = [
            record(TaxonomyKind::Priority, 1, true),
            record(TaxonomyKind::Priority, 2, true),
        ];
        assert_eq!(
            select_default(TaxonomyKind::Priority, &two).unwrap_err(),
            DefaultError::InvariantViolation {
                kind: TaxonomyKind::Priority,
                count: 2
            }
        );
    }

    #[test]
    fn typed_ids_follow_kind() {
        let status = record(TaxonomyKind::Status, 4, false);
        assert_eq!(status.status_id(), Some(StatusId(4)));
        assert_eq!(status.priority_id(), None);
    }
}
