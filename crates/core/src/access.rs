#![forbid(unsafe_code)]

use crate::ids::{ProjectId, UserId};
use crate::model::Project;
use std::collections::BTreeSet;

/// The acting party as reported by the identity layer.
///
/// `memberships` holds the projects the user has a direct Membership row on.
/// Ancestor memberships are never expanded into it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Actor {
    #[default]
    Anonymous,
    User {
        id: UserId,
        is_superuser: bool,
        memberships: BTreeSet<ProjectId>,
    },
}

impl Actor {
    pub fn user(id: UserId, memberships: impl IntoIterator<Item = ProjectId>) -> Self {
        Self::User {
            id,
            is_superuser: false,
            memberships: memberships.into_iter().collect(),
        }
    }

    pub fn superuser(id: UserId) -> Self {
        Self::User {
            id,
            is_superuser: true,
            memberships: BTreeSet::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    pub fn is_superuser(&self) -> bool {
        matches!(
            self,
            Self::User {
                is_superuser: true,
                ..
            }
        )
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User { id, .. } => Some(*id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("access to project {project} is forbidden")]
    Forbidden { project: ProjectId },
}

/// Superusers are members of everything; everyone else needs a row on this exact node.
pub fn is_member(project: &Project, actor: &Actor) -> bool {
    match actor {
        Actor::Anonymous => false,
        Actor::User {
            is_superuser: true, ..
        } => true,
        Actor::User { memberships, .. } => memberships.contains(&project.id),
    }
}

/// Must be called at every boundary that exposes a project or its tickets.
pub fn check_access(project: &Project, actor: &Actor) -> Result<(), AccessError> {
    if project.is_public || is_member(project, actor) {
        Ok(())
    } else {
        Err(AccessError::Forbidden {
            project: project.id,
        })
    }
}

/// Active and accessible: the filter applied at each path-resolution step.
pub fn is_visible(project: &Project, actor: &Actor) -> bool {
    project.is_active && check_access(project, actor).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Slug;
    use proptest::prelude::*;

    fn project(id: i64, is_public: bool, is_active: bool) -> Project {
        Project {
            id: ProjectId(id),
            parent: None,
            name: format!("p{id}"),
            slug: Slug::try_new(format!("p{id}")).unwrap(),
            description: String::new(),
            is_public,
            is_active,
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    }

    #[test]
    fn anonymous_sees_only_public() {
        assert!(check_access(&project(1, true, true), &Actor::Anonymous).is_ok());
        assert_eq!(
            check_access(&project(1, false, true), &Actor::Anonymous),
            Err(AccessError::Forbidden {
                project: ProjectId(1)
            })
        );
    }

    #[test]
    fn membership_is_not_inherited_from_parent() {
        let mut child = project(2, false, true);
        child.parent = Some(ProjectId(1));
        let actor = Actor::user(UserId(7), [ProjectId(1)]);
        assert!(is_member(&project(1, false, true), &actor));
        assert!(!is_member(&child, &actor));
        assert!(check_access(&child, &actor).is_err());
    }

    #[test]
    fn superuser_is_member_everywhere() {
        let actor = Actor::superuser(UserId(1));
        assert!(is_member(&project(9, false, true), &actor));
        assert!(actor.is_authenticated());
    }

    #[test]
    fn inactive_projects_are_not_visible() {
        let actor = Actor::superuser(UserId(1));
        assert!(!is_visible(&project(3, true, false), &actor));
        assert!(is_visible(&project(3, true, true), &actor));
    }

    fn arb_actor() -> impl Strategy<Value = Actor> {
        prop_oneof![
            Just(Actor::Anonymous),
            (1i64..50).prop_map(|id| Actor::superuser(UserId(id))),
            (1i64..50, prop::collection::btree_set(1i64..20, 0..6)).prop_map(|(id, projects)| {
                Actor::user(UserId(id), projects.into_iter().map(ProjectId))
            }),
        ]
    }

    proptest! {
        #[test]
        fn public_projects_never_deny(id in 1i64..20, active in any::<bool>(), actor in arb_actor()) {
            prop_assert!(check_access(&project(id, true, active), &actor).is_ok());
        }

        #[test]
        fn private_projects_require_superuser_or_direct_membership(
            id in 1i64..20,
            actor in arb_actor(),
        ) {
            let target = project(id, false, true);
            let allowed = match &actor {
                Actor::Anonymous => false,
                Actor::User { is_superuser, memberships, .. } => {
                    *is_superuser || memberships.contains(&ProjectId(id))
                }
            };
            prop_assert_eq!(check_access(&target, &actor).is_ok(), allowed);
        }
    }
}
