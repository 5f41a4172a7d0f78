#![forbid(unsafe_code)]

//! Arena of projects keyed by id with a parent → children index.
//!
//! Records hold only their parent id; child sets are derived from the index so the
//! tree never needs back-references.

use crate::access::{Actor, is_visible};
use crate::ids::{ProjectId, Slug};
use crate::model::Project;
use std::collections::{BTreeMap, BTreeSet};

const MAX_TREE_DEPTH: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no visible project matches slug {slug:?} at depth {depth}")]
    NotFound { depth: usize, slug: Slug },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("unknown project {0}")]
    UnknownProject(ProjectId),
    #[error("project parent would form a cycle")]
    ParentCycle,
    #[error("slug {slug:?} is already used by a sibling")]
    SlugTaken { slug: Slug },
    #[error("project tree is deeper than {MAX_TREE_DEPTH}")]
    DepthExceeded,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectTree {
    nodes: BTreeMap<ProjectId, Project>,
    children: BTreeMap<Option<ProjectId>, Vec<ProjectId>>,
}

impl ProjectTree {
    pub fn from_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let nodes = projects
            .into_iter()
            .map(|project| (project.id, project))
            .collect::<BTreeMap<_, _>>();

        let mut children: BTreeMap<Option<ProjectId>, Vec<ProjectId>> = BTreeMap::new();
        for project in nodes.values() {
            children.entry(project.parent).or_default().push(project.id);
        }
        for ids in children.values_mut() {
            ids.sort_by(|a, b| {
                let (a, b) = (&nodes[a], &nodes[b]);
                a.name.cmp(&b.name).then(a.id.cmp(&b.id))
            });
        }

        Self { nodes, children }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.nodes.get(&id)
    }

    pub fn children_of(&self, parent: Option<ProjectId>) -> impl Iterator<Item = &Project> {
        self.children
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
    }

    /// Walks `slugs` from the roots downward.
    ///
    /// Each step only considers active projects the actor may access. The first slug
    /// without a match aborts the walk; there is no partial result. An empty sequence
    /// resolves to `None`.
    pub fn resolve(&self, slugs: &[Slug], actor: &Actor) -> Result<Option<&Project>, ResolveError> {
        let mut current: Option<&Project> = None;
        for (depth, slug) in slugs.iter().enumerate() {
            let scope = current.map(|project| project.id);
            let next = self
                .children_of(scope)
                .find(|candidate| &candidate.slug == slug && is_visible(candidate, actor));
            match next {
                Some(project) => current = Some(project),
                None => {
                    return Err(ResolveError::NotFound {
                        depth,
                        slug: slug.clone(),
                    });
                }
            }
        }
        Ok(current)
    }

    /// Ancestor ids, nearest parent first.
    pub fn ancestors(&self, id: ProjectId) -> Result<Vec<ProjectId>, TreeError> {
        let mut node = self.get(id).ok_or(TreeError::UnknownProject(id))?;
        let mut out = Vec::new();
        let mut seen = BTreeSet::from([id]);
        while let Some(parent) = node.parent {
            if !seen.insert(parent) {
                return Err(TreeError::ParentCycle);
            }
            if out.len() >= MAX_TREE_DEPTH {
                return Err(TreeError::DepthExceeded);
            }
            out.push(parent);
            node = self.get(parent).ok_or(TreeError::UnknownProject(parent))?;
        }
        Ok(out)
    }

    pub fn path_of(&self, id: ProjectId) -> Result<Vec<Slug>, TreeError> {
        let mut ids = self.ancestors(id)?;
        ids.reverse();
        ids.push(id);
        ids.into_iter()
            .map(|id| {
                self.get(id)
                    .map(|project| project.slug.clone())
                    .ok_or(TreeError::UnknownProject(id))
            })
            .collect()
    }

    pub fn path_string(&self, id: ProjectId) -> Result<String, TreeError> {
        Ok(self
            .path_of(id)?
            .iter()
            .map(Slug::as_str)
            .collect::<Vec<_>>()
            .join("/"))
    }

    pub fn is_descendant(&self, candidate: ProjectId, of: ProjectId) -> Result<bool, TreeError> {
        Ok(self.ancestors(candidate)?.contains(&of))
    }

    /// Rejects re-parenting `project` under itself or one of its descendants.
    pub fn check_parent(
        &self,
        project: Option<ProjectId>,
        new_parent: Option<ProjectId>,
    ) -> Result<(), TreeError> {
        let Some(parent) = new_parent else {
            return Ok(());
        };
        if !self.nodes.contains_key(&parent) {
            return Err(TreeError::UnknownProject(parent));
        }
        let Some(project) = project else {
            return Ok(());
        };
        if parent == project || self.is_descendant(parent, project)? {
            return Err(TreeError::ParentCycle);
        }
        Ok(())
    }

    pub fn check_slug_free(
        &self,
        parent: Option<ProjectId>,
        slug: &Slug,
        except: Option<ProjectId>,
    ) -> Result<(), TreeError> {
        let taken = self
            .children_of(parent)
            .any(|sibling| &sibling.slug == slug && Some(sibling.id) != except);
        if taken {
            return Err(TreeError::SlugTaken { slug: slug.clone() });
        }
        Ok(())
    }

    /// Active projects the actor may see, roots first then by parent and name.
    pub fn visible(&self, actor: &Actor) -> Vec<&Project> {
        let mut out = self
            .nodes
            .values()
            .filter(|project| is_visible(project, actor))
            .collect::<Vec<_>>();
        out.sort_by(|a, b| {
            a.parent
                .cmp(&b.parent)
                .then_with(|| a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;
    use proptest::prelude::*;

    fn node(id: i64, parent: Option<i64>, slug: &str) -> Project {
        Project {
            id: ProjectId(id),
            parent: parent.map(ProjectId),
            name: slug.to_string(),
            slug: Slug::try_new(slug).unwrap(),
            description: String::new(),
            is_public: true,
            is_active: true,
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    }

    fn slugs(path: &str) -> Vec<Slug> {
        Slug::split_path(path).unwrap()
    }

    fn acme() -> ProjectTree {
        ProjectTree::from_projects([
            node(1, None, "acme"),
            node(2, Some(1), "web"),
            node(3, Some(2), "api"),
            node(4, None, "other"),
            node(5, Some(4), "web"),
        ])
    }

    #[test]
    fn resolves_descending_path() {
        let tree = acme();
        let found = tree.resolve(&slugs("acme/web"), &Actor::Anonymous).unwrap();
        assert_eq!(found.map(|p| p.id), Some(ProjectId(2)));

        let found = tree.resolve(&slugs("other/web"), &Actor::Anonymous).unwrap();
        assert_eq!(found.map(|p| p.id), Some(ProjectId(5)));
    }

    #[test]
    fn unknown_slug_aborts_without_partial_match() {
        let tree = acme();
        let err = tree
            .resolve(&slugs("acme/missing"), &Actor::Anonymous)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                depth: 1,
                slug: Slug::try_new("missing").unwrap()
            }
        );
        assert!(tree.resolve(&slugs("web"), &Actor::Anonymous).is_err());
        assert!(tree.resolve(&slugs("acme/api"), &Actor::Anonymous).is_err());
    }

    #[test]
    fn empty_path_is_no_project() {
        assert_eq!(acme().resolve(&[], &Actor::Anonymous).unwrap(), None);
    }

    #[test]
    fn private_node_blocks_strangers_but_not_members() {
        let mut web = node(2, Some(1), "web");
        web.is_public = false;
        let tree = ProjectTree::from_projects([node(1, None, "acme"), web]);

        assert!(tree.resolve(&slugs("acme/web"), &Actor::Anonymous).is_err());
        let stranger = Actor::user(UserId(3), [ProjectId(1)]);
        assert!(tree.resolve(&slugs("acme/web"), &stranger).is_err());
        let member = Actor::user(UserId(4), [ProjectId(2)]);
        assert!(tree.resolve(&slugs("acme/web"), &member).unwrap().is_some());
        let root = Actor::superuser(UserId(5));
        assert!(tree.resolve(&slugs("acme/web"), &root).unwrap().is_some());
    }

    #[test]
    fn paths_and_cycle_guard() {
        let tree = acme();
        assert_eq!(tree.path_string(ProjectId(3)).unwrap(), "acme/web/api");
        assert_eq!(
            tree.ancestors(ProjectId(3)).unwrap(),
            vec![ProjectId(2), ProjectId(1)]
        );
        assert_eq!(
            tree.check_parent(Some(ProjectId(1)), Some(ProjectId(3))),
            Err(TreeError::ParentCycle)
        );
        assert_eq!(
            tree.check_parent(Some(ProjectId(1)), Some(ProjectId(1))),
            Err(TreeError::ParentCycle)
        );
        assert!(tree.check_parent(Some(ProjectId(3)), Some(ProjectId(4))).is_ok());
        assert_eq!(
            tree.check_parent(None, Some(ProjectId(99))),
            Err(TreeError::UnknownProject(ProjectId(99)))
        );
    }

    #[test]
    fn sibling_slugs_must_be_unique() {
        let tree = acme();
        let web = Slug::try_new("web").unwrap();
        assert!(tree.check_slug_free(Some(ProjectId(1)), &web, None).is_err());
        assert!(
            tree.check_slug_free(Some(ProjectId(1)), &web, Some(ProjectId(2)))
                .is_ok()
        );
        assert!(tree.check_slug_free(None, &web, None).is_ok());
    }

    #[test]
    fn visible_listing_orders_roots_first() {
        let mut tree_nodes = vec![node(1, None, "zeta"), node(2, None, "alpha")];
        let mut hidden = node(3, Some(2), "hidden");
        hidden.is_active = false;
        tree_nodes.push(hidden);
        tree_nodes.push(node(4, Some(2), "beta"));
        let tree = ProjectTree::from_projects(tree_nodes);
        let ids = tree
            .visible(&Actor::Anonymous)
            .iter()
            .map(|p| p.id.get())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 1, 4]);
    }

    fn arb_tree() -> impl Strategy<Value = Vec<Project>> {
        prop::collection::vec(any::<prop::sample::Index>(), 1..24).prop_map(|picks| {
            let mut out: Vec<Project> = Vec::new();
            for (i, pick) in picks.into_iter().enumerate() {
                let id = i as i64 + 1;
                // Slot 0 means "root", otherwise the parent is an earlier node.
                let slot = pick.index(out.len() + 1);
                let parent = (slot > 0).then(|| out[slot - 1].id.get());
                out.push(node(id, parent, &format!("n{id}")));
            }
            out
        })
    }

    proptest! {
        #[test]
        fn every_node_resolves_by_its_own_path(projects in arb_tree()) {
            let tree = ProjectTree::from_projects(projects.clone());
            for project in &projects {
                let path = tree.path_of(project.id).unwrap();
                let found = tree.resolve(&path, &Actor::Anonymous).unwrap();
                prop_assert_eq!(found.map(|p| p.id), Some(project.id));
            }
        }

        #[test]
        fn one_wrong_slug_is_not_found(projects in arb_tree(), pick in any::<prop::sample::Index>()) {
            let tree = ProjectTree::from_projects(projects.clone());
            let target = &projects[pick.index(projects.len())];
            let mut path = tree.path_of(target.id).unwrap();
            let at = pick.index(path.len());
            path[at] = Slug::try_new("nope").unwrap();
            let resolved = tree.resolve(&path, &Actor::Anonymous);
            prop_assert!(
                matches!(resolved, Err(ResolveError::NotFound { depth, .. }) if depth == at),
                "expected NotFound at depth {}, got {:?}", at, resolved
            );
        }

        #[test]
        fn inactive_node_hides_its_whole_path(projects in arb_tree(), pick in any::<prop::sample::Index>()) {
            let mut projects = projects;
            let victim = pick.index(projects.len());
            projects[victim].is_active = false;
            let victim_id = projects[victim].id;
            let tree = ProjectTree::from_projects(projects.clone());
            for project in &projects {
                let path = tree.path_of(project.id).unwrap();
                let through_victim = project.id == victim_id
                    || tree.is_descendant(project.id, victim_id).unwrap();
                let resolved = tree.resolve(&path, &Actor::Anonymous);
                prop_assert_eq!(resolved.is_err(), through_victim);
            }
        }

        #[test]
        fn truncating_a_path_never_resolves_deeper(projects in arb_tree(), pick in any::<prop::sample::Index>()) {
            let tree = ProjectTree::from_projects(projects.clone());
            let target = &projects[pick.index(projects.len())];
            let mut path = tree.path_of(target.id).unwrap();
            path.remove(0);
            // Any path that skips the root cannot reach the target.
            if let Ok(Some(found)) = tree.resolve(&path, &Actor::Anonymous) {
                prop_assert_ne!(found.id, target.id);
            }
        }
    }
}
