#![forbid(unsafe_code)]

use super::*;
use tk_core::{Actor, Project, ProjectId, ScopeId, Slug};

impl SqliteStore {
    pub fn create_project(
        &mut self,
        scope: &ScopeId,
        request: ProjectCreateRequest,
    ) -> Result<Project, StoreError> {
        let ProjectCreateRequest {
            parent,
            name,
            slug,
            description,
            is_public,
            is_active,
        } = request;

        if name.trim().is_empty() {
            return Err(StoreError::InvalidInput("project name must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.write_tx()?;
        ensure_scope_tx(&tx, scope, now_ms)?;

        let tree = load_tree_tx(&tx, scope)?;
        tree.check_parent(None, parent)?;
        tree.check_slug_free(parent, &slug, None)?;

        tx.execute(
            r#"
            INSERT INTO projects(scope, parent_id, name, slug, description, is_public, is_active, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            params![
                scope.as_str(),
                parent.map(ProjectId::get),
                name,
                slug.as_str(),
                description,
                is_public,
                is_active,
                now_ms
            ],
        )
        .map_err(|err| map_slug_conflict(err, slug.as_str()))?;
        let id = ProjectId(tx.last_insert_rowid());
        let project = project_tx(&tx, scope, id)?;

        tx.commit()?;
        tracing::info!(scope = %scope, project = %id, slug = %project.slug, "project created");
        Ok(project)
    }

    pub fn update_project(
        &mut self,
        scope: &ScopeId,
        request: ProjectEditRequest,
    ) -> Result<Project, StoreError> {
        if request.is_empty() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }
        let ProjectEditRequest {
            id,
            parent,
            name,
            slug,
            description,
            is_public,
            is_active,
        } = request;

        if name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(StoreError::InvalidInput("project name must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.write_tx()?;
        let tree = load_tree_tx(&tx, scope)?;
        let current = tree.get(id).cloned().ok_or(StoreError::NotFound)?;

        let new_parent = parent.unwrap_or(current.parent);
        let new_slug = slug.unwrap_or(current.slug);
        tree.check_parent(Some(id), new_parent)?;
        tree.check_slug_free(new_parent, &new_slug, Some(id))?;

        tx.execute(
            r#"
            UPDATE projects
            SET parent_id = ?3,
                name = ?4,
                slug = ?5,
                description = ?6,
                is_public = ?7,
                is_active = ?8,
                updated_at_ms = ?9
            WHERE scope = ?1 AND id = ?2
            "#,
            params![
                scope.as_str(),
                id.get(),
                new_parent.map(ProjectId::get),
                name.unwrap_or(current.name),
                new_slug.as_str(),
                description.unwrap_or(current.description),
                is_public.unwrap_or(current.is_public),
                is_active.unwrap_or(current.is_active),
                now_ms
            ],
        )
        .map_err(|err| map_slug_conflict(err, new_slug.as_str()))?;
        let project = project_tx(&tx, scope, id)?;

        tx.commit()?;
        tracing::info!(scope = %scope, project = %id, "project updated");
        Ok(project)
    }

    /// Direct lookup by id, gated by the access policy.
    pub fn project(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        id: ProjectId,
    ) -> Result<Project, StoreError> {
        let tx = self.read_tx()?;
        accessible_project_tx(&tx, scope, actor, id)
    }

    /// Resolves a slug path for `actor`. An empty path yields `Ok(None)`; any slug that
    /// does not match an active, accessible project yields `NotFound`.
    pub fn resolve_project_path(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        slugs: &[Slug],
    ) -> Result<Option<Project>, StoreError> {
        if slugs.is_empty() {
            return Ok(None);
        }
        let tx = self.read_tx()?;
        let tree = load_tree_tx(&tx, scope)?;
        match tree.resolve(slugs, actor) {
            Ok(found) => Ok(found.cloned()),
            Err(err) => {
                tracing::debug!(
                    scope = %scope,
                    user = ?actor.user_id(),
                    error = %err,
                    "project path not resolved"
                );
                Err(err.into())
            }
        }
    }

    /// Slash-joined slug path of a project the actor can access.
    pub fn project_path(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        id: ProjectId,
    ) -> Result<String, StoreError> {
        let tx = self.read_tx()?;
        accessible_project_tx(&tx, scope, actor, id)?;
        Ok(load_tree_tx(&tx, scope)?.path_string(id)?)
    }

    /// Active projects visible to `actor`.
    pub fn visible_projects(
        &self,
        scope: &ScopeId,
        actor: &Actor,
    ) -> Result<Vec<Project>, StoreError> {
        let tx = self.read_tx()?;
        let tree = load_tree_tx(&tx, scope)?;
        Ok(tree.visible(actor).into_iter().cloned().collect())
    }
}
