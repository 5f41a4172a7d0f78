#![forbid(unsafe_code)]

use super::*;
use tk_core::{
    Actor, Component, ComponentId, ProjectId, ScopeId, Slug, TaxonomyKind, TaxonomyRecord,
};

impl SqliteStore {
    /// Inserts or updates a taxonomy record.
    ///
    /// When the record is flagged default, every other record of the same collection is
    /// cleared in the same immediate transaction, so no reader ever observes two
    /// defaults or a gap between the old and the new one.
    pub fn save_taxonomy(
        &mut self,
        scope: &ScopeId,
        write: TaxonomyWrite,
    ) -> Result<TaxonomyRecord, StoreError> {
        let TaxonomyWrite {
            kind,
            id,
            name,
            slug,
            ordering,
            is_default,
            is_closed,
            permissions,
        } = write;

        if name.trim().is_empty() {
            return Err(StoreError::InvalidInput("name must not be empty"));
        }
        if is_closed && kind != TaxonomyKind::Status {
            return Err(StoreError::InvalidInput("only statuses can be closed"));
        }
        if !permissions.is_empty() && kind != TaxonomyKind::Role {
            return Err(StoreError::InvalidInput("only roles carry permissions"));
        }
        let permissions_json = serde_json::to_string(&permissions)
            .map_err(|_| StoreError::InvalidInput("permissions are not serializable"))?;

        let now_ms = now_ms();
        let tx = self.write_tx()?;
        ensure_scope_tx(&tx, scope, now_ms)?;

        let id = match id {
            Some(id) => {
                let changed = tx
                    .execute(
                        r#"
                        UPDATE taxonomy
                        SET name = ?4, slug = ?5, ordering = ?6, is_default = ?7, is_closed = ?8, permissions_json = ?9
                        WHERE scope = ?1 AND kind = ?2 AND id = ?3
                        "#,
                        params![
                            scope.as_str(),
                            kind.as_str(),
                            id,
                            name,
                            slug.as_str(),
                            ordering,
                            is_default,
                            is_closed,
                            permissions_json
                        ],
                    )
                    .map_err(|err| map_slug_conflict(err, slug.as_str()))?;
                if changed == 0 {
                    return Err(StoreError::NotFound);
                }
                id
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO taxonomy(scope, kind, name, slug, ordering, is_default, is_closed, permissions_json)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    "#,
                    params![
                        scope.as_str(),
                        kind.as_str(),
                        name,
                        slug.as_str(),
                        ordering,
                        is_default,
                        is_closed,
                        permissions_json
                    ],
                )
                .map_err(|err| map_slug_conflict(err, slug.as_str()))?;
                tx.last_insert_rowid()
            }
        };

        if is_default {
            let cleared = clear_other_defaults_tx(&tx, scope, kind, id)?;
            if cleared > 0 {
                tracing::info!(scope = %scope, kind = %kind, id, cleared, "default moved");
            }
        }

        let record = taxonomy_tx(&tx, scope, kind, id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;
        Ok(record)
    }

    /// The unique default of a collection, `None` when nothing is flagged yet.
    pub fn default_of(
        &self,
        scope: &ScopeId,
        kind: TaxonomyKind,
    ) -> Result<Option<TaxonomyRecord>, StoreError> {
        let tx = self.read_tx()?;
        default_tx(&tx, scope, kind)
    }

    pub fn taxonomy(
        &self,
        scope: &ScopeId,
        kind: TaxonomyKind,
        id: i64,
    ) -> Result<TaxonomyRecord, StoreError> {
        let tx = self.read_tx()?;
        taxonomy_tx(&tx, scope, kind, id)?.ok_or(StoreError::NotFound)
    }

    pub fn list_taxonomy(
        &self,
        scope: &ScopeId,
        kind: TaxonomyKind,
    ) -> Result<Vec<TaxonomyRecord>, StoreError> {
        let tx = self.read_tx()?;
        list_taxonomy_tx(&tx, scope, kind)
    }

    pub fn create_component(
        &mut self,
        scope: &ScopeId,
        project: ProjectId,
        name: &str,
        slug: Slug,
    ) -> Result<Component, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("name must not be empty"));
        }
        let tx = self.write_tx()?;
        project_tx(&tx, scope, project)?;
        tx.execute(
            "INSERT INTO components(scope, project_id, name, slug) VALUES (?1, ?2, ?3, ?4)",
            params![scope.as_str(), project.get(), name, slug.as_str()],
        )
        .map_err(|err| map_slug_conflict(err, slug.as_str()))?;
        let component = Component {
            id: ComponentId(tx.last_insert_rowid()),
            project,
            name: name.to_string(),
            slug,
        };
        tx.commit()?;
        Ok(component)
    }

    pub fn list_components(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        project: ProjectId,
    ) -> Result<Vec<Component>, StoreError> {
        let tx = self.read_tx()?;
        accessible_project_tx(&tx, scope, actor, project)?;
        let mut stmt = tx.prepare(
            "SELECT id, project_id, name, slug FROM components WHERE scope = ?1 AND project_id = ?2 ORDER BY name, id",
        )?;
        let components = stmt
            .query_map(params![scope.as_str(), project.get()], component_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(components)
    }
}
