#![forbid(unsafe_code)]

use super::*;
use std::collections::{BTreeMap, BTreeSet};
use tk_core::{
    Actor, Membership, ProjectId, RoleId, RosterEntry, ScopeId, TaxonomyKind, User, UserId,
};

impl SqliteStore {
    pub fn create_user(&mut self, username: &str, is_superuser: bool) -> Result<User, StoreError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(StoreError::InvalidInput("username must not be empty"));
        }
        let tx = self.write_tx()?;
        let inserted = tx.execute(
            "INSERT INTO users(username, is_superuser, is_active, created_at_ms) VALUES (?1, ?2, 1, ?3)",
            params![username, is_superuser, now_ms()],
        );
        if let Err(err) = inserted {
            if is_constraint_violation(&err) {
                return Err(StoreError::InvalidInput("username already exists"));
            }
            return Err(err.into());
        }
        let user = User {
            id: UserId(tx.last_insert_rowid()),
            username: username.to_string(),
            is_superuser,
            is_active: true,
        };
        tx.commit()?;
        Ok(user)
    }

    pub fn set_user_active(&mut self, id: UserId, is_active: bool) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE users SET is_active = ?2 WHERE id = ?1",
            params![id.get(), is_active],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub fn user(&self, id: UserId) -> Result<User, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.get()],
                user_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    /// Builds the acting party for `user` inside `scope`. Missing or inactive users are
    /// treated as anonymous.
    pub fn actor(&self, scope: &ScopeId, user: Option<UserId>) -> Result<Actor, StoreError> {
        let Some(user_id) = user else {
            return Ok(Actor::Anonymous);
        };
        let tx = self.read_tx()?;
        let user = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id.get()],
                user_from_row,
            )
            .optional()?;
        let Some(user) = user.filter(|user| user.is_active) else {
            return Ok(Actor::Anonymous);
        };

        let mut stmt =
            tx.prepare("SELECT project_id FROM memberships WHERE scope = ?1 AND user_id = ?2")?;
        let memberships = stmt
            .query_map(params![scope.as_str(), user.id.get()], |row| {
                row.get::<_, i64>(0).map(ProjectId)
            })?
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Actor::User {
            id: user.id,
            is_superuser: user.is_superuser,
            memberships,
        })
    }

    /// Replaces the membership set of `project` in one transaction.
    pub fn set_memberships(
        &mut self,
        scope: &ScopeId,
        project: ProjectId,
        members: Vec<MembershipInput>,
    ) -> Result<Vec<Membership>, StoreError> {
        let mut seen = BTreeSet::new();
        if !members.iter().all(|member| seen.insert(member.user)) {
            return Err(StoreError::InvalidInput("duplicate user in memberships"));
        }

        let tx = self.write_tx()?;
        project_tx(&tx, scope, project)?;
        for member in &members {
            ensure_taxonomy_tx(
                &tx,
                scope,
                TaxonomyKind::Role,
                member.role.get(),
                "unknown role",
            )?;
            if !user_exists_tx(&tx, member.user)? {
                return Err(StoreError::InvalidInput("unknown user"));
            }
        }

        tx.execute(
            "DELETE FROM memberships WHERE scope = ?1 AND project_id = ?2",
            params![scope.as_str(), project.get()],
        )?;
        for member in &members {
            tx.execute(
                "INSERT INTO memberships(scope, project_id, user_id, role_id) VALUES (?1, ?2, ?3, ?4)",
                params![
                    scope.as_str(),
                    project.get(),
                    member.user.get(),
                    member.role.get()
                ],
            )?;
        }
        tx.commit()?;
        tracing::info!(
            scope = %scope,
            project = %project,
            count = members.len(),
            "memberships replaced"
        );

        Ok(members
            .into_iter()
            .map(|member| Membership {
                project,
                user: member.user,
                role: member.role,
            })
            .collect())
    }

    pub fn memberships(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        project: ProjectId,
    ) -> Result<Vec<Membership>, StoreError> {
        let tx = self.read_tx()?;
        accessible_project_tx(&tx, scope, actor, project)?;
        let mut stmt = tx.prepare(
            "SELECT user_id, role_id FROM memberships WHERE scope = ?1 AND project_id = ?2 ORDER BY user_id",
        )?;
        let rows = stmt
            .query_map(params![scope.as_str(), project.get()], |row| {
                Ok(Membership {
                    project,
                    user: UserId(row.get(0)?),
                    role: RoleId(row.get(1)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Users who may be assigned tickets in `project`: its active members.
    pub fn assignable_users(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        project: ProjectId,
    ) -> Result<Vec<User>, StoreError> {
        let tx = self.read_tx()?;
        accessible_project_tx(&tx, scope, actor, project)?;
        let mut stmt = tx.prepare(
            r#"
            SELECT u.id, u.username, u.is_superuser, u.is_active
            FROM memberships m JOIN users u ON u.id = m.user_id
            WHERE m.scope = ?1 AND m.project_id = ?2 AND u.is_active = 1
            ORDER BY u.username
            "#,
        )?;
        let users = stmt
            .query_map(params![scope.as_str(), project.get()], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Every role in the scope with the users holding it on `project`.
    pub fn project_roster(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        project: ProjectId,
    ) -> Result<Vec<RosterEntry>, StoreError> {
        let tx = self.read_tx()?;
        accessible_project_tx(&tx, scope, actor, project)?;

        let mut holders: BTreeMap<i64, Vec<User>> = BTreeMap::new();
        {
            let mut stmt = tx.prepare(
                r#"
                SELECT m.role_id, u.id, u.username, u.is_superuser, u.is_active
                FROM memberships m JOIN users u ON u.id = m.user_id
                WHERE m.scope = ?1 AND m.project_id = ?2
                ORDER BY u.username
                "#,
            )?;
            let mut rows = stmt.query(params![scope.as_str(), project.get()])?;
            while let Some(row) = rows.next()? {
                let user = User {
                    id: UserId(row.get(1)?),
                    username: row.get(2)?,
                    is_superuser: row.get(3)?,
                    is_active: row.get(4)?,
                };
                holders.entry(row.get(0)?).or_default().push(user);
            }
        }

        let roles = list_taxonomy_tx(&tx, scope, TaxonomyKind::Role)?;
        Ok(roles
            .into_iter()
            .map(|role| RosterEntry {
                role: RoleId(role.id),
                users: holders.remove(&role.id).unwrap_or_default(),
                role_name: role.name,
            })
            .collect())
    }
}
