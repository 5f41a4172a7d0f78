#![forbid(unsafe_code)]

use super::*;
use std::collections::BTreeMap;
use tk_core::{
    Actor, FieldChange, LogEntry, LogId, ScopeId, Ticket, TicketId, TrackedField, UserId,
    diff_tickets,
};

/// Writes one log row and its change rows. `changes` keeps its order as `seq`.
pub(super) fn insert_log_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    ticket: TicketId,
    actor: Option<UserId>,
    note: &str,
    changes: Vec<FieldChange>,
    now_ms: i64,
) -> Result<LogEntry, StoreError> {
    tx.execute(
        "INSERT INTO ticket_logs(scope, ticket_id, note, actor_id, created_at_ms) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            scope.as_str(),
            ticket.get(),
            note,
            actor.map(UserId::get),
            now_ms
        ],
    )?;
    let id = LogId(tx.last_insert_rowid());

    for (seq, change) in changes.iter().enumerate() {
        let (old_id, new_id) = change.raw_ids();
        tx.execute(
            r#"
            INSERT INTO ticket_changes(log_id, seq, field, entity_kind, old_id, new_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                id.get(),
                seq as i64,
                change.field().as_str(),
                change.entity_kind().as_str(),
                old_id,
                new_id
            ],
        )?;
    }

    tracing::info!(
        scope = %scope,
        ticket = %ticket,
        log = %id,
        changes = changes.len(),
        "ticket change recorded"
    );
    Ok(LogEntry {
        id,
        ticket,
        note: note.to_string(),
        actor,
        created_at_ms: now_ms,
        changes,
    })
}

#[derive(Debug, thiserror::Error)]
#[error("unknown tracked field {0:?}")]
struct UnknownField(String);

impl SqliteStore {
    /// Audits a ticket write the caller persisted on its own.
    ///
    /// `old` is the snapshot captured before the write. Field rows are produced only
    /// when `old` and `new` are the same ticket; the log row is always written. Access
    /// is judged on the stored ticket's project, and on `new.project` when it differs.
    pub fn record_ticket_change(
        &mut self,
        scope: &ScopeId,
        actor: &Actor,
        old: Option<&Ticket>,
        new: &Ticket,
        note: &str,
    ) -> Result<LogEntry, StoreError> {
        let user = require_authenticated(actor)?;
        let tx = self.write_tx()?;
        let stored = ticket_tx(&tx, scope, new.id)?;
        active_project_tx(&tx, scope, actor, stored.project)?;
        if new.project != stored.project {
            active_project_tx(&tx, scope, actor, new.project)?;
        }

        let changes = diff_tickets(old, new);
        let log = insert_log_tx(&tx, scope, new.id, Some(user), note, changes, now_ms())?;
        tx.commit()?;
        Ok(log)
    }

    /// Audit trail of a ticket, oldest first.
    pub fn ticket_logs(
        &self,
        scope: &ScopeId,
        actor: &Actor,
        ticket: TicketId,
    ) -> Result<Vec<LogEntry>, StoreError> {
        let tx = self.read_tx()?;
        let stored = ticket_tx(&tx, scope, ticket)?;
        active_project_tx(&tx, scope, actor, stored.project)?;

        let mut logs = Vec::new();
        let mut index = BTreeMap::new();
        {
            let mut stmt = tx.prepare(
                r#"
                SELECT id, note, actor_id, created_at_ms
                FROM ticket_logs
                WHERE scope = ?1 AND ticket_id = ?2
                ORDER BY id
                "#,
            )?;
            let mut rows = stmt.query(params![scope.as_str(), ticket.get()])?;
            while let Some(row) = rows.next()? {
                let id = LogId(row.get(0)?);
                index.insert(id, logs.len());
                logs.push(LogEntry {
                    id,
                    ticket,
                    note: row.get(1)?,
                    actor: row.get::<_, Option<i64>>(2)?.map(UserId),
                    created_at_ms: row.get(3)?,
                    changes: Vec::new(),
                });
            }
        }

        let mut stmt = tx.prepare(
            r#"
            SELECT c.log_id, c.field, c.old_id, c.new_id
            FROM ticket_changes c JOIN ticket_logs l ON l.id = c.log_id
            WHERE l.scope = ?1 AND l.ticket_id = ?2
            ORDER BY c.log_id, c.seq
            "#,
        )?;
        let mut rows = stmt.query(params![scope.as_str(), ticket.get()])?;
        while let Some(row) = rows.next()? {
            let log_id = LogId(row.get(0)?);
            let raw_field = row.get::<_, String>(1)?;
            let field = TrackedField::parse(&raw_field)
                .ok_or_else(|| conversion_error(1, UnknownField(raw_field)))?;
            let change = FieldChange::from_raw(field, row.get(2)?, row.get(3)?);
            if let Some(&position) = index.get(&log_id) {
                logs[position].changes.push(change);
            }
        }
        Ok(logs)
    }
}
