#![forbid(unsafe_code)]

mod audit;
mod error;
mod members;
mod projects;
mod requests;
mod support;
mod taxonomy;
mod tickets;

pub use error::StoreError;
pub use requests::*;

use crate::config::StoreConfig;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use support::*;
use tk_core::ScopeId;

const DB_FILE_NAME: &str = "ticketry.db";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(&StoreConfig::new(storage_dir.as_ref()))
    }

    pub fn open_with_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let storage_dir = config.storage_dir.clone();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        migrate_sqlite_schema(&conn)?;
        tracing::debug!(path = %db_path.display(), "store opened");

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn init_scope(&mut self, scope: &ScopeId) -> Result<(), StoreError> {
        let tx = self.write_tx()?;
        ensure_scope_tx(&tx, scope, now_ms())?;
        tx.commit()?;
        Ok(())
    }

    pub fn scope_exists(&self, scope: &ScopeId) -> Result<bool, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT 1 FROM scopes WHERE scope = ?1",
                params![scope.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .is_some())
    }

    /// Takes the write lock up front so concurrent writers queue instead of failing
    /// mid-transaction.
    fn write_tx(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    /// Read snapshot for lookups spanning several statements. Dropped without commit.
    fn read_tx(&self) -> Result<Transaction<'_>, StoreError> {
        Ok(self.conn.unchecked_transaction()?)
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

fn map_slug_conflict(err: rusqlite::Error, slug: &str) -> StoreError {
    if is_constraint_violation(&err) {
        return StoreError::SlugTaken {
            slug: slug.to_string(),
        };
    }
    StoreError::Sql(err)
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
