#![forbid(unsafe_code)]

use super::rows::{TAXONOMY_COLUMNS, taxonomy_from_row};
use crate::store::StoreError;
use rusqlite::{Transaction, params};
use tk_core::{ScopeId, TaxonomyKind, TaxonomyRecord, select_default};

pub(in crate::store) fn list_taxonomy_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    kind: TaxonomyKind,
) -> Result<Vec<TaxonomyRecord>, StoreError> {
    let mut stmt = tx.prepare(&format!(
        "SELECT {TAXONOMY_COLUMNS} FROM taxonomy WHERE scope = ?1 AND kind = ?2 ORDER BY ordering, name, id"
    ))?;
    let records = stmt
        .query_map(params![scope.as_str(), kind.as_str()], taxonomy_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Reads every flagged record of the collection. Two or more is reported, never repaired.
pub(in crate::store) fn default_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    kind: TaxonomyKind,
) -> Result<Option<TaxonomyRecord>, StoreError> {
    let mut stmt = tx.prepare(&format!(
        "SELECT {TAXONOMY_COLUMNS} FROM taxonomy WHERE scope = ?1 AND kind = ?2 AND is_default = 1 ORDER BY id"
    ))?;
    let flagged = stmt
        .query_map(params![scope.as_str(), kind.as_str()], taxonomy_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    match select_default(kind, &flagged) {
        Ok(found) => Ok(found.cloned()),
        Err(err) => {
            tracing::error!(
                scope = %scope,
                kind = %kind,
                ids = ?flagged.iter().map(|record| record.id).collect::<Vec<_>>(),
                "default invariant violated"
            );
            Err(err.into())
        }
    }
}

/// Clears the flag on every other record of the collection. Must run in the same
/// transaction as the write that sets `keep` as default.
pub(in crate::store) fn clear_other_defaults_tx(
    tx: &Transaction<'_>,
    scope: &ScopeId,
    kind: TaxonomyKind,
    keep: i64,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "UPDATE taxonomy SET is_default = 0 WHERE scope = ?1 AND kind = ?2 AND id <> ?3 AND is_default = 1",
        params![scope.as_str(), kind.as_str(), keep],
    )?)
}
