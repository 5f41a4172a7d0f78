#![forbid(unsafe_code)]

mod access_tx;
mod rows;
mod schema;
mod taxonomy_tx;
mod time;

pub(super) use access_tx::*;
pub(super) use rows::*;
pub(super) use schema::migrate_sqlite_schema;
pub(super) use taxonomy_tx::*;
pub(super) use time::now_ms;
