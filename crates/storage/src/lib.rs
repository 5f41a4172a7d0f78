#![forbid(unsafe_code)]

//! SQLite persistence for ticketry: project trees, memberships, default-carrying
//! taxonomies, tickets and their audit trail.

mod config;
mod store;

pub use config::{BUSY_TIMEOUT_ENV, STORAGE_DIR_ENV, StoreConfig};
pub use store::*;
