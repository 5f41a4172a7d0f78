#![forbid(unsafe_code)]

pub mod access;
pub mod audit;
pub mod ids;
pub mod model;
pub mod taxonomy;
pub mod tree;

pub use access::{AccessError, Actor, check_access, is_member, is_visible};
pub use audit::{EntityKind, FieldChange, LogEntry, TrackedField, diff_tickets};
pub use ids::*;
pub use model::*;
pub use taxonomy::{DefaultError, TaxonomyKind, TaxonomyRecord, select_default};
pub use tree::{ProjectTree, ResolveError, TreeError};
