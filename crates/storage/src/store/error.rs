#![forbid(unsafe_code)]

use tk_core::{AccessError, DefaultError, ProjectId, ResolveError, TaxonomyKind, TreeError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("not found")]
    NotFound,
    #[error("forbidden (project={project:?})")]
    Forbidden { project: Option<ProjectId> },
    #[error("slug already used by a sibling: {slug}")]
    SlugTaken { slug: String },
    #[error("project parent cycle")]
    ParentCycle,
    #[error("{kind} collection has {count} default records")]
    InvariantViolation { kind: TaxonomyKind, count: usize },
}

impl From<AccessError> for StoreError {
    fn from(value: AccessError) -> Self {
        match value {
            AccessError::Forbidden { project } => Self::Forbidden {
                project: Some(project),
            },
        }
    }
}

impl From<ResolveError> for StoreError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::NotFound { .. } => Self::NotFound,
        }
    }
}

impl From<TreeError> for StoreError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::UnknownProject(_) => Self::NotFound,
            TreeError::ParentCycle => Self::ParentCycle,
            TreeError::SlugTaken { slug } => Self::SlugTaken {
                slug: slug.into_string(),
            },
            TreeError::DepthExceeded => Self::InvalidInput("project tree is too deep"),
        }
    }
}

impl From<DefaultError> for StoreError {
    fn from(value: DefaultError) -> Self {
        match value {
            DefaultError::InvariantViolation { kind, count } => {
                Self::InvariantViolation { kind, count }
            }
        }
    }
}
