#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Tenant boundary threaded through every lookup. Records never cross scopes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopeId(String);

impl ScopeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, ScopeIdError> {
        let value = value.into();
        validate_scope_id(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<String> for ScopeId {
    type Error = ScopeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<ScopeId> for String {
    fn from(value: ScopeId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScopeIdError {
    #[error("scope id must not be empty")]
    Empty,
    #[error("scope id is too long")]
    TooLong,
    #[error("scope id must start with an ascii letter or digit")]
    InvalidFirstChar,
    #[error("scope id contains invalid char {ch:?} at {index}")]
    InvalidChar { ch: char, index: usize },
}

fn validate_scope_id(value: &str) -> Result<(), ScopeIdError> {
    if value.is_empty() {
        return Err(ScopeIdError::Empty);
    }
    if value.len() > 128 {
        return Err(ScopeIdError::TooLong);
    }
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(ScopeIdError::Empty);
    };
    if !first.is_ascii_alphanumeric() {
        return Err(ScopeIdError::InvalidFirstChar);
    }
    for (index, ch) in value.chars().enumerate().skip(1) {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            continue;
        }
        return Err(ScopeIdError::InvalidChar { ch, index });
    }
    Ok(())
}

const MAX_SLUG_LEN: usize = 50;

/// Short identifier unique among the children of one parent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SlugError::Empty);
        }
        if trimmed.len() > MAX_SLUG_LEN {
            return Err(SlugError::TooLong);
        }
        if let Some(ch) = trimmed
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_')))
        {
            return Err(SlugError::InvalidChar { ch });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Splits a routing path like `acme/web` into slugs. Empty segments are skipped,
    /// so `""` and `"/"` both produce an empty sequence.
    pub fn split_path(path: &str) -> Result<Vec<Slug>, SlugError> {
        path.split('/')
            .filter(|segment| !segment.trim().is_empty())
            .map(Slug::try_new)
            .collect()
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug is too long")]
    TooLong,
    #[error("slug contains invalid char {ch:?}")]
    InvalidChar { ch: char },
}

macro_rules! record_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub i64);

            impl $name {
                pub fn get(self) -> i64 {
                    self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

record_id!(
    ProjectId,
    UserId,
    RoleId,
    StatusId,
    PriorityId,
    TicketTypeId,
    ComponentId,
    TicketId,
    LogId,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_id_validation() {
        assert_eq!(ScopeId::try_new("").unwrap_err(), ScopeIdError::Empty);
        assert_eq!(
            ScopeId::try_new("-site").unwrap_err(),
            ScopeIdError::InvalidFirstChar
        );
        assert_eq!(
            ScopeId::try_new("a/b").unwrap_err(),
            ScopeIdError::InvalidChar { ch: '/', index: 1 }
        );
        assert_eq!(
            ScopeId::try_new("x".repeat(129)).unwrap_err(),
            ScopeIdError::TooLong
        );
        assert!(ScopeId::try_new("example.com").is_ok());
    }

    #[test]
    fn slug_validation() {
        assert_eq!(Slug::try_new("  ").unwrap_err(), SlugError::Empty);
        assert_eq!(Slug::try_new("Web").unwrap().as_str(), "Web");
        assert_eq!(
            Slug::try_new("café").unwrap_err(),
            SlugError::InvalidChar { ch: 'é' }
        );
        assert_eq!(
            Slug::try_new("a/b").unwrap_err(),
            SlugError::InvalidChar { ch: '/' }
        );
        assert_eq!(Slug::try_new(" web ").unwrap().as_str(), "web");
    }

    #[test]
    fn split_path_skips_empty_segments() {
        let slugs = Slug::split_path("/acme//web/").unwrap();
        assert_eq!(
            slugs.iter().map(Slug::as_str).collect::<Vec<_>>(),
            vec!["acme", "web"]
        );
        assert!(Slug::split_path("").unwrap().is_empty());
        assert!(Slug::split_path("acme/b d").is_err());
    }
}
