#![forbid(unsafe_code)]

use std::path::PathBuf;

pub const STORAGE_DIR_ENV: &str = "TICKETRY_STORAGE_DIR";
pub const BUSY_TIMEOUT_ENV: &str = "TICKETRY_BUSY_TIMEOUT_MS";

const DEFAULT_STORAGE_DIR: &str = ".ticketry";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_dir: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            ..Self::default()
        }
    }

    /// Reads `TICKETRY_STORAGE_DIR` and `TICKETRY_BUSY_TIMEOUT_MS`. Unset or unparsable
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let storage_dir = lookup(STORAGE_DIR_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir);
        let busy_timeout_ms = match lookup(BUSY_TIMEOUT_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(value) => value,
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring invalid {BUSY_TIMEOUT_ENV}");
                    defaults.busy_timeout_ms
                }
            },
            None => defaults.busy_timeout_ms,
        };
        Self {
            storage_dir,
            busy_timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_overrides_and_falls_back() {
        let env = HashMap::from([
            (STORAGE_DIR_ENV, "/var/lib/ticketry"),
            (BUSY_TIMEOUT_ENV, "250"),
        ]);
        let config = StoreConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/ticketry"));
        assert_eq!(config.busy_timeout_ms, 250);

        let env = HashMap::from([(STORAGE_DIR_ENV, "  "), (BUSY_TIMEOUT_ENV, "soon")]);
        let config = StoreConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config, StoreConfig::default());
    }
}
