//! Environment access.
//!
//! Every component that needs an environment value (credential detection,
//! permission flags, config overrides) receives an [`EnvSource`] instead of
//! calling `std::env` directly, so tests can hand in a fixed map.

use std::collections::HashMap;

pub const ENV_ENABLE_WRITE_MODE: &str = "OSDU_MCP_ENABLE_WRITE_MODE";
pub const ENV_ENABLE_DELETE_MODE: &str = "OSDU_MCP_ENABLE_DELETE_MODE";
pub const ENV_AUTH_MODE: &str = "OSDU_MCP_AUTH_MODE";
pub const ENV_SERVER_URL: &str = "OSDU_MCP_SERVER_URL";
pub const ENV_DATA_PARTITION: &str = "OSDU_MCP_SERVER_DATA_PARTITION";
pub const ENV_DOMAIN: &str = "OSDU_MCP_SERVER_DOMAIN";
pub const ENV_TIMEOUT: &str = "OSDU_MCP_SERVER_TIMEOUT";
pub const ENV_CONFIG_FILE: &str = "OSDU_MCP_CONFIG";

/// Read access to environment-style key/value settings.
pub trait EnvSource: Send + Sync {
    /// Raw value for `key`, if set.
    fn var(&self, key: &str) -> Option<String>;

    /// Value for `key` if it is set to something other than an empty string.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }

    /// True if `key` is set to a non-empty value.
    fn is_set(&self, key: &str) -> bool {
        self.non_empty(key).is_some()
    }

    /// True only if `key` is `true` (case-insensitive).
    fn flag(&self, key: &str) -> bool {
        self.var(key)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// The real process environment, read on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of values. Used by tests and by embedders that resolve
/// settings elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    values: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Write/delete gates, read fresh from the environment every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionFlags {
    pub write_enabled: bool,
    pub delete_enabled: bool,
}

impl PermissionFlags {
    pub fn read(env: &dyn EnvSource) -> Self {
        Self {
            write_enabled: env.flag(ENV_ENABLE_WRITE_MODE),
            delete_enabled: env.flag(ENV_ENABLE_DELETE_MODE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        let env = MapEnv::new()
            .with("A", "true")
            .with("B", "TRUE")
            .with("C", "yes")
            .with("D", "");
        assert!(env.flag("A"));
        assert!(env.flag("B"));
        assert!(!env.flag("C"));
        assert!(!env.flag("D"));
        assert!(!env.flag("MISSING"));
    }

    #[test]
    fn test_empty_values_are_not_set() {
        let env = MapEnv::new().with("EMPTY", "").with("FULL", "x");
        assert!(!env.is_set("EMPTY"));
        assert!(env.is_set("FULL"));
        assert_eq!(env.var("EMPTY"), Some(String::new()));
    }

    #[test]
    fn test_permission_flags_default_to_disabled() {
        let flags = PermissionFlags::read(&MapEnv::new());
        assert!(!flags.write_enabled);
        assert!(!flags.delete_enabled);

        let env = MapEnv::new().with(ENV_ENABLE_DELETE_MODE, "True");
        let flags = PermissionFlags::read(&env);
        assert!(!flags.write_enabled);
        assert!(flags.delete_enabled);
    }
}
