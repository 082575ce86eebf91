//! Renderer-wide settings store
//!
//! A plain key/value store with a fixed set of recognized keys: `views`
//! (directory used for include resolution), `default_scheme` (fallback when
//! a render call names no scheme), and `ignore_errors` (whether accumulated
//! expression errors still produce a success response).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Keys the validating setter accepts
pub const RECOGNIZED_KEYS: &[&str] = &["views", "default_scheme", "ignore_errors"];

/// Errors that can occur when loading a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A setting value
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::Text(s)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Flag(b)
    }
}

/// Key/value store for renderer settings
#[derive(Debug, Default, Clone)]
pub struct ConfigStore {
    entries: HashMap<String, SettingValue>,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load settings from a TOML string
    ///
    /// File keys go through the same validation as [`Self::set_checked`],
    /// so a typo in a config file logs a warning instead of vanishing.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;
        let mut store = Self::new();
        for (key, value) in table {
            match value {
                toml::Value::String(text) => store.set_checked(&key, text),
                toml::Value::Boolean(flag) => store.set_checked(&key, flag),
                other => {
                    tracing::warn!(
                        key = %key,
                        value_type = other.type_str(),
                        "ignoring config value of unsupported type"
                    );
                }
            }
        }
        Ok(store)
    }

    /// Set a key unconditionally
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Set a key only if it is recognized; logs and leaves the store
    /// unchanged otherwise
    pub fn set_checked(&mut self, key: &str, value: impl Into<SettingValue>) {
        if RECOGNIZED_KEYS.contains(&key) {
            self.entries.insert(key.to_string(), value.into());
        } else {
            tracing::warn!(key, "ignoring unrecognized config key");
        }
    }

    /// Get a raw value; absent keys return None, never an error
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries.get(key)
    }

    /// Directory used for include resolution
    pub fn views_dir(&self) -> Option<PathBuf> {
        match self.get("views") {
            Some(SettingValue::Text(path)) => Some(PathBuf::from(path)),
            _ => None,
        }
    }

    /// Scheme used when a render call names none
    pub fn default_scheme(&self) -> Option<&str> {
        match self.get("default_scheme") {
            Some(SettingValue::Text(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Whether accumulated expression errors still produce a success response
    pub fn ignore_errors(&self) -> bool {
        matches!(self.get("ignore_errors"), Some(SettingValue::Flag(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigStore::new();
        config.set("views", "templates/views");
        assert_eq!(
            config.get("views"),
            Some(&SettingValue::from("templates/views"))
        );
        assert_eq!(config.views_dir(), Some(PathBuf::from("templates/views")));
    }

    #[test]
    fn test_get_absent_key() {
        let config = ConfigStore::new();
        assert_eq!(config.get("views"), None);
        assert_eq!(config.views_dir(), None);
        assert_eq!(config.default_scheme(), None);
        assert!(!config.ignore_errors());
    }

    #[test]
    fn test_set_checked_rejects_unknown_key() {
        let mut config = ConfigStore::new();
        config.set_checked("view", "typo");
        assert_eq!(config.get("view"), None);

        config.set_checked("views", "ok");
        assert_eq!(config.views_dir(), Some(PathBuf::from("ok")));
    }

    #[test]
    fn test_ignore_errors_flag() {
        let mut config = ConfigStore::new();
        assert!(!config.ignore_errors());
        config.set("ignore_errors", true);
        assert!(config.ignore_errors());
        config.set("ignore_errors", false);
        assert!(!config.ignore_errors());
    }

    #[test]
    fn test_from_toml_str() {
        let config = ConfigStore::from_toml_str(
            r#"
views = "views"
default_scheme = "main"
ignore_errors = true
"#,
        )
        .expect("Should parse");
        assert_eq!(config.views_dir(), Some(PathBuf::from("views")));
        assert_eq!(config.default_scheme(), Some("main"));
        assert!(config.ignore_errors());
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = ConfigStore::from_toml_str(r#"default_scheme = "main""#).unwrap();
        assert_eq!(config.default_scheme(), Some("main"));
        assert_eq!(config.views_dir(), None);
        assert!(!config.ignore_errors());
    }

    #[test]
    fn test_from_toml_str_unknown_key_not_stored() {
        // `view` is the classic typo for `views`
        let config = ConfigStore::from_toml_str(
            r#"
view = "typo"
default_scheme = "main"
"#,
        )
        .expect("Should parse");
        assert_eq!(config.get("view"), None);
        assert_eq!(config.views_dir(), None);
        assert_eq!(config.default_scheme(), Some("main"));
    }

    #[test]
    fn test_from_toml_str_unsupported_value_type_not_stored() {
        let config = ConfigStore::from_toml_str(r#"views = [1, 2]"#).unwrap();
        assert_eq!(config.get("views"), None);
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = ConfigStore::from_toml_str("views = [not valid");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
