//! Registry configuration types
//!
//! The defaults reproduce the host framework: priority 10, one accepted
//! argument, and every well-formed function name counts as callable.

use serde::{Deserialize, Serialize};

/// Priority used when a caller omits one
pub const DEFAULT_PRIORITY: i32 = 10;

/// Accepted-argument count used when a caller omits one
pub const DEFAULT_ACCEPTED_ARGS: u32 = 1;

/// Configuration for a [`crate::HookRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Priority applied when register/unregister/assert omit one
    #[serde(default = "default_priority")]
    pub default_priority: i32,

    /// Accepted-argument count applied when register omits one
    #[serde(default = "default_accepted_args")]
    pub default_accepted_args: u32,

    /// Optional: the only free functions that exist.
    ///
    /// When set, registering or querying a function callback not in this list
    /// fails as not invocable. Assertions only check syntax and ignore it.
    #[serde(default)]
    pub known_functions: Option<Vec<String>>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_accepted_args() -> u32 {
    DEFAULT_ACCEPTED_ARGS
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            default_accepted_args: DEFAULT_ACCEPTED_ARGS,
            known_functions: None,
        }
    }
}

impl RegistryConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the default priority
    pub fn with_default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }

    /// Builder method: set the default accepted-argument count
    pub fn with_default_accepted_args(mut self, accepted_args: u32) -> Self {
        self.default_accepted_args = accepted_args;
        self
    }

    /// Builder method: declare a function as existing
    pub fn add_known_function(mut self, name: impl Into<String>) -> Self {
        self.known_functions
            .get_or_insert_with(Vec::new)
            .push(name.into());
        self
    }

    /// Builder method: replace the whole function table
    pub fn with_known_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_functions = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Check if a free function exists under this configuration
    pub fn is_known_function(&self, name: &str) -> bool {
        match &self.known_functions {
            Some(known) => known.iter().any(|f| f == name),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::new();
        assert_eq!(config.default_priority, 10);
        assert_eq!(config.default_accepted_args, 1);
        assert!(config.known_functions.is_none());
        assert!(config.is_known_function("anything_goes"));
    }

    #[test]
    fn test_builder() {
        let config = RegistryConfig::new()
            .with_default_priority(5)
            .with_default_accepted_args(2)
            .add_known_function("__return_true")
            .add_known_function("__return_false");

        assert_eq!(config.default_priority, 5);
        assert_eq!(config.default_accepted_args, 2);
        assert!(config.is_known_function("__return_false"));
        assert!(!config.is_known_function("__return_null"));

        let config = config.with_known_functions(["__return_null"]);
        assert!(!config.is_known_function("__return_true"));
        assert!(config.is_known_function("__return_null"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{ "known_functions": ["__return_true"] }"#).unwrap();
        assert_eq!(config.default_priority, DEFAULT_PRIORITY);
        assert_eq!(config.default_accepted_args, DEFAULT_ACCEPTED_ARGS);
        assert_eq!(config.known_functions, Some(vec!["__return_true".to_string()]));
    }
}
