//! Core types for the hooks mock library
//!
//! This module defines the hook kinds, the argument value type recorded when a
//! hook fires, and the error type shared by every registry operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value passed as a hook argument.
///
/// Comparison is strict: `1`, `1.0` and `"1"` are three different values.
/// Use [`identical`] rather than `==` when object key order matters.
pub type HookValue = serde_json::Value;

/// Strict equality of two hook values.
///
/// Like `==`, except objects must also list their keys in the same order.
pub fn identical(a: &HookValue, b: &HookValue) -> bool {
    match (a, b) {
        (HookValue::Array(a), HookValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| identical(x, y))
        }
        (HookValue::Object(a), HookValue::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|((ka, va), (kb, vb))| ka == kb && identical(va, vb))
        }
        _ => a == b,
    }
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, HookError>;

/// The two flavors of hook
///
/// Actions are fired for their side effects, filters thread a value through
/// their callbacks. Registrations and fired history for the two kinds live in
/// separate namespaces.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum HookKind {
    #[default]
    Action,
    Filter,
}

impl HookKind {
    /// Resolve a kind from its name.
    ///
    /// Anything other than `"filter"` resolves to [`HookKind::Action`], including
    /// unknown names and the empty string.
    pub fn from_name(name: &str) -> Self {
        match name {
            "filter" => HookKind::Filter,
            _ => HookKind::Action,
        }
    }

    /// Lowercase name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::Action => "action",
            HookKind::Filter => "filter",
        }
    }
}

impl From<&str> for HookKind {
    fn from(name: &str) -> Self {
        HookKind::from_name(name)
    }
}

impl From<String> for HookKind {
    fn from(name: String) -> Self {
        HookKind::from_name(&name)
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    /// Malformed call: empty hook name, non-invocable callback, bad priority
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Registry state does not match an asserted expectation
    #[error("Hook assertion failed: {0}")]
    Assertion(String),
}

impl HookError {
    /// True for [`HookError::InvalidInput`]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, HookError::InvalidInput(_))
    }

    /// True for [`HookError::Assertion`]
    pub fn is_assertion(&self) -> bool {
        matches!(self, HookError::Assertion(_))
    }

    /// Message without the error-kind prefix
    pub fn message(&self) -> &str {
        match self {
            HookError::InvalidInput(msg) | HookError::Assertion(msg) => msg,
        }
    }
}

/// Record of a single hook firing
///
/// Returned by [`crate::HookRegistry::fire`]. The same arguments are appended
/// to the registry's fired history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredRecord {
    /// Kind the hook was fired as
    pub kind: HookKind,
    /// Name of the fired hook
    pub hook: String,
    /// Arguments the hook was fired with, in order
    pub args: Vec<HookValue>,
}

impl FiredRecord {
    /// The value a filter threads through its callbacks: the first argument.
    ///
    /// Registered callbacks are never run, so this is the unfiltered input.
    pub fn filtered_value(&self) -> Option<&HookValue> {
        self.args.first()
    }
}
