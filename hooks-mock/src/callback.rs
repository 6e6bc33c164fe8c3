//! Callback references and their identities
//!
//! A hook callback is never run by the registry, only recorded and compared.
//! What matters is its identity: two references to the same callable must map
//! to the same [`CallbackId`], and different callables must not collide.

use crate::config::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of per-instance tokens for object and closure handles
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

fn next_token() -> u64 {
    NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
}

fn render_token(token: u64) -> String {
    format!("{:032x}", token)
}

/// String identifying a callback for lookup and deduplication
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(String);

impl CallbackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CallbackId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CallbackId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Stand-in for an object instance that bound-method callbacks hang off.
///
/// Every handle created with [`ObjectHandle::new`] carries a fresh token; clones
/// share it, so they identify the same object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    token: u64,
    class: String,
}

impl ObjectHandle {
    /// Create a new object of the given class
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            token: next_token(),
            class: class.into(),
        }
    }

    /// Class name the object was created with
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Stable per-object token (32 hex digits)
    pub fn token(&self) -> String {
        render_token(self.token)
    }
}

/// Stand-in for an anonymous callable.
///
/// Identity is per instance, like [`ObjectHandle`]. The optional label only
/// shows up in `Display` output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClosureHandle {
    token: u64,
    label: Option<String>,
}

impl ClosureHandle {
    pub fn new() -> Self {
        Self {
            token: next_token(),
            label: None,
        }
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            token: next_token(),
            label: Some(label.into()),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Stable per-closure token (32 hex digits)
    pub fn token(&self) -> String {
        render_token(self.token)
    }
}

impl Default for ClosureHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A reference to something a hook could call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Callback {
    /// Named free function (`"__return_true"`). A name of the form
    /// `"Class::method"` refers to a static method.
    Function(String),
    /// Method bound to an object instance
    Method { object: ObjectHandle, method: String },
    /// Static method on a class
    Static { class: String, method: String },
    /// Anonymous callable
    Closure(ClosureHandle),
}

/// How thoroughly a callback reference is checked before use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Validation<'a> {
    /// Identifier syntax, and existence of free functions per the config
    Strict(&'a RegistryConfig),
    /// Anything that could name a callable: any function string, non-empty
    /// class and method parts
    Loose,
}

impl Callback {
    /// Reference a free function by name
    pub fn function(name: impl Into<String>) -> Self {
        Callback::Function(name.into())
    }

    /// Reference a method bound to `object`
    pub fn method(object: &ObjectHandle, method: impl Into<String>) -> Self {
        Callback::Method {
            object: object.clone(),
            method: method.into(),
        }
    }

    /// Reference a static method
    pub fn static_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Callback::Static {
            class: class.into(),
            method: method.into(),
        }
    }

    /// A fresh anonymous callable
    pub fn closure() -> Self {
        Callback::Closure(ClosureHandle::new())
    }

    /// A fresh anonymous callable with a label for display
    pub fn labeled_closure(label: impl Into<String>) -> Self {
        Callback::Closure(ClosureHandle::labeled(label))
    }

    /// Compute the identity of this callback.
    ///
    /// - function name: the name itself
    /// - bound method: object token followed by the method name
    /// - static method: `Class::method`
    /// - closure: the closure token
    pub fn unique_id(&self) -> CallbackId {
        let id = match self {
            Callback::Function(name) => name.clone(),
            Callback::Method { object, method } => format!("{}{}", object.token(), method),
            Callback::Static { class, method } => format!("{}::{}", class, method),
            Callback::Closure(handle) => handle.token(),
        };
        CallbackId(id)
    }

    pub(crate) fn is_invocable(&self, validation: Validation<'_>) -> bool {
        let Validation::Strict(config) = validation else {
            return match self {
                Callback::Function(_) | Callback::Closure(_) => true,
                Callback::Method { method, .. } => !method.is_empty(),
                Callback::Static { class, method } => !class.is_empty() && !method.is_empty(),
            };
        };

        match self {
            Callback::Function(name) => match name.split_once("::") {
                Some((class, method)) => is_class_name(class) && is_identifier(method),
                None => is_identifier(name) && config.is_known_function(name),
            },
            Callback::Method { method, .. } => is_identifier(method),
            Callback::Static { class, method } => is_class_name(class) && is_identifier(method),
            Callback::Closure(_) => true,
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Function(name) => write!(f, "{}", name),
            Callback::Method { object, method } => write!(f, "{}->{}", object.class(), method),
            Callback::Static { class, method } => write!(f, "{}::{}", class, method),
            Callback::Closure(handle) => match handle.label() {
                Some(label) => write!(f, "{{closure {}}}", label),
                None => write!(f, "{{closure}}"),
            },
        }
    }
}

impl From<&str> for Callback {
    fn from(name: &str) -> Self {
        Callback::Function(name.to_string())
    }
}

impl From<String> for Callback {
    fn from(name: String) -> Self {
        Callback::Function(name)
    }
}

impl From<&Callback> for Callback {
    fn from(callback: &Callback) -> Self {
        callback.clone()
    }
}

impl From<ClosureHandle> for Callback {
    fn from(handle: ClosureHandle) -> Self {
        Callback::Closure(handle)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Class names may be namespaced with `\` separators
fn is_class_name(s: &str) -> bool {
    let s = s.strip_prefix('\\').unwrap_or(s);
    !s.is_empty() && s.split('\\').all(is_identifier)
}
