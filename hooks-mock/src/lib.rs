//! Hooks Mock Library
//!
//! An in-memory stand-in for a global hook system (actions and filters), so
//! code that registers and fires hooks can be unit tested without the host
//! environment that normally dispatches them.
//!
//! # Architecture
//!
//! [`HookRegistry`] keeps two stores per hook kind:
//! - registrations: hook → priority → callback identity → accepted-arg count
//! - fired history: hook → argument snapshots, one per firing
//!
//! The registry does NOT:
//! - Run registered callbacks
//! - Order or dispatch anything by priority
//! - Persist state or perform I/O
//!
//! Code under test usually goes through the free functions ([`add_action`],
//! [`do_action`], ...), which forward to a per-thread default registry. Tests
//! then check expectations with the assertion functions.
//!
//! # Example Usage
//!
//! ```
//! use hooks_mock::{add_filter, assert_filter_added, assert_action_fired, do_action, tear_down};
//! use serde_json::json;
//!
//! // Code under test
//! add_filter("the_title", "my_title_filter", Some(20), Some(2)).unwrap();
//! do_action!("init", "front").unwrap();
//!
//! // Test assertions
//! assert_filter_added("the_title", "my_title_filter", Some(20), Some(2)).unwrap();
//! assert_action_fired("init", Some(&[json!("front")])).unwrap();
//! assert!(assert_filter_added("the_title", "my_title_filter", Some(20), Some(1)).is_err());
//!
//! tear_down();
//! ```

// Public modules
pub mod assertions;
pub mod callback;
pub mod config;
pub mod functions;
pub mod registry;
pub mod types;

mod macros;

// Re-export main types for convenience
pub use assertions::{
    assert_action_added, assert_action_fired, assert_filter_added, assert_filter_fired,
};
pub use callback::{Callback, CallbackId, ClosureHandle, ObjectHandle};
pub use config::{RegistryConfig, DEFAULT_ACCEPTED_ARGS, DEFAULT_PRIORITY};
pub use functions::{
    add_action, add_filter, apply_filters, callback_unique_id, configure, did_action, did_filter,
    do_action, has_action, has_filter, remove_action, remove_filter, tear_down, with_registry,
    with_registry_mut,
};
pub use registry::{
    Bucket, HookRegistry, KindSnapshot, PriorityMap, RegisteredSnapshot, Registration,
    RegistrationSnapshot, RegistrySnapshot,
};
pub use types::{identical, FiredRecord, HookError, HookKind, HookValue, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: a fresh registry is empty
        let registry = HookRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.config().default_priority, DEFAULT_PRIORITY);
    }
}
