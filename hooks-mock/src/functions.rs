//! Free functions over the thread's default registry
//!
//! Code under test calls hooks through global functions (`add_action`,
//! `do_action`, ...). These forward to a registry owned by the current thread.
//! The test harness runs every test on its own thread, so tests start with an
//! empty registry; call [`tear_down`] to reset it between cases that share a
//! thread.

use crate::callback::{Callback, CallbackId};
use crate::config::RegistryConfig;
use crate::registry::HookRegistry;
use crate::types::{FiredRecord, HookKind, HookValue, Result};
use std::cell::RefCell;

thread_local! {
    static REGISTRY: RefCell<HookRegistry> = RefCell::new(HookRegistry::new());
}

/// Run `f` with the thread's default registry.
///
/// # Panics
///
/// Panics if called from inside `f` of [`with_registry_mut`].
pub fn with_registry<R>(f: impl FnOnce(&HookRegistry) -> R) -> R {
    REGISTRY.with(|registry| f(&registry.borrow()))
}

/// Run `f` with mutable access to the thread's default registry.
///
/// # Panics
///
/// Panics if called from inside another `with_registry*` closure.
pub fn with_registry_mut<R>(f: impl FnOnce(&mut HookRegistry) -> R) -> R {
    REGISTRY.with(|registry| f(&mut registry.borrow_mut()))
}

/// Replace the default registry with an empty one using `config`
pub fn configure(config: RegistryConfig) {
    with_registry_mut(|registry| *registry = HookRegistry::with_config(config));
}

/// Clear every registration and firing of the default registry
pub fn tear_down() {
    with_registry_mut(HookRegistry::reset);
}

pub fn add_action(
    hook: &str,
    callback: impl Into<Callback>,
    priority: Option<i32>,
    accepted_args: Option<u32>,
) -> Result<()> {
    let callback = callback.into();
    with_registry_mut(|r| r.register(HookKind::Action, hook, callback, priority, accepted_args))
}

pub fn add_filter(
    hook: &str,
    callback: impl Into<Callback>,
    priority: Option<i32>,
    accepted_args: Option<u32>,
) -> Result<()> {
    let callback = callback.into();
    with_registry_mut(|r| r.register(HookKind::Filter, hook, callback, priority, accepted_args))
}

pub fn remove_action(
    hook: &str,
    callback: impl Into<Callback>,
    priority: Option<i32>,
    accepted_args: Option<u32>,
) -> Result<bool> {
    let callback = callback.into();
    with_registry_mut(|r| r.unregister(HookKind::Action, hook, &callback, priority, accepted_args))
}

pub fn remove_filter(
    hook: &str,
    callback: impl Into<Callback>,
    priority: Option<i32>,
    accepted_args: Option<u32>,
) -> Result<bool> {
    let callback = callback.into();
    with_registry_mut(|r| r.unregister(HookKind::Filter, hook, &callback, priority, accepted_args))
}

/// Record an action firing. See also [`crate::do_action!`].
pub fn do_action(hook: &str, args: Vec<HookValue>) -> Result<FiredRecord> {
    with_registry_mut(|r| r.fire(HookKind::Action, hook, args))
}

/// Record a filter firing; `args[0]` is the value being filtered.
/// See also [`crate::apply_filters!`].
pub fn apply_filters(hook: &str, args: Vec<HookValue>) -> Result<FiredRecord> {
    with_registry_mut(|r| r.fire(HookKind::Filter, hook, args))
}

pub fn did_action(hook: &str) -> Result<bool> {
    with_registry(|r| r.has_hook_fired(HookKind::Action, hook))
}

pub fn did_filter(hook: &str) -> Result<bool> {
    with_registry(|r| r.has_hook_fired(HookKind::Filter, hook))
}

pub fn has_action(hook: &str, callback: Option<&Callback>, priority: Option<i32>) -> Result<bool> {
    with_registry(|r| r.has_hook(HookKind::Action, hook, callback, priority))
}

pub fn has_filter(hook: &str, callback: Option<&Callback>, priority: Option<i32>) -> Result<bool> {
    with_registry(|r| r.has_hook(HookKind::Filter, hook, callback, priority))
}

/// Identity of `callback`, as used to key registrations
pub fn callback_unique_id(callback: impl Into<Callback>) -> CallbackId {
    callback.into().unique_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::ObjectHandle;
    use serde_json::json;

    #[test]
    fn test_add_and_remove_action() {
        tear_down();
        add_action("foo", "__return_true", Some(20), Some(3)).unwrap();
        add_action("bar", "__return_empty_string", Some(10), Some(4)).unwrap();

        assert!(has_action("foo", Some(&"__return_true".into()), Some(20)).unwrap());
        assert!(!has_filter("foo", None, None).unwrap());

        assert!(remove_action("foo", "__return_true", Some(20), Some(3)).unwrap());
        assert!(!has_action("foo", None, None).unwrap());
        assert!(has_action("bar", None, None).unwrap());
        tear_down();
    }

    #[test]
    fn test_filters_are_separate() {
        tear_down();
        let stub = ObjectHandle::new("HooksMockTestStubClass");
        add_filter("foo", Callback::method(&stub, "stub"), Some(30), None).unwrap();

        assert!(has_filter("foo", Some(&Callback::method(&stub, "stub")), None).unwrap());
        assert!(!has_action("foo", None, None).unwrap());
        assert!(!remove_action("foo", Callback::method(&stub, "stub"), Some(30), None).unwrap());
        assert!(remove_filter("foo", Callback::method(&stub, "stub"), Some(30), Some(1)).unwrap());
        tear_down();
    }

    #[test]
    fn test_fire_functions() {
        tear_down();
        do_action("init", vec![]).unwrap();
        let record = apply_filters("the_content", vec![json!("<p>hi</p>")]).unwrap();
        assert_eq!(record.filtered_value(), Some(&json!("<p>hi</p>")));

        assert!(did_action("init").unwrap());
        assert!(!did_filter("init").unwrap());
        assert!(did_filter("the_content").unwrap());
        assert!(did_action("").is_err());
        tear_down();
    }

    #[test]
    fn test_configure_replaces_registry() {
        add_action("foo", "fn_a", None, None).unwrap();
        configure(RegistryConfig::new().add_known_function("fn_b"));

        assert!(!has_action("foo", None, None).unwrap());
        assert!(add_action("foo", "fn_a", None, None).unwrap_err().is_invalid_input());
        add_action("foo", "fn_b", None, None).unwrap();
        assert_eq!(
            with_registry(|r| r.config().known_functions.clone()),
            Some(vec!["fn_b".to_string()])
        );
        configure(RegistryConfig::default());
    }

    #[test]
    fn test_callback_unique_id() {
        assert_eq!(callback_unique_id("__return_false"), "__return_false");
        assert_eq!(
            callback_unique_id(Callback::static_method("HooksMockTest", "doNothing")),
            "HooksMockTest::doNothing"
        );
        let closure = Callback::closure();
        assert_eq!(callback_unique_id(&closure), closure.unique_id());
    }
}
